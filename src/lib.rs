pub mod cli;
pub mod config;
pub mod error;
pub mod notifications;
pub mod pipeline;

use serde::Serialize;

use config::{Environment, SmtpConfig};
use error::NotifyError;
use notifications::NotificationMessage;
use pipeline::{BuildMetrics, PipelineContext, PipelineStatus};

/// How a notification run should be carried out
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Print the rendered message instead of sending it
    pub dry_run: bool,
    /// Print the dry-run preview as JSON
    pub json: bool,
}

/// Dry-run output
#[derive(Debug, Serialize)]
struct Preview<'a> {
    status: PipelineStatus,
    recipient: Option<&'a str>,
    subject: &'a str,
    body: &'a str,
}

/// Resolve the status, collect the run context and render the email
pub fn prepare(env: &Environment) -> (PipelineStatus, NotificationMessage) {
    let (status, message) = pipeline::resolve_status(env);
    let context = PipelineContext::collect(env);
    let metrics = BuildMetrics::collect(env);

    tracing::debug!(
        status = %status,
        repository = %context.repository,
        run_id = %context.run_id,
        sha = %context.sha,
        "Pipeline context collected"
    );

    (
        status,
        NotificationMessage::render(status, &message, &context, &metrics),
    )
}

/// Send one pipeline notification, reporting progress on stdout
pub async fn run(env: &Environment, options: RunOptions) -> Result<(), NotifyError> {
    println!("🚀 Starting notification script...");

    let recipient = match env.recipient() {
        Ok(recipient) => Some(recipient),
        Err(_) if options.dry_run => None,
        Err(e) => {
            println!("❌ Error: {}", e);
            return Err(e.into());
        }
    };

    let (status, message) = prepare(env);

    println!("📊 Pipeline status: {}", status);
    tracing::info!(status = %status, "Pipeline status resolved");

    if options.dry_run {
        return print_preview(status, recipient.as_deref(), &message, options.json);
    }

    // Only the dry-run path reaches here without a recipient
    let Some(recipient) = recipient else {
        return Err(error::ConfigError::MissingRecipient.into());
    };

    println!("📧 Sending notification to: {}", recipient);

    let smtp = SmtpConfig::from_env(env);
    if notifications::email::deliver(&smtp, &recipient, &message).await {
        println!("✅ Notification sent successfully!");
        Ok(())
    } else {
        println!("❌ Failed to send notification!");
        Err(NotifyError::DeliveryFailed)
    }
}

fn print_preview(
    status: PipelineStatus,
    recipient: Option<&str>,
    message: &NotificationMessage,
    json: bool,
) -> Result<(), NotifyError> {
    if json {
        let preview = Preview {
            status,
            recipient,
            subject: &message.subject,
            body: &message.body,
        };
        println!("{}", serde_json::to_string_pretty(&preview)?);
    } else {
        println!("📝 Dry run, not sending. Recipient: {}", recipient.unwrap_or("<unset>"));
        println!("Subject: {}", message.subject);
        println!("{}", message.body);
    }
    Ok(())
}

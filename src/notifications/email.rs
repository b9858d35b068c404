//! SMTP delivery of pipeline notifications.
//!
//! Each delivery opens its own STARTTLS session, authenticates with the sender
//! credentials and sends exactly one message to one recipient. The transport
//! is built without connection pooling, so the session is closed after the
//! send (or dropped on error) before [`deliver`] returns.

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;
use crate::error::{ConfigError, DeliveryError};
use crate::notifications::NotificationMessage;

/// Send the notification, reporting the outcome on stdout.
///
/// Every failure is logged and turned into `false`; nothing is retried.
pub async fn deliver(
    config: &SmtpConfig,
    recipient: &str,
    message: &NotificationMessage,
) -> bool {
    if !config.is_configured() {
        tracing::warn!("Sender credentials not configured, not sending email");
        println!("❌ Error: {}", ConfigError::MissingSenderCredentials);
        return false;
    }

    match try_deliver(config, recipient, message).await {
        Ok(()) => {
            println!("✅ Email sent successfully to: {}", recipient);
            true
        }
        Err(e) => {
            tracing::error!(
                to = %recipient,
                host = %config.host,
                port = %config.port,
                error = %e,
                "Failed to send notification email"
            );
            println!("❌ Error sending email: {}", e);
            false
        }
    }
}

/// Build and send the email over a single SMTP session
pub async fn try_deliver(
    config: &SmtpConfig,
    recipient: &str,
    message: &NotificationMessage,
) -> Result<(), DeliveryError> {
    let (sender, password) = config.credentials()?;
    let port = parse_port(&config.port)?;
    let email = build_message(sender, recipient, message)?;

    tracing::debug!(host = %config.host, port, "Opening SMTP session");

    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        .port(port)
        .credentials(Credentials::new(sender.to_string(), password.to_string()))
        .build();

    let response = mailer.send(email).await?;

    tracing::info!(
        to = %recipient,
        subject = %message.subject,
        code = %response.code(),
        "Email sent successfully"
    );

    Ok(())
}

/// Plain-text message from the sender to the recipient
fn build_message(
    sender: &str,
    recipient: &str,
    message: &NotificationMessage,
) -> Result<Message, DeliveryError> {
    let from: Mailbox = sender.parse()?;
    let to: Mailbox = recipient.parse()?;

    let email = Message::builder()
        .from(from)
        .to(to)
        .subject(&message.subject)
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())?;

    Ok(email)
}

fn parse_port(raw: &str) -> Result<u16, DeliveryError> {
    raw.trim()
        .parse()
        .map_err(|_| DeliveryError::InvalidPort(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    fn message() -> NotificationMessage {
        NotificationMessage {
            subject: "✅ Pipeline completed successfully! - acme/pokemon".to_string(),
            body: "All good".to_string(),
        }
    }

    fn smtp(pairs: &[(&str, &str)]) -> SmtpConfig {
        SmtpConfig::from_env(&Environment::from_pairs(pairs.iter().copied()))
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("587").unwrap(), 587);
        assert_eq!(parse_port(" 2525 ").unwrap(), 2525);
        assert!(matches!(
            parse_port("smtp"),
            Err(DeliveryError::InvalidPort(p)) if p == "smtp"
        ));
        assert!(parse_port("70000").is_err());
        assert!(parse_port("").is_err());
    }

    #[test]
    fn test_build_message_addresses() {
        let email = build_message("ci@example.com", "ops@example.com", &message()).unwrap();
        let envelope = email.envelope();
        assert_eq!(
            envelope.from().map(|a| a.to_string()).as_deref(),
            Some("ci@example.com")
        );
        assert_eq!(envelope.to().len(), 1);
        assert_eq!(envelope.to()[0].to_string(), "ops@example.com");
    }

    #[test]
    fn test_build_message_rejects_malformed_address() {
        let result = build_message("ci@example.com", "not an address", &message());
        assert!(matches!(result, Err(DeliveryError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_connecting() {
        let config = smtp(&[("SENDER_EMAIL", "ci@example.com")]);
        let result = try_deliver(&config, "ops@example.com", &message()).await;
        assert!(matches!(
            result,
            Err(DeliveryError::Config(ConfigError::MissingSenderCredentials))
        ));
    }

    #[tokio::test]
    async fn test_deliver_reports_missing_credentials_as_failure() {
        let config = smtp(&[]);
        assert!(!deliver(&config, "ops@example.com", &message()).await);
    }

    #[tokio::test]
    async fn test_deliver_reports_bad_port_as_failure() {
        let config = smtp(&[
            ("SENDER_EMAIL", "ci@example.com"),
            ("SENDER_PASSWORD", "secret"),
            ("SMTP_PORT", "not-a-port"),
        ]);
        assert!(!deliver(&config, "ops@example.com", &message()).await);
    }

    #[tokio::test]
    async fn test_deliver_reports_bad_recipient_as_failure() {
        let config = smtp(&[
            ("SENDER_EMAIL", "ci@example.com"),
            ("SENDER_PASSWORD", "secret"),
        ]);
        let result = try_deliver(&config, "ops at example", &message()).await;
        assert!(matches!(result, Err(DeliveryError::InvalidAddress(_))));
    }

    /// Port on 127.0.0.1 with nothing listening on it
    fn closed_port() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port.to_string()
    }

    #[tokio::test]
    async fn test_refused_connection_is_smtp_error() {
        let port = closed_port();
        let config = smtp(&[
            ("SMTP_SERVER", "127.0.0.1"),
            ("SMTP_PORT", port.as_str()),
            ("SENDER_EMAIL", "ci@example.com"),
            ("SENDER_PASSWORD", "secret"),
        ]);

        let result = try_deliver(&config, "ops@example.com", &message()).await;
        assert!(matches!(result, Err(DeliveryError::Smtp(_))));
        assert!(!deliver(&config, "ops@example.com", &message()).await);
    }

    /// Minimal ESMTP server that offers STARTTLS, accepts it and hangs up
    async fn spawn_dropping_starttls_server() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let (read, mut write) = stream.into_split();
            let mut lines = BufReader::new(read).lines();

            if write.write_all(b"220 localhost ESMTP\r\n").await.is_err() {
                return;
            }
            while let Ok(Some(line)) = lines.next_line().await {
                let reply: &[u8] = if line.starts_with("EHLO") {
                    b"250-localhost\r\n250 STARTTLS\r\n"
                } else if line.starts_with("STARTTLS") {
                    let _ = write.write_all(b"220 go ahead\r\n").await;
                    break;
                } else {
                    b"502 command not implemented\r\n"
                };
                if write.write_all(reply).await.is_err() {
                    return;
                }
            }
        });

        port
    }

    #[tokio::test]
    async fn test_dropped_tls_upgrade_is_reported_as_failure() {
        let port = spawn_dropping_starttls_server().await.to_string();
        let config = smtp(&[
            ("SMTP_SERVER", "127.0.0.1"),
            ("SMTP_PORT", port.as_str()),
            ("SENDER_EMAIL", "ci@example.com"),
            ("SENDER_PASSWORD", "secret"),
        ]);

        assert!(!deliver(&config, "ops@example.com", &message()).await);
    }
}

//! Pipeline notification rendering and delivery.
//!
//! [`NotificationMessage::render`] turns a resolved status plus the collected
//! run context into the subject and plain-text body of the email; the
//! [`email`] module delivers it over SMTP.

pub mod email;

use crate::pipeline::{BuildMetrics, PipelineContext, PipelineStatus};

/// Subject and body of a pipeline notification email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
}

impl NotificationMessage {
    /// Render the notification for a pipeline run
    pub fn render(
        status: PipelineStatus,
        message: &str,
        context: &PipelineContext,
        metrics: &BuildMetrics,
    ) -> Self {
        let emoji = status.emoji();
        Self {
            subject: format!("{} {} - {}", emoji, message, context.repository),
            body: render_body(status, message, context, metrics),
        }
    }
}

/// Closing guidance, depending only on whether the run succeeded
fn next_steps(status: PipelineStatus) -> &'static str {
    match status {
        PipelineStatus::Success => {
            "Pipeline completed successfully! The project is ready for deployment."
        }
        PipelineStatus::Failure | PipelineStatus::Unknown => {
            "Check the pipeline logs to identify and fix the problems."
        }
    }
}

fn render_body(
    status: PipelineStatus,
    message: &str,
    context: &PipelineContext,
    metrics: &BuildMetrics,
) -> String {
    format!(
        r#"
{emoji} {message}

📊 Pipeline Information:
• Repository: {repository}
• Workflow: {workflow}
• Branch: {ref_name}
• Commit: {sha}
• Triggered by: {actor}
• Timestamp: {timestamp}
• Run ID: {run_id}

🔧 Technical Details:
• Test Status: {test_status}
• Build Status: {build_status}
• Number of Tests: {test_count}
• Tests Passed: {tests_passed}
• Tests Failed: {tests_failed}

📦 Generated Artifacts:
• Executable JAR: {artifact}
• Test Report: surefire-reports/

🚀 Next Steps:
{next_steps}

---
Sent automatically by the CI/CD system
Pokemon Project - Dependency Management System
"#,
        emoji = status.emoji(),
        message = message,
        repository = context.repository,
        workflow = context.workflow,
        ref_name = context.ref_name,
        sha = context.sha,
        actor = context.actor,
        timestamp = context.timestamp,
        run_id = context.run_id,
        test_status = metrics.test_status,
        build_status = metrics.build_status,
        test_count = metrics.test_count,
        tests_passed = metrics.tests_passed,
        tests_failed = metrics.tests_failed,
        artifact = metrics.artifact_name(),
        next_steps = next_steps(status),
    )
}

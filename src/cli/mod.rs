//! Command-line interface.
//!
//! The notifier is normally invoked without arguments from a CI step and takes
//! everything else from the environment. The flags here only change how the
//! run is reported:
//! - `--dry-run` - render the notification and print it instead of sending
//! - `--json` - print the dry-run preview as JSON
//! - `--log-level` - override the diagnostic log filter

use clap::Parser;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "pipeline-notify")]
#[command(author, version, about = "Email a summary of a CI/CD pipeline run", long_about = None)]
pub struct Cli {
    /// Render the notification and print it without sending any email
    #[arg(long)]
    pub dry_run: bool,

    /// Print the dry-run preview as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Override log level (takes precedence over RUST_LOG, default "info")
    #[arg(short, long, env = "PIPELINE_NOTIFY_LOG")]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn options(&self) -> crate::RunOptions {
        crate::RunOptions {
            dry_run: self.dry_run,
            json: self.json,
        }
    }
}

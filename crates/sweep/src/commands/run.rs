//! `sweep run` command implementation.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use sweep_config::{CliSettings, Config, ConfigError, HelpdeskConfig};
use sweep_helpdesk::{HelpdeskClient, RetentionSweeper, SweepConfig, SweepSummary};

use crate::error::CliError;
use crate::output::Output;

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Arguments for the run command.
#[derive(Args)]
pub(crate) struct RunArgs {
    /// Path to configuration file (default: auto-discover sweep.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log eligible attachments without deleting them.
    #[arg(long)]
    dry_run: bool,

    /// Delete eligible attachments (overrides `retention.dry_run = true`).
    #[arg(long, conflicts_with = "dry_run")]
    execute: bool,

    /// Days after closure before attachments are eligible (overrides config).
    #[arg(long)]
    retention_days: Option<u32>,

    /// Maximum attachments processed in this run (overrides config).
    #[arg(long)]
    max_deletions: Option<u32>,

    /// Helpdesk tenant URL (overrides config).
    #[arg(long)]
    base_url: Option<String>,

    /// Helpdesk API key (overrides config).
    #[arg(long, env = "SWEEP_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub(crate) log_format: LogFormat,
}

impl RunArgs {
    /// Execute the run command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the sweep aborts.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let helpdesk = require_helpdesk_config(&config, &output)?;
        let client = HelpdeskClient::from_config(&config)?;
        let sweep_config = SweepConfig::from(&config.retention);

        output.info(&format!(
            "Sweeping {} (retention {} days, cap {})...",
            helpdesk.base_url, sweep_config.retention_days, sweep_config.max_deletions
        ));
        if sweep_config.dry_run {
            output.highlight("[DRY RUN] Eligible attachments are logged, not deleted.");
        }

        let summary = RetentionSweeper::new(&client, sweep_config).run()?;
        print_summary(&output, &summary);

        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        let dry_run = if self.dry_run {
            Some(true)
        } else if self.execute {
            Some(false)
        } else {
            None
        };
        CliSettings {
            retention_days: self.retention_days,
            dry_run,
            max_deletions: self.max_deletions,
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

fn require_helpdesk_config<'a>(
    config: &'a Config,
    output: &Output,
) -> Result<&'a HelpdeskConfig, CliError> {
    config.require_helpdesk().map_err(|err| {
        if matches!(err, ConfigError::Validation(_)) {
            output.info("Add the following to your sweep.toml:");
            output.info("\n[helpdesk]");
            output.info(r#"base_url = "https://yourcompany.freshdesk.com""#);
            output.info(r#"api_key = "${HELPDESK_API_KEY}""#);
            output.info("");
        }
        CliError::from(err)
    })
}

fn print_summary(output: &Output, summary: &SweepSummary) {
    output.highlight("\nSweep summary");
    output.field(
        "cutoff:",
        &summary.cutoff.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    );
    output.field("tickets:", &summary.tickets_seen.to_string());
    output.field("processed:", &summary.processed.to_string());
    output.field("skipped (no id):", &summary.skipped_missing_id.to_string());
    output.field(
        "skipped (no activity):",
        &summary.skipped_no_activity.to_string(),
    );

    if !summary.routes_used.is_empty() {
        output.info("\nDelete routes:");
        for (template, count) in &summary.routes_used {
            output.info(&format!("  {count:>5}  {template}"));
        }
    }

    if summary.cap_reached {
        output.warning("\nDeletion cap reached; remaining attachments are left for the next run.");
    }

    if summary.dry_run {
        output.success(&format!(
            "\n[DRY RUN] {} attachment(s) eligible, none deleted.",
            summary.processed
        ));
    } else {
        output.success(&format!("\nDeleted {} attachment(s).", summary.processed));
    }
}

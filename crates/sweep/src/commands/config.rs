//! `sweep config` command implementation.

use std::path::PathBuf;

use clap::Args;
use sweep_config::Config;
use sweep_helpdesk::EndpointResolver;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the config command.
#[derive(Args)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover sweep.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ConfigArgs {
    /// Print the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or a delete
    /// route is malformed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;
        let resolver = EndpointResolver::new(&config.delete.routes)?;

        let source = config
            .config_path
            .as_ref()
            .map_or_else(|| "(defaults)".to_owned(), |p| p.display().to_string());
        output.info(&format!("Configuration: {source}"));

        output.highlight("\n[helpdesk]");
        output.field("base_url", or_unset(&config.helpdesk.base_url));
        output.field("api_key", &redact(&config.helpdesk.api_key));
        output.field("auth", &config.helpdesk.auth.to_string());
        output.field(
            "timeout_secs",
            &config
                .helpdesk
                .timeout_secs
                .map_or_else(|| "none".to_owned(), |t| t.to_string()),
        );

        output.highlight("\n[retention]");
        output.field("days", &config.retention.days.to_string());
        output.field("dry_run", &config.retention.dry_run.to_string());
        output.field("max_deletions", &config.retention.max_deletions.to_string());

        let api = &config.api;
        output.highlight("\n[api]");
        output.field("tickets_path", &api.tickets_path);
        output.field("attachments_path", &api.attachments_path);
        output.field("page_size", &api.page_size.to_string());
        output.field("page_param", &api.page_param);
        output.field("page_size_param", &api.page_size_param);
        output.field(
            "closed filter",
            &format!("{}={}", api.status_param, api.closed_status),
        );
        output.field("cutoff_param", &api.cutoff_param);
        output.field("sort", &format!("{}={}", api.sort_param, api.sort_order));

        output.highlight("\n[delete]");
        for (index, route) in resolver.routes().iter().enumerate() {
            let note = if route.needs_activity() {
                "  (needs activity id)"
            } else {
                ""
            };
            output.info(&format!("  {}. {route}{note}", index + 1));
        }

        Ok(())
    }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "(unset)" } else { value }
}

/// Mask a credential, keeping only whether it is set.
fn redact(secret: &str) -> String {
    if secret.is_empty() {
        "(unset)".to_owned()
    } else {
        "********".to_owned()
    }
}

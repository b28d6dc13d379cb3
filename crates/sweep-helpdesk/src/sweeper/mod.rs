//! Attachment retention sweeper.
//!
//! This module provides the [`RetentionSweeper`] that enforces the retention
//! policy for one run:
//!
//! 1. Compute the cutoff (now minus the retention window)
//! 2. Walk closed tickets closed at or before the cutoff
//! 3. Walk each ticket's attachments
//! 4. Delete each attachment (or only log it in dry-run mode)
//! 5. Stop the whole run once the deletion cap is reached
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use sweep_config::Config;
//! use sweep_helpdesk::{HelpdeskClient, RetentionSweeper, SweepConfig};
//!
//! let config = Config::load(None, None)?;
//! let client = HelpdeskClient::from_config(&config)?;
//! let sweeper = RetentionSweeper::new(&client, SweepConfig::from(&config.retention));
//!
//! let summary = sweeper.run()?;
//! println!("processed: {}", summary.processed);
//! # Ok(())
//! # }
//! ```

mod executor;
mod result;

pub use executor::{RetentionSweeper, cutoff};
pub use result::SweepSummary;

use sweep_config::RetentionConfig;

/// Policy for one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// Days after closure before attachments are eligible.
    pub retention_days: u32,
    /// Log intended deletions without issuing them.
    pub dry_run: bool,
    /// Run-wide ceiling on processed attachments.
    pub max_deletions: u32,
}

impl From<&RetentionConfig> for SweepConfig {
    fn from(retention: &RetentionConfig) -> Self {
        Self {
            retention_days: retention.days,
            dry_run: retention.dry_run,
            max_deletions: retention.max_deletions,
        }
    }
}

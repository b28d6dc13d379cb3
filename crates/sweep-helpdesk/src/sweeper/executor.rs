//! Retention sweeper implementation.

use std::ops::ControlFlow;

use chrono::{DateTime, Days, Utc};
use tracing::{debug, info, warn};

use crate::client::HelpdeskClient;
use crate::error::HelpdeskError;
use crate::transport::Transport;
use crate::types::{Attachment, Ticket};

use super::SweepConfig;
use super::result::SweepSummary;

/// Closure cutoff: `now` minus `retention_days` whole days.
///
/// # Errors
///
/// Returns [`HelpdeskError::CutoffOutOfRange`] if the result is not a
/// representable date.
pub fn cutoff(now: DateTime<Utc>, retention_days: u32) -> Result<DateTime<Utc>, HelpdeskError> {
    now.checked_sub_days(Days::new(u64::from(retention_days)))
        .ok_or(HelpdeskError::CutoffOutOfRange {
            days: retention_days,
        })
}

/// What happened to one attachment.
enum Decision {
    /// Counted without a delete request.
    DryRun,
    /// Deleted through a resolved route.
    Deleted,
    /// Left in place; no usable route for it.
    CannotDelete,
}

/// Enforces the retention policy against one helpdesk tenant.
pub struct RetentionSweeper<'a, T: Transport> {
    client: &'a HelpdeskClient<T>,
    config: SweepConfig,
}

impl<'a, T: Transport> RetentionSweeper<'a, T> {
    /// Create a new sweeper.
    #[must_use]
    pub fn new(client: &'a HelpdeskClient<T>, config: SweepConfig) -> Self {
        Self { client, config }
    }

    /// Run one sweep with the current time.
    ///
    /// # Errors
    ///
    /// Returns the first unrecoverable error; the run stops where it failed.
    pub fn run(&self) -> Result<SweepSummary, HelpdeskError> {
        self.run_at(Utc::now())
    }

    /// Run one sweep as of `now`.
    ///
    /// Records without identifiers and attachments that only activity-scoped
    /// routes could delete are skipped. Anything else that fails aborts the run.
    ///
    /// # Errors
    ///
    /// Returns listing or delete errors other than the recovered ones above.
    pub fn run_at(&self, now: DateTime<Utc>) -> Result<SweepSummary, HelpdeskError> {
        let cutoff = cutoff(now, self.config.retention_days)?;
        let mut summary = SweepSummary::new(cutoff, self.config.dry_run);

        info!(
            cutoff = %cutoff,
            dry_run = self.config.dry_run,
            max_deletions = self.config.max_deletions,
            "Starting retention sweep"
        );

        if self.config.max_deletions == 0 {
            summary.cap_reached = true;
        } else {
            for record in self.client.closed_tickets(cutoff) {
                let Some(ticket) = Ticket::from_record(record?) else {
                    debug!("Skipping ticket record without id");
                    summary.skipped_missing_id += 1;
                    continue;
                };
                summary.tickets_seen += 1;

                if self.sweep_ticket(&ticket, &mut summary)?.is_break() {
                    summary.cap_reached = true;
                    break;
                }
            }
        }

        if summary.cap_reached {
            info!(
                processed = summary.processed,
                max_deletions = self.config.max_deletions,
                "Deletion cap reached, stopping"
            );
        }
        info!(
            processed = summary.processed,
            tickets = summary.tickets_seen,
            skipped = summary.skipped(),
            dry_run = summary.dry_run,
            "Retention sweep finished"
        );
        Ok(summary)
    }

    /// Process every attachment of `ticket`; breaks when the cap is reached.
    fn sweep_ticket(
        &self,
        ticket: &Ticket,
        summary: &mut SweepSummary,
    ) -> Result<ControlFlow<()>, HelpdeskError> {
        for record in self.client.attachments(&ticket.id) {
            let Some(attachment) = Attachment::from_record(record?, &ticket.id) else {
                debug!(ticket_id = %ticket.id, "Skipping attachment record without id");
                summary.skipped_missing_id += 1;
                continue;
            };

            match self.process(&attachment, summary)? {
                Decision::DryRun | Decision::Deleted => summary.processed += 1,
                Decision::CannotDelete => {
                    summary.skipped_no_activity += 1;
                    continue;
                }
            }

            if summary.processed >= self.config.max_deletions {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn process(
        &self,
        attachment: &Attachment,
        summary: &mut SweepSummary,
    ) -> Result<Decision, HelpdeskError> {
        if self.config.dry_run {
            info!(
                attachment_id = %attachment.id,
                name = %attachment.name,
                ticket_id = %attachment.ticket_id,
                "Dry run: would delete attachment"
            );
            return Ok(Decision::DryRun);
        }

        match self.client.delete_attachment(attachment) {
            Ok(route) => {
                info!(
                    attachment_id = %attachment.id,
                    name = %attachment.name,
                    ticket_id = %attachment.ticket_id,
                    route = %route.path,
                    "Deleted attachment"
                );
                summary.record_route(&route);
                Ok(Decision::Deleted)
            }
            Err(HelpdeskError::MissingActivityId { .. }) => {
                warn!(
                    attachment_id = %attachment.id,
                    name = %attachment.name,
                    ticket_id = %attachment.ticket_id,
                    "Cannot delete attachment: delete routes need an activity id it does not have"
                );
                Ok(Decision::CannotDelete)
            }
            Err(err) => Err(err),
        }
    }
}

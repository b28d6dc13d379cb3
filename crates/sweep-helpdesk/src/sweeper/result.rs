//! Sweep run statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::resolver::ResolvedRoute;

/// Statistics for one sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepSummary {
    /// Closure cutoff used for the ticket listing.
    pub cutoff: DateTime<Utc>,
    /// Whether deletions were only logged.
    pub dry_run: bool,
    /// Attachments deleted or dry-run logged. Never exceeds the cap.
    pub processed: u32,
    /// Tickets with an identifier that were walked.
    pub tickets_seen: u32,
    /// Ticket and attachment records skipped for lack of an identifier.
    pub skipped_missing_id: u32,
    /// Attachments skipped because every usable route needs an activity id.
    pub skipped_no_activity: u32,
    /// True when the run stopped at the deletion cap.
    pub cap_reached: bool,
    /// Successful deletes per route template.
    pub routes_used: BTreeMap<String, u32>,
}

impl SweepSummary {
    pub(crate) fn new(cutoff: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            cutoff,
            dry_run,
            processed: 0,
            tickets_seen: 0,
            skipped_missing_id: 0,
            skipped_no_activity: 0,
            cap_reached: false,
            routes_used: BTreeMap::new(),
        }
    }

    pub(crate) fn record_route(&mut self, route: &ResolvedRoute) {
        *self.routes_used.entry(route.template.clone()).or_insert(0) += 1;
    }

    /// Total records skipped for any reason.
    #[must_use]
    pub fn skipped(&self) -> u32 {
        self.skipped_missing_id + self.skipped_no_activity
    }
}

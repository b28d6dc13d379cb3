//! Ticket listing.

use chrono::{DateTime, SecondsFormat, Utc};

use super::HelpdeskClient;
use crate::pagination::{Listing, Pager};
use crate::transport::Transport;

impl<T: Transport> HelpdeskClient<T> {
    /// Walk closed tickets whose closure is at or before `cutoff`.
    ///
    /// Filtering happens server-side through the status and cutoff query
    /// parameters; records come back unparsed.
    pub fn closed_tickets(&self, cutoff: DateTime<Utc>) -> Pager<'_, T> {
        let listing = Listing::new(self.api.tickets_path.clone())
            .param(self.api.status_param.clone(), self.api.closed_status.clone())
            .param(
                self.api.cutoff_param.clone(),
                cutoff.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        Pager::new(&self.transport, listing, self.page_spec())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sweep_config::ApiConfig;

    use super::*;
    use crate::transport::MockTransport;

    fn client(transport: MockTransport) -> HelpdeskClient<MockTransport> {
        HelpdeskClient::new(transport, ApiConfig::default(), &["/a/{attachment_id}"]).unwrap()
    }

    #[test]
    fn test_closed_tickets_query() {
        let transport = MockTransport::new().with_page("/api/v2/tickets", 1, json!([]));
        let client = client(transport);
        let cutoff = Utc.with_ymd_and_hms(2026, 7, 18, 9, 30, 0).unwrap();

        assert_eq!(client.closed_tickets(cutoff).count(), 0);

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/api/v2/tickets");
        assert_eq!(
            requests[0].query,
            vec![
                ("status".to_owned(), "Closed".to_owned()),
                ("closed_before".to_owned(), "2026-07-18T09:30:00Z".to_owned()),
                ("page".to_owned(), "1".to_owned()),
                ("per_page".to_owned(), "100".to_owned()),
            ]
        );
    }

    #[test]
    fn test_closed_tickets_error_surfaces() {
        let client = client(MockTransport::new());
        let cutoff = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        let results: Vec<_> = client.closed_tickets(cutoff).collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].as_ref().is_err_and(crate::HelpdeskError::is_not_found));
    }
}

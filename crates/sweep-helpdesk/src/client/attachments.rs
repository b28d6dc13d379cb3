//! Attachment listing and deletion.

use percent_encoding::utf8_percent_encode;

use super::HelpdeskClient;
use crate::error::HelpdeskError;
use crate::pagination::{Listing, Pager};
use crate::resolver::ResolvedRoute;
use crate::transport::{Transport, UNRESERVED};
use crate::types::Attachment;

impl<T: Transport> HelpdeskClient<T> {
    /// Walk the attachments of one ticket.
    pub fn attachments(&self, ticket_id: &str) -> Pager<'_, T> {
        let listing = Listing::new(self.attachments_path(ticket_id))
            .param(self.api.sort_param.clone(), self.api.sort_order.clone());
        Pager::new(&self.transport, listing, self.page_spec())
    }

    /// Delete one attachment through the first accepting route.
    ///
    /// # Errors
    ///
    /// See [`EndpointResolver::delete`](crate::EndpointResolver::delete).
    pub fn delete_attachment(
        &self,
        attachment: &Attachment,
    ) -> Result<ResolvedRoute, HelpdeskError> {
        self.resolver.delete(&self.transport, attachment)
    }

    fn attachments_path(&self, ticket_id: &str) -> String {
        let encoded = utf8_percent_encode(ticket_id, UNRESERVED).to_string();
        self.api.attachments_path.replace("{ticket_id}", &encoded)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sweep_config::ApiConfig;

    use super::*;
    use crate::transport::{Method, MockReply, MockTransport};

    fn client(transport: MockTransport) -> HelpdeskClient<MockTransport> {
        HelpdeskClient::new(
            transport,
            ApiConfig::default(),
            &["/api/v2/attachments/{attachment_id}"],
        )
        .unwrap()
    }

    #[test]
    fn test_attachments_listing_path_and_sort() {
        let transport = MockTransport::new().with_page(
            "/api/v2/tickets/42/attachments",
            1,
            json!({"result": [{"id": 1}, {"id": 2}]}),
        );
        let client = client(transport);

        let records: Vec<_> = client
            .attachments("42")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);

        let requests = client.transport().requests();
        assert_eq!(requests[0].path, "/api/v2/tickets/42/attachments");
        assert_eq!(requests[0].query[0], ("order".to_owned(), "asc".to_owned()));
    }

    #[test]
    fn test_attachments_path_encodes_ticket_id() {
        let client = client(MockTransport::new());
        assert_eq!(
            client.attachments_path("A/1"),
            "/api/v2/tickets/A%2F1/attachments"
        );
    }

    #[test]
    fn test_ticket_id_encoded_like_delete_routes() {
        let client = HelpdeskClient::new(
            MockTransport::new(),
            ApiConfig::default(),
            &["/api/v2/tickets/{ticket_id}/attachments/{attachment_id}"],
        )
        .unwrap();
        let attachment = Attachment {
            id: "5".to_owned(),
            name: "a.png".to_owned(),
            ticket_id: "T-9.x_~".to_owned(),
            activity_id: None,
        };

        let listing = client.attachments_path(&attachment.ticket_id);
        assert_eq!(listing, "/api/v2/tickets/T-9.x_~/attachments");
        let delete = client.resolver().routes()[0].render(&attachment).unwrap();
        assert_eq!(delete, format!("{listing}/5"));
    }

    #[test]
    fn test_delete_attachment_uses_resolver() {
        let transport = MockTransport::new().with_reply(
            Method::Delete,
            "/api/v2/attachments/5",
            MockReply::Text("deleted".to_owned()),
        );
        let client = client(transport);
        let attachment = Attachment {
            id: "5".to_owned(),
            name: "a.png".to_owned(),
            ticket_id: "1".to_owned(),
            activity_id: None,
        };

        let route = client.delete_attachment(&attachment).unwrap();
        assert_eq!(route.path, "/api/v2/attachments/5");
        assert_eq!(route.index, 0);
    }
}

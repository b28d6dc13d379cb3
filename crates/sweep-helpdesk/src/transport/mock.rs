//! Mock transport implementation for testing.
//!
//! Provides [`MockTransport`] for exercising pagination, route resolution and
//! the sweeper without network access.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use serde_json::Value;

use super::{ApiRequest, Method, ResponseBody, Transport, http_error};
use crate::error::HelpdeskError;

/// Scripted reply for one request.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with a JSON body.
    Json(Value),
    /// 200 with a plain-text body.
    Text(String),
    /// Error status with an empty body.
    Status(u16),
}

/// A request observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<Value>,
}

/// Replies are keyed by method, path and the `page` query value (if any).
type ReplyKey = (Method, String, Option<String>);

/// Mock transport for testing.
///
/// Replies are queued per key and consumed in order; the last reply for a key
/// is repeated once the queue would run empty. Unscripted requests answer 404.
///
/// # Example
///
/// ```ignore
/// use serde_json::json;
/// use sweep_helpdesk::{MockReply, MockTransport};
///
/// let transport = MockTransport::new()
///     .with_page("/api/v2/tickets", 1, json!({"data": [{"id": 1}]}))
///     .with_reply(Method::Delete, "/api/v2/attachments/9", MockReply::Text("ok".into()));
/// ```
#[derive(Debug)]
pub struct MockTransport {
    replies: RwLock<HashMap<ReplyKey, VecDeque<MockReply>>>,
    requests: RwLock<Vec<RecordedRequest>>,
    page_param: String,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            replies: RwLock::new(HashMap::new()),
            requests: RwLock::new(Vec::new()),
            page_param: "page".to_owned(),
        }
    }
}

impl MockTransport {
    /// Create a new mock with no scripted replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different query parameter to key listing pages.
    #[must_use]
    pub fn page_param(mut self, name: impl Into<String>) -> Self {
        self.page_param = name.into();
        self
    }

    /// Queue a reply for requests without a page parameter.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_reply(self, method: Method, path: impl Into<String>, reply: MockReply) -> Self {
        self.push((method, path.into(), None), reply);
        self
    }

    /// Queue a JSON body for page `page` of a GET listing.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, path: impl Into<String>, page: u32, body: Value) -> Self {
        self.with_page_reply(path, page, MockReply::Json(body))
    }

    /// Queue any reply for page `page` of a GET listing.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page_reply(self, path: impl Into<String>, page: u32, reply: MockReply) -> Self {
        self.push((Method::Get, path.into(), Some(page.to_string())), reply);
        self
    }

    /// All requests sent so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Requests sent with `method`.
    #[must_use]
    pub fn requests_with(&self, method: Method) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    fn push(&self, key: ReplyKey, reply: MockReply) {
        self.replies
            .write()
            .unwrap()
            .entry(key)
            .or_default()
            .push_back(reply);
    }

    fn next_reply(&self, key: &ReplyKey) -> Option<MockReply> {
        let mut replies = self.replies.write().unwrap();
        let queue = replies.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &ApiRequest) -> Result<ResponseBody, HelpdeskError> {
        self.requests.write().unwrap().push(RecordedRequest {
            method: request.method,
            path: request.path.clone(),
            query: request.query.clone(),
            body: request.body.clone(),
        });

        let page = request.query_value(&self.page_param).map(str::to_owned);
        let key = (request.method, request.path.clone(), page);

        match self.next_reply(&key) {
            Some(MockReply::Json(value)) => Ok(ResponseBody::Json(value)),
            Some(MockReply::Text(text)) => Ok(ResponseBody::Text(text)),
            Some(MockReply::Status(status)) => {
                Err(http_error(status, ResponseBody::Text(String::new())))
            }
            None => Err(http_error(404, ResponseBody::Text(String::new()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_records_query_and_body() {
        let transport = MockTransport::new();
        let request = ApiRequest::delete("/api/v2/attachments/1")
            .query("reason", "retention")
            .json(json!({"permanent": true}));

        let _ = transport.send(&request);

        let recorded = transport.requests_with(Method::Delete);
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].query, vec![("reason".to_owned(), "retention".to_owned())]);
        assert_eq!(recorded[0].body, Some(json!({"permanent": true})));
    }

    #[test]
    fn test_unscripted_request_is_404() {
        let err = MockTransport::new()
            .send(&ApiRequest::get("/nowhere"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_last_reply_repeats() {
        let transport = MockTransport::new()
            .with_reply(Method::Delete, "/a/1", MockReply::Status(503))
            .with_reply(Method::Delete, "/a/1", MockReply::Text("ok".to_owned()));
        let request = ApiRequest::delete("/a/1");

        assert!(transport.send(&request).is_err());
        assert_eq!(
            transport.send(&request).unwrap(),
            ResponseBody::Text("ok".to_owned())
        );
        assert_eq!(
            transport.send(&request).unwrap(),
            ResponseBody::Text("ok".to_owned())
        );
    }
}

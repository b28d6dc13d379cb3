//! ureq-backed transport.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::utf8_percent_encode;
use sweep_config::{AuthScheme, HelpdeskConfig};
use tracing::debug;
use ureq::{Agent, Body};
use ureq::http::Response;

use super::{ApiRequest, Method, ResponseBody, Transport, UNRESERVED, http_error};
use crate::error::HelpdeskError;

/// Blocking HTTP transport for one helpdesk tenant.
pub struct HttpTransport {
    agent: Agent,
    base_url: String,
    authorization: String,
}

impl HttpTransport {
    /// Create a transport from validated helpdesk settings.
    #[must_use]
    pub fn new(config: &HelpdeskConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(config.timeout_secs.map(Duration::from_secs))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            authorization: authorization_header(config.auth, &config.api_key),
        }
    }

    /// Absolute URL for a request, query string included.
    fn url(&self, request: &ApiRequest) -> String {
        let mut url = format!("{}{}", self.base_url, request.path);
        for (i, (key, value)) in request.query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.extend(utf8_percent_encode(key, UNRESERVED));
            url.push('=');
            url.extend(utf8_percent_encode(value, UNRESERVED));
        }
        url
    }

    fn dispatch(&self, url: &str, request: &ApiRequest) -> Result<Response<Body>, ureq::Error> {
        let builder = match request.method {
            Method::Get => self.agent.get(url),
            Method::Delete => self.agent.delete(url),
        }
        .header("Authorization", self.authorization.as_str())
        .header("Accept", request.accept);

        match &request.body {
            Some(body) => builder.force_send_body().send_json(body),
            None => builder.call(),
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ResponseBody, HelpdeskError> {
        let url = self.url(request);
        debug!(method = %request.method, url = %url, "Sending request");

        let response = self.dispatch(&url, request)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let text = response.into_body().read_to_string();

        decode_response(status, content_type.as_deref(), text)
    }
}

/// Turn a status and the body read result into the transport outcome.
///
/// A body that cannot be read fails a successful response; on an error
/// status it is only informational.
fn decode_response(
    status: u16,
    content_type: Option<&str>,
    text: Result<String, ureq::Error>,
) -> Result<ResponseBody, HelpdeskError> {
    if status >= 400 {
        let text = text.unwrap_or_else(|_| "(unable to read body)".to_owned());
        let body = ResponseBody::decode(content_type, text.clone())
            .unwrap_or(ResponseBody::Text(text));
        return Err(http_error(status, body));
    }

    ResponseBody::decode(content_type, text?)
}

/// `Authorization` header value for the configured scheme.
fn authorization_header(scheme: AuthScheme, api_key: &str) -> String {
    match scheme {
        AuthScheme::Basic => format!("Basic {}", STANDARD.encode(format!("{api_key}:X"))),
        AuthScheme::Bearer => format!("Bearer {api_key}"),
    }
}

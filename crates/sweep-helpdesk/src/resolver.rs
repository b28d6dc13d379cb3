//! Delete-route resolution.
//!
//! The helpdesk's delete route varies between tenants, so deletion walks an
//! ordered list of route templates. A 404 means the route does not exist
//! here and the next template is tried; any other failure stops the walk.

use std::fmt;

use percent_encoding::utf8_percent_encode;
use tracing::debug;

use crate::error::HelpdeskError;
use crate::transport::{ApiRequest, Transport, UNRESERVED};
use crate::types::Attachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Param {
    AttachmentId,
    TicketId,
    ActivityId,
}

impl Param {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "attachment_id" => Some(Self::AttachmentId),
            "ticket_id" => Some(Self::TicketId),
            "activity_id" => Some(Self::ActivityId),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(Param),
}

/// Parsed delete route template such as
/// `/api/v2/tickets/{ticket_id}/attachments/{attachment_id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// Returns [`HelpdeskError::InvalidRoute`] for unknown or unterminated
    /// placeholders, or a template without `{attachment_id}`.
    pub fn parse(raw: &str) -> Result<Self, HelpdeskError> {
        let mut segments = Vec::new();
        let mut rest = raw;
        while let Some(start) = rest.find('{') {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_owned()));
            }
            let after = &rest[start + 1..];
            let end = after.find('}').ok_or_else(|| {
                HelpdeskError::InvalidRoute(format!("unterminated placeholder in {raw}"))
            })?;
            let name = &after[..end];
            let param = Param::parse(name).ok_or_else(|| {
                HelpdeskError::InvalidRoute(format!("unknown placeholder {{{name}}} in {raw}"))
            })?;
            segments.push(Segment::Param(param));
            rest = &after[end + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_owned()));
        }

        if !segments.contains(&Segment::Param(Param::AttachmentId)) {
            return Err(HelpdeskError::InvalidRoute(format!(
                "{raw} does not reference {{attachment_id}}"
            )));
        }

        Ok(Self {
            raw: raw.to_owned(),
            segments,
        })
    }

    /// Template text as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the template needs an activity id.
    #[must_use]
    pub fn needs_activity(&self) -> bool {
        self.segments.contains(&Segment::Param(Param::ActivityId))
    }

    /// Render the path for `attachment`, or `None` if it lacks a required id.
    #[must_use]
    pub fn render(&self, attachment: &Attachment) -> Option<String> {
        let mut path = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Param(param) => {
                    let value = match param {
                        Param::AttachmentId => attachment.id.as_str(),
                        Param::TicketId => attachment.ticket_id.as_str(),
                        Param::ActivityId => attachment.activity_id.as_deref()?,
                    };
                    path.extend(utf8_percent_encode(value, UNRESERVED));
                }
            }
        }
        Some(path)
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// The route that accepted a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Position of the template in the candidate list.
    pub index: usize,
    /// Template text.
    pub template: String,
    /// Rendered path that was deleted.
    pub path: String,
}

/// Ordered delete-route candidates.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    routes: Vec<RouteTemplate>,
}

impl EndpointResolver {
    /// Build a resolver from templates in priority order.
    ///
    /// # Errors
    ///
    /// Returns [`HelpdeskError::InvalidRoute`] if any template is malformed
    /// or the list is empty.
    pub fn new<S: AsRef<str>>(templates: &[S]) -> Result<Self, HelpdeskError> {
        if templates.is_empty() {
            return Err(HelpdeskError::InvalidRoute(
                "at least one delete route is required".to_owned(),
            ));
        }
        let routes = templates
            .iter()
            .map(|t| RouteTemplate::parse(t.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self { routes })
    }

    /// Candidate templates in order.
    #[must_use]
    pub fn routes(&self) -> &[RouteTemplate] {
        &self.routes
    }

    /// Delete `attachment` through the first route the server accepts.
    ///
    /// Templates needing an id the attachment lacks are passed over without a
    /// request. Only 404 moves on to the next candidate.
    ///
    /// # Errors
    ///
    /// - [`HelpdeskError::MissingActivityId`] if no template can be rendered
    /// - [`HelpdeskError::AllCandidatesExhausted`] if every tried route answered 404
    /// - the first non-404 error from the transport, unchanged
    pub fn delete<T: Transport + ?Sized>(
        &self,
        transport: &T,
        attachment: &Attachment,
    ) -> Result<ResolvedRoute, HelpdeskError> {
        let mut tried = Vec::new();

        for (index, route) in self.routes.iter().enumerate() {
            let Some(path) = route.render(attachment) else {
                debug!(
                    route = %route,
                    attachment_id = %attachment.id,
                    "Route needs an activity id, skipping"
                );
                continue;
            };

            match transport.send(&ApiRequest::delete(path.clone())) {
                Ok(_) => {
                    return Ok(ResolvedRoute {
                        index,
                        template: route.as_str().to_owned(),
                        path,
                    });
                }
                Err(err) if err.is_not_found() => {
                    debug!(path = %path, "Delete route answered 404, trying next");
                    tried.push(path);
                }
                Err(err) => return Err(err),
            }
        }

        if tried.is_empty() {
            return Err(HelpdeskError::MissingActivityId {
                attachment_id: attachment.id.clone(),
            });
        }

        Err(HelpdeskError::AllCandidatesExhausted {
            attachment_id: attachment.id.clone(),
            tried,
        })
    }
}

//! Error types for helpdesk API operations.

use std::fmt;

/// Error from helpdesk API operations.
#[derive(Debug, thiserror::Error)]
pub enum HelpdeskError {
    /// HTTP request failed (network error, TLS, etc).
    #[error("HTTP request failed")]
    Request(#[from] ureq::Error),

    /// Server answered with an error status.
    #[error("HTTP error: {status} {status_text} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        status_text: String,
        /// Decoded response body, stringified.
        body: String,
    },

    /// Response declared JSON but could not be parsed.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Every usable delete route needs an activity id the attachment lacks.
    #[error("attachment {attachment_id} has no activity id required by the delete routes")]
    MissingActivityId {
        /// Attachment that could not be deleted.
        attachment_id: String,
    },

    /// Every candidate delete route answered 404.
    #[error("no delete route accepted attachment {attachment_id} (tried: {})", .tried.join(", "))]
    AllCandidatesExhausted {
        /// Attachment that could not be deleted.
        attachment_id: String,
        /// Paths that answered 404, in order.
        tried: Vec<String>,
    },

    /// Retention window reaches before the earliest representable date.
    #[error("retention window of {days} days is out of range")]
    CutoffOutOfRange {
        /// Configured retention window.
        days: u32,
    },

    /// Route template is malformed.
    #[error("invalid route template: {0}")]
    InvalidRoute(String),
}

impl HelpdeskError {
    /// Status class of an HTTP error, `None` for other variants.
    #[must_use]
    pub fn status_class(&self) -> Option<StatusClass> {
        match self {
            Self::Http { status, .. } => Some(StatusClass::from_status(*status)),
            _ => None,
        }
    }

    /// True when the server reported the resource or route as absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_class() == Some(StatusClass::NotFound)
    }
}

/// Coarse classification of error statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 404.
    NotFound,
    /// 401 or 403.
    Unauthorized,
    /// 429.
    RateLimited,
    /// 5xx.
    ServerError,
    /// Any other 4xx (and anything unexpected).
    ClientError,
}

impl StatusClass {
    /// Classify an HTTP status code.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            401 | 403 => Self::Unauthorized,
            429 => Self::RateLimited,
            500..=599 => Self::ServerError,
            _ => Self::ClientError,
        }
    }

    /// Whether the same request could succeed later without changes.
    ///
    /// Nothing retries automatically; this only shapes the error report.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerError)
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not found",
            Self::Unauthorized => "unauthorized",
            Self::RateLimited => "rate limited",
            Self::ServerError => "server error",
            Self::ClientError => "client error",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> HelpdeskError {
        HelpdeskError::Http {
            status,
            status_text: String::new(),
            body: String::new(),
        }
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(StatusClass::from_status(404), StatusClass::NotFound);
        assert_eq!(StatusClass::from_status(401), StatusClass::Unauthorized);
        assert_eq!(StatusClass::from_status(403), StatusClass::Unauthorized);
        assert_eq!(StatusClass::from_status(429), StatusClass::RateLimited);
        assert_eq!(StatusClass::from_status(503), StatusClass::ServerError);
        assert_eq!(StatusClass::from_status(422), StatusClass::ClientError);
    }

    #[test]
    fn test_retryable_classes() {
        assert!(StatusClass::RateLimited.is_retryable());
        assert!(StatusClass::ServerError.is_retryable());
        assert!(!StatusClass::Unauthorized.is_retryable());
        assert!(!StatusClass::NotFound.is_retryable());
    }

    #[test]
    fn test_is_not_found_only_for_404() {
        assert!(http(404).is_not_found());
        assert!(!http(401).is_not_found());
        assert!(
            !HelpdeskError::MissingActivityId {
                attachment_id: "1".to_owned()
            }
            .is_not_found()
        );
    }

    #[test]
    fn test_exhausted_message_lists_paths() {
        let err = HelpdeskError::AllCandidatesExhausted {
            attachment_id: "7".to_owned(),
            tried: vec!["/a/7".to_owned(), "/b/7".to_owned()],
        };
        assert_eq!(
            err.to_string(),
            "no delete route accepted attachment 7 (tried: /a/7, /b/7)"
        );
    }
}

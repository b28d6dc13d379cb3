//! CLI error types.

use std::error::Error;

use sweep_config::ConfigError;
use sweep_helpdesk::{HelpdeskError, StatusClass};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Helpdesk(#[from] HelpdeskError),
}

impl CliError {
    /// True when the helpdesk answered with a rate-limit or server error.
    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            Self::Helpdesk(err) => err.status_class().is_some_and(StatusClass::is_retryable),
            Self::Config(_) => false,
        }
    }
}

/// Render an error followed by each distinct cause, joined by `: `.
///
/// Causes whose message is already part of the text so far are skipped.
pub(crate) fn error_chain(err: &dyn Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !text.contains(&message) {
            text.push_str(": ");
            text.push_str(&message);
        }
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("inner")]
    struct Inner;

    #[test]
    fn test_chain_appends_causes() {
        assert_eq!(error_chain(&Outer(Inner)), "outer: inner");
    }

    #[test]
    fn test_chain_skips_repeated_cause() {
        let io = std::io::Error::other("disk gone");
        let err = CliError::from(ConfigError::from(io));
        assert_eq!(error_chain(&err), "I/O error: disk gone");
    }

    #[test]
    fn test_server_error_is_retryable() {
        let err = CliError::from(HelpdeskError::Http {
            status: 503,
            status_text: "Service Unavailable".to_owned(),
            body: String::new(),
        });
        assert!(err.is_retryable());
    }

    #[test]
    fn test_config_error_not_retryable() {
        let err = CliError::from(ConfigError::Validation("bad".to_owned()));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_helpdesk_error_is_transparent() {
        let err = CliError::from(HelpdeskError::InvalidRoute("/x".to_owned()));
        assert_eq!(error_chain(&err), "invalid route template: /x");
    }
}

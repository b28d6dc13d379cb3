//! Helpdesk attachment retention for sweep.
//!
//! This crate provides:
//! - [`HelpdeskClient`]: ticket/attachment listings and attachment deletion
//! - [`RetentionSweeper`]: the retention run with dry-run and deletion cap
//! - [`EndpointResolver`]: ordered delete-route probing
//!
//! # API Client
//!
//! ```ignore
//! use sweep_config::Config;
//! use sweep_helpdesk::{Attachment, HelpdeskClient};
//!
//! let config = Config::load(None, None)?;
//! let client = HelpdeskClient::from_config(&config)?;
//!
//! for record in client.attachments("42") {
//!     if let Some(attachment) = Attachment::from_record(record?, "42") {
//!         println!("{attachment}");
//!     }
//! }
//! ```

// API client
mod client;
pub use client::HelpdeskClient;

// Response envelopes
pub mod envelope;
pub use envelope::records;

// Paging
mod pagination;
pub use pagination::{Listing, PageSpec, Pager};

// Delete routes
mod resolver;
pub use resolver::{EndpointResolver, ResolvedRoute, RouteTemplate};

// Transport
pub mod transport;
#[cfg(any(test, feature = "mock"))]
pub use transport::{MockReply, MockTransport, RecordedRequest};
pub use transport::{ApiRequest, HttpTransport, Method, ResponseBody, Transport};

// Records
mod types;
pub use types::{Attachment, Ticket, TicketStatus, UNNAMED_ATTACHMENT};

// Retention run
pub mod sweeper;
pub use sweeper::{RetentionSweeper, SweepConfig, SweepSummary, cutoff};

// Errors
pub mod error;
pub use error::{HelpdeskError, StatusClass};

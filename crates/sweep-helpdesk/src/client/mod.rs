//! Helpdesk REST API client.
//!
//! Builds the ticket and attachment listings from [`ApiConfig`] and deletes
//! attachments through the [`EndpointResolver`]. Any [`Transport`] works;
//! production uses [`HttpTransport`].

mod attachments;
mod tickets;

use sweep_config::{ApiConfig, Config};

use crate::error::HelpdeskError;
use crate::pagination::PageSpec;
use crate::resolver::EndpointResolver;
use crate::transport::{HttpTransport, Transport};

/// Helpdesk REST API client.
pub struct HelpdeskClient<T: Transport> {
    transport: T,
    api: ApiConfig,
    resolver: EndpointResolver,
}

impl HelpdeskClient<HttpTransport> {
    /// Create a client over HTTP from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HelpdeskError::InvalidRoute`] if a delete route is malformed.
    pub fn from_config(config: &Config) -> Result<Self, HelpdeskError> {
        Self::new(
            HttpTransport::new(&config.helpdesk),
            config.api.clone(),
            &config.delete.routes,
        )
    }
}

impl<T: Transport> HelpdeskClient<T> {
    /// Create a client over any transport.
    ///
    /// # Errors
    ///
    /// Returns [`HelpdeskError::InvalidRoute`] if a delete route is malformed.
    pub fn new<S: AsRef<str>>(
        transport: T,
        api: ApiConfig,
        routes: &[S],
    ) -> Result<Self, HelpdeskError> {
        Ok(Self {
            transport,
            api,
            resolver: EndpointResolver::new(routes)?,
        })
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Delete route candidates in priority order.
    #[must_use]
    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    pub(crate) fn page_spec(&self) -> PageSpec {
        PageSpec {
            page_param: self.api.page_param.clone(),
            size_param: self.api.page_size_param.clone(),
            size: self.api.page_size,
        }
    }
}

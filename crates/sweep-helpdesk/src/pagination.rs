//! Page-by-page listing retrieval.

use serde_json::Value;
use tracing::debug;

use crate::envelope;
use crate::error::HelpdeskError;
use crate::transport::{ApiRequest, Transport};

/// A listing endpoint: path plus the query parameters sent with every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Listing path.
    pub path: String,
    /// Fixed query parameters (filters, sort order).
    pub query: Vec<(String, String)>,
}

impl Listing {
    /// Listing at `path` with no fixed parameters.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Add a fixed query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Names of the paging query parameters and the page size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    /// Page number parameter (pages start at 1).
    pub page_param: String,
    /// Page size parameter.
    pub size_param: String,
    /// Records requested per page.
    pub size: u32,
}

/// Lazy walk over every record of a listing.
///
/// Requests pages 1, 2, 3, ... and stops after a page that is empty or
/// shorter than the page size, so a final partial page costs no extra
/// request. A transport error is yielded once and ends the walk.
pub struct Pager<'a, T: Transport + ?Sized> {
    transport: &'a T,
    listing: Listing,
    spec: PageSpec,
    next_page: u32,
    buffer: std::vec::IntoIter<Value>,
    finished: bool,
}

impl<'a, T: Transport + ?Sized> Pager<'a, T> {
    /// Start a walk at page 1.
    #[must_use]
    pub fn new(transport: &'a T, listing: Listing, spec: PageSpec) -> Self {
        Self {
            transport,
            listing,
            spec,
            next_page: 1,
            buffer: Vec::new().into_iter(),
            finished: false,
        }
    }

    /// Number of page requests issued so far.
    #[must_use]
    pub fn pages_fetched(&self) -> u32 {
        self.next_page - 1
    }

    fn fetch_page(&mut self) -> Result<Vec<Value>, HelpdeskError> {
        let page = self.next_page;
        self.next_page += 1;

        let mut request = ApiRequest::get(self.listing.path.clone());
        request.query.clone_from(&self.listing.query);
        let request = request
            .query(self.spec.page_param.clone(), page.to_string())
            .query(self.spec.size_param.clone(), self.spec.size.to_string());

        let records = envelope::records(self.transport.send(&request)?);
        debug!(
            path = %self.listing.path,
            page,
            records = records.len(),
            "Fetched page"
        );
        Ok(records)
    }
}

impl<T: Transport + ?Sized> Iterator for Pager<'_, T> {
    type Item = Result<Value, HelpdeskError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.next() {
                return Some(Ok(record));
            }
            if self.finished {
                return None;
            }

            match self.fetch_page() {
                Ok(records) => {
                    let short = u32::try_from(records.len()).is_ok_and(|n| n < self.spec.size);
                    if records.is_empty() || short {
                        self.finished = true;
                    }
                    self.buffer = records.into_iter();
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

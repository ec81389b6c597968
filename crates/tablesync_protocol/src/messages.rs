//! Paginated table listing responses.

use crate::payload::ObjectPayload;
use serde::{Deserialize, Serialize};

/// One page of a table's full listing.
///
/// The server reports the table's total page count on every page, so a
/// single page-1 request is enough to size the fetch plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse {
    /// The objects on this page.
    pub objects: Vec<ObjectPayload>,
    /// Total number of pages in the table's listing, at least 1.
    pub total_pages: u32,
}

impl PageResponse {
    /// Creates a page response.
    pub fn new(objects: Vec<ObjectPayload>, total_pages: u32) -> Self {
        Self {
            objects,
            total_pages: total_pages.max(1),
        }
    }

    /// An empty single-page response.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 1)
    }
}

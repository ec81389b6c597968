//! Transport layer abstraction for talking to the sync server.

use crate::error::SyncResult;
use tablesync_core::TableId;
use tablesync_protocol::{ObjectPayload, PageResponse};
use uuid::Uuid;

/// Network boundary of the sync core.
///
/// This trait abstracts the HTTP layer, allowing for different
/// implementations (HTTP, in-memory for testing, etc.). Every call
/// carries the transport's own timeout; on timeout the call fails with
/// a transport error and is never retried inside the core.
///
/// A server-side "resource does not exist" answer surfaces as
/// [`SyncError::NotFound`](crate::SyncError::NotFound); it drives the
/// state-machine reconciliation rather than being a generic failure.
pub trait SyncTransport: Send + Sync {
    /// Fetches one page of a table's full listing. Pages are 1-based;
    /// every response reports the table's total page count.
    fn fetch_page(&self, table_id: TableId, page: u32) -> SyncResult<PageResponse>;

    /// Fetches a single object, for notification-driven resync.
    fn fetch_object(&self, uuid: Uuid) -> SyncResult<ObjectPayload>;

    /// Creates or updates an object and returns the etag the server
    /// assigned to this version.
    fn create_or_update(&self, payload: &ObjectPayload) -> SyncResult<String>;

    /// Deletes an object on the server.
    fn delete(&self, uuid: Uuid) -> SyncResult<()>;
}

impl<T: SyncTransport + ?Sized> SyncTransport for &T {
    fn fetch_page(&self, table_id: TableId, page: u32) -> SyncResult<PageResponse> {
        (**self).fetch_page(table_id, page)
    }

    fn fetch_object(&self, uuid: Uuid) -> SyncResult<ObjectPayload> {
        (**self).fetch_object(uuid)
    }

    fn create_or_update(&self, payload: &ObjectPayload) -> SyncResult<String> {
        (**self).create_or_update(payload)
    }

    fn delete(&self, uuid: Uuid) -> SyncResult<()> {
        (**self).delete(uuid)
    }
}

impl<T: SyncTransport + ?Sized> SyncTransport for std::sync::Arc<T> {
    fn fetch_page(&self, table_id: TableId, page: u32) -> SyncResult<PageResponse> {
        (**self).fetch_page(table_id, page)
    }

    fn fetch_object(&self, uuid: Uuid) -> SyncResult<ObjectPayload> {
        (**self).fetch_object(uuid)
    }

    fn create_or_update(&self, payload: &ObjectPayload) -> SyncResult<String> {
        (**self).create_or_update(payload)
    }

    fn delete(&self, uuid: Uuid) -> SyncResult<()> {
        (**self).delete(uuid)
    }
}

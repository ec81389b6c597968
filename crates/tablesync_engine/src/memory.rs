//! An in-memory sync server for tests and offline development.

use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tablesync_core::TableId;
use tablesync_protocol::{ObjectPayload, PageResponse};
use uuid::Uuid;

#[derive(Default)]
struct ServerInner {
    /// Objects per table, in insertion order.
    tables: HashMap<TableId, Vec<ObjectPayload>>,
    next_etag: u64,
    failing_tables: HashSet<TableId>,
    failing_pages: HashSet<(TableId, u32)>,
    /// Every page request received, in arrival order.
    request_log: Vec<(TableId, u32)>,
}

impl ServerInner {
    fn assign_etag(&mut self) -> String {
        self.next_etag += 1;
        format!("{:08x}", self.next_etag)
    }

    fn find(&self, uuid: Uuid) -> Option<&ObjectPayload> {
        self.tables.values().flatten().find(|o| o.uuid == uuid)
    }
}

/// An in-memory [`SyncTransport`] that behaves like the real server:
/// it assigns etags, paginates table listings with a fixed page size,
/// and reports missing resources as not-found conflicts.
///
/// Whole tables or individual pages can be made to fail with transport
/// errors, and every page request is recorded so tests can assert the
/// scheduler's request order.
pub struct MemoryServer {
    inner: RwLock<ServerInner>,
    page_size: usize,
}

impl MemoryServer {
    /// Creates a server paginating listings with the given page size.
    pub fn new(page_size: usize) -> Self {
        Self {
            inner: RwLock::new(ServerInner::default()),
            page_size: page_size.max(1),
        }
    }

    /// Seeds an object server-side, assigning it a fresh etag, and
    /// returns that etag.
    pub fn insert(&self, mut payload: ObjectPayload) -> String {
        let mut inner = self.inner.write();
        let etag = inner.assign_etag();
        payload.etag = Some(etag.clone());
        let table = inner.tables.entry(payload.table_id).or_default();
        match table.iter_mut().find(|o| o.uuid == payload.uuid) {
            Some(existing) => *existing = payload,
            None => table.push(payload),
        }
        etag
    }

    /// Removes an object server-side, as if another client deleted it.
    pub fn remove(&self, uuid: Uuid) {
        let mut inner = self.inner.write();
        for table in inner.tables.values_mut() {
            table.retain(|o| o.uuid != uuid);
        }
    }

    /// Returns the server's copy of an object.
    pub fn object(&self, uuid: Uuid) -> Option<ObjectPayload> {
        self.inner.read().find(uuid).cloned()
    }

    /// Total number of objects on the server.
    pub fn object_count(&self) -> usize {
        self.inner.read().tables.values().map(Vec::len).sum()
    }

    /// Makes every page request for a table fail with a transport error.
    pub fn fail_table(&self, table_id: TableId) {
        self.inner.write().failing_tables.insert(table_id);
    }

    /// Makes one specific page request fail with a transport error.
    pub fn fail_page(&self, table_id: TableId, page: u32) {
        self.inner.write().failing_pages.insert((table_id, page));
    }

    /// Clears all injected failures.
    pub fn heal(&self) {
        let mut inner = self.inner.write();
        inner.failing_tables.clear();
        inner.failing_pages.clear();
    }

    /// Every page request received so far, in arrival order.
    pub fn request_log(&self) -> Vec<(TableId, u32)> {
        self.inner.read().request_log.clone()
    }
}

impl SyncTransport for MemoryServer {
    fn fetch_page(&self, table_id: TableId, page: u32) -> SyncResult<PageResponse> {
        let mut inner = self.inner.write();
        inner.request_log.push((table_id, page));

        if inner.failing_tables.contains(&table_id)
            || inner.failing_pages.contains(&(table_id, page))
        {
            return Err(SyncError::transport(format!(
                "injected failure for table {table_id} page {page}"
            )));
        }

        let objects = inner.tables.get(&table_id).map(Vec::as_slice).unwrap_or(&[]);
        let total_pages = (objects.len().max(1)).div_ceil(self.page_size) as u32;
        let start = (page.saturating_sub(1) as usize) * self.page_size;
        let slice = objects
            .get(start..objects.len().min(start + self.page_size))
            .unwrap_or(&[]);
        Ok(PageResponse::new(slice.to_vec(), total_pages))
    }

    fn fetch_object(&self, uuid: Uuid) -> SyncResult<ObjectPayload> {
        let inner = self.inner.read();
        match inner.find(uuid) {
            Some(payload) if inner.failing_tables.contains(&payload.table_id) => Err(
                SyncError::transport(format!("injected failure for table {}", payload.table_id)),
            ),
            Some(payload) => Ok(payload.clone()),
            None => Err(SyncError::not_found(uuid)),
        }
    }

    fn create_or_update(&self, payload: &ObjectPayload) -> SyncResult<String> {
        let mut inner = self.inner.write();
        let etag = inner.assign_etag();
        let mut stored = payload.clone();
        stored.etag = Some(etag.clone());
        let table = inner.tables.entry(stored.table_id).or_default();
        match table.iter_mut().find(|o| o.uuid == stored.uuid) {
            Some(existing) => *existing = stored,
            None => table.push(stored),
        }
        Ok(etag)
    }

    fn delete(&self, uuid: Uuid) -> SyncResult<()> {
        let mut inner = self.inner.write();
        for table in inner.tables.values_mut() {
            if let Some(index) = table.iter().position(|o| o.uuid == uuid) {
                table.remove(index);
                return Ok(());
            }
        }
        Err(SyncError::not_found(uuid))
    }
}

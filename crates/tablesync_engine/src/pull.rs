//! Pull engine: reconciles the server's authoritative object set into
//! the local record store.

use crate::convert::object_from_payload;
use crate::engine::SyncEngine;
use crate::error::{SyncError, SyncResult};
use crate::schedule::page_plan;
use crate::transport::SyncTransport;
use std::collections::{HashMap, HashSet};
use tablesync_core::{RecordStore, TableId, UploadStatus};
use tablesync_protocol::{ObjectPayload, PageResponse};
use tracing::{debug, warn};
use uuid::Uuid;

/// Result of one full pull pass.
#[derive(Debug, Clone, Default)]
pub struct PullOutcome {
    /// True if every table's listing was fetched and reconciled.
    pub success: bool,
    /// Tables whose synchronization was aborted by a page failure.
    /// Sibling tables proceed independently.
    pub failed_tables: Vec<TableId>,
    /// Objects discovered remotely and created locally.
    pub created: u64,
    /// Objects overwritten locally because their etag changed.
    pub updated: u64,
    /// Locally `UpToDate` objects removed because the server's full
    /// listing no longer contains them.
    pub deleted: u64,
}

/// How a single remote object was reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reconciliation {
    /// Not present locally; created as `UpToDate`.
    Created,
    /// Present locally with a different etag; fields, file reference and
    /// etag overwritten.
    Updated,
    /// Identical etag, or shielded by a pending local change.
    Unchanged,
}

impl<T: SyncTransport, S: RecordStore> SyncEngine<T, S> {
    /// Runs a full pull over all configured tables.
    ///
    /// Page 1 of every table is fetched first (in `table_ids` order) to
    /// learn total page counts; the remaining pages follow the
    /// scheduler's fetch order. A table's absence-deletions are applied
    /// only once all of its pages arrived, so an object is never deleted
    /// because its page simply has not been fetched yet.
    pub fn pull(&self) -> SyncResult<PullOutcome> {
        let mut outcome = PullOutcome::default();
        let mut failed: Vec<TableId> = Vec::new();
        let mut pages: HashMap<TableId, u32> = HashMap::new();
        let mut first_pages: HashMap<TableId, PageResponse> = HashMap::new();

        // Discovery pass: page 1 of every table sizes the fetch plan.
        for &table_id in &self.config.table_ids {
            match self.transport.fetch_page(table_id, 1) {
                Ok(page) => {
                    pages.insert(table_id, page.total_pages.max(1));
                    first_pages.insert(table_id, page);
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(table_id, error = %err, "first page fetch failed, skipping table");
                    failed.push(table_id);
                }
            }
        }

        let healthy: Vec<TableId> = self
            .config
            .table_ids
            .iter()
            .copied()
            .filter(|t| !failed.contains(t))
            .collect();
        let plan = page_plan(&healthy, &self.config.parallel_table_ids, &pages);

        let mut seen: HashMap<TableId, HashSet<Uuid>> =
            healthy.iter().map(|&t| (t, HashSet::new())).collect();

        for (table_id, page_index) in plan {
            if failed.contains(&table_id) {
                continue;
            }
            let page = if page_index == 1 {
                match first_pages.remove(&table_id) {
                    Some(page) => page,
                    None => continue,
                }
            } else {
                match self.transport.fetch_page(table_id, page_index) {
                    Ok(page) => page,
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(err) => {
                        warn!(table_id, page_index, error = %err, "page fetch failed, aborting table");
                        failed.push(table_id);
                        continue;
                    }
                }
            };

            if let Some(table_seen) = seen.get_mut(&table_id) {
                for payload in &page.objects {
                    table_seen.insert(payload.uuid);
                    match self.reconcile_remote(payload)? {
                        Reconciliation::Created => outcome.created += 1,
                        Reconciliation::Updated => outcome.updated += 1,
                        Reconciliation::Unchanged => {}
                    }
                }
            }
        }

        // Absence deletion, per fully listed table only.
        for &table_id in &healthy {
            if failed.contains(&table_id) {
                continue;
            }
            let Some(table_seen) = seen.get(&table_id) else {
                continue;
            };
            for local in self.store.list_by_table(table_id)? {
                if local.upload_status == UploadStatus::UpToDate
                    && !table_seen.contains(&local.uuid)
                {
                    debug!(uuid = %local.uuid, table_id, "object absent from server listing, removing");
                    self.store.delete_object(local.uuid)?;
                    outcome.deleted += 1;
                }
            }
        }

        outcome.success = failed.is_empty();
        outcome.failed_tables = failed;
        Ok(outcome)
    }

    /// Reconciles one remote object into the store, committing fields,
    /// etag and status in a single store transaction.
    ///
    /// Pending local changes (`New`/`Updated`/`Deleted`) are left
    /// untouched: push takes precedence over a concurrent pull for the
    /// same object within one cycle.
    pub(crate) fn reconcile_remote(&self, payload: &ObjectPayload) -> SyncResult<Reconciliation> {
        match self.store.get_by_uuid(payload.uuid)? {
            None => {
                let mut object = object_from_payload(payload, &self.config.data_path);
                self.store.upsert_object(&mut object)?;
                debug!(uuid = %payload.uuid, table_id = payload.table_id, "discovered remote object");
                Ok(Reconciliation::Created)
            }
            Some(local) => {
                if local.upload_status.is_pending() {
                    return Ok(Reconciliation::Unchanged);
                }
                if local.etag == payload.etag {
                    return Ok(Reconciliation::Unchanged);
                }
                let mut object = object_from_payload(payload, &self.config.data_path);
                object.id = local.id;
                self.store.upsert_object(&mut object)?;
                debug!(uuid = %payload.uuid, "remote change, overwriting local copy");
                Ok(Reconciliation::Updated)
            }
        }
    }
}

//! Push engine: uploads local divergence and reconciles
//! missing-on-server conflicts.

use crate::convert::payload_from_object;
use crate::engine::SyncEngine;
use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;
use tablesync_core::{RecordStore, UploadStatus};
use tracing::{debug, warn};
use uuid::Uuid;

/// Result of one full push pass.
#[derive(Debug, Clone, Default)]
pub struct PushOutcome {
    /// True if every divergent object was reconciled with the server.
    pub success: bool,
    /// Objects whose push failed and whose status was left unchanged.
    pub failed_objects: Vec<Uuid>,
    /// Objects uploaded and advanced to `UpToDate`.
    pub pushed: u64,
    /// Objects removed locally: confirmed deletes plus objects the
    /// server reported as nonexistent.
    pub removed: u64,
}

impl<T: SyncTransport, S: RecordStore> SyncEngine<T, S> {
    /// Pushes every locally divergent object, in store order.
    ///
    /// Objects are independent: one object's failure never blocks the
    /// rest, and there is no dependency ordering between pushes.
    pub fn push(&self) -> SyncResult<PushOutcome> {
        let mut outcome = PushOutcome::default();

        for object in self.store.list_all()? {
            if !object.upload_status.is_pending() {
                continue;
            }
            let uuid = object.uuid;

            match object.upload_status {
                UploadStatus::New | UploadStatus::Updated => {
                    let payload = payload_from_object(&object);
                    match self.transport.create_or_update(&payload) {
                        Ok(etag) => {
                            let mut synced = object;
                            synced.etag = Some(etag);
                            synced.upload_status = UploadStatus::UpToDate;
                            self.store.update_object(&synced)?;
                            outcome.pushed += 1;
                        }
                        Err(SyncError::NotFound { .. }) => {
                            // The server's ground truth wins: the prior
                            // local state was inconsistent, so the object
                            // is removed rather than retried forever.
                            debug!(%uuid, "update target missing on server, removing locally");
                            self.store.delete_object(uuid)?;
                            outcome.removed += 1;
                        }
                        Err(err) if err.is_fatal() => return Err(err),
                        Err(err) => {
                            warn!(%uuid, error = %err, "push failed, leaving status unchanged");
                            outcome.failed_objects.push(uuid);
                        }
                    }
                }
                UploadStatus::Deleted => match self.transport.delete(uuid) {
                    Ok(()) | Err(SyncError::NotFound { .. }) => {
                        self.store.delete_object(uuid)?;
                        outcome.removed += 1;
                    }
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(err) => {
                        warn!(%uuid, error = %err, "delete push failed, leaving status unchanged");
                        outcome.failed_objects.push(uuid);
                    }
                },
                UploadStatus::UpToDate => {}
            }
        }

        outcome.success = outcome.failed_objects.is_empty();
        Ok(outcome)
    }
}

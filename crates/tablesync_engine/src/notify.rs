//! Notification-driven incremental sync.
//!
//! The server pushes `(table_id, uuid, operation)` events for
//! out-of-band remote changes; each one triggers a bounded
//! single-object resync instead of a full pull cycle.

use crate::engine::SyncEngine;
use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;
use std::sync::mpsc::Receiver;
use tablesync_core::{RecordStore, UploadStatus};
use tablesync_protocol::{EventOperation, NotificationEvent};
use tracing::{debug, warn};
use uuid::Uuid;

impl<T: SyncTransport, S: RecordStore> SyncEngine<T, S> {
    /// Applies one notification event as a single-object reconciliation.
    ///
    /// Created and updated events fetch the object and reconcile it
    /// under the same rules as a full pull; delete events reconcile the
    /// absence directly, without a fetch. Pending local changes shield
    /// the object either way.
    ///
    /// Each reconciliation commits through a single store call, so an
    /// event is applied completely or not at all.
    pub fn handle_event(&self, event: &NotificationEvent) -> SyncResult<()> {
        match event.operation {
            EventOperation::Deleted => self.reconcile_absence(event.uuid),
            EventOperation::Created | EventOperation::Updated => {
                match self.transport.fetch_object(event.uuid) {
                    Ok(payload) => {
                        self.reconcile_remote(&payload)?;
                        Ok(())
                    }
                    // Deleted again between the event and our fetch.
                    Err(SyncError::NotFound { .. }) => self.reconcile_absence(event.uuid),
                    Err(err) => Err(err),
                }
            }
        }
    }

    /// Drains a notification channel, applying events one at a time in
    /// delivery order, until the sender side closes.
    ///
    /// Transport failures are logged and skip the one event; only store
    /// errors end the loop early.
    pub fn run_notifications(&self, events: &Receiver<NotificationEvent>) -> SyncResult<()> {
        while let Ok(event) = events.recv() {
            match self.handle_event(&event) {
                Ok(()) => {}
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(uuid = %event.uuid, error = %err, "notification resync failed, skipping event");
                }
            }
        }
        debug!("notification channel closed");
        Ok(())
    }

    /// Removes a locally `UpToDate` object the server no longer has.
    /// Pending local changes win and are left for the next push.
    fn reconcile_absence(&self, uuid: Uuid) -> SyncResult<()> {
        if let Some(local) = self.store.get_by_uuid(uuid)? {
            if local.upload_status == UploadStatus::UpToDate {
                debug!(%uuid, "remote deletion event, removing local copy");
                self.store.delete_object(uuid)?;
            }
        }
        Ok(())
    }
}

//! Notification channel events.

use serde::{Deserialize, Serialize};
use tablesync_core::TableId;
use uuid::Uuid;

/// What happened to the object on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOperation {
    /// The object was created remotely.
    Created,
    /// The object was updated remotely.
    Updated,
    /// The object was deleted remotely.
    Deleted,
}

/// An out-of-band remote change delivered over the notification channel.
///
/// Each event triggers a bounded single-object resync; events are
/// processed one at a time, in delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Table of the changed object.
    pub table_id: TableId,
    /// Identity of the changed object.
    pub uuid: Uuid,
    /// The remote operation.
    pub operation: EventOperation,
}

impl NotificationEvent {
    /// Creates a notification event.
    pub fn new(table_id: TableId, uuid: Uuid, operation: EventOperation) -> Self {
        Self {
            table_id,
            uuid,
            operation,
        }
    }
}

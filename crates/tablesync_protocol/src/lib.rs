//! # tablesync Protocol
//!
//! Server-facing wire types for the tablesync client.
//!
//! This crate defines:
//! - The object payload exchanged with the server
//! - Paginated table listing responses
//! - Notification channel events for out-of-band remote changes
//!
//! All field values travel as strings; richer types are an
//! application-layer concern. The `properties` map preserves insertion
//! order so first-write field order survives round trips.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod events;
mod messages;
mod payload;

pub use events::{EventOperation, NotificationEvent};
pub use messages::PageResponse;
pub use payload::ObjectPayload;

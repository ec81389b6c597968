//! # tablesync Engine
//!
//! Reconciliation core for the tablesync offline-first client.
//!
//! This crate provides:
//! - The page scheduler ordering paginated, per-table fetches
//! - The pull engine reconciling the server's authoritative object set
//!   into the local record store
//! - The push engine uploading local divergence and resolving
//!   missing-on-server conflicts
//! - Notification-driven single-object resync
//! - A transport abstraction with an in-memory server for tests
//!
//! ## Architecture
//!
//! One sync cycle runs **pull then push** to completion; triggering a
//! new cycle while one is in flight is a no-op. Per-table and
//! per-object failures are isolated and reported in the aggregate
//! [`SyncCycleResult`] instead of aborting sibling work.
//!
//! ## Key Invariants
//!
//! - Page *k+1* of a table is never requested before page *k*
//! - A table's absence-deletions apply only after all of its pages
//!   arrived
//! - Pending local changes are never overwritten by pull; push takes
//!   precedence within one cycle
//! - A "resource does not exist" push response reconciles the client to
//!   the server's ground truth by removing the object locally

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod convert;
mod engine;
mod error;
mod memory;
mod notify;
mod pull;
mod push;
mod schedule;
mod transport;

pub use config::SyncConfig;
pub use engine::{SyncCycleResult, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use memory::MemoryServer;
pub use pull::PullOutcome;
pub use push::PushOutcome;
pub use schedule::{page_plan, sort_table_ids};
pub use transport::SyncTransport;

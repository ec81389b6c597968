//! # tablesync Core
//!
//! Object model and local persistence boundary for the tablesync client.
//!
//! This crate provides:
//! - The [`TableObject`] / [`Property`] record model
//! - The upload-status state machine tracking local-vs-remote divergence
//! - The [`RecordStore`] trait the sync engines persist through
//! - An in-memory reference store for tests and embedding
//! - Blob file path handling for file-backed objects
//!
//! ## Key Invariants
//!
//! - Every object has a globally unique, immutable `uuid`
//! - A field set never contains two entries with the same name
//! - `file_path` is set if and only if the object is file-backed
//! - Upload status only changes through the transitions defined on
//!   [`UploadStatus`] and the object mutation API

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod blob;
mod error;
mod object;
mod store;
mod types;

pub use blob::{blob_path, copy_blob};
pub use error::{CoreResult, StoreError};
pub use object::{Property, TableObject, UploadStatus};
pub use store::{MemoryRecordStore, RecordStore};
pub use types::{TableId, Visibility};

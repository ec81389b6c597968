//! Configuration for the sync engine.

use std::path::PathBuf;
use tablesync_core::TableId;

/// Configuration for one application's sync setup.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// The tables to synchronize, in iteration order. The order also
    /// breaks ties in the page scheduler.
    pub table_ids: Vec<TableId>,
    /// Subset of `table_ids` whose paginated listings the server can
    /// serve with pages fetched concurrently.
    pub parallel_table_ids: Vec<TableId>,
    /// Root directory for blob files of file-backed objects.
    pub data_path: PathBuf,
}

impl SyncConfig {
    /// Creates a configuration with no parallel-capable tables.
    pub fn new(table_ids: Vec<TableId>, data_path: impl Into<PathBuf>) -> Self {
        Self {
            table_ids,
            parallel_table_ids: Vec::new(),
            data_path: data_path.into(),
        }
    }

    /// Sets the parallel-capable tables.
    pub fn with_parallel_table_ids(mut self, table_ids: Vec<TableId>) -> Self {
        self.parallel_table_ids = table_ids;
        self
    }
}

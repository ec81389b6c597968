//! Blob file handling for file-backed objects.
//!
//! A file-backed object owns exactly one blob file, addressed by
//! `(table_id, uuid)` below the application data path. The blob's
//! lifecycle is tied 1:1 to the object: it is copied in when the file is
//! set and removed when the object is deleted from the store.

use crate::error::CoreResult;
use crate::types::TableId;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Returns the canonical path of an object's blob file.
///
/// Blobs live at `<data_path>/<table_id>/<uuid>`.
pub fn blob_path(data_path: &Path, table_id: TableId, uuid: Uuid) -> PathBuf {
    data_path.join(table_id.to_string()).join(uuid.to_string())
}

/// Copies `src` to the object's blob path, creating the table directory
/// if necessary, and returns the destination path.
pub fn copy_blob(
    src: &Path,
    data_path: &Path,
    table_id: TableId,
    uuid: Uuid,
) -> CoreResult<PathBuf> {
    let dest = blob_path(data_path, table_id, uuid);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, &dest)?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn blob_path_is_keyed_by_table_and_uuid() {
        let uuid = Uuid::new_v4();
        let path = blob_path(Path::new("/data"), 7, uuid);
        assert_eq!(path, Path::new("/data").join("7").join(uuid.to_string()));
    }

    #[test]
    fn copy_blob_creates_table_directory() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("source.jpg");
        let mut file = fs::File::create(&src).unwrap();
        file.write_all(b"image bytes").unwrap();

        let uuid = Uuid::new_v4();
        let dest = copy_blob(&src, dir.path(), 3, uuid).unwrap();

        assert!(dest.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"image bytes");
        assert_eq!(dest, blob_path(dir.path(), 3, uuid));
    }
}

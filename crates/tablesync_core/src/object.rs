//! Table objects, properties and the upload-status state machine.

use crate::blob::copy_blob;
use crate::error::CoreResult;
use crate::store::RecordStore;
use crate::types::{TableId, Visibility};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The local divergence state of an object relative to the server.
///
/// Transitions:
/// - local creation → [`New`](UploadStatus::New)
/// - remote discovery during pull → [`UpToDate`](UploadStatus::UpToDate)
/// - field or file mutation → stays `New` if it was `New`, else `Updated`
/// - user-facing delete while authenticated → [`Deleted`](UploadStatus::Deleted)
/// - successful push of `New`/`Updated` → `UpToDate` with the server's etag
/// - push of `Deleted`, or any push answered with "resource does not
///   exist" → permanent removal from the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadStatus {
    /// Created locally, no remote counterpart yet.
    #[default]
    New,
    /// Mutated locally since the last successful push or pull.
    Updated,
    /// Soft-deleted locally; the delete has not been pushed yet.
    Deleted,
    /// In sync with the server as of the stored etag.
    UpToDate,
}

impl UploadStatus {
    /// Returns true if the object diverges from the server and must be
    /// visited by the push engine.
    pub fn is_pending(&self) -> bool {
        !matches!(self, UploadStatus::UpToDate)
    }

    /// The status after a local field or file mutation.
    ///
    /// `New` objects stay `New`; synced objects become `Updated`. A
    /// soft-deleted object keeps its `Deleted` status so a pending
    /// delete is never resurrected by a late edit.
    pub fn after_local_edit(self) -> Self {
        match self {
            UploadStatus::New => UploadStatus::New,
            UploadStatus::Deleted => UploadStatus::Deleted,
            UploadStatus::Updated | UploadStatus::UpToDate => UploadStatus::Updated,
        }
    }
}

/// One named string value owned by exactly one [`TableObject`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Property {
    /// Local surrogate key, assigned by the record store.
    pub id: i64,
    /// Store-level foreign key of the owning object. This is an index
    /// lookup key, never a live parent pointer.
    pub owner_id: i64,
    /// Property name, unique within one object's field set.
    pub name: String,
    /// Property value. Always a string; richer types are an
    /// application-layer concern.
    pub value: String,
}

impl Property {
    /// Creates a property for the given owner. The surrogate id is
    /// assigned by the store on creation.
    pub fn new(owner_id: i64, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: 0,
            owner_id,
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A synchronizable record belonging to one logical table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableObject {
    /// Local surrogate key, assigned by the record store. Never
    /// transmitted as the sync identity.
    pub id: i64,
    /// Global identity, stable across client and server. Assigned at
    /// creation and immutable.
    pub uuid: Uuid,
    /// The logical table this record belongs to.
    pub table_id: TableId,
    /// Server-defined access scope.
    pub visibility: Visibility,
    /// Whether the payload is a binary blob stored outside the field set.
    pub is_file: bool,
    /// Path of the blob file. Set if and only if `is_file` is true.
    pub file_path: Option<PathBuf>,
    /// Opaque version token assigned by the server on every successful
    /// create or update. Compared for equality, never interpreted.
    pub etag: Option<String>,
    /// Local divergence state.
    pub upload_status: UploadStatus,
    /// Ordered field set. First-write order is preserved across round
    /// trips; names are unique.
    pub properties: Vec<Property>,
}

impl TableObject {
    /// Creates an in-memory object in the `New` state. Not yet persisted.
    pub fn new_local(uuid: Uuid, table_id: TableId) -> Self {
        Self {
            uuid,
            table_id,
            upload_status: UploadStatus::New,
            ..Self::default()
        }
    }

    /// Creates an in-memory object discovered on the server, already
    /// `UpToDate` under the given etag. Not yet persisted.
    pub fn new_remote(
        uuid: Uuid,
        table_id: TableId,
        visibility: Visibility,
        is_file: bool,
        etag: Option<String>,
    ) -> Self {
        Self {
            uuid,
            table_id,
            visibility,
            is_file,
            etag,
            upload_status: UploadStatus::UpToDate,
            ..Self::default()
        }
    }

    /// Creates an object with the given field set and persists it.
    ///
    /// Duplicate names in `properties` collapse to the last value while
    /// keeping the position of the first occurrence.
    pub fn create(
        store: &dyn RecordStore,
        uuid: Uuid,
        table_id: TableId,
        properties: Vec<(String, String)>,
    ) -> CoreResult<Self> {
        let mut object = Self::new_local(uuid, table_id);
        for (name, value) in properties {
            match object.properties.iter_mut().find(|p| p.name == name) {
                Some(existing) => existing.value = value,
                None => object.properties.push(Property::new(0, name, value)),
            }
        }
        store.create_object(&mut object)?;
        Ok(object)
    }

    /// Creates a file-backed object, copies the blob into place and
    /// persists the result.
    pub fn create_with_file(
        store: &dyn RecordStore,
        uuid: Uuid,
        table_id: TableId,
        src: &Path,
        data_path: &Path,
    ) -> CoreResult<Self> {
        let mut object = Self::new_local(uuid, table_id);
        object.is_file = true;
        store.create_object(&mut object)?;
        object.set_file(store, src, data_path)?;
        Ok(object)
    }

    /// Returns the value of the named property, or `None` if the field
    /// set does not contain the name.
    pub fn get_property_value(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Sets a property value, overwriting in place when the name already
    /// exists, and persists the change.
    ///
    /// Promotes the upload status per the state machine.
    pub fn set_property_value(
        &mut self,
        store: &dyn RecordStore,
        name: &str,
        value: &str,
    ) -> CoreResult<()> {
        match self.properties.iter_mut().find(|p| p.name == name) {
            Some(property) => {
                property.value = value.to_string();
                store.update_property(property)?;
            }
            None => {
                let mut property = Property::new(self.id, name, value);
                store.create_property(&mut property)?;
                self.properties.push(property);
            }
        }
        self.upload_status = self.upload_status.after_local_edit();
        store.update_object(self)
    }

    /// Sets multiple property values in one pass and persists the result.
    pub fn set_property_values(
        &mut self,
        store: &dyn RecordStore,
        pairs: &[(&str, &str)],
    ) -> CoreResult<()> {
        for (name, value) in pairs {
            match self.properties.iter_mut().find(|p| p.name == *name) {
                Some(property) => {
                    property.value = value.to_string();
                    store.update_property(property)?;
                }
                None => {
                    let mut property = Property::new(self.id, *name, *value);
                    store.create_property(&mut property)?;
                    self.properties.push(property);
                }
            }
        }
        self.upload_status = self.upload_status.after_local_edit();
        store.update_object(self)
    }

    /// Removes the named property from the field set and the store.
    ///
    /// A missing name is a no-op.
    pub fn remove_property(&mut self, store: &dyn RecordStore, name: &str) -> CoreResult<()> {
        let Some(index) = self.properties.iter().position(|p| p.name == name) else {
            return Ok(());
        };
        let property = self.properties.remove(index);
        store.delete_property(property.id)?;
        self.upload_status = self.upload_status.after_local_edit();
        store.update_object(self)
    }

    /// Replaces the object's blob file with a copy of `src` and records
    /// the source extension as the `ext` property.
    ///
    /// No-op when the object is not file-backed.
    pub fn set_file(
        &mut self,
        store: &dyn RecordStore,
        src: &Path,
        data_path: &Path,
    ) -> CoreResult<()> {
        if !self.is_file {
            return Ok(());
        }
        let dest = copy_blob(src, data_path, self.table_id, self.uuid)?;
        self.file_path = Some(dest);
        let ext = src
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        self.set_property_value(store, "ext", &ext)
    }

    /// User-facing delete.
    ///
    /// With an authenticated session the object is soft-deleted and the
    /// remote delete is deferred to the next push. Without one no remote
    /// copy can exist, so the record, its fields and its blob file are
    /// removed immediately.
    pub fn delete(&mut self, store: &dyn RecordStore, authenticated: bool) -> CoreResult<()> {
        if authenticated {
            self.upload_status = UploadStatus::Deleted;
            store.update_object(self)
        } else {
            store.delete_object(self.uuid)
        }
    }

    /// Removes the object, its fields and its blob file from the store
    /// immediately, bypassing the state machine.
    pub fn delete_immediately(&self, store: &dyn RecordStore) -> CoreResult<()> {
        store.delete_object(self.uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRecordStore;
    use std::fs;
    use std::io::Write;

    fn store() -> MemoryRecordStore {
        MemoryRecordStore::new()
    }

    #[test]
    fn created_objects_start_new() {
        let store = store();
        let uuid = Uuid::new_v4();
        let object = TableObject::create(&store, uuid, 4, Vec::new()).unwrap();

        assert_eq!(object.upload_status, UploadStatus::New);
        assert_eq!(object.table_id, 4);
        assert!(object.id != 0);

        let loaded = store.get_by_uuid(uuid).unwrap().unwrap();
        assert_eq!(loaded.uuid, uuid);
        assert_eq!(loaded.id, object.id);
    }

    #[test]
    fn create_collapses_duplicate_property_names() {
        let store = store();
        let object = TableObject::create(
            &store,
            Uuid::new_v4(),
            4,
            vec![
                ("page1".into(), "first".into()),
                ("page2".into(), "other".into()),
                ("page1".into(), "second".into()),
            ],
        )
        .unwrap();

        assert_eq!(object.properties.len(), 2);
        assert_eq!(object.properties[0].name, "page1");
        assert_eq!(object.get_property_value("page1"), Some("second"));
    }

    #[test]
    fn set_property_value_creates_and_overwrites_in_place() {
        let store = store();
        let mut object = TableObject::create(&store, Uuid::new_v4(), 4, Vec::new()).unwrap();

        object.set_property_value(&store, "page1", "Hello World").unwrap();
        assert_eq!(object.properties.len(), 1);
        assert!(object.properties[0].id != 0);

        object.set_property_value(&store, "page1", "Hallo Welt").unwrap();
        assert_eq!(object.properties.len(), 1);
        assert_eq!(object.get_property_value("page1"), Some("Hallo Welt"));

        let loaded = store.get_by_uuid(object.uuid).unwrap().unwrap();
        assert_eq!(loaded.properties.len(), 1);
        assert_eq!(loaded.get_property_value("page1"), Some("Hallo Welt"));
    }

    #[test]
    fn set_property_values_persists_batch() {
        let store = store();
        let mut object = TableObject::create(&store, Uuid::new_v4(), 4, Vec::new()).unwrap();

        object
            .set_property_values(&store, &[("page1", "test"), ("page2", "blablabla")])
            .unwrap();

        let loaded = store.get_by_uuid(object.uuid).unwrap().unwrap();
        assert_eq!(loaded.properties.len(), 2);
        assert_eq!(loaded.properties[0].name, "page1");
        assert_eq!(loaded.properties[1].name, "page2");
        assert!(loaded.properties.iter().all(|p| p.id != 0));
    }

    #[test]
    fn get_property_value_returns_none_for_unknown_name() {
        let store = store();
        let object = TableObject::create(&store, Uuid::new_v4(), 4, Vec::new()).unwrap();
        assert_eq!(object.get_property_value("page1"), None);
    }

    #[test]
    fn remove_property_deletes_from_store() {
        let store = store();
        let mut object = TableObject::create(
            &store,
            Uuid::new_v4(),
            4,
            vec![("page1".into(), "Hello World".into())],
        )
        .unwrap();

        object.remove_property(&store, "page1").unwrap();
        assert!(object.properties.is_empty());

        let loaded = store.get_by_uuid(object.uuid).unwrap().unwrap();
        assert!(loaded.properties.is_empty());
    }

    #[test]
    fn mutation_promotes_up_to_date_to_updated() {
        let store = store();
        let mut object = TableObject::new_remote(Uuid::new_v4(), 4, Visibility::Private, false, Some("e1".into()));
        store.upsert_object(&mut object).unwrap();
        assert_eq!(object.upload_status, UploadStatus::UpToDate);

        object.set_property_value(&store, "page1", "x").unwrap();
        assert_eq!(object.upload_status, UploadStatus::Updated);

        let loaded = store.get_by_uuid(object.uuid).unwrap().unwrap();
        assert_eq!(loaded.upload_status, UploadStatus::Updated);
    }

    #[test]
    fn mutation_keeps_new_objects_new() {
        let store = store();
        let mut object = TableObject::create(&store, Uuid::new_v4(), 4, Vec::new()).unwrap();
        object.set_property_value(&store, "page1", "x").unwrap();
        assert_eq!(object.upload_status, UploadStatus::New);
    }

    #[test]
    fn delete_while_authenticated_soft_deletes() {
        let store = store();
        let mut object = TableObject::create(&store, Uuid::new_v4(), 4, Vec::new()).unwrap();

        object.delete(&store, true).unwrap();

        let loaded = store.get_by_uuid(object.uuid).unwrap().unwrap();
        assert_eq!(loaded.upload_status, UploadStatus::Deleted);
    }

    #[test]
    fn delete_while_unauthenticated_removes_immediately() {
        let store = store();
        let mut object = TableObject::create(
            &store,
            Uuid::new_v4(),
            4,
            vec![("page1".into(), "Hello World".into())],
        )
        .unwrap();

        object.delete(&store, false).unwrap();
        assert!(store.get_by_uuid(object.uuid).unwrap().is_none());
    }

    #[test]
    fn delete_immediately_removes_blob_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("icon.ico");
        let mut file = fs::File::create(&src).unwrap();
        file.write_all(b"icon bytes").unwrap();

        let store = store();
        let object =
            TableObject::create_with_file(&store, Uuid::new_v4(), 4, &src, dir.path()).unwrap();
        let blob = object.file_path.clone().unwrap();
        assert!(blob.exists());

        object.delete_immediately(&store).unwrap();
        assert!(!blob.exists());
        assert!(store.get_by_uuid(object.uuid).unwrap().is_none());
    }

    #[test]
    fn set_file_copies_blob_and_records_extension() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("image.jpg");
        let mut file = fs::File::create(&src).unwrap();
        file.write_all(b"image bytes").unwrap();

        let store = store();
        let object =
            TableObject::create_with_file(&store, Uuid::new_v4(), 3, &src, dir.path()).unwrap();

        assert!(object.is_file);
        assert!(object.file_path.is_some());
        assert_eq!(object.get_property_value("ext"), Some("jpg"));
        assert_eq!(object.upload_status, UploadStatus::New);

        let loaded = store.get_by_uuid(object.uuid).unwrap().unwrap();
        assert_eq!(loaded.file_path, object.file_path);
    }

    #[test]
    fn set_file_is_a_noop_for_non_file_objects() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("image.jpg");
        fs::File::create(&src).unwrap();

        let store = store();
        let mut object = TableObject::create(&store, Uuid::new_v4(), 3, Vec::new()).unwrap();
        object.set_file(&store, &src, dir.path()).unwrap();

        assert!(!object.is_file);
        assert!(object.file_path.is_none());
    }

    #[test]
    fn edits_never_resurrect_a_pending_delete() {
        assert_eq!(UploadStatus::Deleted.after_local_edit(), UploadStatus::Deleted);
        assert_eq!(UploadStatus::New.after_local_edit(), UploadStatus::New);
        assert_eq!(UploadStatus::UpToDate.after_local_edit(), UploadStatus::Updated);
        assert_eq!(UploadStatus::Updated.after_local_edit(), UploadStatus::Updated);
    }
}

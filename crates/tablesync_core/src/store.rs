//! The record store boundary and an in-memory reference implementation.

use crate::error::{CoreResult, StoreError};
use crate::object::{Property, TableObject};
use crate::types::TableId;
use parking_lot::RwLock;
use std::fs;
use tracing::warn;
use uuid::Uuid;

/// Durable keyed storage for objects and their fields.
///
/// All calls are synchronous from the sync core's point of view; an
/// implementation may be backed by an async store internally. Writes
/// must be serialized per store so a single-object reconciliation
/// commits atomically.
pub trait RecordStore: Send + Sync {
    /// Returns the object with the given uuid, including its field set.
    fn get_by_uuid(&self, uuid: Uuid) -> CoreResult<Option<TableObject>>;

    /// Returns every object of a table, in store order.
    fn list_by_table(&self, table_id: TableId) -> CoreResult<Vec<TableObject>>;

    /// Returns every stored object, in store order.
    fn list_all(&self) -> CoreResult<Vec<TableObject>>;

    /// Persists a new object and its field set, assigning surrogate ids.
    fn create_object(&self, object: &mut TableObject) -> CoreResult<()>;

    /// Updates the object row (status, etag, visibility, file reference).
    ///
    /// Does not touch the stored field set; fields are managed through
    /// the property operations or [`upsert_object`](Self::upsert_object).
    fn update_object(&self, object: &TableObject) -> CoreResult<()>;

    /// Atomically creates or replaces the object together with its whole
    /// field set. This is the commit operation reconciliation uses:
    /// fields, etag and status land in one store transaction or not at
    /// all.
    fn upsert_object(&self, object: &mut TableObject) -> CoreResult<()>;

    /// Removes the object, cascading to its fields and its blob file.
    ///
    /// Removing an absent uuid is a no-op.
    fn delete_object(&self, uuid: Uuid) -> CoreResult<()>;

    /// Persists a new property on its owner, assigning a surrogate id.
    ///
    /// If the owner already has a property with the same name, the value
    /// is overwritten in place instead (field names are unique).
    fn create_property(&self, property: &mut Property) -> CoreResult<()>;

    /// Updates an existing property by its surrogate id.
    fn update_property(&self, property: &Property) -> CoreResult<()>;

    /// Removes a property by its surrogate id. Absent ids are a no-op.
    fn delete_property(&self, property_id: i64) -> CoreResult<()>;
}

#[derive(Default)]
struct StoreInner {
    /// Objects in insertion order, with their field sets embedded.
    objects: Vec<TableObject>,
    next_object_id: i64,
    next_property_id: i64,
    /// Count of mutating calls that reached the store.
    writes: u64,
}

impl StoreInner {
    fn find_mut(&mut self, uuid: Uuid) -> Option<&mut TableObject> {
        self.objects.iter_mut().find(|o| o.uuid == uuid)
    }

    fn assign_property_ids(&mut self, object: &mut TableObject) {
        for property in &mut object.properties {
            property.owner_id = object.id;
            if property.id == 0 {
                self.next_property_id += 1;
                property.id = self.next_property_id;
            }
        }
    }
}

/// An in-memory [`RecordStore`].
///
/// Serves as the reference implementation for tests and embedding. All
/// writes go through a single lock, which also provides the per-object
/// write serialization the sync engines rely on.
#[derive(Default)]
pub struct MemoryRecordStore {
    inner: RwLock<StoreInner>,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        self.inner.read().objects.len()
    }

    /// Number of mutating calls that have reached the store. Useful for
    /// asserting that a reconciliation pass caused no write churn.
    pub fn writes(&self) -> u64 {
        self.inner.read().writes
    }

    fn remove_blob(object: &TableObject) {
        if let Some(path) = &object.file_path {
            if let Err(err) = fs::remove_file(path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(uuid = %object.uuid, error = %err, "failed to remove blob file");
                }
            }
        }
    }
}

impl RecordStore for MemoryRecordStore {
    fn get_by_uuid(&self, uuid: Uuid) -> CoreResult<Option<TableObject>> {
        Ok(self
            .inner
            .read()
            .objects
            .iter()
            .find(|o| o.uuid == uuid)
            .cloned())
    }

    fn list_by_table(&self, table_id: TableId) -> CoreResult<Vec<TableObject>> {
        Ok(self
            .inner
            .read()
            .objects
            .iter()
            .filter(|o| o.table_id == table_id)
            .cloned()
            .collect())
    }

    fn list_all(&self) -> CoreResult<Vec<TableObject>> {
        Ok(self.inner.read().objects.clone())
    }

    fn create_object(&self, object: &mut TableObject) -> CoreResult<()> {
        let mut inner = self.inner.write();
        if inner.objects.iter().any(|o| o.uuid == object.uuid) {
            return Err(StoreError::DuplicateObject(object.uuid));
        }
        inner.next_object_id += 1;
        object.id = inner.next_object_id;
        inner.assign_property_ids(object);
        inner.objects.push(object.clone());
        inner.writes += 1;
        Ok(())
    }

    fn update_object(&self, object: &TableObject) -> CoreResult<()> {
        let mut inner = self.inner.write();
        let stored = inner
            .find_mut(object.uuid)
            .ok_or(StoreError::ObjectNotFound(object.uuid))?;
        stored.table_id = object.table_id;
        stored.visibility = object.visibility;
        stored.is_file = object.is_file;
        stored.file_path = object.file_path.clone();
        stored.etag = object.etag.clone();
        stored.upload_status = object.upload_status;
        inner.writes += 1;
        Ok(())
    }

    fn upsert_object(&self, object: &mut TableObject) -> CoreResult<()> {
        let mut inner = self.inner.write();
        match inner.objects.iter().position(|o| o.uuid == object.uuid) {
            Some(index) => {
                object.id = inner.objects[index].id;
                inner.assign_property_ids(object);
                inner.objects[index] = object.clone();
            }
            None => {
                inner.next_object_id += 1;
                object.id = inner.next_object_id;
                inner.assign_property_ids(object);
                inner.objects.push(object.clone());
            }
        }
        inner.writes += 1;
        Ok(())
    }

    fn delete_object(&self, uuid: Uuid) -> CoreResult<()> {
        let mut inner = self.inner.write();
        if let Some(index) = inner.objects.iter().position(|o| o.uuid == uuid) {
            let object = inner.objects.remove(index);
            Self::remove_blob(&object);
            inner.writes += 1;
        }
        Ok(())
    }

    fn create_property(&self, property: &mut Property) -> CoreResult<()> {
        let mut inner = self.inner.write();
        let owner_id = property.owner_id;
        let owner_index = inner
            .objects
            .iter()
            .position(|o| o.id == owner_id)
            .ok_or(StoreError::OwnerNotFound(owner_id))?;

        let next_id = inner.next_property_id + 1;
        let mut created = false;
        let owner = &mut inner.objects[owner_index];
        match owner.properties.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => {
                existing.value = property.value.clone();
                property.id = existing.id;
            }
            None => {
                property.id = next_id;
                owner.properties.push(property.clone());
                created = true;
            }
        }
        if created {
            inner.next_property_id = next_id;
        }
        inner.writes += 1;
        Ok(())
    }

    fn update_property(&self, property: &Property) -> CoreResult<()> {
        let mut inner = self.inner.write();
        let stored = inner
            .objects
            .iter_mut()
            .flat_map(|o| o.properties.iter_mut())
            .find(|p| p.id == property.id)
            .ok_or(StoreError::PropertyNotFound(property.id))?;
        stored.name = property.name.clone();
        stored.value = property.value.clone();
        inner.writes += 1;
        Ok(())
    }

    fn delete_property(&self, property_id: i64) -> CoreResult<()> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        for object in &mut inner.objects {
            if let Some(index) = object.properties.iter().position(|p| p.id == property_id) {
                object.properties.remove(index);
                inner.writes += 1;
                return Ok(());
            }
        }
        Ok(())
    }
}

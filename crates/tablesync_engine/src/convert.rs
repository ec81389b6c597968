//! Conversions between the local object model and the wire payload.

use std::path::Path;
use tablesync_core::{blob_path, Property, TableObject};
use tablesync_protocol::ObjectPayload;

/// Builds the wire payload for a local object.
pub(crate) fn payload_from_object(object: &TableObject) -> ObjectPayload {
    let mut payload = ObjectPayload::new(object.uuid, object.table_id).with_file(object.is_file);
    payload.visibility = object.visibility;
    payload.etag = object.etag.clone();
    for property in &object.properties {
        payload
            .properties
            .insert(property.name.clone(), property.value.clone());
    }
    payload
}

/// Builds the local representation of a remotely discovered object,
/// already `UpToDate` under the payload's etag. Surrogate ids are
/// assigned by the store on commit.
pub(crate) fn object_from_payload(payload: &ObjectPayload, data_path: &Path) -> TableObject {
    let mut object = TableObject::new_remote(
        payload.uuid,
        payload.table_id,
        payload.visibility,
        payload.file,
        payload.etag.clone(),
    );
    if payload.file {
        object.file_path = Some(blob_path(data_path, payload.table_id, payload.uuid));
    }
    for (name, value) in &payload.properties {
        object.properties.push(Property::new(0, name, value));
    }
    object
}

//! The object payload exchanged with the server.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tablesync_core::{TableId, Visibility};
use uuid::Uuid;

/// Wire representation of one table object.
///
/// The blob of a file-backed object is addressed by `(table_id, uuid)`
/// and transferred out of band; only the `file` flag travels here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectPayload {
    /// Global object identity, client-assigned at creation.
    pub uuid: Uuid,
    /// The logical table the object belongs to.
    pub table_id: TableId,
    /// Access scope, as a server-defined integer enum.
    #[serde(default)]
    pub visibility: Visibility,
    /// Whether the object's payload is a binary blob.
    #[serde(default)]
    pub file: bool,
    /// Field set, insertion-ordered, values always strings.
    #[serde(default)]
    pub properties: IndexMap<String, String>,
    /// Server-assigned version token. Absent on a client-side create
    /// that has not been acknowledged yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl ObjectPayload {
    /// Creates an empty payload for the given identity.
    pub fn new(uuid: Uuid, table_id: TableId) -> Self {
        Self {
            uuid,
            table_id,
            visibility: Visibility::default(),
            file: false,
            properties: IndexMap::new(),
            etag: None,
        }
    }

    /// Adds a property, overwriting in place when the name exists.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Sets the etag.
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Marks the payload as file-backed.
    pub fn with_file(mut self, file: bool) -> Self {
        self.file = file;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_wire_shape() {
        let uuid = Uuid::new_v4();
        let payload = ObjectPayload::new(uuid, 4)
            .with_property("page1", "Hello World")
            .with_property("page2", "Hallo Welt")
            .with_etag("etag-1");

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["uuid"], uuid.to_string());
        assert_eq!(json["table_id"], 4);
        assert_eq!(json["visibility"], 0);
        assert_eq!(json["file"], false);
        assert_eq!(json["properties"]["page1"], "Hello World");
        assert_eq!(json["etag"], "etag-1");
    }

    #[test]
    fn payload_omits_absent_etag() {
        let payload = ObjectPayload::new(Uuid::new_v4(), 1);
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("etag").is_none());
    }

    #[test]
    fn properties_preserve_insertion_order() {
        let payload = ObjectPayload::new(Uuid::new_v4(), 1)
            .with_property("zebra", "1")
            .with_property("apple", "2")
            .with_property("zebra", "3");

        let names: Vec<&str> = payload.properties.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["zebra", "apple"]);
        assert_eq!(payload.properties["zebra"], "3");

        let text = serde_json::to_string(&payload).unwrap();
        let decoded: ObjectPayload = serde_json::from_str(&text).unwrap();
        let decoded_names: Vec<&str> = decoded.properties.keys().map(|k| k.as_str()).collect();
        assert_eq!(decoded_names, vec!["zebra", "apple"]);
    }

    #[test]
    fn visibility_round_trips_as_integer() {
        let mut payload = ObjectPayload::new(Uuid::new_v4(), 1);
        payload.visibility = Visibility::Public;

        let text = serde_json::to_string(&payload).unwrap();
        assert!(text.contains("\"visibility\":2"));
        let decoded: ObjectPayload = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded.visibility, Visibility::Public);
    }
}

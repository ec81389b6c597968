//! Shared identifier and enum types.

use serde::{Deserialize, Serialize};

/// Identifier of a logical table (a collection of objects sharing a
/// schema-free field set). Configured per application.
pub type TableId = u32;

/// Access scope of a table object, assigned by the server.
///
/// Transmitted as an integer on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Visibility {
    /// Only the owning user can access the object.
    #[default]
    Private,
    /// Accessible to users the server grants access to.
    Protected,
    /// Accessible to everyone.
    Public,
}

impl From<Visibility> for u8 {
    fn from(visibility: Visibility) -> Self {
        match visibility {
            Visibility::Private => 0,
            Visibility::Protected => 1,
            Visibility::Public => 2,
        }
    }
}

impl TryFrom<u8> for Visibility {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Visibility::Private),
            1 => Ok(Visibility::Protected),
            2 => Ok(Visibility::Public),
            other => Err(format!("unknown visibility value: {other}")),
        }
    }
}

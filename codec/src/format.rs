//! Wire layouts of every serialization version.
//!
//! Only [`CurrentDocument`] is ever written. The `Stored*` structs describe
//! what older writers produced and are only read.

use std::collections::BTreeMap;
use std::fmt;

use entity_schema_core::{AliasGroupMap, LocalizedTermMap, SchemaId};
use serde::de::{Error as _, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};

/// Field naming the serialization version.
pub(crate) const VERSION_FIELD: &str = "serializationVersion";

/// Serialization version of a stored schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SerializationVersion {
    /// Original layout: no version field (or `"1.0"`), terms stored as
    /// `{"language", "value"}` objects, body under `schema`.
    V1,
    /// `"2.0"`: plain term strings, body under `schema`.
    V2,
    /// `"3.0"`: plain term strings, body under `schemaText`.
    V3,
}

impl SerializationVersion {
    /// The version every write produces.
    pub const CURRENT: Self = Self::V3;

    /// Version string as stored in `serializationVersion`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "1.0",
            Self::V2 => "2.0",
            Self::V3 => "3.0",
        }
    }

    /// Maps a stored version string to a version.
    pub fn from_version_str(version: &str) -> Option<Self> {
        match version {
            "1.0" => Some(Self::V1),
            "2.0" => Some(Self::V2),
            "3.0" => Some(Self::V3),
            _ => None,
        }
    }

    /// Name of the field holding the body.
    pub(crate) fn body_field(&self) -> &'static str {
        match self {
            Self::V1 | Self::V2 => "schema",
            Self::V3 => "schemaText",
        }
    }
}

impl fmt::Display for SerializationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current (3.0) document, borrowed for writing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CurrentDocument<'a> {
    pub id: &'a str,
    pub serialization_version: &'static str,
    pub labels: &'a LocalizedTermMap,
    pub descriptions: &'a LocalizedTermMap,
    pub aliases: &'a AliasGroupMap,
    pub schema_text: &'a str,
    #[serde(rename = "type")]
    pub schema_type: &'static str,
}

/// 3.0 document as read back.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredV3 {
    pub id: SchemaId,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub labels: LocalizedTermMap,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub descriptions: LocalizedTermMap,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub aliases: AliasGroupMap,
    #[serde(default)]
    pub schema_text: String,
}

/// 2.0 document.
#[derive(Debug, Deserialize)]
pub(crate) struct StoredV2 {
    pub id: SchemaId,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub labels: LocalizedTermMap,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub descriptions: LocalizedTermMap,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub aliases: AliasGroupMap,
    #[serde(default)]
    pub schema: String,
}

/// A term of the 1.0 layout. Its `language` key repeats the map key and is
/// skipped.
#[derive(Debug, Deserialize)]
pub(crate) struct StoredTerm {
    pub value: String,
}

/// Original, unversioned document.
#[derive(Debug, Deserialize)]
pub(crate) struct StoredV1 {
    pub id: SchemaId,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub labels: BTreeMap<String, StoredTerm>,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub descriptions: BTreeMap<String, StoredTerm>,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub aliases: BTreeMap<String, Vec<StoredTerm>>,
    #[serde(default)]
    pub schema: String,
}

/// Accepts a JSON object, or an empty array standing for an empty object.
fn map_or_empty_list<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MapOrList<T> {
        Map(BTreeMap<String, T>),
        List(Vec<IgnoredAny>),
    }

    match MapOrList::deserialize(deserializer)? {
        MapOrList::Map(map) => Ok(map),
        MapOrList::List(list) if list.is_empty() => Ok(BTreeMap::new()),
        MapOrList::List(_) => Err(D::Error::custom(
            "expected an object keyed by language code",
        )),
    }
}

//! Schema type definitions.
//!
//! This module defines the canonical in-memory model every other component
//! works on. Whatever serialization version a stored schema was written
//! with, it is reconstructed into a [`CanonicalSchema`] before it is diffed,
//! patched or re-encoded.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::ValidationError;

/// Type marker written into every persisted schema.
pub const SCHEMA_TYPE_SHEXC: &str = "ShExC";

/// Language code → single term (labels, descriptions).
pub type LocalizedTermMap = BTreeMap<String, String>;

/// Language code → ordered, duplicate-free aliases.
pub type AliasGroupMap = BTreeMap<String, Vec<String>>;

static SCHEMA_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^O[1-9][0-9]*$").expect("static regex must compile"));

/// Returned when a string does not match the schema id pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid schema id: {0:?}")]
pub struct InvalidSchemaId(pub String);

/// Identifier of a schema, e.g. `O123`.
///
/// Only obtainable through [`SchemaId::new`], so holding one means the
/// pattern was checked.
///
/// # Examples
///
/// ```
/// use entity_schema_core::SchemaId;
///
/// let id = SchemaId::new("O123").unwrap();
/// assert_eq!(id.as_str(), "O123");
///
/// assert!(SchemaId::new("Q123").is_err());
/// assert!(SchemaId::new("O0123").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaId(String);

impl SchemaId {
    /// Validates `id` and wraps it.
    pub fn new(id: &str) -> Result<Self, InvalidSchemaId> {
        if SCHEMA_ID_RE.is_match(id) {
            Ok(Self(id.to_string()))
        } else {
            Err(InvalidSchemaId(id.to_string()))
        }
    }

    /// Returns the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SchemaId {
    type Error = InvalidSchemaId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<SchemaId> for String {
    fn from(id: SchemaId) -> Self {
        id.0
    }
}

impl AsRef<str> for SchemaId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint and body of a schema, without its id.
///
/// Produced by [`validate_input`](crate::validate_input) and consumed by
/// [`normalize`](crate::normalize).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFields {
    /// Labels keyed by language code.
    #[serde(default)]
    pub labels: LocalizedTermMap,
    /// Descriptions keyed by language code.
    #[serde(default)]
    pub descriptions: LocalizedTermMap,
    /// Alias groups keyed by language code.
    #[serde(default)]
    pub aliases: AliasGroupMap,
    /// Schema body (ShExC text).
    #[serde(default, rename = "schemaText")]
    pub body: String,
}

/// Reconciled in-memory form of a schema.
///
/// This is the unit the differ and patcher operate on.
///
/// # Examples
///
/// ```
/// use entity_schema_core::{CanonicalSchema, SchemaId};
///
/// let schema = CanonicalSchema::new(SchemaId::new("O1").unwrap())
///     .with_label("en", "Cat")
///     .with_aliases("en", ["kitty", "feline"])
///     .with_body("<cat> {}");
///
/// assert_eq!(schema.labels["en"], "Cat");
/// assert_eq!(schema.aliases["en"], vec!["kitty", "feline"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalSchema {
    /// Schema identifier.
    pub id: SchemaId,
    /// Labels keyed by language code.
    pub labels: LocalizedTermMap,
    /// Descriptions keyed by language code.
    pub descriptions: LocalizedTermMap,
    /// Alias groups keyed by language code.
    pub aliases: AliasGroupMap,
    /// Schema body (ShExC text).
    pub body: String,
}

impl CanonicalSchema {
    /// Creates an empty schema with the given id.
    pub fn new(id: SchemaId) -> Self {
        Self::from_fields(id, SchemaFields::default())
    }

    /// Combines an id with already validated fields.
    pub fn from_fields(id: SchemaId, fields: SchemaFields) -> Self {
        Self {
            id,
            labels: fields.labels,
            descriptions: fields.descriptions,
            aliases: fields.aliases,
            body: fields.body,
        }
    }

    /// Splits off the id, returning the remaining fields.
    pub fn into_fields(self) -> (SchemaId, SchemaFields) {
        (
            self.id,
            SchemaFields {
                labels: self.labels,
                descriptions: self.descriptions,
                aliases: self.aliases,
                body: self.body,
            },
        )
    }

    /// Sets a label.
    pub fn with_label(mut self, language: &str, label: &str) -> Self {
        self.labels.insert(language.to_string(), label.to_string());
        self
    }

    /// Sets a description.
    pub fn with_description(mut self, language: &str, description: &str) -> Self {
        self.descriptions
            .insert(language.to_string(), description.to_string());
        self
    }

    /// Sets an alias group.
    pub fn with_aliases<I, S>(mut self, language: &str, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.insert(
            language.to_string(),
            aliases.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Sets the body text.
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }
}

/// Caller-supplied schema content before any shape checks.
///
/// Values are kept as raw JSON so that validation can reject wrongly typed
/// input (a number as a label, an object as an alias group) instead of
/// having it silently coerced. A top-level `labels`, `descriptions` or
/// `aliases` may be `[]` for an empty map; any other non-object value is an
/// [`InvalidShape`](ValidationError::InvalidShape).
///
/// # Examples
///
/// ```
/// use entity_schema_core::SchemaInput;
///
/// let input: SchemaInput = serde_json::from_str(
///     r#"{"labels": {"en": "Cat"}, "aliases": {"en": ["kitty"]}, "schemaText": "<a> {}"}"#,
/// ).unwrap();
/// assert_eq!(input.labels.len(), 1);
/// assert!(input.descriptions.is_empty());
///
/// let empty: SchemaInput = serde_json::from_str(r#"{"aliases": []}"#).unwrap();
/// assert!(empty.aliases.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct SchemaInput {
    /// Labels keyed by language code.
    pub labels: Map<String, Value>,
    /// Descriptions keyed by language code.
    pub descriptions: Map<String, Value>,
    /// Alias groups keyed by language code.
    pub aliases: Map<String, Value>,
    /// Schema body.
    #[serde(rename = "schemaText")]
    pub body: Value,
}

fn empty_string_value() -> Value {
    Value::String(String::new())
}

impl Default for SchemaInput {
    fn default() -> Self {
        Self {
            labels: Map::new(),
            descriptions: Map::new(),
            aliases: Map::new(),
            body: empty_string_value(),
        }
    }
}

impl TryFrom<Value> for SchemaInput {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut document) = value else {
            return Err(ValidationError::InvalidShape(
                "fields document must be an object".to_string(),
            ));
        };
        Ok(Self {
            labels: take_language_map(&mut document, "labels")?,
            descriptions: take_language_map(&mut document, "descriptions")?,
            aliases: take_language_map(&mut document, "aliases")?,
            body: document
                .remove("schemaText")
                .unwrap_or_else(empty_string_value),
        })
    }
}

fn take_language_map(
    document: &mut Map<String, Value>,
    field: &str,
) -> Result<Map<String, Value>, ValidationError> {
    match document.remove(field) {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(Value::Array(items)) if items.is_empty() => Ok(Map::new()),
        Some(_) => Err(ValidationError::InvalidShape(format!(
            "{field} must be an object keyed by language code"
        ))),
    }
}

impl From<&SchemaFields> for SchemaInput {
    fn from(fields: &SchemaFields) -> Self {
        let terms = |map: &LocalizedTermMap| {
            map.iter()
                .map(|(lang, term)| (lang.clone(), Value::String(term.clone())))
                .collect()
        };
        Self {
            labels: terms(&fields.labels),
            descriptions: terms(&fields.descriptions),
            aliases: fields
                .aliases
                .iter()
                .map(|(lang, group)| {
                    let values = group.iter().cloned().map(Value::String).collect();
                    (lang.clone(), Value::Array(values))
                })
                .collect(),
            body: Value::String(fields.body.clone()),
        }
    }
}

impl From<&CanonicalSchema> for SchemaInput {
    fn from(schema: &CanonicalSchema) -> Self {
        let (_, fields) = schema.clone().into_fields();
        Self::from(&fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_id_accepts_prefix_and_digits() {
        assert!(SchemaId::new("O1").is_ok());
        assert!(SchemaId::new("O987654").is_ok());
    }

    #[test]
    fn test_schema_id_rejects_bad_input() {
        for bad in ["", "O", "O0", "o12", "O12a", " O12", "E12"] {
            assert_eq!(
                SchemaId::new(bad),
                Err(InvalidSchemaId(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_schema_id_deserialization_validates() {
        let ok: SchemaId = serde_json::from_str("\"O5\"").unwrap();
        assert_eq!(ok.to_string(), "O5");
        assert!(serde_json::from_str::<SchemaId>("\"X5\"").is_err());
    }

    #[test]
    fn test_input_from_fields_preserves_values() {
        let mut fields = SchemaFields::default();
        fields.labels.insert("en".into(), "Cat".into());
        fields
            .aliases
            .insert("de".into(), vec!["Katze".into(), "Mieze".into()]);
        fields.body = "body".into();

        let input = SchemaInput::from(&fields);
        assert_eq!(input.labels["en"], Value::String("Cat".into()));
        assert_eq!(
            input.aliases["de"],
            serde_json::json!(["Katze", "Mieze"])
        );
        assert_eq!(input.body, Value::String("body".into()));
    }

    #[test]
    fn test_input_reads_empty_list_as_empty_map() {
        let input = SchemaInput::try_from(serde_json::json!({
            "labels": {"en": "Cat"},
            "aliases": [],
            "descriptions": []
        }))
        .unwrap();
        assert_eq!(input.labels.len(), 1);
        assert!(input.aliases.is_empty());
        assert!(input.descriptions.is_empty());
        assert_eq!(input.body, Value::String(String::new()));
    }

    #[test]
    fn test_input_rejects_non_object_term_maps() {
        assert_eq!(
            SchemaInput::try_from(serde_json::json!({"labels": "x"})),
            Err(ValidationError::InvalidShape(
                "labels must be an object keyed by language code".to_string()
            ))
        );
        assert!(matches!(
            SchemaInput::try_from(serde_json::json!({"aliases": ["kitty"]})),
            Err(ValidationError::InvalidShape(_))
        ));
        assert!(matches!(
            SchemaInput::try_from(serde_json::json!(["labels"])),
            Err(ValidationError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_into_fields_roundtrip() {
        let schema = CanonicalSchema::new(SchemaId::new("O2").unwrap())
            .with_label("en", "a")
            .with_description("en", "b")
            .with_body("c");
        let (id, fields) = schema.clone().into_fields();
        assert_eq!(CanonicalSchema::from_fields(id, fields), schema);
    }
}

//! Reading persisted schemas of any serialization version.
//!
//! Every supported version has its own parse function producing a
//! [`CanonicalSchema`]; nothing version-specific leaves this module.

use std::collections::BTreeMap;

use entity_schema_core::{AliasGroupMap, CanonicalSchema, LocalizedTermMap, SchemaId};
use serde_json::{Map, Value};

use crate::error::CodecError;
use crate::format::{SerializationVersion, StoredTerm, StoredV1, StoredV2, StoredV3, VERSION_FIELD};

type Result<T> = std::result::Result<T, CodecError>;

/// Parses persisted text of any supported version into canonical form.
///
/// # Errors
///
/// Fails with a [`CodecError`] (all of which read as malformed persisted
/// data) when the text is not a JSON object, names an unknown version, or
/// has a missing/invalid id or wrongly typed fields.
///
/// # Examples
///
/// ```
/// use entity_schema_codec::parse;
///
/// let v2 = r#"{"id":"O3","serializationVersion":"2.0","labels":{"en":"Cat"},"schema":"<cat> {}"}"#;
/// let schema = parse(v2).unwrap();
/// assert_eq!(schema.labels["en"], "Cat");
/// assert_eq!(schema.body, "<cat> {}");
/// assert!(schema.aliases.is_empty());
/// ```
pub fn parse(text: &str) -> Result<CanonicalSchema> {
    let document = parse_object(text)?;
    let version = version_of(&document)?;
    tracing::debug!(%version, "parsing persisted schema");

    let value = Value::Object(document);
    match version {
        SerializationVersion::V1 => parse_v1(value),
        SerializationVersion::V2 => parse_v2(value),
        SerializationVersion::V3 => parse_v3(value),
    }
}

/// Returns the serialization version of persisted text.
pub fn detect_version(text: &str) -> Result<SerializationVersion> {
    version_of(&parse_object(text)?)
}

/// Reads only the id.
pub fn get_id(text: &str) -> Result<SchemaId> {
    let document = parse_object(text)?;
    match document.get("id") {
        Some(Value::String(id)) => Ok(SchemaId::new(id)?),
        Some(_) => Err(malformed("id is not a string")),
        None => Err(malformed("missing id")),
    }
}

/// Reads only the body, from whichever field the stored version uses.
///
/// A missing body reads as empty.
pub fn get_body(text: &str) -> Result<String> {
    let document = parse_object(text)?;
    let field = version_of(&document)?.body_field();
    match document.get(field) {
        Some(Value::String(body)) => Ok(body.clone()),
        None => Ok(String::new()),
        Some(_) => Err(malformed(format!("{field} is not a string"))),
    }
}

fn parse_object(text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(document) => Ok(document),
        _ => Err(malformed("document is not a JSON object")),
    }
}

fn version_of(document: &Map<String, Value>) -> Result<SerializationVersion> {
    match document.get(VERSION_FIELD) {
        None => Ok(SerializationVersion::V1),
        Some(Value::String(version)) => SerializationVersion::from_version_str(version)
            .ok_or_else(|| CodecError::UnsupportedVersion(version.clone())),
        Some(other) => Err(CodecError::UnsupportedVersion(other.to_string())),
    }
}

fn parse_v1(value: Value) -> Result<CanonicalSchema> {
    let stored: StoredV1 = serde_json::from_value(value)?;
    let term_values = |terms: BTreeMap<String, StoredTerm>| -> LocalizedTermMap {
        terms
            .into_iter()
            .map(|(language, term)| (language, term.value))
            .collect()
    };
    let aliases: AliasGroupMap = stored
        .aliases
        .into_iter()
        .map(|(language, group)| {
            let values = group.into_iter().map(|term| term.value).collect();
            (language, values)
        })
        .collect();

    Ok(CanonicalSchema {
        id: stored.id,
        labels: term_values(stored.labels),
        descriptions: term_values(stored.descriptions),
        aliases,
        body: stored.schema,
    })
}

fn parse_v2(value: Value) -> Result<CanonicalSchema> {
    let stored: StoredV2 = serde_json::from_value(value)?;
    Ok(CanonicalSchema {
        id: stored.id,
        labels: stored.labels,
        descriptions: stored.descriptions,
        aliases: stored.aliases,
        body: stored.schema,
    })
}

fn parse_v3(value: Value) -> Result<CanonicalSchema> {
    let stored: StoredV3 = serde_json::from_value(value)?;
    Ok(CanonicalSchema {
        id: stored.id,
        labels: stored.labels,
        descriptions: stored.descriptions,
        aliases: stored.aliases,
        body: stored.schema_text,
    })
}

fn malformed(reason: impl Into<String>) -> CodecError {
    CodecError::MalformedPersistedData(reason.into())
}

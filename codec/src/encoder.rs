//! Writing schemas in the current persisted format.
//!
//! Input is validated before it is normalized, so that malformed values are
//! rejected instead of being trimmed into something that looks valid.

use entity_schema_core::{
    CanonicalSchema, LanguageCodeList, LanguageCodeValidator, SCHEMA_TYPE_SHEXC, SchemaFields,
    SchemaId, SchemaInput, SchemaLimits, normalize, validate_input,
};

use crate::config::SchemaConfig;
use crate::error::{CodecError, Result};
use crate::format::{CurrentDocument, SerializationVersion};

/// Validates, normalizes and serializes schemas.
///
/// # Examples
///
/// ```
/// use entity_schema_codec::SchemaEncoder;
/// use entity_schema_core::{SchemaId, SchemaInput};
///
/// let mut input = SchemaInput::default();
/// input.labels.insert("en".into(), "  Cat ".into());
/// input.aliases.insert("en".into(), serde_json::json!(["kitty", "kitty"]));
///
/// let text = SchemaEncoder::default()
///     .encode(&SchemaId::new("O1").unwrap(), &input)
///     .unwrap();
/// assert_eq!(
///     text,
///     r#"{"id":"O1","serializationVersion":"3.0","labels":{"en":"Cat"},"descriptions":{},"aliases":{"en":["kitty"]},"schemaText":"","type":"ShExC"}"#
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SchemaEncoder<L = LanguageCodeList> {
    limits: SchemaLimits,
    languages: L,
}

impl Default for SchemaEncoder {
    fn default() -> Self {
        Self::new(SchemaLimits::default(), LanguageCodeList::builtin())
    }
}

impl SchemaEncoder {
    /// Creates an encoder with the limits and language codes of `config`.
    pub fn from_config(config: &SchemaConfig) -> Self {
        Self::new(config.limits, config.language_codes())
    }
}

impl<L: LanguageCodeValidator> SchemaEncoder<L> {
    /// Creates an encoder with explicit limits and language oracle.
    pub fn new(limits: SchemaLimits, languages: L) -> Self {
        Self { limits, languages }
    }

    /// Limits this encoder validates against.
    pub fn limits(&self) -> &SchemaLimits {
        &self.limits
    }

    /// Validates and normalizes `input` without serializing it.
    ///
    /// # Errors
    ///
    /// Returns [`Validation`](crate::SchemaError::Validation) on the first
    /// failed check.
    pub fn prepare(&self, input: &SchemaInput) -> Result<SchemaFields> {
        let fields = validate_input(input, &self.limits, &self.languages)?;
        Ok(normalize(fields))
    }

    /// Validates, normalizes and serializes `input` as the current version.
    ///
    /// # Errors
    ///
    /// Returns [`Validation`](crate::SchemaError::Validation) if the input
    /// is rejected.
    pub fn encode(&self, id: &SchemaId, input: &SchemaInput) -> Result<String> {
        let fields = self.prepare(input)?;
        encode_schema(&CanonicalSchema::from_fields(id.clone(), fields))
    }

    /// Re-encodes an existing schema, running it through validation and
    /// normalization again.
    ///
    /// # Errors
    ///
    /// Returns [`Validation`](crate::SchemaError::Validation) if the schema
    /// no longer passes, e.g. under tighter limits.
    pub fn encode_validated(&self, schema: &CanonicalSchema) -> Result<String> {
        self.encode(&schema.id, &SchemaInput::from(schema))
    }
}

/// Serializes a schema as-is in the current version.
///
/// Used for schemas that are already canonical, such as the result of a
/// patch. Empty maps are written as `{}`.
///
/// # Errors
///
/// Returns [`Codec`](crate::SchemaError::Codec) if serialization fails.
pub fn encode_schema(schema: &CanonicalSchema) -> Result<String> {
    let document = CurrentDocument {
        id: schema.id.as_str(),
        serialization_version: SerializationVersion::CURRENT.as_str(),
        labels: &schema.labels,
        descriptions: &schema.descriptions,
        aliases: &schema.aliases,
        schema_text: &schema.body,
        schema_type: SCHEMA_TYPE_SHEXC,
    };
    let text = serde_json::to_string(&document).map_err(CodecError::from)?;
    tracing::debug!(
        schema = %schema.id,
        version = %SerializationVersion::CURRENT,
        bytes = text.len(),
        "encoded schema"
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use entity_schema_core::ValidationError;
    use serde_json::json;

    use super::*;
    use crate::SchemaError;

    fn id() -> SchemaId {
        SchemaId::new("O5").unwrap()
    }

    fn input(value: serde_json::Value) -> SchemaInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_encode_writes_current_layout_in_field_order() {
        let text = SchemaEncoder::default()
            .encode(
                &id(),
                &input(json!({
                    "labels": {"en": "Cat", "de": "Katze"},
                    "descriptions": {"en": "a feline"},
                    "aliases": {"en": ["kitty"]},
                    "schemaText": "<cat> {}\n"
                })),
            )
            .unwrap();
        assert_eq!(
            text,
            r#"{"id":"O5","serializationVersion":"3.0","labels":{"de":"Katze","en":"Cat"},"descriptions":{"en":"a feline"},"aliases":{"en":["kitty"]},"schemaText":"<cat> {}","type":"ShExC"}"#
        );
    }

    #[test]
    fn test_encode_empty_input_writes_empty_objects() {
        let text = SchemaEncoder::default()
            .encode(&id(), &SchemaInput::default())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["labels"], json!({}));
        assert_eq!(value["descriptions"], json!({}));
        assert_eq!(value["aliases"], json!({}));
        assert_eq!(value["schemaText"], "");
    }

    #[test]
    fn test_encode_drops_blank_terms() {
        let text = SchemaEncoder::default()
            .encode(
                &id(),
                &input(json!({
                    "labels": {"en": " \u{200B} ", "de": "Katze"},
                    "aliases": {"en": ["  ", ""], "de": [" Mieze", "Mieze "]}
                })),
            )
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["labels"], json!({"de": "Katze"}));
        assert_eq!(value["aliases"], json!({"de": ["Mieze"]}));
    }

    #[test]
    fn test_validation_runs_before_normalization() {
        let encoder = SchemaEncoder::new(
            SchemaLimits {
                max_identifying_info_chars: 3,
                max_schema_text_bytes: 100,
            },
            LanguageCodeList::builtin(),
        );
        // would fit after trimming, but not before
        let err = encoder
            .encode(&id(), &input(json!({"labels": {"en": "  Cat  "}})))
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Validation(ValidationError::IdentifyingInfoTooLong { max: 3 })
        ));
    }

    #[test]
    fn test_encoder_uses_closure_oracle() {
        let encoder = SchemaEncoder::new(SchemaLimits::default(), |code: &str| code == "tlh");
        assert!(
            encoder
                .encode(&id(), &input(json!({"labels": {"tlh": "vIghro'"}})))
                .is_ok()
        );
        let err = encoder
            .encode(&id(), &input(json!({"labels": {"en": "Cat"}})))
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Validation(ValidationError::InvalidLanguageCode(code)) if code == "en"
        ));
    }

    #[test]
    fn test_encoder_from_config_applies_limits() {
        let mut config = SchemaConfig::default();
        config.limits.max_schema_text_bytes = 4;
        let encoder = SchemaEncoder::from_config(&config);
        assert_eq!(encoder.limits().max_schema_text_bytes, 4);

        let err = encoder
            .encode(&id(), &input(json!({"schemaText": "12345"})))
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Validation(ValidationError::SchemaTextTooLong { max: 4 })
        ));
    }

    #[test]
    fn test_encode_validated_rechecks_schema() {
        let schema = CanonicalSchema::new(id()).with_label("xx-bogus", "Cat");
        assert!(encode_schema(&schema).is_ok());
        assert!(SchemaEncoder::default().encode_validated(&schema).is_err());
    }
}

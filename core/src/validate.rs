//! Input validation and normalization.
//!
//! [`validate_input`] checks caller-supplied content for bad language
//! codes, wrong shapes and length limits. [`normalize`] then trims and
//! deduplicates the validated fields. The order matters: validation always
//! sees the raw input, so a value that only looks acceptable after cleanup
//! (an all-whitespace label, say) is judged as submitted.
//!
//! # Examples
//!
//! ```
//! use entity_schema_core::*;
//!
//! let input: SchemaInput = serde_json::from_str(
//!     r#"{"labels": {"en": "  Cat "}, "aliases": {"en": ["a", "a", " "]}}"#,
//! ).unwrap();
//!
//! let fields = validate_input(&input, &SchemaLimits::default(), &LanguageCodeList::builtin())
//!     .unwrap();
//! let fields = normalize(fields);
//! assert_eq!(fields.labels["en"], "Cat");
//! assert_eq!(fields.aliases["en"], vec!["a"]);
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{AliasGroupMap, LanguageCodeValidator, LocalizedTermMap, SchemaFields, SchemaInput};

/// Default maximum length, in characters, of a label, description or alias
/// group.
pub const DEFAULT_MAX_IDENTIFYING_INFO_CHARS: usize = 250;

/// Default maximum size, in bytes, of the schema body.
pub const DEFAULT_MAX_SCHEMA_TEXT_BYTES: usize = 50_000;

static TRIM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{Z}\p{Cc}\p{Cf}]+|[\p{Z}\p{Cc}\p{Cf}]+$").expect("static regex must compile")
});

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A labels/descriptions/aliases key is not a supported language code.
    #[error("invalid language code: {0}")]
    InvalidLanguageCode(String),
    /// A value has the wrong JSON type.
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    /// A label, description or alias group exceeds the character limit.
    #[error("identifying information is longer than the allowed max of {max} characters")]
    IdentifyingInfoTooLong {
        /// Configured limit.
        max: usize,
    },
    /// The schema body exceeds the byte limit.
    #[error("schema text is longer than the allowed max of {max} bytes")]
    SchemaTextTooLong {
        /// Configured limit.
        max: usize,
    },
}

/// Length limits applied by [`validate_input`].
///
/// # Examples
///
/// ```
/// use entity_schema_core::SchemaLimits;
///
/// let limits = SchemaLimits::default();
/// assert_eq!(limits.max_identifying_info_chars, 250);
/// assert_eq!(limits.max_schema_text_bytes, 50_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaLimits {
    /// Maximum characters of a label, a description, or the concatenation of
    /// one alias group.
    pub max_identifying_info_chars: usize,
    /// Maximum bytes of the schema body.
    pub max_schema_text_bytes: usize,
}

impl Default for SchemaLimits {
    fn default() -> Self {
        Self {
            max_identifying_info_chars: DEFAULT_MAX_IDENTIFYING_INFO_CHARS,
            max_schema_text_bytes: DEFAULT_MAX_SCHEMA_TEXT_BYTES,
        }
    }
}

/// Validates raw schema input and returns it as typed fields.
///
/// Checks run in a fixed order and stop at the first failure: language
/// codes, value shapes, identifying-info lengths, body size. The returned
/// fields are not yet normalized.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
///
/// # Examples
///
/// ```
/// use entity_schema_core::*;
///
/// let mut input = SchemaInput::default();
/// input.labels.insert("xx-bogus".into(), "Cat".into());
///
/// let err = validate_input(&input, &SchemaLimits::default(), &LanguageCodeList::builtin())
///     .unwrap_err();
/// assert_eq!(err, ValidationError::InvalidLanguageCode("xx-bogus".into()));
/// ```
pub fn validate_input(
    input: &SchemaInput,
    limits: &SchemaLimits,
    languages: &dyn LanguageCodeValidator,
) -> Result<SchemaFields, ValidationError> {
    validate_language_codes(input, languages)?;

    let labels = term_map(&input.labels, "label")?;
    let descriptions = term_map(&input.descriptions, "description")?;
    let aliases = alias_map(&input.aliases)?;
    let Value::String(body) = &input.body else {
        return Err(ValidationError::InvalidShape(
            "schema text must be a string".to_string(),
        ));
    };

    let too_long = |s: &str| s.chars().count() > limits.max_identifying_info_chars;
    if labels.values().any(|label| too_long(label))
        || descriptions.values().any(|description| too_long(description))
        || aliases.values().any(|group| too_long(&group.concat()))
    {
        return Err(ValidationError::IdentifyingInfoTooLong {
            max: limits.max_identifying_info_chars,
        });
    }

    if body.len() > limits.max_schema_text_bytes {
        return Err(ValidationError::SchemaTextTooLong {
            max: limits.max_schema_text_bytes,
        });
    }

    Ok(SchemaFields {
        labels,
        descriptions,
        aliases,
        body: body.clone(),
    })
}

fn validate_language_codes(
    input: &SchemaInput,
    languages: &dyn LanguageCodeValidator,
) -> Result<(), ValidationError> {
    let mut codes: Vec<&String> = input
        .labels
        .keys()
        .chain(input.descriptions.keys())
        .chain(input.aliases.keys())
        .collect();
    codes.sort();
    codes.dedup();

    match codes
        .into_iter()
        .find(|code| !languages.is_supported_language_code(code))
    {
        Some(code) => Err(ValidationError::InvalidLanguageCode(code.clone())),
        None => Ok(()),
    }
}

fn term_map(raw: &Map<String, Value>, kind: &str) -> Result<LocalizedTermMap, ValidationError> {
    raw.iter()
        .map(|(lang, value)| match value {
            Value::String(term) => Ok((lang.clone(), term.clone())),
            _ => Err(ValidationError::InvalidShape(format!(
                "{kind} for language {lang} must be a string"
            ))),
        })
        .collect()
}

fn alias_map(raw: &Map<String, Value>) -> Result<AliasGroupMap, ValidationError> {
    let mut aliases = AliasGroupMap::new();
    for (lang, value) in raw {
        let Value::Array(items) = value else {
            return Err(ValidationError::InvalidShape(format!(
                "aliases for language {lang} must be a list of strings"
            )));
        };
        let group = items
            .iter()
            .map(|item| match item {
                Value::String(alias) => Ok(alias.clone()),
                _ => Err(ValidationError::InvalidShape(format!(
                    "aliases for language {lang} must be a list of strings"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        aliases.insert(lang.clone(), group);
    }
    Ok(aliases)
}

/// Trims leading and trailing Unicode separator, control and format
/// characters.
///
/// # Examples
///
/// ```
/// use entity_schema_core::trim_term;
///
/// assert_eq!(trim_term("\u{200B} Cat\t\n"), "Cat");
/// assert_eq!(trim_term("a b"), "a b");
/// ```
pub fn trim_term(s: &str) -> String {
    TRIM_RE.replace_all(s, "").into_owned()
}

/// Cleans validated fields for storage.
///
/// Every term, alias and the body are trimmed; labels, descriptions and
/// aliases that end up empty are dropped; alias groups are deduplicated
/// (exact match, first occurrence kept) and dropped when empty.
/// Idempotent.
pub fn normalize(fields: SchemaFields) -> SchemaFields {
    let clean_terms = |terms: LocalizedTermMap| -> LocalizedTermMap {
        terms
            .into_iter()
            .map(|(lang, term)| (lang, trim_term(&term)))
            .filter(|(_, term)| !term.is_empty())
            .collect()
    };

    let aliases = fields
        .aliases
        .into_iter()
        .filter_map(|(lang, group)| {
            let group = dedup_aliases(group.iter().map(|alias| trim_term(alias)));
            (!group.is_empty()).then_some((lang, group))
        })
        .collect();

    SchemaFields {
        labels: clean_terms(fields.labels),
        descriptions: clean_terms(fields.descriptions),
        aliases,
        body: trim_term(&fields.body),
    }
}

/// Removes empty strings and repeats, keeping first occurrences in order.
pub(crate) fn dedup_aliases<I>(aliases: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    aliases
        .into_iter()
        .filter(|alias| !alias.is_empty() && seen.insert(alias.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::LanguageCodeList;

    fn input(value: serde_json::Value) -> SchemaInput {
        serde_json::from_value(value).unwrap()
    }

    fn check(input: &SchemaInput) -> Result<SchemaFields, ValidationError> {
        validate_input(input, &SchemaLimits::default(), &LanguageCodeList::builtin())
    }

    #[test]
    fn test_validate_accepts_valid_input() {
        let fields = check(&input(json!({
            "labels": {"en": "Cat"},
            "descriptions": {"de": "Katze"},
            "aliases": {"en": ["kitty"]},
            "schemaText": "<cat> {}",
        })))
        .unwrap();
        assert_eq!(fields.labels["en"], "Cat");
        assert_eq!(fields.descriptions["de"], "Katze");
        assert_eq!(fields.aliases["en"], vec!["kitty"]);
        assert_eq!(fields.body, "<cat> {}");
    }

    #[test]
    fn test_validate_rejects_unknown_language_in_any_map() {
        for map in ["labels", "descriptions"] {
            let err = check(&input(json!({ map: {"en": "ok", "xx-bogus": "x"} }))).unwrap_err();
            assert_eq!(err, ValidationError::InvalidLanguageCode("xx-bogus".into()));
        }
        let err = check(&input(json!({"aliases": {"xx-bogus": ["a"]}}))).unwrap_err();
        assert_eq!(err, ValidationError::InvalidLanguageCode("xx-bogus".into()));
    }

    #[test]
    fn test_language_codes_are_checked_before_shapes() {
        let err = check(&input(json!({"labels": {"xx-bogus": 5}}))).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidLanguageCode(_)));
    }

    #[test]
    fn test_validate_rejects_non_string_terms() {
        let err = check(&input(json!({"labels": {"en": 5}}))).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidShape(_)));
        let err = check(&input(json!({"descriptions": {"en": ["a"]}}))).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidShape(_)));
    }

    #[test]
    fn test_validate_rejects_associative_alias_group() {
        let err = check(&input(json!({"aliases": {"en": {"0": "a", "2": "b"}}}))).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidShape(_)));
    }

    #[test]
    fn test_validate_rejects_non_string_alias() {
        let err = check(&input(json!({"aliases": {"en": ["a", null]}}))).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidShape(_)));
    }

    #[test]
    fn test_validate_rejects_non_string_body() {
        let err = check(&input(json!({"schemaText": 42}))).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidShape(_)));
    }

    #[test]
    fn test_label_length_boundary() {
        let limits = SchemaLimits {
            max_identifying_info_chars: 5,
            max_schema_text_bytes: 100,
        };
        let languages = LanguageCodeList::builtin();

        let exact = input(json!({"labels": {"en": "ääääá"}}));
        assert!(validate_input(&exact, &limits, &languages).is_ok());

        let over = input(json!({"labels": {"en": "ääääáa"}}));
        assert_eq!(
            validate_input(&over, &limits, &languages),
            Err(ValidationError::IdentifyingInfoTooLong { max: 5 })
        );
    }

    #[test]
    fn test_alias_group_length_is_concatenated() {
        let limits = SchemaLimits {
            max_identifying_info_chars: 4,
            max_schema_text_bytes: 100,
        };
        let languages = LanguageCodeList::builtin();

        let fits = input(json!({"aliases": {"en": ["ab", "cd"]}}));
        assert!(validate_input(&fits, &limits, &languages).is_ok());

        let over = input(json!({"aliases": {"en": ["ab", "cd", "e"]}}));
        assert_eq!(
            validate_input(&over, &limits, &languages),
            Err(ValidationError::IdentifyingInfoTooLong { max: 4 })
        );
    }

    #[test]
    fn test_body_limit_counts_bytes() {
        let limits = SchemaLimits {
            max_identifying_info_chars: 10,
            max_schema_text_bytes: 4,
        };
        let languages = LanguageCodeList::builtin();

        assert!(validate_input(&input(json!({"schemaText": "ää"})), &limits, &languages).is_ok());
        assert_eq!(
            validate_input(&input(json!({"schemaText": "äää"})), &limits, &languages),
            Err(ValidationError::SchemaTextTooLong { max: 4 })
        );
    }

    #[test]
    fn test_length_checked_before_trimming() {
        let limits = SchemaLimits {
            max_identifying_info_chars: 3,
            max_schema_text_bytes: 100,
        };
        let padded = input(json!({"labels": {"en": "  ab  "}}));
        assert!(validate_input(&padded, &limits, &LanguageCodeList::builtin()).is_err());
    }

    #[test]
    fn test_trim_term_strips_unicode_categories() {
        assert_eq!(trim_term("\u{00A0}\u{2003}Cat\u{200E}\u{0007}"), "Cat");
        assert_eq!(trim_term("\u{FEFF}"), "");
        assert_eq!(trim_term("in ner"), "in ner");
    }

    #[test]
    fn test_normalize_drops_empty_terms_and_groups() {
        let mut fields = SchemaFields::default();
        fields.labels.insert("en".into(), "   ".into());
        fields.labels.insert("de".into(), " Katze ".into());
        fields.descriptions.insert("en".into(), "\t".into());
        fields.aliases.insert("en".into(), vec![" ".into(), "".into()]);
        fields
            .aliases
            .insert("de".into(), vec!["b".into(), " a".into(), "b ".into(), "a".into()]);
        fields.body = "\n<a> {}\n".into();

        let normalized = normalize(fields);
        assert_eq!(normalized.labels.len(), 1);
        assert_eq!(normalized.labels["de"], "Katze");
        assert!(normalized.descriptions.is_empty());
        assert!(!normalized.aliases.contains_key("en"));
        assert_eq!(normalized.aliases["de"], vec!["b", "a"]);
        assert_eq!(normalized.body, "<a> {}");
    }

    #[test]
    fn test_normalize_is_case_sensitive() {
        let mut fields = SchemaFields::default();
        fields
            .aliases
            .insert("en".into(), vec!["Cat".into(), "cat".into()]);
        assert_eq!(normalize(fields).aliases["en"], vec!["Cat", "cat"]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut fields = SchemaFields::default();
        fields.labels.insert("en".into(), " \u{200B}x ".into());
        fields
            .aliases
            .insert("en".into(), vec!["a ".into(), " a".into(), "\u{0}".into()]);
        fields.body = "  text\n".into();

        let once = normalize(fields);
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
    }
}

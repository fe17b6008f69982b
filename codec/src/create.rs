//! Building a brand-new schema from a single-language request.

use entity_schema_core::{LanguageCodeValidator, SchemaId, SchemaInput};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::encoder::SchemaEncoder;
use crate::error::Result;

/// Content submitted when creating a schema: one language's terms plus the
/// body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSchemaRequest {
    /// Language of label, description and aliases.
    pub language: String,
    /// Label; empty for none.
    #[serde(default)]
    pub label: String,
    /// Description; empty for none.
    #[serde(default)]
    pub description: String,
    /// Aliases in submission order.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Schema body.
    #[serde(default)]
    pub body: String,
}

impl NewSchemaRequest {
    /// Splits a `|`-separated alias field, trimming entries and dropping
    /// empty ones.
    ///
    /// ```
    /// use entity_schema_codec::NewSchemaRequest;
    ///
    /// assert_eq!(
    ///     NewSchemaRequest::split_alias_field(" kitty | |puss"),
    ///     vec!["kitty", "puss"]
    /// );
    /// ```
    pub fn split_alias_field(field: &str) -> Vec<String> {
        field
            .split('|')
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Converts the request into unvalidated schema input.
    ///
    /// Every field is carried over, even when empty, so that validation sees
    /// the submitted language code.
    pub fn to_input(&self) -> SchemaInput {
        let single = |value: Value| {
            let mut map = Map::new();
            map.insert(self.language.clone(), value);
            map
        };
        SchemaInput {
            labels: single(Value::String(self.label.clone())),
            descriptions: single(Value::String(self.description.clone())),
            aliases: single(Value::Array(
                self.aliases.iter().cloned().map(Value::String).collect(),
            )),
            body: Value::String(self.body.clone()),
        }
    }
}

/// Validates and encodes a new schema under the caller-allocated `id`.
///
/// # Errors
///
/// Returns [`Validation`](crate::SchemaError::Validation) if the request is
/// rejected, e.g. for an unsupported language code.
pub fn encode_new_schema<L: LanguageCodeValidator>(
    id: &SchemaId,
    request: &NewSchemaRequest,
    encoder: &SchemaEncoder<L>,
) -> Result<String> {
    tracing::debug!(schema = %id, language = %request.language, "creating schema");
    encoder.encode(id, &request.to_input())
}

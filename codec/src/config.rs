//! Schema store configuration.
//!
//! Holds the length limits and, optionally, the list of supported language
//! codes. Loaded from YAML and passed explicitly into encoding; nothing reads
//! it from global state.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! limits:
//!   max_identifying_info_chars: 250
//!   max_schema_text_bytes: 50000
//! language_codes:
//!   - en
//!   - de
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use entity_schema_core::{LanguageCodeList, SchemaLimits};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use entity_schema_codec::SchemaConfig;
///
/// let config: SchemaConfig = serde_yaml::from_str(r#"
/// version: "1.0"
/// limits:
///   max_identifying_info_chars: 100
///   max_schema_text_bytes: 2000
/// language_codes: [en, tlh]
/// "#).unwrap();
///
/// assert_eq!(config.limits.max_identifying_info_chars, 100);
/// let languages = config.language_codes();
/// assert_eq!(languages.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Validation limits.
    #[serde(default)]
    pub limits: SchemaLimits,
    /// Supported language codes; the built-in list when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_codes: Option<Vec<String>>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            limits: SchemaLimits::default(),
            language_codes: None,
        }
    }
}

impl SchemaConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::SchemaError::Io) if the file cannot be read, or
    /// [`Yaml`](crate::SchemaError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::SchemaError::Io) if the file cannot be written,
    /// or [`Yaml`](crate::SchemaError::Yaml) if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns the language code oracle this configuration describes.
    pub fn language_codes(&self) -> LanguageCodeList {
        match &self.language_codes {
            Some(codes) => LanguageCodeList::from_codes(codes.iter().cloned()),
            None => LanguageCodeList::builtin(),
        }
    }
}

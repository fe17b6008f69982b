//! Language code oracle.
//!
//! Validation never decides on its own which language codes exist; it asks a
//! [`LanguageCodeValidator`]. Hosts plug in their own list, tests usually
//! pass a closure.

use std::collections::BTreeSet;

/// Decides whether a language code may key a label, description or alias
/// group.
pub trait LanguageCodeValidator {
    /// Returns `true` if `code` is a supported language code.
    fn is_supported_language_code(&self, code: &str) -> bool;
}

impl<F> LanguageCodeValidator for F
where
    F: Fn(&str) -> bool,
{
    fn is_supported_language_code(&self, code: &str) -> bool {
        self(code)
    }
}

/// Codes accepted by [`LanguageCodeList::builtin`].
const BUILTIN_LANGUAGE_CODES: &[&str] = &[
    "ace", "af", "als", "am", "an", "ang", "ar", "arc", "arz", "as", "ast", "az", "ba", "bar",
    "be", "be-tarask", "bg", "bn", "bo", "br", "bs", "ca", "ce", "ceb", "ckb", "co", "cs", "cy",
    "da", "de", "de-at", "de-ch", "dsb", "el", "en", "en-ca", "en-gb", "eo", "es", "et", "eu",
    "fa", "fi", "fo", "fr", "fy", "ga", "gd", "gl", "gsw", "gu", "gv", "he", "hi", "hr", "hsb",
    "ht", "hu", "hy", "ia", "id", "ig", "is", "it", "ja", "jv", "ka", "kk", "km", "kn", "ko",
    "ku", "kw", "ky", "la", "lb", "li", "lt", "lv", "mg", "mi", "mk", "ml", "mn", "mr", "ms",
    "mt", "my", "nb", "nds", "ne", "nl", "nn", "oc", "or", "pa", "pl", "ps", "pt", "pt-br", "qu",
    "rm", "ro", "ru", "sa", "sc", "scn", "sco", "se", "sh", "si", "sk", "sl", "sq", "sr",
    "sr-ec", "sr-el", "sv", "sw", "ta", "te", "tg", "th", "tl", "tr", "tt", "ug", "uk", "ur",
    "uz", "vec", "vi", "wa", "yi", "yo", "yue", "zh", "zh-cn", "zh-hans", "zh-hant", "zh-hk",
    "zh-tw", "zu",
];

/// Explicit set of supported language codes.
///
/// # Examples
///
/// ```
/// use entity_schema_core::{LanguageCodeList, LanguageCodeValidator};
///
/// let builtin = LanguageCodeList::builtin();
/// assert!(builtin.is_supported_language_code("en"));
/// assert!(!builtin.is_supported_language_code("xx-bogus"));
///
/// let custom = LanguageCodeList::from_codes(["en", "tlh"]);
/// assert!(custom.is_supported_language_code("tlh"));
/// assert!(!custom.is_supported_language_code("de"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCodeList {
    codes: BTreeSet<String>,
}

impl LanguageCodeList {
    /// Builds a list from arbitrary codes.
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// A list of widely used codes, for hosts without their own registry.
    pub fn builtin() -> Self {
        Self::from_codes(BUILTIN_LANGUAGE_CODES.iter().copied())
    }

    /// Number of codes in the list.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns `true` if no code is accepted.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for LanguageCodeList {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LanguageCodeValidator for LanguageCodeList {
    fn is_supported_language_code(&self, code: &str) -> bool {
        self.codes.contains(code)
    }
}

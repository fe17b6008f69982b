//! Structural diff between two canonical schemas.
//!
//! [`diff_schemas`] compares labels and descriptions per language, delegates
//! alias groups to [`AliasGroupListPatcher::diff`], and compares bodies as
//! whole strings. Ids are never inspected; callers make sure both sides
//! describe the same schema.
//!
//! # Example
//!
//! ```
//! use entity_schema_core::*;
//!
//! let id = SchemaId::new("O1").unwrap();
//! let old = CanonicalSchema::new(id.clone()).with_label("en", "Cat");
//! let new = CanonicalSchema::new(id).with_label("en", "Dog").with_label("de", "Hund");
//!
//! let diff = diff_schemas(&old, &new);
//! assert_eq!(
//!     diff.labels["en"],
//!     TermDiffOp::Change { old: "Cat".into(), new: "Dog".into() },
//! );
//! assert_eq!(diff.labels["de"], TermDiffOp::Add { new: "Hund".into() });
//! assert!(diff.body.is_none());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AliasGroupListPatcher, CanonicalSchema, LocalizedTermMap};

/// Change to one language's label or description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TermDiffOp {
    /// The language had no term and now has one.
    Add {
        /// Value after the change.
        new: String,
    },
    /// The term changed.
    Change {
        /// Value the diff was computed against.
        old: String,
        /// Value after the change.
        new: String,
    },
    /// The term was removed.
    Remove {
        /// Value the diff was computed against.
        old: String,
    },
}

/// Change to one language's alias group.
///
/// Every variant can be read as an `old_values → new_values` pair; the
/// patcher works on the element-level removals and additions between the
/// two, never on whole-list replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ListDiffOp {
    /// The group did not exist.
    Add {
        /// Aliases of the new group.
        values: Vec<String>,
    },
    /// The group was removed entirely.
    Remove {
        /// Aliases of the removed group.
        values: Vec<String>,
    },
    /// The group changed.
    Change {
        /// Group the diff was computed against.
        old_values: Vec<String>,
        /// Group after the change.
        new_values: Vec<String>,
    },
}

impl ListDiffOp {
    /// Group the diff was computed against (empty for [`ListDiffOp::Add`]).
    pub fn old_values(&self) -> &[String] {
        match self {
            Self::Add { .. } => &[],
            Self::Remove { values } => values,
            Self::Change { old_values, .. } => old_values,
        }
    }

    /// Group after the change (empty for [`ListDiffOp::Remove`]).
    pub fn new_values(&self) -> &[String] {
        match self {
            Self::Add { values } => values,
            Self::Remove { .. } => &[],
            Self::Change { new_values, .. } => new_values,
        }
    }

    /// Elements present before and gone after.
    ///
    /// # Examples
    ///
    /// ```
    /// use entity_schema_core::ListDiffOp;
    ///
    /// let op = ListDiffOp::Change {
    ///     old_values: vec!["x".into(), "y".into()],
    ///     new_values: vec!["y".into(), "z".into()],
    /// };
    /// assert_eq!(op.removed(), vec!["x"]);
    /// assert_eq!(op.added(), vec!["z"]);
    /// ```
    pub fn removed(&self) -> Vec<&str> {
        let new = self.new_values();
        self.old_values()
            .iter()
            .filter(|value| !new.contains(value))
            .map(String::as_str)
            .collect()
    }

    /// Elements absent before and present after.
    pub fn added(&self) -> Vec<&str> {
        let old = self.old_values();
        self.new_values()
            .iter()
            .filter(|value| !old.contains(value))
            .map(String::as_str)
            .collect()
    }
}

/// Change to the schema body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TextDiffOp {
    /// The body was empty and now has text.
    Add {
        /// Body after the change.
        new: String,
    },
    /// The body changed.
    Change {
        /// Body the diff was computed against.
        old: String,
        /// Body after the change.
        new: String,
    },
    /// The body was emptied.
    Remove {
        /// Body the diff was computed against.
        old: String,
    },
}

impl TextDiffOp {
    /// Returns the `(old, new)` texts the op describes.
    pub fn texts(&self) -> (&str, &str) {
        match self {
            Self::Add { new } => ("", new.as_str()),
            Self::Change { old, new } => (old.as_str(), new.as_str()),
            Self::Remove { old } => (old.as_str(), ""),
        }
    }
}

/// Structural diff of two schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDiff {
    /// Label changes keyed by language.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, TermDiffOp>,
    /// Description changes keyed by language.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub descriptions: BTreeMap<String, TermDiffOp>,
    /// Alias group changes keyed by language.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, ListDiffOp>,
    /// Body change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<TextDiffOp>,
}

impl SchemaDiff {
    /// Returns `true` if the diff contains no operation.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
            && self.descriptions.is_empty()
            && self.aliases.is_empty()
            && self.body.is_none()
    }

    /// Number of operations in the diff.
    pub fn len(&self) -> usize {
        self.labels.len()
            + self.descriptions.len()
            + self.aliases.len()
            + usize::from(self.body.is_some())
    }
}

/// Computes the structural diff turning `old` into `new`.
pub fn diff_schemas(old: &CanonicalSchema, new: &CanonicalSchema) -> SchemaDiff {
    let aliases = old
        .aliases
        .keys()
        .chain(new.aliases.keys())
        .filter_map(|lang| {
            let from = old.aliases.get(lang).map(Vec::as_slice).unwrap_or_default();
            let to = new.aliases.get(lang).map(Vec::as_slice).unwrap_or_default();
            AliasGroupListPatcher::diff(from, to).map(|op| (lang.clone(), op))
        })
        .collect();

    let diff = SchemaDiff {
        labels: diff_terms(&old.labels, &new.labels),
        descriptions: diff_terms(&old.descriptions, &new.descriptions),
        aliases,
        body: diff_text(&old.body, &new.body),
    };
    tracing::debug!(schema = %old.id, operations = diff.len(), "computed schema diff");
    diff
}

/// Diffs two term maps over the union of their languages.
pub fn diff_terms(
    old: &LocalizedTermMap,
    new: &LocalizedTermMap,
) -> BTreeMap<String, TermDiffOp> {
    old.keys()
        .chain(new.keys())
        .filter_map(|lang| {
            let op = match (old.get(lang), new.get(lang)) {
                (None, Some(new)) => TermDiffOp::Add { new: new.clone() },
                (Some(old), None) => TermDiffOp::Remove { old: old.clone() },
                (Some(old), Some(new)) if old != new => TermDiffOp::Change {
                    old: old.clone(),
                    new: new.clone(),
                },
                _ => return None,
            };
            Some((lang.clone(), op))
        })
        .collect()
}

/// Diffs two bodies; empty text counts as absent.
pub fn diff_text(old: &str, new: &str) -> Option<TextDiffOp> {
    match (old.is_empty(), new.is_empty()) {
        _ if old == new => None,
        (true, false) => Some(TextDiffOp::Add {
            new: new.to_string(),
        }),
        (false, true) => Some(TextDiffOp::Remove {
            old: old.to_string(),
        }),
        _ => Some(TextDiffOp::Change {
            old: old.to_string(),
            new: new.to_string(),
        }),
    }
}

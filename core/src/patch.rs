//! Applying structural diffs.
//!
//! [`StructuralPatcher`] replays a [`SchemaDiff`] onto a base schema with
//! optimistic checks: every touched language must still hold the value the
//! diff was computed against. Languages the diff does not touch are copied
//! through, so edits to different languages never collide.
//!
//! The body is not patched here; see [`crate::TextMerger`].

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::{
    AliasConflictPolicy, AliasGroupListPatcher, CanonicalSchema, LocalizedTermMap, SchemaDiff,
    TermDiffOp,
};

/// Which term map a conflict was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermField {
    /// Labels.
    Label,
    /// Descriptions.
    Description,
}

impl fmt::Display for TermField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label => f.write_str("label"),
            Self::Description => f.write_str("description"),
        }
    }
}

/// Conflicts raised while patching a schema.
///
/// Every variant is a legitimate concurrent-edit conflict; callers report it
/// rather than guess a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// An add targets a language that already has a term.
    #[error("{field} for language {language} already exists")]
    TermAlreadyExists {
        /// Term map the conflict is in.
        field: TermField,
        /// Language code.
        language: String,
    },
    /// The base term no longer equals the value the diff was computed from.
    #[error("{field} for language {language} was modified")]
    TermWasModified {
        /// Term map the conflict is in.
        field: TermField,
        /// Language code.
        language: String,
    },
    /// An alias to remove is no longer in the base group.
    #[error("alias {element:?} for language {language} was already removed")]
    ElementAlreadyRemoved {
        /// Language code.
        language: String,
        /// Alias.
        element: String,
    },
    /// An alias to add is already in the base group.
    #[error("alias {element:?} for language {language} is already present")]
    ElementAlreadyPresent {
        /// Language code.
        language: String,
        /// Alias.
        element: String,
    },
    /// The body changed on both sides in overlapping regions.
    #[error("schema text could not be merged because it has been changed")]
    TextMergeConflict,
}

impl PatchError {
    /// Always `true`: every patch failure is a concurrent-edit conflict.
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::TermAlreadyExists { .. }
            | Self::TermWasModified { .. }
            | Self::ElementAlreadyRemoved { .. }
            | Self::ElementAlreadyPresent { .. }
            | Self::TextMergeConflict => true,
        }
    }

    /// Language the conflict is in, if it is tied to one.
    pub fn language(&self) -> Option<&str> {
        match self {
            Self::TermAlreadyExists { language, .. }
            | Self::TermWasModified { language, .. }
            | Self::ElementAlreadyRemoved { language, .. }
            | Self::ElementAlreadyPresent { language, .. } => Some(language),
            Self::TextMergeConflict => None,
        }
    }
}

/// Applies a [`SchemaDiff`] to a base schema.
///
/// # Examples
///
/// ```
/// use entity_schema_core::*;
///
/// let id = SchemaId::new("O1").unwrap();
/// let old = CanonicalSchema::new(id.clone()).with_label("en", "Cat");
/// let new = CanonicalSchema::new(id.clone()).with_label("en", "Kitten");
/// let diff = diff_schemas(&old, &new);
///
/// // someone added a German label in between
/// let base = old.clone().with_label("de", "Katze");
/// let patched = StructuralPatcher::default().patch(&base, &diff).unwrap();
/// assert_eq!(patched.labels["en"], "Kitten");
/// assert_eq!(patched.labels["de"], "Katze");
///
/// // but the English label itself moved on
/// let moved = old.with_label("en", "Tomcat");
/// let err = StructuralPatcher::default().patch(&moved, &diff).unwrap_err();
/// assert!(matches!(err, PatchError::TermWasModified { .. }));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralPatcher {
    aliases: AliasGroupListPatcher,
}

impl StructuralPatcher {
    /// Creates a patcher using `policy` for alias groups.
    pub fn new(policy: AliasConflictPolicy) -> Self {
        Self {
            aliases: AliasGroupListPatcher::new(policy),
        }
    }

    /// Patches labels, descriptions and aliases of `base`.
    ///
    /// The returned schema carries `base`'s id and body. Inputs are not
    /// modified.
    ///
    /// # Errors
    ///
    /// Returns the first conflict found; labels are checked before
    /// descriptions, descriptions before aliases.
    pub fn patch(
        &self,
        base: &CanonicalSchema,
        diff: &SchemaDiff,
    ) -> Result<CanonicalSchema, PatchError> {
        let labels = patch_terms(&base.labels, &diff.labels, TermField::Label)?;
        let descriptions =
            patch_terms(&base.descriptions, &diff.descriptions, TermField::Description)?;
        let aliases = self.aliases.patch_groups(&base.aliases, &diff.aliases)?;

        Ok(CanonicalSchema {
            id: base.id.clone(),
            labels,
            descriptions,
            aliases,
            body: base.body.clone(),
        })
    }
}

/// Applies per-language term ops to a term map.
pub fn patch_terms(
    base: &LocalizedTermMap,
    ops: &BTreeMap<String, TermDiffOp>,
    field: TermField,
) -> Result<LocalizedTermMap, PatchError> {
    let mut terms = base.clone();
    for (language, op) in ops {
        let current = terms.get(language).filter(|term| !term.is_empty());
        match op {
            TermDiffOp::Add { new } => {
                if current.is_some() {
                    return Err(PatchError::TermAlreadyExists {
                        field,
                        language: language.clone(),
                    });
                }
                terms.insert(language.clone(), new.clone());
            }
            TermDiffOp::Change { old, new } => {
                if current != Some(old) {
                    return Err(PatchError::TermWasModified {
                        field,
                        language: language.clone(),
                    });
                }
                terms.insert(language.clone(), new.clone());
            }
            TermDiffOp::Remove { old } => {
                if current.is_some_and(|term| term != old) {
                    return Err(PatchError::TermWasModified {
                        field,
                        language: language.clone(),
                    });
                }
                terms.remove(language);
            }
        }
    }
    Ok(terms)
}

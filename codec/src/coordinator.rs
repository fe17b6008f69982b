//! Diffing and patching persisted schema texts.
//!
//! The coordinator ties the dispatcher, the structural patcher and the text
//! merger together into the operations an undo or restore request needs.
//! Inputs are persisted texts of any version; outputs are canonical schemas
//! ready for [`encode_schema`](crate::encode_schema).

use entity_schema_core::{
    AliasConflictPolicy, CanonicalSchema, SchemaDiff, SchemaId, StructuralPatcher, TextMerger,
    diff_schemas,
};

use crate::dispatcher::{get_id, parse};
use crate::error::{Result, SchemaError};

/// Checks that all given texts carry the same id and returns it.
///
/// # Errors
///
/// Returns [`SchemaError::IdMismatch`] naming the first id and the first one
/// that differs, or a codec error if an id cannot be read.
pub fn require_same_id(first: &str, second: &str, base: Option<&str>) -> Result<SchemaId> {
    let expected = get_id(first)?;
    for text in std::iter::once(second).chain(base) {
        let found = get_id(text)?;
        if found != expected {
            return Err(SchemaError::IdMismatch { expected, found });
        }
    }
    Ok(expected)
}

/// Runs diff/patch/undo over persisted texts.
///
/// # Examples
///
/// ```
/// use entity_schema_codec::SchemaPatchCoordinator;
///
/// let v1 = r#"{"id":"O1","serializationVersion":"3.0","labels":{"en":"Cat"},"schemaText":""}"#;
/// let v2 = r#"{"id":"O1","serializationVersion":"3.0","labels":{"en":"Kitten"},"schemaText":""}"#;
/// let v3 = r#"{"id":"O1","serializationVersion":"3.0","labels":{"en":"Kitten","de":"Katze"},"schemaText":""}"#;
///
/// // undo the v1 -> v2 edit on top of v3
/// let undone = SchemaPatchCoordinator::default().undo(v2, v1, v3).unwrap();
/// assert_eq!(undone.labels["en"], "Cat");
/// assert_eq!(undone.labels["de"], "Katze");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaPatchCoordinator {
    patcher: StructuralPatcher,
}

impl SchemaPatchCoordinator {
    /// Creates a coordinator using `policy` for alias groups.
    pub fn new(policy: AliasConflictPolicy) -> Self {
        Self {
            patcher: StructuralPatcher::new(policy),
        }
    }

    /// Structural diff from `old_text` to `new_text`.
    ///
    /// # Errors
    ///
    /// Fails if either text cannot be parsed. Ids are not compared; see
    /// [`require_same_id`].
    pub fn diff(&self, old_text: &str, new_text: &str) -> Result<SchemaDiff> {
        let old = parse(old_text)?;
        let new = parse(new_text)?;
        Ok(diff_schemas(&old, &new))
    }

    /// Applies `diff` to the schema stored in `base_text`.
    ///
    /// The fingerprint is patched first; its conflicts win over a body
    /// conflict. The body is then merged line by line.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Patch`] on any conflict, or a codec error if
    /// `base_text` cannot be parsed.
    pub fn patch(&self, diff: &SchemaDiff, base_text: &str) -> Result<CanonicalSchema> {
        let base = parse(base_text)?;
        self.patch_schema(diff, &base)
    }

    /// Like [`patch`](Self::patch), on an already parsed base.
    pub fn patch_schema(
        &self,
        diff: &SchemaDiff,
        base: &CanonicalSchema,
    ) -> Result<CanonicalSchema> {
        let mut patched = self.patcher.patch(base, diff).inspect_err(|err| {
            tracing::warn!(schema = %base.id, error = %err, "structural patch conflict");
        })?;
        patched.body = TextMerger::merge_op(diff.body.as_ref(), &base.body).inspect_err(|_| {
            tracing::warn!(schema = %base.id, "schema text merge conflict");
        })?;
        tracing::debug!(schema = %base.id, operations = diff.len(), "patched schema");
        Ok(patched)
    }

    /// Reverts the edit `undo_from -> undo_to` on top of `base`.
    ///
    /// Typically `undo_from` is the revision being undone, `undo_to` its
    /// parent and `base` the latest revision.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::IdMismatch`] if the three texts describe
    /// different schemas, otherwise as [`patch`](Self::patch).
    pub fn undo(&self, undo_from: &str, undo_to: &str, base: &str) -> Result<CanonicalSchema> {
        let id = require_same_id(undo_from, undo_to, Some(base))?;
        let diff = self.diff(undo_from, undo_to)?;
        tracing::debug!(schema = %id, operations = diff.len(), "undoing edit");
        self.patch(&diff, base)
    }

    /// Returns the content of `target` for writing on top of `current`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::IdMismatch`] if the texts describe different
    /// schemas, or a codec error if `target` cannot be parsed.
    pub fn restore(&self, current: &str, target: &str) -> Result<CanonicalSchema> {
        let id = require_same_id(current, target, None)?;
        tracing::debug!(schema = %id, "restoring revision");
        Ok(parse(target)?)
    }
}

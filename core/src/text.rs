//! Three-way line merge of schema bodies.

use crate::{PatchError, TextDiffOp};

/// Merges body edits onto a base text.
pub struct TextMerger;

impl TextMerger {
    /// Replays the edit `old → new` onto `base`.
    ///
    /// Returns `base` untouched when `old == new`. Otherwise runs a line
    /// based three-way merge with `old` as the common ancestor; the merged
    /// text is trimmed of surrounding whitespace.
    ///
    /// # Errors
    ///
    /// [`PatchError::TextMergeConflict`] when `base` and `new` changed the
    /// same region differently.
    ///
    /// # Examples
    ///
    /// ```
    /// use entity_schema_core::{PatchError, TextMerger};
    ///
    /// assert_eq!(TextMerger::merge("A", "B", "A").unwrap(), "B");
    /// assert_eq!(TextMerger::merge("A", "B", "C"), Err(PatchError::TextMergeConflict));
    /// assert_eq!(TextMerger::merge("A", "A", " C "), Ok(" C ".to_string()));
    /// ```
    pub fn merge(old: &str, new: &str, base: &str) -> Result<String, PatchError> {
        if old == new {
            return Ok(base.to_string());
        }
        match diffy::merge(old, base, new) {
            Ok(merged) => Ok(merged.trim().to_string()),
            Err(_) => {
                tracing::debug!("schema text merge produced conflicts");
                Err(PatchError::TextMergeConflict)
            }
        }
    }

    /// Applies an optional body diff op to `base`.
    ///
    /// `None` leaves `base` as it is.
    pub fn merge_op(op: Option<&TextDiffOp>, base: &str) -> Result<String, PatchError> {
        match op {
            Some(op) => {
                let (old, new) = op.texts();
                Self::merge(old, new, base)
            }
            None => Ok(base.to_string()),
        }
    }
}

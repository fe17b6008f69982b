//! Diffing and patching of alias groups.
//!
//! Alias lists are diffed as `old → new` pairs and patched element by
//! element, so an alias added concurrently by someone else survives a patch
//! that only touched other aliases of the same language.
//!
//! # Example
//!
//! ```
//! use entity_schema_core::AliasGroupListPatcher;
//!
//! let op = AliasGroupListPatcher::diff(
//!     &["x".to_string(), "y".to_string()],
//!     &["y".to_string(), "z".to_string()],
//! )
//! .unwrap();
//!
//! // "w" was added by another edit in the meantime
//! let base = vec!["y".to_string(), "w".to_string()];
//! let patched = AliasGroupListPatcher::default().patch(&base, &op).unwrap();
//! assert_eq!(patched, vec!["y", "z", "w"]);
//! ```

use std::collections::{BTreeMap, HashSet};

use crate::{AliasGroupMap, ListDiffOp, PatchError};

/// How element-level collisions between a diff and its base are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AliasConflictPolicy {
    /// Re-adding a present alias or removing an absent one is a no-op.
    #[default]
    Lenient,
    /// Re-adding a present alias fails with
    /// [`PatchError::ElementAlreadyPresent`]; removing an absent one fails
    /// with [`PatchError::ElementAlreadyRemoved`].
    Strict,
}

/// Diffs and patches the alias list of one language.
#[derive(Debug, Clone, Copy, Default)]
pub struct AliasGroupListPatcher {
    policy: AliasConflictPolicy,
}

impl AliasGroupListPatcher {
    /// Creates a patcher with the given conflict policy.
    pub fn new(policy: AliasConflictPolicy) -> Self {
        Self { policy }
    }

    /// Diffs two alias lists.
    ///
    /// Returns `None` if the lists are equal.
    pub fn diff(old: &[String], new: &[String]) -> Option<ListDiffOp> {
        if old == new {
            return None;
        }
        let op = if old.is_empty() {
            ListDiffOp::Add {
                values: new.to_vec(),
            }
        } else if new.is_empty() {
            ListDiffOp::Remove {
                values: old.to_vec(),
            }
        } else {
            ListDiffOp::Change {
                old_values: old.to_vec(),
                new_values: new.to_vec(),
            }
        };
        Some(op)
    }

    /// Applies `op` to the alias list `base` of language `language`.
    ///
    /// Elements kept or added by the op come first, in the op's order;
    /// elements that only exist in `base` follow in base order. An element
    /// the op kept but `base` no longer has stays removed. An empty result
    /// means the group should be dropped.
    ///
    /// # Errors
    ///
    /// With [`AliasConflictPolicy::Strict`], fails on the first removal of
    /// an alias missing from `base` or addition of one already in it.
    pub fn patch_language(
        &self,
        language: &str,
        base: &[String],
        op: &ListDiffOp,
    ) -> Result<Vec<String>, PatchError> {
        let old = op.old_values();
        let removed = op.removed();
        let added = op.added();

        let base_set: HashSet<&str> = base.iter().map(String::as_str).collect();

        if self.policy == AliasConflictPolicy::Strict {
            if let Some(missing) = removed.iter().find(|alias| !base_set.contains(*alias)) {
                return Err(PatchError::ElementAlreadyRemoved {
                    language: language.to_string(),
                    element: missing.to_string(),
                });
            }
            if let Some(present) = added.iter().find(|alias| base_set.contains(*alias)) {
                return Err(PatchError::ElementAlreadyPresent {
                    language: language.to_string(),
                    element: present.to_string(),
                });
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut patched = Vec::with_capacity(base.len() + added.len());

        for alias in op.new_values() {
            let kept_by_base = base_set.contains(alias.as_str());
            let newly_added = !old.contains(alias);
            if (kept_by_base || newly_added) && seen.insert(alias) {
                patched.push(alias.clone());
            }
        }
        for alias in base {
            if !removed.contains(&alias.as_str()) && seen.insert(alias) {
                patched.push(alias.clone());
            }
        }

        Ok(patched)
    }

    /// Applies `op` to a list without naming the language in errors.
    pub fn patch(&self, base: &[String], op: &ListDiffOp) -> Result<Vec<String>, PatchError> {
        self.patch_language("", base, op)
    }

    /// Applies per-language alias diffs to a whole alias map.
    ///
    /// Languages without a diff pass through unchanged; groups that end up
    /// empty are dropped.
    pub fn patch_groups(
        &self,
        base: &AliasGroupMap,
        diffs: &BTreeMap<String, ListDiffOp>,
    ) -> Result<AliasGroupMap, PatchError> {
        let mut patched = base.clone();
        for (language, op) in diffs {
            let current = base.get(language).map(Vec::as_slice).unwrap_or_default();
            let group = self.patch_language(language, current, op)?;
            if group.is_empty() {
                patched.remove(language);
            } else {
                patched.insert(language.clone(), group);
            }
        }
        Ok(patched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_diff_equal_lists_is_none() {
        assert_eq!(AliasGroupListPatcher::diff(&list(&["a"]), &list(&["a"])), None);
        assert_eq!(AliasGroupListPatcher::diff(&[], &[]), None);
    }

    #[test]
    fn test_diff_variants() {
        assert_eq!(
            AliasGroupListPatcher::diff(&[], &list(&["a"])),
            Some(ListDiffOp::Add {
                values: list(&["a"])
            })
        );
        assert_eq!(
            AliasGroupListPatcher::diff(&list(&["a"]), &[]),
            Some(ListDiffOp::Remove {
                values: list(&["a"])
            })
        );
        assert_eq!(
            AliasGroupListPatcher::diff(&list(&["a"]), &list(&["b"])),
            Some(ListDiffOp::Change {
                old_values: list(&["a"]),
                new_values: list(&["b"])
            })
        );
    }

    #[test]
    fn test_patch_on_unchanged_base_yields_new_list() {
        let old = list(&["a", "b", "c"]);
        let new = list(&["c", "d", "a"]);
        let op = AliasGroupListPatcher::diff(&old, &new).unwrap();
        let patched = AliasGroupListPatcher::default().patch(&old, &op).unwrap();
        assert_eq!(patched, new);
    }

    #[test]
    fn test_concurrent_additions_merge() {
        let op = AliasGroupListPatcher::diff(&list(&["x", "y"]), &list(&["y", "z"])).unwrap();
        let patched = AliasGroupListPatcher::default()
            .patch(&list(&["y", "w"]), &op)
            .unwrap();
        assert_eq!(patched, list(&["y", "z", "w"]));
    }

    #[test]
    fn test_concurrent_removal_of_kept_alias_stays_removed() {
        let op = AliasGroupListPatcher::diff(&list(&["a", "b"]), &list(&["a", "b", "c"])).unwrap();
        let patched = AliasGroupListPatcher::default()
            .patch(&list(&["a"]), &op)
            .unwrap();
        assert_eq!(patched, list(&["a", "c"]));
    }

    #[test]
    fn test_lenient_readd_is_idempotent() {
        let op = ListDiffOp::Add {
            values: list(&["a"]),
        };
        let patched = AliasGroupListPatcher::default()
            .patch(&list(&["a", "b"]), &op)
            .unwrap();
        assert_eq!(patched, list(&["a", "b"]));
    }

    #[test]
    fn test_strict_rejects_missing_removal() {
        let op = ListDiffOp::Remove {
            values: list(&["a"]),
        };
        let err = AliasGroupListPatcher::new(AliasConflictPolicy::Strict)
            .patch_language("en", &list(&["b"]), &op)
            .unwrap_err();
        assert_eq!(
            err,
            PatchError::ElementAlreadyRemoved {
                language: "en".into(),
                element: "a".into()
            }
        );
    }

    #[test]
    fn test_strict_rejects_present_addition() {
        let op = ListDiffOp::Change {
            old_values: list(&["a"]),
            new_values: list(&["a", "b"]),
        };
        let err = AliasGroupListPatcher::new(AliasConflictPolicy::Strict)
            .patch_language("de", &list(&["a", "b"]), &op)
            .unwrap_err();
        assert_eq!(
            err,
            PatchError::ElementAlreadyPresent {
                language: "de".into(),
                element: "b".into()
            }
        );
    }

    #[test]
    fn test_patch_groups_drops_empty_and_passes_through_others() {
        let mut base = AliasGroupMap::new();
        base.insert("en".into(), list(&["a"]));
        base.insert("de".into(), list(&["b"]));

        let mut diffs = BTreeMap::new();
        diffs.insert(
            "en".to_string(),
            ListDiffOp::Remove {
                values: list(&["a"]),
            },
        );
        diffs.insert(
            "fr".to_string(),
            ListDiffOp::Add {
                values: list(&["c"]),
            },
        );

        let patched = AliasGroupListPatcher::default()
            .patch_groups(&base, &diffs)
            .unwrap();
        assert!(!patched.contains_key("en"));
        assert_eq!(patched["de"], list(&["b"]));
        assert_eq!(patched["fr"], list(&["c"]));
    }
}

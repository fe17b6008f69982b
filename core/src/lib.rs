//! Canonical entity schema model, validation, structural diff/patch and
//! text merge.
//!
//! This crate holds everything about entity schemas that does not depend on
//! how they are stored:
//!
//! - [`CanonicalSchema`]: id, labels, descriptions, aliases and body text in
//!   the single shape every other component works on.
//! - [`validate_input`] and [`normalize`]: reject malformed caller input,
//!   then trim and deduplicate it.
//! - [`diff_schemas`]: per-language structural diff of two schemas.
//! - [`StructuralPatcher`]: replays a [`SchemaDiff`] onto a base schema and
//!   reports concurrent-edit conflicts as [`PatchError`].
//! - [`AliasGroupListPatcher`]: element-level alias list diff/patch.
//! - [`TextMerger`]: three-way line merge of the body.
//!
//! Encoding to and parsing from the persisted text format lives in
//! `entity-schema-codec`.
//!
//! # Example
//!
//! ```
//! use entity_schema_core::*;
//!
//! let id = SchemaId::new("O42").unwrap();
//! let v1 = CanonicalSchema::new(id.clone())
//!     .with_label("en", "Cat")
//!     .with_body("<cat> {}");
//! let v2 = v1.clone().with_label("en", "House cat");
//!
//! let diff = diff_schemas(&v1, &v2);
//! let patched = StructuralPatcher::default().patch(&v1, &diff).unwrap();
//! assert_eq!(patched, v2);
//! ```

mod alias;
mod diff;
mod language;
mod patch;
mod text;
mod types;
mod validate;

pub use alias::{AliasConflictPolicy, AliasGroupListPatcher};
pub use diff::{
    ListDiffOp, SchemaDiff, TermDiffOp, TextDiffOp, diff_schemas, diff_terms, diff_text,
};
pub use language::{LanguageCodeList, LanguageCodeValidator};
pub use patch::{PatchError, StructuralPatcher, TermField, patch_terms};
pub use text::TextMerger;
pub use types::*;
pub use validate::{
    DEFAULT_MAX_IDENTIFYING_INFO_CHARS, DEFAULT_MAX_SCHEMA_TEXT_BYTES, SchemaLimits,
    ValidationError, normalize, trim_term, validate_input,
};

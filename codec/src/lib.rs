//! Persistent text format for entity schemas.
//!
//! This crate turns caller input into the stored text blob and back, and
//! runs structural diff/patch over stored texts:
//!
//! - [`SchemaEncoder`] validates, normalizes and writes the current
//!   serialization version (3.0).
//! - [`parse`] reads every version ever written into a
//!   [`CanonicalSchema`](entity_schema_core::CanonicalSchema).
//! - [`SchemaPatchCoordinator`] diffs two stored texts and patches a third,
//!   which is what undo and restore are built on. Their results are
//!   stored through [`SchemaEncoder::encode_validated`].
//! - [`SchemaConfig`] holds limits and language codes, loaded from YAML.
//!
//! # Quick start
//!
//! ```
//! use entity_schema_codec::{SchemaEncoder, SchemaPatchCoordinator, parse};
//! use entity_schema_core::{SchemaId, SchemaInput};
//!
//! let id = SchemaId::new("O7").unwrap();
//! let mut input = SchemaInput::default();
//! input.labels.insert("en".into(), "Cat".into());
//! let first = SchemaEncoder::default().encode(&id, &input).unwrap();
//!
//! input.labels.insert("en".into(), "Kitten".into());
//! let second = SchemaEncoder::default().encode(&id, &input).unwrap();
//!
//! // revert the rename on top of the latest revision
//! let reverted = SchemaPatchCoordinator::default()
//!     .undo(&second, &first, &second)
//!     .unwrap();
//! assert_eq!(reverted, parse(&first).unwrap());
//! let stored = SchemaEncoder::default().encode_validated(&reverted).unwrap();
//! assert_eq!(stored, first);
//! ```

mod config;
mod coordinator;
mod create;
mod dispatcher;
mod encoder;
mod error;
mod format;

pub use config::SchemaConfig;
pub use coordinator::{SchemaPatchCoordinator, require_same_id};
pub use create::{NewSchemaRequest, encode_new_schema};
pub use dispatcher::{detect_version, get_body, get_id, parse};
pub use encoder::{SchemaEncoder, encode_schema};
pub use error::{CodecError, Result, SchemaError};
pub use format::SerializationVersion;

//! Grade schemas and the batch form they drive.
//!
//! The [`GradeSchemaCache`] resolves which material grades exist and which
//! elements each grade exposes. The [`FormModel`] holds the batch form; two
//! field families (`<element>_raw` and `scrap_<element>`) follow the active
//! grade's element list, every other field is static.

pub mod envelope;
pub mod error;
pub mod fields;
pub mod form;
pub mod key;
pub mod schema_cache;

pub use error::{SchemaError, SchemaResult};
pub use form::{FormModel, SchemaChange};
pub use key::{ElementFamily, FieldKey, FieldValue};
pub use schema_cache::{GradeList, GradeSchema, GradeSchemaCache};

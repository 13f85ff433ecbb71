//! Clinical field codec for the passômetro handoff sheet.
//!
//! The note generator packs multi-part clinical information into single text fields. This crate
//! owns those micro-formats:
//! - tagged items (lab and blood-gas lines with keyword emphasis) and their highlighter
//! - the problem-list encoding (`"block | block"`, `"statement ~ sub-item"`)
//! - the list-field and problem-list edit transforms
//! - the fixed Condutas grid
//! - identification normalisation
//!
//! Everything here is a pure transform over in-memory values. Malformed input is normalised
//! silently; nothing in this crate returns an error. The record envelope and the edit state live in
//! `passometro-core`.

pub mod condutas;
pub mod field;
pub mod highlight;
pub mod identification;
pub mod list_field;
pub mod problems;
pub mod tagged_item;
pub mod wire;

pub use condutas::DirectiveGrid;
pub use field::{AppliedEdit, FieldKind, FieldValue, RenderedField};
pub use highlight::{HighlightRule, HighlightRules, Segment};
pub use identification::{Identification, IdentificationHeader};
pub use problems::{Collapsed, OrphanPolicy, ProblemBlock};
pub use tagged_item::TaggedItem;

pub use passometro_types::{NonEmptyText, StyleTag};

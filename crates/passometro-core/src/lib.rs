//! # Passômetro Core
//!
//! Record handling for the ICU shift-handoff sheet.
//!
//! This crate owns everything around the field codec:
//! - the structured note and handoff record envelope, and the sheet schema
//! - the entry board (raw input, generation lifecycle, publishing)
//! - the handoff view with its single edit selector
//! - JSON persistence keyed by view name
//! - the HTTP client for the external note service
//! - plain-text rendering of the sheet
//!
//! **No API concerns**: HTTP servers and DTOs belong in `api-rest` and `api-shared`.

pub mod config;
pub mod constants;
pub mod entry;
pub mod error;
pub mod generator;
pub mod record;
pub mod sheet;
pub mod store;
pub mod text;
pub mod view;

pub use config::CoreConfig;
pub use entry::{EntryBoard, EntryField, EntryPatient, EntryStatus};
pub use error::{HandoffError, HandoffResult};
pub use generator::{GenerationRequest, HttpNoteService, NoteGenerator, SheetBackend};
pub use record::{FieldKey, FieldSpec, HandoffRecord, StructuredNote, HANDOFF_SCHEMA};
pub use sheet::{EditSelector, EditTarget, HandoffView, RenderedSheet};
pub use store::JsonStore;
pub use text::TextRenderer;
pub use view::ViewMode;

pub use passometro_types::RecordId;

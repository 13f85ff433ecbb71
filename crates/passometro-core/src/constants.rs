//! Constants used throughout the passômetro core crate.

/// Store key of the entry board (raw clinical input per patient).
pub const ENTRY_STORE_KEY: &str = "pacientes-insercao";

/// Store key of the published handoff sheet.
pub const HANDOFF_STORE_KEY: &str = "pacientes-passometro";

/// Extension of store files under the data directory.
pub const STORE_FILE_EXTENSION: &str = "json";

/// Default directory for store files when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "passometro_data";

/// Default note-generation service.
pub const DEFAULT_BACKEND_URL: &str = "https://passometro-backend-1.onrender.com";

/// Path of the note-generation endpoint on the backend.
pub const GENERATE_PATH: &str = "/api/gerar-passometro";

/// Path of the sheet sync endpoint on the backend.
pub const SHEET_PATH: &str = "/api/passometro";

/// Default request timeout for the note service. Generation runs a language model upstream.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Query parameter that switches to the handoff view.
pub const HANDOFF_VIEW_PARAM: &str = "passometro";

/// Title of the rendered sheet.
pub const SHEET_TITLE: &str = "Passômetro UTI";

/// Shown when the sheet has no patients.
pub const EMPTY_SHEET_MESSAGE: &str = "Nenhum paciente encontrado.";

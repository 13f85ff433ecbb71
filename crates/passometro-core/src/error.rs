use crate::record::FieldKey;
use passometro_types::RecordId;

#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no patient with id {0}")]
    RecordNotFound(RecordId),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("field {0} cannot be edited on the handoff sheet")]
    FieldNotEditable(FieldKey),
    #[error("field {0} was given a value of the wrong shape")]
    FieldShapeMismatch(FieldKey),
    #[error("no edit in progress for {target} of patient {record_id}")]
    NotEditing { record_id: RecordId, target: String },

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write store file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read store file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize records: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize records: {0}")]
    Deserialization(serde_json::Error),

    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(reqwest::Error),
    #[error("cannot reach note service at {0}")]
    GeneratorConnection(String),
    #[error("note service request failed: {0}")]
    HttpClient(String),
    #[error("note service returned status {status}: {body}")]
    GeneratorStatus { status: u16, body: String },
    #[error("failed to parse note service response: {0}")]
    GeneratorResponse(String),
}

pub type HandoffResult<T> = std::result::Result<T, HandoffError>;

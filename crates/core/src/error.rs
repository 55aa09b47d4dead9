use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown compliance standard '{0}'")]
    UnknownStandard(String),
    #[error("unsupported file type '{content_type}'; allowed types: {allowed}")]
    UnsupportedMediaType {
        content_type: String,
        allowed: String,
    },
    #[error("file size {size} bytes exceeds the {limit_mb}MB limit")]
    PayloadTooLarge { size: usize, limit_mb: usize },
    #[error("record {0} not found")]
    RecordNotFound(Uuid),
    #[error("record {0} already exists")]
    DuplicateRecord(Uuid),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("record store lock poisoned")]
    StorePoisoned,
    #[error("failed to deserialize extraction payload: {0}")]
    Deserialization(serde_json::Error),
}

pub type VaultResult<T> = std::result::Result<T, VaultError>;

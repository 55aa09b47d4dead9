//! Constants used throughout the vault core crate.

/// Application name reported by `/health` and the OpenAPI document.
pub const APP_NAME: &str = "Personal Vault API";

/// Service version reported by `/health`.
pub const APP_VERSION: &str = "2.1.0";

/// Short description of the service.
pub const APP_DESCRIPTION: &str =
    "Medical Compliance Microservice - Upload Once, Standardize Many Times";

/// Human-readable description of the processing pipeline.
pub const PIPELINE_DESCRIPTION: &str = "Transcription → Translation → Standardization";

/// Default bind address for the REST server.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:8000";

/// Default directory for uploaded image storage.
pub const DEFAULT_DATA_DIR: &str = "vault_data";

/// Default OpenAI vision model.
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";

/// Default per-request timeout for the vision API, in seconds.
pub const DEFAULT_VISION_TIMEOUT_SECS: u64 = 60;

/// Default number of retries for transient vision API failures.
pub const DEFAULT_VISION_MAX_RETRIES: u32 = 2;

/// Simulated latency of the mock extractor, in milliseconds.
pub const MOCK_EXTRACTION_DELAY_MS: u64 = 2000;

/// Maximum accepted upload size in megabytes.
pub const MAX_FILE_SIZE_MB: usize = 10;

/// Content types accepted by the upload endpoint.
pub const ALLOWED_FILE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/jpg", "application/pdf"];

/// Maximum length of a caller-supplied session identifier.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Number of raw-text characters echoed back as evidence to agents.
pub const EVIDENCE_SNIPPET_CHARS: usize = 200;

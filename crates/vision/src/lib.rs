//! # Vault Vision
//!
//! Extraction adapter: turns an image of a vaccination record into an
//! [`ExtractionResult`] by asking a vision model to transcribe, translate and list the
//! vaccines it sees.
//!
//! The compliance rules never live here. This crate only produces the raw payload that
//! `vault-core` standardises.

pub mod mock;
pub mod openai;
pub mod prompts;
pub mod retry;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use vault_core::constants::MOCK_EXTRACTION_DELAY_MS;
use vault_core::{CoreConfig, ExtractionResult};

pub use mock::MockExtractor;
pub use openai::OpenAiExtractor;
pub use retry::RetryPolicy;

/// Errors returned by an extractor.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("OPENAI_API_KEY is not configured")]
    MissingApiKey,
    #[error("vision request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("vision API returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("vision API response had no message content")]
    EmptyResponse,
    #[error("vision API returned malformed extraction JSON: {0}")]
    MalformedResponse(serde_json::Error),
}

pub type VisionResult<T> = Result<T, VisionError>;

/// Anything that can read vaccine entries out of an image.
#[async_trait]
pub trait VisionExtractor: Send + Sync {
    /// Short name for logs, e.g. `"openai:gpt-4o"`.
    fn name(&self) -> String;

    /// Extract the payload for one image.
    async fn extract(&self, image: &[u8], mime_type: &str) -> VisionResult<ExtractionResult>;
}

/// Build the extractor selected by configuration.
///
/// Mock mode wins over a configured API key.
///
/// # Errors
///
/// Returns [`VisionError::MissingApiKey`] when mock mode is off and no key is configured,
/// or [`VisionError::Transport`] if the HTTP client cannot be built.
pub fn extractor_from_config(cfg: &CoreConfig) -> VisionResult<Arc<dyn VisionExtractor>> {
    let vision = cfg.vision();
    if vision.mock {
        tracing::info!("using mock vision extractor");
        return Ok(Arc::new(MockExtractor::with_delay(Duration::from_millis(
            MOCK_EXTRACTION_DELAY_MS,
        ))));
    }

    let api_key = vision.api_key.clone().ok_or(VisionError::MissingApiKey)?;
    let extractor = OpenAiExtractor::new(
        api_key,
        vision.model.clone(),
        vision.timeout,
        RetryPolicy::with_max_retries(vision.max_retries),
    )?;
    Ok(Arc::new(extractor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vault_core::{Environment, VisionSettings};

    fn cfg(vision: VisionSettings) -> CoreConfig {
        CoreConfig::new(PathBuf::from("unused"), vision, Environment::Development).unwrap()
    }

    #[test]
    fn mock_mode_selects_mock_extractor() {
        let extractor = extractor_from_config(&cfg(VisionSettings {
            mock: true,
            api_key: Some("sk-test".into()),
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(extractor.name(), "mock");
    }

    #[test]
    fn missing_key_is_an_error() {
        let result = extractor_from_config(&cfg(VisionSettings::default()));
        assert!(matches!(result, Err(VisionError::MissingApiKey)));
    }

    #[test]
    fn api_key_selects_openai() {
        let extractor = extractor_from_config(&cfg(VisionSettings {
            api_key: Some("sk-test".into()),
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(extractor.name(), "openai:gpt-4o");
    }
}

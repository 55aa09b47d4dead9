//! Agent-facing verification endpoint.
//!
//! One call does the whole pipeline for an image URL: download, extract, standardise. The
//! response is flat and errors carry a machine-readable code.

use crate::analytics::{log_event, AnalyticsEvent};
use crate::AppState;
use api_shared::{AgentComplianceRes, AgentErrorCode, AgentErrorRes, VerifyReq};
use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::json;
use vault_core::constants::MAX_FILE_SIZE_MB;
use vault_core::validation::validate_session_id;
use vault_core::{standardize_against, ComplianceStandard};

type AgentError = (StatusCode, Json<AgentErrorRes>);

fn agent_error(code: AgentErrorCode, message: impl Into<String>) -> AgentError {
    let status = match code {
        AgentErrorCode::InvalidStandard => StatusCode::BAD_REQUEST,
        AgentErrorCode::ImageNotFound => StatusCode::NOT_FOUND,
        AgentErrorCode::ConfigError => StatusCode::SERVICE_UNAVAILABLE,
        AgentErrorCode::DownloadError | AgentErrorCode::ProcessingError => {
            StatusCode::BAD_GATEWAY
        }
    };
    let body = AgentErrorRes::new(code, message);
    tracing::warn!(code = ?code, "verification failed: {}", body.error.message);
    (status, Json(body))
}

/// Fetches the image at `url`, returning its bytes and declared content type.
async fn download_image(
    client: &reqwest::Client,
    url: &str,
) -> Result<(Vec<u8>, Option<String>), AgentError> {
    let mut resp = client.get(url).send().await.map_err(|e| {
        agent_error(
            AgentErrorCode::DownloadError,
            format!("Failed to download image: {e}"),
        )
    })?;

    let status = resp.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(agent_error(
            AgentErrorCode::ImageNotFound,
            format!("The image at {url} could not be found (404)."),
        ));
    }
    if !status.is_success() {
        return Err(agent_error(
            AgentErrorCode::DownloadError,
            format!("Failed to download image: HTTP {}", status.as_u16()),
        ));
    }

    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

    let limit = MAX_FILE_SIZE_MB * 1024 * 1024;
    let too_large = || {
        agent_error(
            AgentErrorCode::DownloadError,
            format!("Image exceeds the {MAX_FILE_SIZE_MB}MB limit"),
        )
    };

    if resp.content_length().is_some_and(|len| len > limit as u64) {
        return Err(too_large());
    }

    // The declared length may be absent or wrong, so the body is capped while reading.
    let mut bytes = Vec::new();
    while let Some(chunk) = resp.chunk().await.map_err(|e| {
        agent_error(
            AgentErrorCode::DownloadError,
            format!("Failed to download image: {e}"),
        )
    })? {
        if bytes.len() + chunk.len() > limit {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok((bytes, content_type))
}

#[utoipa::path(
    post,
    path = "/verify_vaccine_record",
    request_body = VerifyReq,
    responses(
        (status = 200, description = "Flat compliance verdict", body = AgentComplianceRes),
        (status = 400, description = "INVALID_STANDARD", body = AgentErrorRes),
        (status = 404, description = "IMAGE_NOT_FOUND", body = AgentErrorRes),
        (status = 502, description = "DOWNLOAD_ERROR or PROCESSING_ERROR", body = AgentErrorRes),
        (status = 503, description = "CONFIG_ERROR", body = AgentErrorRes)
    )
)]
/// Verify a vaccination record from an image URL
///
/// Intended for tool-calling agents. Nothing is cached.
#[axum::debug_handler]
pub(crate) async fn verify_vaccine_record(
    State(state): State<AppState>,
    Json(req): Json<VerifyReq>,
) -> Result<Json<AgentComplianceRes>, AgentError> {
    let standard_id = req
        .standard
        .as_deref()
        .unwrap_or(ComplianceStandard::DEFAULT.id());
    let standard: ComplianceStandard = standard_id.parse().map_err(|_| {
        agent_error(
            AgentErrorCode::InvalidStandard,
            format!(
                "Invalid standard '{standard_id}'. Supported: {}",
                ComplianceStandard::supported_ids()
            ),
        )
    })?;

    let session_id = req
        .session_id
        .as_deref()
        .and_then(|s| match validate_session_id(s) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("ignoring session id for analytics: {}", e);
                None
            }
        });

    let Some(extractor) = state.extractor.as_ref() else {
        return Err(agent_error(
            AgentErrorCode::ConfigError,
            "OPENAI_API_KEY not set on server.",
        ));
    };

    let (bytes, declared_type) = download_image(&state.http, &req.image_url).await?;
    let mime_type = vault_files::detect_media_type(&bytes)
        .map(|t| t.as_str().to_string())
        .or(declared_type)
        .unwrap_or_else(|| "image/jpeg".into());

    let extraction = extractor.extract(&bytes, &mime_type).await.map_err(|e| {
        tracing::error!("agent extraction failed: {:?}", e);
        agent_error(
            AgentErrorCode::ProcessingError,
            format!("An unexpected error occurred: {e}"),
        )
    })?;

    let (transcription, _translation, entries) = extraction.into_stages();
    let verdict = standardize_against(standard, &entries);
    let res = AgentComplianceRes::new(&verdict, &transcription);

    log_event(
        session_id.as_ref().map(|s| s.as_str()),
        AnalyticsEvent::AgentVerification,
        json!({
            "standard": standard.id(),
            "is_compliant": res.is_compliant,
        }),
    );

    Ok(Json(res))
}

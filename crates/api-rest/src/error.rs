//! Mapping from domain errors to HTTP responses.

use api_shared::ErrorRes;
use axum::{http::StatusCode, Json};
use vault_core::{ComplianceStandard, VaultError};

/// Error half of every JSON handler's result.
pub(crate) type ApiError = (StatusCode, Json<ErrorRes>);

pub(crate) type ApiResult<T> = Result<Json<T>, ApiError>;

pub(crate) fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(ErrorRes::new(detail)))
}

/// Logs `err` and converts it into a status and `{"detail"}` body.
pub(crate) fn from_vault_error(err: VaultError) -> ApiError {
    let status = match &err {
        VaultError::InvalidInput(_)
        | VaultError::UnknownStandard(_)
        | VaultError::Deserialization(_) => StatusCode::BAD_REQUEST,
        VaultError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        VaultError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        VaultError::RecordNotFound(_) => StatusCode::NOT_FOUND,
        VaultError::DuplicateRecord(_) => StatusCode::CONFLICT,
        VaultError::InvalidConfig(_) | VaultError::StorePoisoned => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status.is_server_error() {
        tracing::error!("request failed: {:?}", err);
    } else {
        tracing::warn!("request rejected: {}", err);
    }

    let detail = match &err {
        VaultError::UnknownStandard(_) => {
            format!("{err}. Supported: {}", ComplianceStandard::supported_ids())
        }
        VaultError::RecordNotFound(_) => "Record not found. Please upload first.".into(),
        VaultError::StorePoisoned => "Internal error".into(),
        _ => err.to_string(),
    };
    api_error(status, detail)
}

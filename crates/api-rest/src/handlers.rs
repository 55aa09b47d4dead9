use crate::analytics::{log_event, AnalyticsEvent};
use crate::error::{api_error, from_vault_error, ApiError, ApiResult};
use crate::AppState;
use api_shared::{
    ErrorRes, HealthRes, HealthService, ReportReq, StandardisationRes, StandardiseReq,
    StandardsRes, StoredResultRes, UploadRes,
};
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use vault_core::validation::{validate_session_id, validate_upload};
use vault_core::{
    standardize_against, standardize_session, ComplianceStandard, StoredResult, UploadedRecord,
    VaultError,
};
use vault_files::{FilesError, Sha256Hash};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
pub(crate) async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health("REST"))
}

#[utoipa::path(
    get,
    path = "/standards",
    responses(
        (status = 200, description = "Supported compliance standards", body = StandardsRes)
    )
)]
/// Lists every compliance standard with its required vaccines.
pub(crate) async fn list_standards() -> Json<StandardsRes> {
    Json(StandardsRes {
        standards: ComplianceStandard::ALL.into_iter().map(Into::into).collect(),
    })
}

struct UploadedFile {
    content_type: Option<String>,
    file_name: Option<String>,
    bytes: Vec<u8>,
}

/// The parts of an upload form the handler cares about.
#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    session_id: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("malformed multipart body: {}", e);
                return Err(api_error(e.status(), e.body_text()));
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    tracing::warn!("failed to read upload: {}", e);
                    api_error(e.status(), e.body_text())
                })?;
                form.file = Some(UploadedFile {
                    content_type,
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "session_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| api_error(e.status(), e.body_text()))?;
                form.session_id = Some(text);
            }
            other => tracing::debug!("ignoring form field {:?}", other),
        }
    }
    Ok(form)
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content_type = "multipart/form-data", description = "`file` (JPEG, PNG or PDF) and optional `session_id`"),
    responses(
        (status = 200, description = "Record extracted and cached", body = UploadRes),
        (status = 400, description = "Missing file or invalid session id", body = ErrorRes),
        (status = 413, description = "File larger than 10MB", body = ErrorRes),
        (status = 415, description = "Unsupported file type", body = ErrorRes),
        (status = 502, description = "Extraction failed", body = ErrorRes),
        (status = 503, description = "Vision API not configured", body = ErrorRes)
    )
)]
/// Upload a vaccination record image and extract its entries
///
/// No standard is applied here. The record is cached so it can be standardised against
/// any number of standards afterwards.
#[axum::debug_handler]
pub(crate) async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<UploadRes> {
    let form = read_upload_form(multipart).await?;
    let Some(UploadedFile {
        content_type,
        file_name,
        bytes,
    }) = form.file
    else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'file' field"));
    };

    validate_upload(content_type.as_deref(), bytes.len()).map_err(from_vault_error)?;
    let session_id = form
        .session_id
        .filter(|s| !s.trim().is_empty())
        .map(|s| validate_session_id(&s))
        .transpose()
        .map_err(from_vault_error)?;

    let Some(extractor) = state.extractor.as_ref() else {
        tracing::error!("upload rejected: vision extractor is not configured");
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "OPENAI_API_KEY not set on server.",
        ));
    };

    let record_id = Uuid::new_v4();

    let mime_type = content_type.as_deref().unwrap_or("image/jpeg");
    let extraction = extractor.extract(&bytes, mime_type).await.map_err(|e| {
        tracing::error!("extraction failed for {}: {:?}", record_id, e);
        api_error(StatusCode::BAD_GATEWAY, format!("Upload failed: {e}"))
    })?;

    // Only extracted records keep their image. A storage failure leaves the record
    // without an image link.
    let image_hash = match state.images.add_bytes(&bytes, file_name.as_deref()) {
        Ok(metadata) => Some(metadata.hash),
        Err(e) => {
            tracing::error!("failed to store image for {}: {:?}", record_id, e);
            None
        }
    };

    let (transcription, translation, extracted_vaccines) = extraction.into_stages();
    let record = UploadedRecord {
        record_id,
        session_id,
        transcription,
        translation,
        extracted_vaccines,
        image_hash,
        uploaded_at: Utc::now(),
    };
    let res = UploadRes::from(&record);
    let session = record.session_id.as_ref().map(|s| s.as_str().to_string());

    state.store.insert_upload(record).map_err(from_vault_error)?;

    tracing::info!(
        %record_id,
        entries = res.extracted_vaccines.len(),
        extractor = %extractor.name(),
        "upload processed"
    );
    log_event(
        session.as_deref(),
        AnalyticsEvent::UploadComplete,
        json!({ "record_id": res.record_id }),
    );

    Ok(Json(res))
}

#[utoipa::path(
    get,
    path = "/records/{session_id}",
    params(("session_id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Uploads for the session, oldest first", body = [UploadRes]),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Every record uploaded under a session
pub(crate) async fn session_records(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Vec<UploadRes>> {
    let uploads = state
        .store
        .uploads_for_session(&session_id)
        .map_err(from_vault_error)?;
    Ok(Json(uploads.iter().map(UploadRes::from).collect()))
}

fn parse_standard(standard: &str) -> Result<ComplianceStandard, ApiError> {
    standard.parse().map_err(from_vault_error)
}

#[utoipa::path(
    post,
    path = "/standardize/{standard}",
    params(("standard" = String, Path, description = "Standard id, e.g. `us_cdc`")),
    request_body = StandardiseReq,
    responses(
        (status = 200, description = "Compliance verdict", body = StandardisationRes),
        (status = 400, description = "Unknown standard", body = ErrorRes),
        (status = 404, description = "Record not found", body = ErrorRes)
    )
)]
/// Check one uploaded record against a standard
///
/// The verdict is saved alongside the record.
#[axum::debug_handler]
pub(crate) async fn standardise_record(
    State(state): State<AppState>,
    Path(standard): Path<String>,
    Json(req): Json<StandardiseReq>,
) -> ApiResult<StandardisationRes> {
    let standard = parse_standard(&standard)?;

    let record = Uuid::parse_str(req.record_id.trim())
        .map_err(|_| VaultError::InvalidInput(format!("malformed record id {:?}", req.record_id)))
        .and_then(|id| state.store.upload(id))
        .map_err(|e| match e {
            err @ VaultError::InvalidInput(_) => {
                tracing::warn!("{}", err);
                api_error(StatusCode::NOT_FOUND, "Record not found. Please upload first.")
            }
            other => from_vault_error(other),
        })?;

    let verdict = standardize_against(standard, &record.extracted_vaccines);
    let res = StandardisationRes::from(&verdict);
    let is_compliant = verdict.is_compliant;

    state
        .store
        .save_result(StoredResult {
            record_id: record.record_id,
            session_id: record.session_id.clone(),
            verdict,
            processed_at: Utc::now(),
        })
        .map_err(from_vault_error)?;

    log_event(
        record.session_id.as_ref().map(|s| s.as_str()),
        AnalyticsEvent::StandardizationRun,
        json!({
            "record_id": record.record_id.to_string(),
            "standard": standard.id(),
            "is_compliant": is_compliant,
        }),
    );

    Ok(Json(res))
}

#[utoipa::path(
    get,
    path = "/results/{record_id}",
    params(("record_id" = String, Path, description = "Record id returned by `/upload`")),
    responses(
        (status = 200, description = "Saved verdicts for the record, oldest first", body = [StoredResultRes]),
        (status = 404, description = "Record not found", body = ErrorRes)
    )
)]
/// Every verdict saved for an uploaded record
pub(crate) async fn record_results(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> ApiResult<Vec<StoredResultRes>> {
    let record_id = Uuid::parse_str(record_id.trim())
        .map_err(|_| api_error(StatusCode::NOT_FOUND, "Record not found. Please upload first."))?;
    state.store.upload(record_id).map_err(from_vault_error)?;

    let results = state
        .store
        .results_for_record(record_id)
        .map_err(from_vault_error)?;
    Ok(Json(results.iter().map(StoredResultRes::from).collect()))
}

#[utoipa::path(
    post,
    path = "/report/{standard}",
    params(("standard" = String, Path, description = "Standard id, e.g. `us_cdc`")),
    request_body = ReportReq,
    responses(
        (status = 200, description = "Aggregate verdict for the session", body = StandardisationRes),
        (status = 400, description = "Unknown standard", body = ErrorRes)
    )
)]
/// Check every record of a session against a standard as one combined record
pub(crate) async fn session_report(
    State(state): State<AppState>,
    Path(standard): Path<String>,
    Json(req): Json<ReportReq>,
) -> ApiResult<StandardisationRes> {
    let standard = parse_standard(&standard)?;

    let uploads = state
        .store
        .uploads_for_session(&req.session_id)
        .map_err(from_vault_error)?;
    let verdict = standardize_session(
        standard.id(),
        uploads.iter().map(|u| u.extracted_vaccines.as_slice()),
    );

    log_event(
        Some(req.session_id.as_str()),
        AnalyticsEvent::SessionReport,
        json!({
            "standard": standard.id(),
            "records": uploads.len(),
            "is_compliant": verdict.is_compliant,
        }),
    );

    Ok(Json(StandardisationRes::from(&verdict)))
}

#[utoipa::path(
    get,
    path = "/images/{hash}",
    params(("hash" = String, Path, description = "SHA-256 of the image")),
    responses(
        (status = 200, description = "Stored image bytes"),
        (status = 400, description = "Malformed hash", body = ErrorRes),
        (status = 404, description = "No image with that hash", body = ErrorRes)
    )
)]
/// Serve a stored upload by content hash
pub(crate) async fn read_image(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let hash = Sha256Hash::parse(&hash)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let bytes = state.images.read(&hash).map_err(|e| match e {
        FilesError::NotFound(_) => api_error(StatusCode::NOT_FOUND, "Image not found"),
        other => {
            tracing::error!("failed to read image {}: {:?}", hash, other);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    })?;

    let content_type = vault_files::detect_media_type(&bytes)
        .map(|t| t.as_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".into());

    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

//! # API REST
//!
//! REST API implementation for the Personal Vault.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (multipart uploads, JSON serialization, CORS)
//!
//! Uses `api-shared` for wire types. The binary in the workspace root builds an
//! [`AppState`] from configuration and serves [`router`].

#![warn(rust_2018_idioms)]

mod agent;
mod analytics;
mod error;
mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use vault_core::constants::{APP_DESCRIPTION, APP_NAME, APP_VERSION, MAX_FILE_SIZE_MB};
use vault_core::{CoreConfig, RecordStore};
use vault_files::ImageStore;
use vault_vision::VisionExtractor;

/// Headroom above the file limit for multipart framing and the other form fields.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Application state for the REST API server
///
/// Shared by every handler. The extractor is `None` when the vision API is not configured;
/// endpoints that need it then answer 503.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub store: Arc<dyn RecordStore>,
    pub extractor: Option<Arc<dyn VisionExtractor>>,
    pub images: Arc<ImageStore>,
    /// Client used to download images for `/verify_vaccine_record`.
    pub http: reqwest::Client,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if the download client cannot be built.
    pub fn new(
        cfg: Arc<CoreConfig>,
        store: Arc<dyn RecordStore>,
        extractor: Option<Arc<dyn VisionExtractor>>,
        images: Arc<ImageStore>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.vision().timeout)
            .build()?;
        Ok(Self {
            cfg,
            store,
            extractor,
            images,
            http,
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_standards,
        handlers::upload,
        handlers::session_records,
        handlers::standardise_record,
        handlers::record_results,
        handlers::session_report,
        handlers::read_image,
        agent::verify_vaccine_record,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::ErrorRes,
        api_shared::StandardInfoRes,
        api_shared::StandardsRes,
        api_shared::RawVaccineEntryRes,
        api_shared::TranscriptionRes,
        api_shared::TranslationRes,
        api_shared::UploadRes,
        api_shared::StandardiseReq,
        api_shared::ReportReq,
        api_shared::VerifyReq,
        api_shared::VaccineRecordRes,
        api_shared::StandardisationRes,
        api_shared::StoredResultRes,
        api_shared::AgentComplianceRes,
        api_shared::AgentEvidence,
        api_shared::agent::AgentEvidenceVaccine,
        api_shared::AgentError,
        api_shared::AgentErrorCode,
        api_shared::AgentErrorRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router.
///
/// Swagger UI is mounted at `/swagger-ui` outside production.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .route("/standards", get(handlers::list_standards))
        .route("/upload", post(handlers::upload))
        .route("/records/:session_id", get(handlers::session_records))
        .route("/standardize/:standard", post(handlers::standardise_record))
        .route("/results/:record_id", get(handlers::record_results))
        .route("/report/:standard", post(handlers::session_report))
        .route("/verify_vaccine_record", post(agent::verify_vaccine_record))
        .route("/images/:hash", get(handlers::read_image));

    if state.cfg.is_production() {
        tracing::info!("production environment: Swagger UI disabled");
    } else {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi()));
    }

    app.layer(DefaultBodyLimit::max(
        MAX_FILE_SIZE_MB * 1024 * 1024 + MULTIPART_OVERHEAD_BYTES,
    ))
    .layer(CorsLayer::permissive())
    .with_state(state)
}

/// OpenAPI document with the service name, version and description filled in.
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = APP_NAME.into();
    doc.info.version = APP_VERSION.into();
    doc.info.description = Some(APP_DESCRIPTION.into());
    doc
}

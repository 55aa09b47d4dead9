//! # Vault Core
//!
//! Core business logic for the Personal Vault compliance service.
//!
//! This crate contains the pure vaccine-compliance rules and the in-process record store:
//! - Canonical vaccine vocabulary and name normalisation ([`normalize_name`])
//! - Compliance standards and their requirement table
//! - The standardisation engine ([`standardize`], [`standardize_session`])
//! - The extraction payload contract consumed from the vision adapter
//! - Upload validation and startup configuration
//!
//! **No API concerns**: HTTP routing, multipart handling and the vision API client belong in
//! `api-rest` and `vault-vision`.

pub mod config;
pub mod constants;
pub mod error;
pub mod extraction;
pub mod normalize;
pub mod records;
pub mod standardize;
pub mod standards;
pub mod vaccines;
pub mod validation;

pub use config::{CoreConfig, Environment, VisionEnv, VisionSettings};
pub use error::{VaultError, VaultResult};
pub use extraction::{ExtractionResult, LanguageCode, Transcription, Translation};
pub use normalize::normalize_name;
pub use records::{InMemoryRecordStore, RecordStore, StoredResult, UploadedRecord};
pub use standardize::{
    standardize, standardize_against, standardize_session, ComplianceStatus, ComplianceVerdict,
    RawVaccineEntry, VaccineRecord,
};
pub use standards::ComplianceStandard;
pub use vaccines::{CanonicalVaccine, VaccineStatus};
pub use vault_types::{NonEmptyText, Sha256Hash};

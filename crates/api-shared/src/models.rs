//! Request and response bodies for the REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vault_core::{
    ComplianceStandard, ComplianceVerdict, RawVaccineEntry, StoredResult, Transcription,
    Translation, UploadedRecord, VaccineRecord,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub status: String,
    pub mode: String,
    pub version: String,
    pub pipeline: String,
}

/// Plain error body, `{"detail": "..."}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub detail: String,
}

impl ErrorRes {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StandardInfoRes {
    pub id: String,
    pub name: String,
    pub required_vaccines: Vec<String>,
}

impl From<ComplianceStandard> for StandardInfoRes {
    fn from(standard: ComplianceStandard) -> Self {
        Self {
            id: standard.id().into(),
            name: standard.display_name().into(),
            required_vaccines: standard
                .required_vaccines()
                .into_iter()
                .map(|v| v.as_str().to_string())
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StandardsRes {
    pub standards: Vec<StandardInfoRes>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RawVaccineEntryRes {
    pub vaccine_name: String,
    pub date: String,
    pub lot_number: Option<String>,
    pub provider: Option<String>,
    pub original_text: Option<String>,
}

impl From<&RawVaccineEntry> for RawVaccineEntryRes {
    fn from(entry: &RawVaccineEntry) -> Self {
        Self {
            vaccine_name: entry.vaccine_name.clone(),
            date: entry.date.clone(),
            lot_number: entry.lot_number.clone(),
            provider: entry.provider.clone(),
            original_text: entry.original_text.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TranscriptionRes {
    pub raw_text: String,
    pub detected_language: String,
    pub confidence: f64,
    #[schema(value_type = Object)]
    pub structured_data: serde_json::Value,
}

impl From<&Transcription> for TranscriptionRes {
    fn from(t: &Transcription) -> Self {
        Self {
            raw_text: t.raw_text.clone(),
            detected_language: language_code(&t.detected_language),
            confidence: t.confidence,
            structured_data: t.structured_data.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TranslationRes {
    pub original_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub translation_confidence: f64,
}

impl From<&Translation> for TranslationRes {
    fn from(t: &Translation) -> Self {
        Self {
            original_text: t.original_text.clone(),
            translated_text: t.translated_text.clone(),
            source_language: language_code(&t.source_language),
            target_language: language_code(&t.target_language),
            translation_confidence: t.translation_confidence,
        }
    }
}

/// One processed upload as returned by `/upload` and `/records/{session_id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadRes {
    pub record_id: String,
    pub session_id: Option<String>,
    pub transcription: TranscriptionRes,
    pub translation: TranslationRes,
    pub extracted_vaccines: Vec<RawVaccineEntryRes>,
    /// Content hash of the stored image.
    pub image_hash: Option<String>,
    /// Relative URL serving the stored image.
    pub image_url: Option<String>,
    /// RFC 3339 timestamp.
    pub uploaded_at: String,
}

impl From<&UploadedRecord> for UploadRes {
    fn from(record: &UploadedRecord) -> Self {
        Self {
            record_id: record.record_id.to_string(),
            session_id: record.session_id.as_ref().map(|s| s.as_str().to_string()),
            transcription: (&record.transcription).into(),
            translation: (&record.translation).into(),
            extracted_vaccines: record.extracted_vaccines.iter().map(Into::into).collect(),
            image_hash: record.image_hash.as_ref().map(|h| h.to_string()),
            image_url: record.image_hash.as_ref().map(|h| format!("/images/{h}")),
            uploaded_at: record.uploaded_at.to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StandardiseReq {
    pub record_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportReq {
    pub session_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VerifyReq {
    /// Publicly reachable URL of the record image.
    pub image_url: String,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Standard id; `us_cdc` when omitted.
    #[serde(default)]
    pub standard: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VaccineRecordRes {
    pub vaccine_name: String,
    pub raw_name: String,
    pub date: String,
    pub status: String,
    pub original_text: String,
    pub translated_text: Option<String>,
    pub lot_number: Option<String>,
    pub provider: Option<String>,
    pub expiration_date: Option<String>,
}

impl From<&VaccineRecord> for VaccineRecordRes {
    fn from(r: &VaccineRecord) -> Self {
        Self {
            vaccine_name: r.vaccine_name.as_str().into(),
            raw_name: r.raw_name.clone(),
            date: r.date.clone(),
            status: r.status.as_str().into(),
            original_text: r.original_text.clone(),
            translated_text: r.translated_text.clone(),
            lot_number: r.lot_number.clone(),
            provider: r.provider.clone(),
            expiration_date: r.expiration_date.clone(),
        }
    }
}

/// A compliance verdict as returned by `/standardize` and `/report`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StandardisationRes {
    pub standard: String,
    pub is_compliant: bool,
    /// `compliant`, `non_compliant` or `undetermined`.
    pub status: String,
    pub records: Vec<VaccineRecordRes>,
    pub missing_vaccines: Vec<String>,
    pub compliance_notes: String,
}

impl From<&ComplianceVerdict> for StandardisationRes {
    fn from(v: &ComplianceVerdict) -> Self {
        Self {
            standard: v.standard.id().into(),
            is_compliant: v.is_compliant,
            status: enum_literal(&v.status),
            records: v.records.iter().map(Into::into).collect(),
            missing_vaccines: v
                .missing_vaccines
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
            compliance_notes: v.compliance_notes.clone(),
        }
    }
}

/// A verdict previously saved by `/standardize`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StoredResultRes {
    pub record_id: String,
    pub session_id: Option<String>,
    pub verdict: StandardisationRes,
    /// RFC 3339 timestamp.
    pub processed_at: String,
}

impl From<&StoredResult> for StoredResultRes {
    fn from(result: &StoredResult) -> Self {
        Self {
            record_id: result.record_id.to_string(),
            session_id: result.session_id.as_ref().map(|s| s.as_str().to_string()),
            verdict: (&result.verdict).into(),
            processed_at: result.processed_at.to_rfc3339(),
        }
    }
}

fn language_code(code: &vault_core::LanguageCode) -> String {
    enum_literal(code)
}

/// Serialised form of a unit enum variant, e.g. `"non_compliant"`.
fn enum_literal<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::{standardize, ExtractionResult, Sha256Hash};

    #[test]
    fn verdict_converts_to_wire_literals() {
        let entries = vec![
            RawVaccineEntry::new("MMR", "2023-05-15"),
            RawVaccineEntry::new("Tetanus", "2023-11-20"),
        ];
        let res = StandardisationRes::from(&standardize("us_cdc", &entries));

        assert_eq!(res.standard, "us_cdc");
        assert_eq!(res.status, "non_compliant");
        assert_eq!(res.missing_vaccines, vec!["Hepatitis B"]);
        assert_eq!(res.records[0].vaccine_name, "MMR");
        assert_eq!(res.records[0].status, "Compliant");
    }

    #[test]
    fn upload_links_stored_image() {
        let (transcription, translation, entries) = ExtractionResult {
            raw_text: "Hepatitis B 2021".into(),
            detected_language: Some("fr".into()),
            ..Default::default()
        }
        .into_stages();
        let hash = Sha256Hash::parse(&"ab".repeat(32)).unwrap();
        let record = UploadedRecord {
            record_id: uuid::Uuid::new_v4(),
            session_id: None,
            transcription,
            translation,
            extracted_vaccines: entries,
            image_hash: Some(hash.clone()),
            uploaded_at: chrono::Utc::now(),
        };

        let res = UploadRes::from(&record);

        assert_eq!(res.transcription.detected_language, "fr");
        assert_eq!(res.translation.target_language, "en");
        assert_eq!(res.image_url, Some(format!("/images/{hash}")));
        assert!(res.session_id.is_none());
    }

    #[test]
    fn standards_list_required_vaccines_by_name() {
        let info = StandardInfoRes::from(ComplianceStandard::CornellTech);
        assert_eq!(info.id, "cornell_tech");
        assert!(info.required_vaccines.contains(&"TB Test".to_string()));
    }

    #[test]
    fn verify_request_defaults_optional_fields() {
        let req: VerifyReq =
            serde_json::from_str(r#"{"image_url": "https://example.org/card.jpg"}"#).unwrap();
        assert!(req.session_id.is_none());
        assert!(req.standard.is_none());
    }
}

//! Agent-facing response shapes.
//!
//! Tool-calling agents get a flat verdict with the decision data at the top level, and
//! machine-readable error codes they can branch on (retry a `DOWNLOAD_ERROR`, give up on
//! `IMAGE_NOT_FOUND`).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vault_core::constants::EVIDENCE_SNIPPET_CHARS;
use vault_core::{ComplianceVerdict, Transcription};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AgentEvidenceVaccine {
    pub name: String,
    pub date: String,
    pub provider: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AgentEvidence {
    pub vaccines: Vec<AgentEvidenceVaccine>,
    pub original_text_snippet: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AgentComplianceRes {
    pub is_compliant: bool,
    pub missing_vaccines: Vec<String>,
    pub extracted_vaccines: Vec<String>,
    pub compliance_summary: String,
    pub evidence: AgentEvidence,
    pub overall_confidence: f64,
}

impl AgentComplianceRes {
    pub fn new(verdict: &ComplianceVerdict, transcription: &Transcription) -> Self {
        let summary = if verdict.compliance_notes.is_empty() {
            "Analysis complete.".to_string()
        } else {
            verdict.compliance_notes.clone()
        };

        Self {
            is_compliant: verdict.is_compliant,
            missing_vaccines: verdict
                .missing_vaccines
                .iter()
                .map(|v| v.as_str().to_string())
                .collect(),
            extracted_vaccines: verdict
                .records
                .iter()
                .map(|r| r.vaccine_name.as_str().to_string())
                .collect(),
            compliance_summary: summary,
            evidence: AgentEvidence {
                vaccines: verdict
                    .records
                    .iter()
                    .map(|r| AgentEvidenceVaccine {
                        name: r.vaccine_name.as_str().into(),
                        date: r.date.clone(),
                        provider: r.provider.clone(),
                    })
                    .collect(),
                original_text_snippet: snippet(&transcription.raw_text),
            },
            overall_confidence: transcription.confidence,
        }
    }
}

/// First [`EVIDENCE_SNIPPET_CHARS`] characters, with `...` appended when truncated.
pub fn snippet(text: &str) -> String {
    if text.chars().count() <= EVIDENCE_SNIPPET_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(EVIDENCE_SNIPPET_CHARS).collect();
    out.push_str("...");
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentErrorCode {
    InvalidStandard,
    ConfigError,
    ImageNotFound,
    DownloadError,
    ProcessingError,
}

impl AgentErrorCode {
    pub fn suggestion(self) -> &'static str {
        match self {
            Self::InvalidStandard => "Use one of the ids listed by GET /standards.",
            Self::ConfigError => {
                "Please contact the system administrator to configure the backend."
            }
            Self::ImageNotFound => "Check the URL and try again.",
            Self::DownloadError => "Ensure the URL is publicly accessible and valid.",
            Self::ProcessingError => "This may be a temporary system issue. Please try again.",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AgentError {
    pub code: AgentErrorCode,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Error body, `{"error": {"code": ..., "message": ..., "suggestion": ...}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AgentErrorRes {
    pub error: AgentError,
}

impl AgentErrorRes {
    pub fn new(code: AgentErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: AgentError {
                code,
                message: message.into(),
                suggestion: Some(code.suggestion().into()),
            },
        }
    }
}

//! Standardisation engine: raw vaccine entries in, compliance verdict out.
//!
//! Both public operations are pure and infallible. Unknown standards degrade to
//! [`ComplianceStandard::DEFAULT`] and unknown vaccine names degrade to
//! [`CanonicalVaccine::Other`]; no input entry is ever dropped.

use crate::normalize::normalize_name;
use crate::standards::ComplianceStandard;
use crate::vaccines::{CanonicalVaccine, VaccineStatus};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// One un-normalised vaccine entry as produced by the extraction step.
///
/// Deserialisation is lenient: missing or `null` strings become empty, unknown keys are
/// ignored. The date is kept verbatim and never parsed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVaccineEntry {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vaccine_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
}

impl RawVaccineEntry {
    pub fn new(vaccine_name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            vaccine_name: vaccine_name.into(),
            date: date.into(),
            ..Self::default()
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A normalised vaccine record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccineRecord {
    pub vaccine_name: CanonicalVaccine,
    /// The free-text name exactly as extracted.
    pub raw_name: String,
    pub date: String,
    pub status: VaccineStatus,
    /// Source line from the document, or the raw name when none was extracted.
    pub original_text: String,
    pub translated_text: Option<String>,
    pub lot_number: Option<String>,
    pub provider: Option<String>,
    pub expiration_date: Option<String>,
}

impl VaccineRecord {
    fn from_entry(entry: &RawVaccineEntry) -> Self {
        let original_text = entry
            .original_text
            .clone()
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| entry.vaccine_name.clone());

        Self {
            vaccine_name: normalize_name(&entry.vaccine_name),
            raw_name: entry.vaccine_name.clone(),
            date: entry.date.clone(),
            status: VaccineStatus::Compliant,
            translated_text: Some(original_text.clone()),
            original_text,
            lot_number: entry.lot_number.clone(),
            provider: entry.provider.clone(),
            expiration_date: None,
        }
    }
}

/// Overall outcome of a compliance check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    /// Nothing to evaluate (an empty session). Not proof of non-compliance.
    Undetermined,
}

/// Result of checking a set of entries against a standard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceVerdict {
    pub standard: ComplianceStandard,
    pub is_compliant: bool,
    pub status: ComplianceStatus,
    pub records: Vec<VaccineRecord>,
    /// Required but absent, in [`CanonicalVaccine`] declaration order.
    pub missing_vaccines: Vec<CanonicalVaccine>,
    pub compliance_notes: String,
}

/// Normalises `raw_entries` and checks them against `standard_id`.
///
/// An unrecognised `standard_id` is evaluated against the default standard.
pub fn standardize(standard_id: &str, raw_entries: &[RawVaccineEntry]) -> ComplianceVerdict {
    let standard = ComplianceStandard::resolve_lenient(standard_id);
    standardize_against(standard, raw_entries)
}

/// Same as [`standardize`] for an already-resolved standard.
pub fn standardize_against(
    standard: ComplianceStandard,
    raw_entries: &[RawVaccineEntry],
) -> ComplianceVerdict {
    let records: Vec<VaccineRecord> = raw_entries.iter().map(VaccineRecord::from_entry).collect();

    // Presence, not count: duplicates stay in `records` but collapse here.
    let present: BTreeSet<CanonicalVaccine> = records.iter().map(|r| r.vaccine_name).collect();
    let missing_vaccines: Vec<CanonicalVaccine> = standard
        .required_vaccines()
        .difference(&present)
        .copied()
        .collect();

    let is_compliant = missing_vaccines.is_empty();
    let compliance_notes = compliance_notes(standard, &missing_vaccines);

    tracing::debug!(
        standard = standard.id(),
        records = records.len(),
        missing = missing_vaccines.len(),
        "standardised vaccine entries"
    );

    ComplianceVerdict {
        standard,
        is_compliant,
        status: if is_compliant {
            ComplianceStatus::Compliant
        } else {
            ComplianceStatus::NonCompliant
        },
        records,
        missing_vaccines,
        compliance_notes,
    }
}

/// Evaluates every entry uploaded in one session as a single record.
///
/// Batches are concatenated without deduplication. When the union is empty the verdict is
/// [`ComplianceStatus::Undetermined`] with `is_compliant = false` and no missing vaccines.
pub fn standardize_session<'a, I>(standard_id: &str, batches: I) -> ComplianceVerdict
where
    I: IntoIterator<Item = &'a [RawVaccineEntry]>,
{
    let all_entries: Vec<RawVaccineEntry> = batches
        .into_iter()
        .flat_map(|batch| batch.iter().cloned())
        .collect();

    if all_entries.is_empty() {
        return ComplianceVerdict {
            standard: ComplianceStandard::resolve_lenient(standard_id),
            is_compliant: false,
            status: ComplianceStatus::Undetermined,
            records: Vec::new(),
            missing_vaccines: Vec::new(),
            compliance_notes: "No records found for this session.".into(),
        };
    }

    standardize(standard_id, &all_entries)
}

fn compliance_notes(standard: ComplianceStandard, missing: &[CanonicalVaccine]) -> String {
    let outcome = if missing.is_empty() {
        "All required vaccines present.".to_string()
    } else {
        let names: Vec<&str> = missing.iter().map(|v| v.as_str()).collect();
        format!("Missing: {}", names.join(", "))
    };
    format!(
        "Validated against {} requirements. {}",
        standard.id().to_uppercase(),
        outcome
    )
}

//! Canonical vaccine identifiers and per-record status values.
//!
//! [`CanonicalVaccine`] is the closed vocabulary every extracted vaccine name is mapped
//! onto. Its literal values are what the vision prompt asks the model to produce and
//! what is serialised on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of recognised vaccine identifiers.
///
/// Variant order is significant: the case-insensitive normalisation tier picks the first
/// match in this order, and missing-vaccine lists are sorted by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalVaccine {
    #[serde(rename = "MMR")]
    Mmr,
    #[serde(rename = "Measles")]
    Measles,
    #[serde(rename = "Mumps")]
    Mumps,
    #[serde(rename = "Rubella")]
    Rubella,
    #[serde(rename = "Tetanus")]
    Tetanus,
    #[serde(rename = "Diphtheria")]
    Diphtheria,
    #[serde(rename = "Pertussis")]
    Pertussis,
    #[serde(rename = "Tdap")]
    Tdap,
    #[serde(rename = "Hepatitis A")]
    HepatitisA,
    #[serde(rename = "Hepatitis B")]
    HepatitisB,
    #[serde(rename = "Varicella")]
    Varicella,
    #[serde(rename = "Meningococcal")]
    Meningococcal,
    #[serde(rename = "COVID-19")]
    Covid19,
    #[serde(rename = "Influenza")]
    Influenza,
    #[serde(rename = "HPV")]
    Hpv,
    #[serde(rename = "Polio")]
    Polio,
    #[serde(rename = "TB Test")]
    TbTest,
    /// Catch-all for names that match nothing else.
    #[serde(rename = "Other")]
    Other,
}

impl CanonicalVaccine {
    /// Every variant, in declaration order.
    pub const ALL: [CanonicalVaccine; 18] = [
        CanonicalVaccine::Mmr,
        CanonicalVaccine::Measles,
        CanonicalVaccine::Mumps,
        CanonicalVaccine::Rubella,
        CanonicalVaccine::Tetanus,
        CanonicalVaccine::Diphtheria,
        CanonicalVaccine::Pertussis,
        CanonicalVaccine::Tdap,
        CanonicalVaccine::HepatitisA,
        CanonicalVaccine::HepatitisB,
        CanonicalVaccine::Varicella,
        CanonicalVaccine::Meningococcal,
        CanonicalVaccine::Covid19,
        CanonicalVaccine::Influenza,
        CanonicalVaccine::Hpv,
        CanonicalVaccine::Polio,
        CanonicalVaccine::TbTest,
        CanonicalVaccine::Other,
    ];

    /// The literal value, e.g. `"Hepatitis B"`. Also used as the display name.
    pub const fn as_str(self) -> &'static str {
        match self {
            CanonicalVaccine::Mmr => "MMR",
            CanonicalVaccine::Measles => "Measles",
            CanonicalVaccine::Mumps => "Mumps",
            CanonicalVaccine::Rubella => "Rubella",
            CanonicalVaccine::Tetanus => "Tetanus",
            CanonicalVaccine::Diphtheria => "Diphtheria",
            CanonicalVaccine::Pertussis => "Pertussis",
            CanonicalVaccine::Tdap => "Tdap",
            CanonicalVaccine::HepatitisA => "Hepatitis A",
            CanonicalVaccine::HepatitisB => "Hepatitis B",
            CanonicalVaccine::Varicella => "Varicella",
            CanonicalVaccine::Meningococcal => "Meningococcal",
            CanonicalVaccine::Covid19 => "COVID-19",
            CanonicalVaccine::Influenza => "Influenza",
            CanonicalVaccine::Hpv => "HPV",
            CanonicalVaccine::Polio => "Polio",
            CanonicalVaccine::TbTest => "TB Test",
            CanonicalVaccine::Other => "Other",
        }
    }

    /// Looks up a variant by its exact literal value (case-sensitive).
    pub fn from_literal(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == value)
    }
}

impl fmt::Display for CanonicalVaccine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-record compliance status.
///
/// Only `Compliant` is ever assigned today; no expiry comparison exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaccineStatus {
    #[serde(rename = "Compliant")]
    Compliant,
    #[serde(rename = "Non-Compliant")]
    NonCompliant,
    #[serde(rename = "Review Needed")]
    ReviewNeeded,
    #[serde(rename = "Expired")]
    Expired,
}

impl VaccineStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            VaccineStatus::Compliant => "Compliant",
            VaccineStatus::NonCompliant => "Non-Compliant",
            VaccineStatus::ReviewNeeded => "Review Needed",
            VaccineStatus::Expired => "Expired",
        }
    }
}

impl fmt::Display for VaccineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_literal_values() {
        let json = serde_json::to_string(&CanonicalVaccine::HepatitisB).unwrap();
        assert_eq!(json, "\"Hepatitis B\"");

        let parsed: CanonicalVaccine = serde_json::from_str("\"TB Test\"").unwrap();
        assert_eq!(parsed, CanonicalVaccine::TbTest);
    }

    #[test]
    fn serde_literals_match_as_str() {
        for vaccine in CanonicalVaccine::ALL {
            let json = serde_json::to_string(&vaccine).unwrap();
            assert_eq!(json, format!("\"{}\"", vaccine.as_str()));
        }
    }

    #[test]
    fn from_literal_is_case_sensitive() {
        assert_eq!(
            CanonicalVaccine::from_literal("COVID-19"),
            Some(CanonicalVaccine::Covid19)
        );
        assert_eq!(CanonicalVaccine::from_literal("covid-19"), None);
    }

    #[test]
    fn all_is_sorted_in_declaration_order() {
        let mut sorted = CanonicalVaccine::ALL;
        sorted.sort();
        assert_eq!(sorted, CanonicalVaccine::ALL);
    }

    #[test]
    fn status_serialises_with_display_text() {
        let json = serde_json::to_string(&VaccineStatus::ReviewNeeded).unwrap();
        assert_eq!(json, "\"Review Needed\"");
    }
}

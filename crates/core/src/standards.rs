//! Compliance standards and their required-vaccine table.
//!
//! The requirement table lives here and only here. Route handlers, the CLI and the
//! standardisation engine all read it through [`ComplianceStandard::required_vaccines`].

use crate::vaccines::CanonicalVaccine;
use crate::{VaultError, VaultResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::{fmt, str::FromStr};

/// A named vaccination policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStandard {
    /// General US CDC guidelines.
    UsCdc,
    /// Cornell Tech institutional requirements.
    CornellTech,
    /// UK NHS (regional placeholder).
    UkNhs,
    /// Health Canada (regional placeholder).
    CanadaHealth,
}

impl ComplianceStandard {
    pub const ALL: [ComplianceStandard; 4] = [
        ComplianceStandard::UsCdc,
        ComplianceStandard::CornellTech,
        ComplianceStandard::UkNhs,
        ComplianceStandard::CanadaHealth,
    ];

    /// Standard used when a caller supplies an identifier we do not recognise.
    pub const DEFAULT: ComplianceStandard = ComplianceStandard::UsCdc;

    /// Wire identifier, e.g. `"uk_nhs"`.
    pub const fn id(self) -> &'static str {
        match self {
            ComplianceStandard::UsCdc => "us_cdc",
            ComplianceStandard::CornellTech => "cornell_tech",
            ComplianceStandard::UkNhs => "uk_nhs",
            ComplianceStandard::CanadaHealth => "canada_health",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            ComplianceStandard::UsCdc => "US CDC",
            ComplianceStandard::CornellTech => "Cornell Tech",
            ComplianceStandard::UkNhs => "UK NHS",
            ComplianceStandard::CanadaHealth => "Health Canada",
        }
    }

    /// The fixed set of vaccines a record must contain to satisfy this standard.
    pub fn required_vaccines(self) -> BTreeSet<CanonicalVaccine> {
        use CanonicalVaccine::*;

        let required: &[CanonicalVaccine] = match self {
            ComplianceStandard::UsCdc => &[Mmr, Tetanus, HepatitisB],
            ComplianceStandard::CornellTech => &[Mmr, Tetanus, HepatitisB, Meningococcal, TbTest],
            ComplianceStandard::UkNhs => &[Mmr, Tetanus, Meningococcal],
            ComplianceStandard::CanadaHealth => &[Mmr, Tetanus, HepatitisB, Varicella],
        };
        required.iter().copied().collect()
    }

    /// Resolves an identifier without failing.
    ///
    /// Unknown identifiers fall back to [`ComplianceStandard::DEFAULT`]. Callers that must
    /// reject unknown identifiers should use [`str::parse`] instead.
    pub fn resolve_lenient(standard_id: &str) -> Self {
        match standard_id.parse() {
            Ok(standard) => standard,
            Err(_) => {
                tracing::warn!(
                    "unknown compliance standard {:?}, falling back to {}",
                    standard_id,
                    Self::DEFAULT.id()
                );
                Self::DEFAULT
            }
        }
    }

    /// Comma-separated list of every supported identifier, for error messages.
    pub fn supported_ids() -> String {
        Self::ALL
            .iter()
            .map(|s| s.id())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for ComplianceStandard {
    type Err = VaultError;

    fn from_str(s: &str) -> VaultResult<Self> {
        Self::ALL
            .into_iter()
            .find(|standard| standard.id() == s)
            .ok_or_else(|| VaultError::UnknownStandard(s.to_owned()))
    }
}

impl fmt::Display for ComplianceStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CanonicalVaccine::*;

    #[test]
    fn parses_every_known_identifier() {
        for standard in ComplianceStandard::ALL {
            assert_eq!(standard.id().parse::<ComplianceStandard>().unwrap(), standard);
        }
    }

    #[test]
    fn strict_parse_rejects_unknown_and_miscased() {
        assert!(matches!(
            "mars_health".parse::<ComplianceStandard>(),
            Err(VaultError::UnknownStandard(id)) if id == "mars_health"
        ));
        assert!("US_CDC".parse::<ComplianceStandard>().is_err());
    }

    #[test]
    fn lenient_resolution_falls_back_to_us_cdc() {
        assert_eq!(
            ComplianceStandard::resolve_lenient("mars_health"),
            ComplianceStandard::UsCdc
        );
        assert_eq!(
            ComplianceStandard::resolve_lenient("uk_nhs"),
            ComplianceStandard::UkNhs
        );
    }

    #[test]
    fn requirement_table() {
        assert_eq!(
            ComplianceStandard::UsCdc.required_vaccines(),
            BTreeSet::from([Mmr, Tetanus, HepatitisB])
        );
        assert_eq!(
            ComplianceStandard::CornellTech.required_vaccines(),
            BTreeSet::from([Mmr, Tetanus, HepatitisB, Meningococcal, TbTest])
        );
        assert_eq!(
            ComplianceStandard::UkNhs.required_vaccines(),
            BTreeSet::from([Mmr, Tetanus, Meningococcal])
        );
        assert_eq!(
            ComplianceStandard::CanadaHealth.required_vaccines(),
            BTreeSet::from([Mmr, Tetanus, HepatitisB, Varicella])
        );
    }

    #[test]
    fn no_standard_requires_the_catch_all() {
        for standard in ComplianceStandard::ALL {
            assert!(!standard.required_vaccines().contains(&Other));
        }
    }

    #[test]
    fn serde_uses_snake_case_ids() {
        let json = serde_json::to_string(&ComplianceStandard::CanadaHealth).unwrap();
        assert_eq!(json, "\"canada_health\"");
    }
}

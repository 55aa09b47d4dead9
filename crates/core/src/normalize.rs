//! Free-text vaccine name normalisation.
//!
//! Maps whatever the vision model wrote for a vaccine name onto exactly one
//! [`CanonicalVaccine`]. Tiers, first match wins:
//!
//! 1. exact literal match (case-sensitive, untrimmed input)
//! 2. alias table (trimmed, ASCII case-insensitive)
//! 3. canonical literal match (trimmed, case-insensitive, declaration order)
//! 4. [`CanonicalVaccine::Other`]

use crate::vaccines::CanonicalVaccine;

/// Known synonyms and abbreviations that the model tends to emit.
const ALIASES: &[(&str, CanonicalVaccine)] = &[
    ("MMR II", CanonicalVaccine::Mmr),
    ("Measles Mumps Rubella", CanonicalVaccine::Mmr),
    ("Td", CanonicalVaccine::Tetanus),
    ("DTap", CanonicalVaccine::Tdap),
    ("Varicella Zoster", CanonicalVaccine::Varicella),
    ("Chicken Pox", CanonicalVaccine::Varicella),
    ("Meningitis", CanonicalVaccine::Meningococcal),
    ("PPD", CanonicalVaccine::TbTest),
    ("Mantoux", CanonicalVaccine::TbTest),
];

/// Resolves a raw vaccine name. Never fails.
pub fn normalize_name(raw_text: &str) -> CanonicalVaccine {
    if let Some(exact) = CanonicalVaccine::from_literal(raw_text) {
        return exact;
    }

    let trimmed = raw_text.trim();

    if let Some(alias) = lookup_alias(trimmed) {
        return alias;
    }

    let lowered = trimmed.to_lowercase();
    CanonicalVaccine::ALL
        .into_iter()
        .find(|v| v.as_str().to_lowercase() == lowered)
        .unwrap_or(CanonicalVaccine::Other)
}

fn lookup_alias(name: &str) -> Option<CanonicalVaccine> {
    ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|(_, vaccine)| *vaccine)
}

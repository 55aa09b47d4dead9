//! Fixed extraction used when `MOCK_AI` is enabled.

use crate::{VisionExtractor, VisionResult};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use vault_core::{ExtractionResult, RawVaccineEntry};

/// Returns the same MMR and Tdap record for every image.
#[derive(Debug, Clone, Default)]
pub struct MockExtractor {
    delay: Duration,
}

impl MockExtractor {
    /// Sleep for `delay` before answering, to mimic upstream latency.
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn sample() -> ExtractionResult {
        ExtractionResult {
            raw_text: "MOCK DATA: MMR Vaccine - 05/15/2023, Lot: ABC123, Provider: University Health Center\n\
                       Tdap - 11/20/2023, Lot: GSK-456, Provider: Walgreens"
                .into(),
            detected_language: Some("en".into()),
            confidence: Some(0.98),
            translation: None,
            structured_data: Some(json!({
                "dates": ["2023-05-15", "2023-11-20"],
                "vaccines": ["MMR", "Tdap"],
                "lot_numbers": ["ABC123", "GSK-456"]
            })),
            extracted_vaccines: vec![
                RawVaccineEntry {
                    original_text: Some("MMR Vaccine - 05/15/2023".into()),
                    lot_number: Some("ABC123".into()),
                    provider: Some("University Health Center".into()),
                    ..RawVaccineEntry::new("MMR", "2023-05-15")
                },
                RawVaccineEntry {
                    original_text: Some("Tdap - 11/20/2023".into()),
                    lot_number: Some("GSK-456".into()),
                    provider: Some("Walgreens".into()),
                    ..RawVaccineEntry::new("Tdap", "2023-11-20")
                },
            ],
        }
    }
}

#[async_trait]
impl VisionExtractor for MockExtractor {
    fn name(&self) -> String {
        "mock".into()
    }

    async fn extract(&self, image: &[u8], mime_type: &str) -> VisionResult<ExtractionResult> {
        tracing::debug!(bytes = image.len(), mime_type, "mock extraction");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Self::sample())
    }
}

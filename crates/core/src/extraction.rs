//! Extraction payload contract and its split into pipeline stages.
//!
//! The vision adapter returns an [`ExtractionResult`], deserialised from whatever JSON the
//! model produced. [`ExtractionResult::into_stages`] turns it into the typed
//! transcription and translation stages plus the raw entries the engine consumes.

use crate::standardize::RawVaccineEntry;
use serde::{Deserialize, Serialize};

/// ISO 639-1 codes the service recognises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    En,
    Es,
    Zh,
    Fr,
    De,
    Ja,
    Ko,
    Pt,
    Ru,
    Ar,
    Hi,
    Unknown,
}

impl LanguageCode {
    /// Maps a detected code onto the supported set. Anything else is `Unknown`.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Self::En,
            "es" => Self::Es,
            "zh" => Self::Zh,
            "fr" => Self::Fr,
            "de" => Self::De,
            "ja" => Self::Ja,
            "ko" => Self::Ko,
            "pt" => Self::Pt,
            "ru" => Self::Ru,
            "ar" => Self::Ar,
            "hi" => Self::Hi,
            _ => Self::Unknown,
        }
    }
}

/// Raw translation block as the model reports it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationPayload {
    #[serde(default)]
    pub original_text: Option<String>,
    #[serde(default)]
    pub translated_text: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Everything the extraction adapter hands back for one image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default)]
    pub raw_text: String,
    #[serde(default)]
    pub detected_language: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub translation: Option<TranslationPayload>,
    #[serde(default)]
    pub structured_data: Option<serde_json::Value>,
    #[serde(default)]
    pub extracted_vaccines: Vec<RawVaccineEntry>,
}

/// Stage 1: OCR transcription.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub raw_text: String,
    pub detected_language: LanguageCode,
    pub confidence: f64,
    pub structured_data: serde_json::Value,
}

/// Stage 2: translation into English.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub original_text: String,
    pub translated_text: String,
    pub source_language: LanguageCode,
    pub target_language: LanguageCode,
    pub translation_confidence: f64,
}

impl ExtractionResult {
    /// Splits the payload into transcription, translation and raw entries.
    ///
    /// Missing language defaults to English. Confidences are clamped into `0.0..=1.0`.
    /// Missing translation text falls back to the raw transcription.
    pub fn into_stages(self) -> (Transcription, Translation, Vec<RawVaccineEntry>) {
        let detected_language = self
            .detected_language
            .as_deref()
            .map(LanguageCode::from_code)
            .unwrap_or(LanguageCode::En);

        let transcription = Transcription {
            raw_text: self.raw_text,
            detected_language,
            confidence: clamp_confidence(self.confidence.unwrap_or(0.0)),
            structured_data: self
                .structured_data
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
        };

        let payload = self.translation.unwrap_or_default();
        let translation = Translation {
            original_text: payload
                .original_text
                .unwrap_or_else(|| transcription.raw_text.clone()),
            translated_text: payload
                .translated_text
                .unwrap_or_else(|| transcription.raw_text.clone()),
            source_language: detected_language,
            target_language: LanguageCode::En,
            translation_confidence: clamp_confidence(payload.confidence.unwrap_or(1.0)),
        };

        (transcription, translation, self.extracted_vaccines)
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_full_payload() {
        let json = r#"{
            "raw_text": "Vacuna triple viral - 15/05/2023",
            "detected_language": "es",
            "confidence": 0.91,
            "translation": {
                "original_text": "Vacuna triple viral",
                "translated_text": "MMR vaccine",
                "confidence": 0.8
            },
            "structured_data": {"dates": ["2023-05-15"]},
            "extracted_vaccines": [
                {"vaccine_name": "MMR", "date": "2023-05-15", "original_text": "Vacuna triple viral"}
            ]
        }"#;
        let result: ExtractionResult = serde_json::from_str(json).unwrap();
        let (transcription, translation, entries) = result.into_stages();

        assert_eq!(transcription.detected_language, LanguageCode::Es);
        assert_eq!(transcription.confidence, 0.91);
        assert_eq!(transcription.structured_data["dates"][0], "2023-05-15");
        assert_eq!(translation.translated_text, "MMR vaccine");
        assert_eq!(translation.source_language, LanguageCode::Es);
        assert_eq!(translation.target_language, LanguageCode::En);
        assert_eq!(translation.translation_confidence, 0.8);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].vaccine_name, "MMR");
    }

    #[test]
    fn sparse_payload_gets_defaults() {
        let result: ExtractionResult =
            serde_json::from_str(r#"{"raw_text": "MMR 2020"}"#).unwrap();
        let (transcription, translation, entries) = result.into_stages();

        assert_eq!(transcription.detected_language, LanguageCode::En);
        assert_eq!(transcription.confidence, 0.0);
        assert!(transcription.structured_data.as_object().unwrap().is_empty());
        assert_eq!(translation.original_text, "MMR 2020");
        assert_eq!(translation.translated_text, "MMR 2020");
        assert_eq!(translation.translation_confidence, 1.0);
        assert!(entries.is_empty());
    }

    #[test]
    fn unsupported_language_is_unknown() {
        assert_eq!(LanguageCode::from_code("tlh"), LanguageCode::Unknown);
        assert_eq!(LanguageCode::from_code(" FR "), LanguageCode::Fr);
    }

    #[test]
    fn confidence_is_clamped() {
        let result = ExtractionResult {
            confidence: Some(7.5),
            translation: Some(TranslationPayload {
                confidence: Some(-1.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let (transcription, translation, _) = result.into_stages();

        assert_eq!(transcription.confidence, 1.0);
        assert_eq!(translation.translation_confidence, 0.0);
    }
}

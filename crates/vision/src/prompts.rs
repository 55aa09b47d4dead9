//! Prompt text sent to the vision model.

/// System prompt describing the four extraction steps and the JSON contract.
pub const SYSTEM_PROMPT: &str = r#"You are a medical document OCR and extraction expert.
Your task is to analyze a vaccination record image and extract structured data.

Perform the following steps:
1. TRANSCRIPTION: Extract all visible text.
2. LANGUAGE DETECTION: Detect the primary language as an ISO 639-1 code.
3. TRANSLATION: If not English, provide an English translation of the key medical text.
4. EXTRACTION: Extract vaccine records into a structured list.

For each vaccine record, normalize 'vaccine_name' to one of these values if possible:
MMR, Measles, Mumps, Rubella, Tetanus, Diphtheria, Pertussis, Tdap, Hepatitis A, Hepatitis B,
Varicella, Meningococcal, COVID-19, Influenza, HPV, Polio, TB Test.
If it does not match, use the raw name.

Return ONLY a JSON object with this structure:
{
    "raw_text": "full extracted text...",
    "detected_language": "en",
    "confidence": 0.95,
    "translation": {
        "original_text": "...",
        "translated_text": "...",
        "confidence": 1.0
    },
    "structured_data": {
        "dates": ["YYYY-MM-DD"],
        "vaccines": ["Name1", "Name2"],
        "lot_numbers": ["..."]
    },
    "extracted_vaccines": [
        {
            "vaccine_name": "Standardized Or Raw Name",
            "date": "YYYY-MM-DD",
            "original_text": "Line from doc",
            "lot_number": "...",
            "provider": "..."
        }
    ]
}"#;

/// User turn that accompanies the image.
pub const USER_PROMPT: &str = "Analyze this vaccination record.";

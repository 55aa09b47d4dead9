//! OpenAI chat-completions vision client.
//!
//! The image is sent inline as a base64 data URL. The model is asked for a JSON object
//! (`response_format: json_object`, temperature 0) matching [`ExtractionResult`].
//! Transport errors, 429 and 5xx responses are retried with backoff; everything else
//! fails the call immediately.

use crate::prompts::{SYSTEM_PROMPT, USER_PROMPT};
use crate::retry::{is_retryable_status, RetryPolicy};
use crate::{VisionError, VisionExtractor, VisionResult};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use std::time::Duration;
use vault_core::ExtractionResult;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Upper bound on how much of an error body is kept in [`VisionError::Upstream`].
const MAX_ERROR_BODY_CHARS: usize = 500;

pub struct OpenAiExtractor {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    retry: RetryPolicy,
}

impl OpenAiExtractor {
    /// # Errors
    ///
    /// Returns [`VisionError::Transport`] if the HTTP client cannot be built.
    pub fn new(
        api_key: String,
        model: String,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> VisionResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.into(),
            retry,
        })
    }

    /// Point the client at a compatible endpoint instead of api.openai.com.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn send_once(&self, body: &Value) -> VisionResult<Value> {
        let resp = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(VisionError::Upstream {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl VisionExtractor for OpenAiExtractor {
    fn name(&self) -> String {
        format!("openai:{}", self.model)
    }

    async fn extract(&self, image: &[u8], mime_type: &str) -> VisionResult<ExtractionResult> {
        tracing::info!(model = %self.model, bytes = image.len(), "requesting vision extraction");
        let body = request_body(&self.model, mime_type, &STANDARD.encode(image));

        let mut retry = 0;
        let completion = loop {
            match self.send_once(&body).await {
                Ok(value) => break value,
                Err(err) if is_transient(&err) && self.retry.should_retry(retry + 1) => {
                    retry += 1;
                    let delay = self.retry.delay_for(retry);
                    tracing::warn!(
                        "vision request failed ({err}); retry {retry}/{} in {delay:?}",
                        self.retry.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        };

        parse_completion(&completion)
    }
}

fn is_transient(err: &VisionError) -> bool {
    match err {
        VisionError::Transport(_) => true,
        VisionError::Upstream { status, .. } => is_retryable_status(*status),
        _ => false,
    }
}

/// Chat-completions request for one image.
pub fn request_body(model: &str, mime_type: &str, image_b64: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            {
                "role": "user",
                "content": [
                    { "type": "text", "text": USER_PROMPT },
                    {
                        "type": "image_url",
                        "image_url": { "url": format!("data:{mime_type};base64,{image_b64}") }
                    }
                ]
            }
        ],
        "response_format": { "type": "json_object" },
        "temperature": 0.0
    })
}

/// Pull the extraction JSON out of a chat-completions response.
pub fn parse_completion(completion: &Value) -> VisionResult<ExtractionResult> {
    let content = completion["choices"][0]["message"]["content"]
        .as_str()
        .filter(|c| !c.trim().is_empty())
        .ok_or(VisionError::EmptyResponse)?;

    serde_json::from_str(strip_code_fence(content)).map_err(VisionError::MalformedResponse)
}

/// Models occasionally wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::Json, routing::post, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn completion(content: &str) -> Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    /// Chat-completions stand-in. Answers the i-th request with `statuses[i]`, and with a
    /// PPD extraction once the list runs out. Returns the base URL and the hit counter.
    async fn completions_server(statuses: Vec<u16>) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let counter = counter.clone();
                let statuses = statuses.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    match statuses.get(n) {
                        Some(&status) => (
                            StatusCode::from_u16(status).unwrap(),
                            Json(json!({ "error": { "message": "scripted failure" } })),
                        ),
                        None => (
                            StatusCode::OK,
                            Json(completion(
                                r#"{"raw_text": "PPD 2022-01-01", "extracted_vaccines": [{"vaccine_name": "PPD", "date": "2022-01-01"}]}"#,
                            )),
                        ),
                    }
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v1"), hits)
    }

    fn fast_extractor(base_url: &str, max_retries: u32) -> OpenAiExtractor {
        let retry = RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
        };
        OpenAiExtractor::new("sk-test".into(), "gpt-4o".into(), Duration::from_secs(5), retry)
            .unwrap()
            .with_base_url(base_url)
    }

    #[tokio::test]
    async fn server_errors_are_retried_until_success() {
        let (base, hits) = completions_server(vec![503, 503]).await;

        let result = fast_extractor(&base, 2)
            .extract(b"image", "image/png")
            .await
            .unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(result.extracted_vaccines.len(), 1);
        assert_eq!(result.extracted_vaccines[0].vaccine_name, "PPD");
    }

    #[tokio::test]
    async fn client_errors_fail_without_retrying() {
        let (base, hits) = completions_server(vec![401]).await;

        let err = fast_extractor(&base, 2)
            .extract(b"image", "image/png")
            .await
            .unwrap_err();

        assert!(matches!(err, VisionError::Upstream { status: 401, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_stop_at_the_configured_limit() {
        let (base, hits) = completions_server(vec![429, 429, 429, 429]).await;

        let err = fast_extractor(&base, 2)
            .extract(b"image", "image/png")
            .await
            .unwrap_err();

        assert!(matches!(err, VisionError::Upstream { status: 429, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn request_body_carries_data_url_and_json_mode() {
        let body = request_body("gpt-4o", "image/png", "QUJD");

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(
            body["messages"][1]["content"][1]["image_url"]["url"],
            "data:image/png;base64,QUJD"
        );
    }

    #[test]
    fn parses_plain_json_content() {
        let content = r#"{
            "raw_text": "Sarampión 2020",
            "detected_language": "es",
            "extracted_vaccines": [{ "vaccine_name": "Measles", "date": "2020-01-01" }]
        }"#;

        let result = parse_completion(&completion(content)).unwrap();

        assert_eq!(result.detected_language.as_deref(), Some("es"));
        assert_eq!(result.extracted_vaccines.len(), 1);
        assert_eq!(result.extracted_vaccines[0].vaccine_name, "Measles");
    }

    #[test]
    fn parses_fenced_json_content() {
        let content = "```json\n{\"raw_text\": \"x\", \"extracted_vaccines\": []}\n```";
        let result = parse_completion(&completion(content)).unwrap();
        assert_eq!(result.raw_text, "x");
    }

    #[test]
    fn missing_content_is_empty_response() {
        let err = parse_completion(&json!({ "choices": [] })).unwrap_err();
        assert!(matches!(err, VisionError::EmptyResponse));

        let err = parse_completion(&completion("   ")).unwrap_err();
        assert!(matches!(err, VisionError::EmptyResponse));
    }

    #[test]
    fn non_json_content_is_malformed() {
        let err = parse_completion(&completion("I cannot read this image.")).unwrap_err();
        assert!(matches!(err, VisionError::MalformedResponse(_)));
    }

    #[test]
    fn only_transient_failures_are_retried() {
        let rate_limited = VisionError::Upstream {
            status: 429,
            body: String::new(),
        };
        let unauthorized = VisionError::Upstream {
            status: 401,
            body: String::new(),
        };
        assert!(is_transient(&rate_limited));
        assert!(!is_transient(&unauthorized));
        assert!(!is_transient(&VisionError::EmptyResponse));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let extractor = OpenAiExtractor::new(
            "sk-test".into(),
            "gpt-4o".into(),
            Duration::from_secs(5),
            RetryPolicy::default(),
        )
        .unwrap()
        .with_base_url("http://localhost:9999/v1/");

        assert_eq!(
            extractor.completions_url(),
            "http://localhost:9999/v1/chat/completions"
        );
    }
}

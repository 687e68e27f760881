//! Generative text client.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::retry::{is_retryable, retry_delay, BACKOFF_BASE, MAX_RETRIES};
use crate::error::{AppError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

// == Generative Client ==
/// Client for the `generateContent` endpoint.
#[derive(Clone)]
pub struct GenerativeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    backoff_base: Duration,
}

impl GenerativeClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            backoff_base: BACKOFF_BASE,
        })
    }

    /// Overrides the backoff base, mostly for tests.
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Completes `prompt`.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        self.complete_with(None, prompt).await
    }

    /// Completes `prompt` under an optional system instruction.
    ///
    /// Rate limiting and transient server errors are retried up to
    /// [`MAX_RETRIES`] times; every other failure is returned at once.
    pub async fn complete_with(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(AppError::InvalidRequest("el texto a procesar está vacío".to_string()));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let mut body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });
        if let Some(system) = system.filter(|s| !s.trim().is_empty()) {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }

        let mut attempt = 0;
        loop {
            let response = self
                .http
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&body)
                .send()
                .await?;
            let status = response.status();

            if status.is_success() {
                let parsed: GenerateResponse = response.json().await?;
                let text = extract_text(parsed)?;
                info!(model = %self.model, attempts = attempt + 1, "completion received");
                return Ok(text);
            }

            if is_retryable(status.as_u16()) && attempt < MAX_RETRIES {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let delay = retry_delay(attempt, retry_after.as_deref(), self.backoff_base);
                warn!(%status, attempt = attempt + 1, delay_ms = delay.as_millis() as u64, "completion failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let detail = response.text().await.unwrap_or_default();
            debug!(%status, detail = %detail, "completion rejected");
            return Err(AppError::Upstream(describe_failure(status, &detail)));
        }
    }
}

fn extract_text(response: GenerateResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AppError::Upstream("el servicio de IA no devolvió texto".to_string()));
    }
    Ok(text)
}

/// Human-readable message for a failed completion.
fn describe_failure(status: StatusCode, detail: &str) -> String {
    let reason = serde_json::from_str::<Value>(detail)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string));

    let base = match status.as_u16() {
        429 => "el servicio de IA está saturado, intenta nuevamente en unos minutos".to_string(),
        500 | 503 => "el servicio de IA no está disponible en este momento".to_string(),
        400 => "el servicio de IA rechazó la solicitud".to_string(),
        401 | 403 => "la clave del servicio de IA no es válida".to_string(),
        code => format!("el servicio de IA respondió con estado {code}"),
    };
    match reason {
        Some(reason) => format!("{base} ({reason})"),
        None => base,
    }
}

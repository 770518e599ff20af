//! # AI Critique Client
//!
//! Sends the displayed photo to a multimodal model with a fixed reviewer prompt
//! and returns the model's free text.
//!
//! ## Layers
//!
//! 1. [`VisionModel`]: the network seam. One call, image bytes in, text out.
//! 2. [`GeminiClient`]: `generateContent` over blocking reqwest.
//! 3. [`Critic`]: owns an optional model and folds every failure, including a
//!    missing credential, into a [`Critique`] the user can read. It never
//!    returns an error.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use reqwest::blocking::Client;
use serde_json::{Value, json};

use crate::config::{Credential, StudioConfig};
use crate::error::{StudioError, StudioResult};

/// Instruction sent with every critique request.
pub const CRITIQUE_PROMPT: &str = "Act as a professional photographer reviewing an ID photo.
Analyze this image for suitability as a formal ID or Passport photo.
Check the following criteria:
1. Background (Is it clean/plain?)
2. Lighting (Are there shadows on the face?)
3. Face Visibility (Eyes open, looking straight?)
4. Head Position (Is it centered?)

Provide a short, constructive assessment in bullet points.
Start with an overall verdict: \"✅ Suitable\" or \"⚠️ Needs Improvement\".";

pub const MISSING_KEY_MESSAGE: &str =
    "Error: API Key is missing. Please configure your environment.";
pub const FAILURE_MESSAGE: &str = "Failed to analyze image. Please try again later.";
pub const EMPTY_MESSAGE: &str = "No analysis could be generated.";

/// A multimodal model that can describe an image.
pub trait VisionModel {
    /// Run `prompt` against `image` (encoded bytes of type `mime`).
    fn generate(&self, image: &[u8], mime: &str, prompt: &str) -> StudioResult<String>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    /// `timeout` bounds the whole request; `None` waits for the model indefinitely.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> StudioResult<Self> {
        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            StudioError::config("http_client", format!("{:?}", timeout), e.to_string())
                .with_operation("critique")
        })?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: endpoint.into(),
        })
    }

    /// Build a client from configuration; `Ok(None)` when no credential is set.
    pub fn from_config(config: &StudioConfig) -> StudioResult<Option<Self>> {
        match &config.credential {
            Credential::Present(key) => Self::new(
                key.clone(),
                config.model.clone(),
                config.endpoint.clone(),
                config.request_timeout,
            )
            .map(Some),
            Credential::Absent => Ok(None),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

/// JSON body for a single image + text turn.
pub fn request_body(image: &[u8], mime: &str, prompt: &str) -> Value {
    json!({
        "contents": [{
            "parts": [
                { "inline_data": { "mime_type": mime, "data": general_purpose::STANDARD.encode(image) } },
                { "text": prompt }
            ]
        }]
    })
}

/// Concatenate the text parts of the first candidate. Empty when there are none.
pub fn response_text(response: &Value) -> String {
    response["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

impl VisionModel for GeminiClient {
    fn generate(&self, image: &[u8], mime: &str, prompt: &str) -> StudioResult<String> {
        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(image, mime, prompt))
            .send()?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(StudioError::auth("critique", format!("API key rejected ({})", status))
                .with_recovery_suggestion("Check GEMINI_API_KEY / API_KEY"));
        }
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            log::debug!("Gemini error body: {}", detail);
            return Err(StudioError::http_status("critique", status.as_u16()));
        }

        let body: Value = response.json()?;
        Ok(response_text(&body))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Stand-in for a client that could not be built. Every request fails, so the
/// user sees the failure placeholder instead of a missing-key message.
struct Unusable {
    model: String,
    reason: String,
}

impl VisionModel for Unusable {
    fn generate(&self, _image: &[u8], _mime: &str, _prompt: &str) -> StudioResult<String> {
        Err(StudioError::config("http_client", &self.model, &self.reason).with_operation("critique"))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Overall verdict the report opens with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Suitable,
    NeedsImprovement,
    Unknown,
}

impl Verdict {
    pub fn from_report(text: &str) -> Self {
        if text.contains('✅') {
            Verdict::Suitable
        } else if text.contains('⚠') {
            Verdict::NeedsImprovement
        } else {
            Verdict::Unknown
        }
    }
}

/// What the user sees after asking for a critique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Critique {
    /// Model output.
    Report(String),
    /// No credential configured; no request was made.
    Unavailable(String),
    /// The request failed or returned nothing usable.
    Failed(String),
}

impl Critique {
    pub fn text(&self) -> &str {
        match self {
            Critique::Report(t) | Critique::Unavailable(t) | Critique::Failed(t) => t,
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self {
            Critique::Report(t) => Verdict::from_report(t),
            _ => Verdict::Unknown,
        }
    }
}

/// Critique front end. Holds the model only when a credential is configured.
pub struct Critic {
    model: Option<Box<dyn VisionModel>>,
}

impl Critic {
    pub fn new(model: Option<Box<dyn VisionModel>>) -> Self {
        Self { model }
    }

    pub fn from_config(config: &StudioConfig) -> Self {
        let model: Box<dyn VisionModel> = match GeminiClient::from_config(config) {
            Ok(Some(client)) => Box::new(client),
            Ok(None) => {
                log::warn!("⚠️ API key not found in environment; critiques are disabled");
                return Self::new(None);
            }
            Err(e) => {
                log::error!("❌ Could not set up the HTTP client: {}", e);
                Box::new(Unusable {
                    model: config.model.clone(),
                    reason: e.to_string(),
                })
            }
        };
        Self::new(Some(model))
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    /// Ask the model about `image`. Failures become placeholder text.
    pub fn critique(&self, image: &[u8], mime: &str) -> Critique {
        let Some(model) = &self.model else {
            return Critique::Unavailable(MISSING_KEY_MESSAGE.to_string());
        };

        log::info!("🤖 Requesting critique from {} ({} bytes)", model.name(), image.len());
        match model.generate(image, mime, CRITIQUE_PROMPT) {
            Ok(text) if text.trim().is_empty() => Critique::Failed(EMPTY_MESSAGE.to_string()),
            Ok(text) => Critique::Report(text),
            Err(e) => {
                log::error!("❌ Critique request failed: {}", e);
                Critique::Failed(FAILURE_MESSAGE.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Canned {
        reply: StudioResult<String>,
        calls: Cell<usize>,
    }

    impl VisionModel for Canned {
        fn generate(&self, _image: &[u8], mime: &str, prompt: &str) -> StudioResult<String> {
            self.calls.set(self.calls.get() + 1);
            assert_eq!(mime, "image/jpeg");
            assert!(prompt.contains("Head Position"));
            match &self.reply {
                Ok(t) => Ok(t.clone()),
                Err(_) => Err(StudioError::network("critique")),
            }
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    #[test]
    fn missing_credential_yields_placeholder() {
        let critic = Critic::from_config(&StudioConfig::default());
        assert!(!critic.is_available());
        let result = critic.critique(b"jpeg", "image/jpeg");
        assert_eq!(result, Critique::Unavailable(MISSING_KEY_MESSAGE.to_string()));
    }

    #[test]
    fn network_error_yields_failure_text() {
        let critic = Critic::new(Some(Box::new(Canned {
            reply: Err(StudioError::network("x")),
            calls: Cell::new(0),
        })));
        assert_eq!(critic.critique(b"jpeg", "image/jpeg").text(), FAILURE_MESSAGE);
    }

    #[test]
    fn empty_reply_yields_no_analysis() {
        let critic = Critic::new(Some(Box::new(Canned {
            reply: Ok("  ".to_string()),
            calls: Cell::new(0),
        })));
        assert_eq!(critic.critique(b"jpeg", "image/jpeg").text(), EMPTY_MESSAGE);
    }

    #[test]
    fn report_carries_verdict() {
        let critic = Critic::new(Some(Box::new(Canned {
            reply: Ok("✅ Suitable\n- plain background".to_string()),
            calls: Cell::new(0),
        })));
        let result = critic.critique(b"jpeg", "image/jpeg");
        assert_eq!(result.verdict(), Verdict::Suitable);
    }

    #[test]
    fn verdict_parsing() {
        assert_eq!(Verdict::from_report("⚠️ Needs Improvement"), Verdict::NeedsImprovement);
        assert_eq!(Verdict::from_report("looks fine"), Verdict::Unknown);
    }

    #[test]
    fn request_body_shape() {
        let body = request_body(&[1, 2, 3], "image/jpeg", "hi");
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[0]["inline_data"]["data"], "AQID");
        assert_eq!(parts[1]["text"], "hi");
    }

    #[test]
    fn response_text_joins_parts() {
        let body = json!({
            "candidates": [{ "content": { "parts": [ { "text": "✅ Suitable" }, { "text": "\n- ok" } ] } }]
        });
        assert_eq!(response_text(&body), "✅ Suitable\n- ok");
        assert_eq!(response_text(&json!({})), "");
    }

    #[test]
    fn gemini_url_uses_model() {
        let client = GeminiClient::new("k", "m1", "https://example.test/v1beta", None).unwrap();
        assert_eq!(client.url(), "https://example.test/v1beta/models/m1:generateContent");
    }

    #[test]
    fn configured_timeout_bounds_the_request() {
        // Accepts connections at the socket level but never answers.
        let silent = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", silent.local_addr().unwrap());
        let client = GeminiClient::new("k", "m", endpoint, Some(Duration::from_secs(1))).unwrap();

        let started = std::time::Instant::now();
        let err = client.generate(b"jpeg", "image/jpeg", "hi").unwrap_err();
        assert_eq!(err.category(), "network");
        assert!(started.elapsed() < Duration::from_secs(15), "{:?}", started.elapsed());
        drop(silent);
    }

    #[test]
    fn client_builds_without_timeout() {
        let config = StudioConfig::from_lookup(|key| (key == "GEMINI_API_KEY").then(|| "k".to_string()));
        assert!(config.request_timeout.is_none());
        assert!(GeminiClient::from_config(&config).unwrap().is_some());
        assert!(Critic::from_config(&config).is_available());
    }

    #[test]
    fn unusable_client_yields_failure_text() {
        let critic = Critic::new(Some(Box::new(Unusable {
            model: "m".into(),
            reason: "no TLS backend".into(),
        })));
        let result = critic.critique(b"jpeg", "image/jpeg");
        assert_eq!(result, Critique::Failed(FAILURE_MESSAGE.to_string()));
    }
}

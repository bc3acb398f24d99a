//! GeminiClient -- concrete [`TextGenerator`] implementation for the
//! Google Generative Language API.
//!
//! Sends requests to `models/{model}:generateContent` with the API key in
//! the `x-goog-api-key` header. The key is wrapped in
//! [`secrecy::SecretString`] and is never logged or included in `Debug`
//! output. Attachments travel as base64 `inlineData` parts next to the
//! prompt text, matching how the API accepts PDF and image bytes.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};

use charla_core::llm::provider::TextGenerator;
use charla_types::chat::Role;
use charla_types::llm::{ContextEntry, GenerationError};

use super::types::{GeminiContent, GeminiPart, GeminiRequest, GeminiResponse};

/// Gemini text-generation client.
///
/// Explicitly constructed at startup and handed to the conversation
/// session; there is no ambient global client state.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// constructing the `x-goog-api-key` header. The struct does NOT derive
/// Debug, keeping the key and the rest of the client state out of
/// formatted output and tracing logs.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client for the given model (e.g. "gemini-2.0-flash").
    pub fn new(api_key: SecretString, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model,
        }
    }

    /// The model this client targets.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Override the base URL (useful for testing or proxies).
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Convert replayed context entries into the Gemini request shape.
    ///
    /// `system` entries are lifted into `systemInstruction` (the API rejects
    /// a "system" role inside `contents`); `user`/`model` entries map 1:1 in
    /// order.
    fn to_request(&self, context: &[ContextEntry], extra: Option<GeminiContent>) -> GeminiRequest {
        let mut system_texts = Vec::new();
        let mut contents = Vec::new();

        for entry in context {
            match entry.role {
                Role::System => system_texts.push(entry.content.clone()),
                role => contents.push(GeminiContent {
                    role: Some(role.to_string()),
                    parts: vec![GeminiPart::text(&entry.content)],
                }),
            }
        }
        if let Some(extra) = extra {
            contents.push(extra);
        }

        let system_instruction = if system_texts.is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart::text(system_texts.join("\n\n"))],
            })
        };

        GeminiRequest {
            contents,
            system_instruction,
        }
    }

    async fn send(&self, body: GeminiRequest) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => GenerationError::AuthenticationFailed,
                429 => GenerationError::RateLimited,
                _ => GenerationError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Deserialization(format!("failed to parse response: {e}")))?;

        gemini_response.text().ok_or(GenerationError::Empty)
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, context: &[ContextEntry]) -> Result<String, GenerationError> {
        self.send(self.to_request(context, None)).await
    }

    async fn generate_with_attachment(
        &self,
        context: &[ContextEntry],
        prompt: &str,
        data: &[u8],
        mime_type: &str,
    ) -> Result<String, GenerationError> {
        // Attachment bytes first, prompt text second, as one user turn.
        let turn = GeminiContent {
            role: Some(Role::User.to_string()),
            parts: vec![
                GeminiPart::inline(mime_type, BASE64.encode(data)),
                GeminiPart::text(prompt),
            ],
        };
        self.send(self.to_request(context, Some(turn))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new(SecretString::from("test-key"), "gemini-2.0-flash".to_string())
    }

    #[test]
    fn test_url_includes_model() {
        let url = client().url();
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_system_entries_become_system_instruction() {
        let context = vec![
            ContextEntry::new(Role::System, "Be terse."),
            ContextEntry::new(Role::User, "hola"),
            ContextEntry::new(Role::Model, "hola!"),
        ];
        let request = client().to_request(&context, None);

        assert_eq!(request.contents.len(), 2);
        assert_eq!(request.contents[0].role.as_deref(), Some("user"));
        assert_eq!(request.contents[1].role.as_deref(), Some("model"));
        let system = request.system_instruction.unwrap();
        assert_eq!(system.parts[0].text.as_deref(), Some("Be terse."));
    }

    #[test]
    fn test_no_system_instruction_when_absent() {
        let context = vec![ContextEntry::new(Role::User, "hola")];
        let request = client().to_request(&context, None);
        assert!(request.system_instruction.is_none());
    }

    #[test]
    fn test_attachment_turn_appended_last() {
        let context = vec![ContextEntry::new(Role::User, "earlier")];
        let turn = GeminiContent {
            role: Some("user".to_string()),
            parts: vec![
                GeminiPart::inline("application/pdf", BASE64.encode(b"%PDF-1.4")),
                GeminiPart::text("evaluate this"),
            ],
        };
        let request = client().to_request(&context, Some(turn));

        assert_eq!(request.contents.len(), 2);
        let last = &request.contents[1];
        assert!(last.parts[0].inline_data.is_some());
        assert_eq!(last.parts[1].text.as_deref(), Some("evaluate this"));
    }
}

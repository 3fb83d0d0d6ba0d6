//! Google Gemini API Provider
//!
//! Secondary provider in the fallback chain, using the generateContent
//! endpoint. The API key travels in the `x-goog-api-key` header rather
//! than the query string so it never lands in request logs.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ProviderClient, ProviderConfig};
use crate::types::{FailureReason, ProviderId, Result, ReviewError};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini API Provider with secure API key handling
pub struct GeminiProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or_else(|| {
                ReviewError::Config(
                    "Gemini API key not found. Set GEMINI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let client = config.http_client()?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, prompt: &str, system_prompt: Option<&str>) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: system_prompt.map(|text| SystemInstruction {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            }),
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        }
    }
}

#[async_trait]
impl ProviderClient for GeminiProvider {
    async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> std::result::Result<String, FailureReason> {
        info!(model = %self.model, "Generating with Gemini");

        let request = self.build_request(prompt, system_prompt);
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| FailureReason::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FailureReason::from_http_status(status.as_u16(), &body));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            FailureReason::MalformedResponse(format!("failed to parse Gemini response: {}", e))
        })?;

        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| {
                FailureReason::MalformedResponse("no candidates in Gemini response".to_string())
            })?;

        if text.trim().is_empty() {
            return Err(FailureReason::EmptyResponse(
                "Gemini returned empty content".to_string(),
            ));
        }

        Ok(text.to_string())
    }

    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiProvider {
        GeminiProvider::new(ProviderConfig {
            provider: "gemini".to_string(),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_build_request_carries_system_instruction() {
        let request = provider().build_request("후기를 써줘", Some("당신은 작가입니다"));
        assert!(request.system_instruction.is_some());
        assert_eq!(request.contents[0].parts[0].text, "후기를 써줘");
    }

    #[test]
    fn test_request_wire_shape() {
        let request = provider().build_request("테스트", None);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("systemInstruction").is_none());
        assert!(json["generationConfig"]["maxOutputTokens"].is_number());
        assert_eq!(json["contents"][0]["parts"][0]["text"], "테스트");
    }

    #[test]
    fn test_response_shape_parses() {
        let json = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"멋진 후기"}]}}]}"#;
        let body: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.candidates[0].content.parts[0].text, "멋진 후기");
    }

    #[test]
    fn test_empty_candidates_parse_to_empty_vec() {
        let body: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(body.candidates.is_empty());
    }
}

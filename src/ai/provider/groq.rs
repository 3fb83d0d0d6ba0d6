//! Groq Pool Provider
//!
//! Tertiary tier of the fallback chain. Groq hosts several interchangeable
//! small open models behind an OpenAI-compatible API; this provider walks
//! an ordered pool of them, treating any single member's failure as
//! non-fatal and raising to the caller only after every member is
//! exhausted. This tier prioritizes availability over quality.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{ProviderClient, ProviderConfig};
use crate::types::{FailureReason, ProviderId, Result, ReviewError};

const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default ordered model pool, fastest-to-recover first
const DEFAULT_MODEL_POOL: &[&str] = &[
    "llama-3.3-70b-versatile",
    "llama-3.1-8b-instant",
    "gemma2-9b-it",
];

/// Groq pool provider with secure API key handling
pub struct GroqProvider {
    api_key: SecretString,
    api_base: String,
    /// Ordered pool; members are tried front to back
    models: Vec<String>,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for GroqProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("models", &self.models)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GroqProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GROQ_API_KEY").ok())
            .ok_or_else(|| {
                ReviewError::Config(
                    "Groq API key not found. Set GROQ_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let mut models = config.model_pool.clone();
        if models.is_empty() {
            if let Some(model) = config.model.clone() {
                models.push(model);
            } else {
                models = DEFAULT_MODEL_POOL.iter().map(|s| s.to_string()).collect();
            }
        }

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let client = config.http_client()?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            models,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    async fn complete_with_model(
        &self,
        model: &str,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> std::result::Result<String, FailureReason> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages,
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        };

        let url = format!("{}/chat/completions", self.api_base);
        debug!(model, "Sending request to Groq API");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
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

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            FailureReason::MalformedResponse(format!("failed to parse Groq response: {}", e))
        })?;

        let content = body
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| {
                FailureReason::MalformedResponse("no choices in Groq response".to_string())
            })?;

        if content.trim().is_empty() {
            return Err(FailureReason::EmptyResponse(
                "Groq returned empty content".to_string(),
            ));
        }

        Ok(content.to_string())
    }
}

#[async_trait]
impl ProviderClient for GroqProvider {
    async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> std::result::Result<String, FailureReason> {
        info!(pool_size = self.models.len(), "Generating with Groq pool");

        let mut last_failure: Option<FailureReason> = None;
        for model in &self.models {
            match self.complete_with_model(model, prompt, system_prompt).await {
                Ok(text) => {
                    debug!(model, "Groq pool member succeeded");
                    return Ok(text);
                }
                Err(reason) => {
                    warn!(model, error = %reason, "Groq pool member failed, trying next");
                    last_failure = Some(reason);
                }
            }
        }

        Err(last_failure.unwrap_or_else(|| {
            FailureReason::Unknown("Groq pool has no configured models".to_string())
        }))
    }

    fn id(&self) -> ProviderId {
        ProviderId::Groq
    }

    fn model(&self) -> &str {
        self.models.first().map(String::as_str).unwrap_or("unknown")
    }
}

// Request/Response types (OpenAI-compatible wire format)

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;

    fn config_with_key() -> ProviderConfig {
        ProviderConfig {
            provider: "groq".to_string(),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    /// Local HTTP stand-in for the Groq endpoint: answers one connection
    /// per scripted (status, body) pair and forwards each request body
    /// through the channel.
    fn scripted_server(responses: Vec<(u16, &'static str)>) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let api_base = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            for (status, body) in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let request = read_request(&mut stream);
                let _ = tx.send(request);
                let response = format!(
                    "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        (api_base, rx)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = match stream.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn pool_provider(api_base: String) -> GroqProvider {
        GroqProvider::new(ProviderConfig {
            api_base: Some(api_base),
            model_pool: vec!["model-a".to_string(), "model-b".to_string()],
            ..config_with_key()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_pool_advances_past_rate_limited_member() {
        let (api_base, requests) = scripted_server(vec![
            (429, r#"{"error":{"message":"rate limit reached"}}"#),
            (200, r#"{"choices":[{"message":{"content":"풀에서 살아남은 응답"}}]}"#),
        ]);
        let provider = pool_provider(api_base);

        let text = provider
            .complete("방문 리뷰를 작성해주세요", None)
            .await
            .unwrap();
        assert_eq!(text, "풀에서 살아남은 응답");

        // First member was tried and rejected, second answered
        let first = requests.recv().unwrap();
        let second = requests.recv().unwrap();
        assert!(first.contains(r#""model":"model-a""#));
        assert!(second.contains(r#""model":"model-b""#));
    }

    #[tokio::test]
    async fn test_pool_exhaustion_surfaces_last_member_failure() {
        let (api_base, requests) = scripted_server(vec![
            (429, r#"{"error":{"message":"rate limit reached"}}"#),
            (503, r#"{"error":{"message":"service unavailable"}}"#),
        ]);
        let provider = pool_provider(api_base);

        let err = provider
            .complete("방문 리뷰를 작성해주세요", None)
            .await
            .unwrap_err();

        // Both members were exhausted and the final member's reason wins
        assert!(matches!(err, FailureReason::NetworkError(_)));
        assert!(requests.recv().is_ok());
        assert!(requests.recv().is_ok());
    }

    #[test]
    fn test_default_pool_applied() {
        let provider = GroqProvider::new(config_with_key()).unwrap();
        assert_eq!(provider.models.len(), DEFAULT_MODEL_POOL.len());
        assert_eq!(provider.model(), DEFAULT_MODEL_POOL[0]);
    }

    #[test]
    fn test_explicit_pool_overrides_default() {
        let provider = GroqProvider::new(ProviderConfig {
            model_pool: vec!["model-a".to_string(), "model-b".to_string()],
            ..config_with_key()
        })
        .unwrap();
        assert_eq!(provider.models, vec!["model-a", "model-b"]);
    }

    #[test]
    fn test_single_model_becomes_pool_of_one() {
        let provider = GroqProvider::new(ProviderConfig {
            model: Some("only-model".to_string()),
            ..config_with_key()
        })
        .unwrap();
        assert_eq!(provider.models, vec!["only-model"]);
    }

    #[test]
    fn test_response_shape_parses() {
        let json = r#"{"choices":[{"message":{"content":"후기"}}]}"#;
        let body: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.choices[0].message.content.as_deref(), Some("후기"));
    }
}

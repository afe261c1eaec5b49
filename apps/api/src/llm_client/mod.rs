/// LLM Client — the single point of entry for all language model calls in the service.
///
/// ARCHITECTURAL RULE: No other module may talk to the Ollama HTTP API directly.
/// Handlers hold an `Arc<dyn LanguageModel>` and only ever call `complete`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model unavailable after {retries} retries")]
    Unavailable { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A chat-style language model: one system instruction, one user prompt, one reply.
///
/// Carried in `AppState` as `Arc<dyn LanguageModel>` so tests can swap in a canned model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier reported by the health endpoint.
    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub message: ResponseMessage,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// Client for a locally hosted Ollama server (`/api/chat`, non-streaming).
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// Makes a raw call to the chat endpoint, returning the full response object.
    /// Retries on transport errors, 429 and 5xx with exponential backoff.
    pub async fn call(&self, system: &str, prompt: &str) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/api/chat", self.base_url);
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            stream: false,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&url).json(&request_body).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Ollama returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<OllamaError>(&body)
                    .map(|e| e.error)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let chat_response: ChatResponse = serde_json::from_str(&body)?;

            debug!(
                "LLM call succeeded: model={}, prompt_tokens={:?}, output_tokens={:?}",
                self.model, chat_response.prompt_eval_count, chat_response.eval_count
            );

            return Ok(chat_response);
        }

        Err(last_error.unwrap_or(LlmError::Unavailable {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(system, prompt).await?;
        non_empty(response.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn non_empty(content: String) -> Result<String, LlmError> {
    if content.trim().is_empty() {
        Err(LlmError::EmptyContent)
    } else {
        Ok(content)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_serializes_system_then_user() {
        let request = ChatRequest {
            model: "llama3.2:1b",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "be brief",
                },
                ChatMessage {
                    role: "user",
                    content: "hello",
                },
            ],
            stream: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "llama3.2:1b");
        assert_eq!(value["stream"], false);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_chat_response_deserializes_with_token_counts() {
        let json = r#"{
            "model": "llama3.2:1b",
            "created_at": "2024-01-01T00:00:00Z",
            "message": {"role": "assistant", "content": "Week 1: Basics"},
            "done": true,
            "prompt_eval_count": 42,
            "eval_count": 128
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.message.content, "Week 1: Basics");
        assert_eq!(response.prompt_eval_count, Some(42));
        assert_eq!(response.eval_count, Some(128));
    }

    #[test]
    fn test_chat_response_without_token_counts() {
        let json = r#"{"message": {"role": "assistant", "content": "hi"}}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.eval_count, None);
    }

    #[test]
    fn test_blank_content_is_rejected() {
        assert!(matches!(
            non_empty("  \n".to_string()),
            Err(LlmError::EmptyContent)
        ));
        assert_eq!(non_empty("ok".to_string()).unwrap(), "ok");
    }

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, routing::post, Router};

    /// Replies served in order by the fake Ollama; the last one repeats.
    #[derive(Clone)]
    struct Script {
        replies: Arc<Vec<(StatusCode, String)>>,
        hits: Arc<AtomicUsize>,
    }

    async fn scripted_chat(State(script): State<Script>) -> (StatusCode, String) {
        let n = script.hits.fetch_add(1, Ordering::SeqCst);
        script.replies[n.min(script.replies.len() - 1)].clone()
    }

    /// Starts a fake `/api/chat` on an ephemeral port and returns a client pointed at it.
    async fn fake_ollama(replies: &[(StatusCode, &str)]) -> (OllamaClient, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let script = Script {
            replies: Arc::new(
                replies
                    .iter()
                    .map(|(status, body)| (*status, body.to_string()))
                    .collect(),
            ),
            hits: Arc::clone(&hits),
        };
        let app = Router::new()
            .route("/api/chat", post(scripted_chat))
            .with_state(script);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client =
            OllamaClient::new(&format!("http://{addr}"), "llama3.2:1b", Duration::from_secs(10))
                .unwrap();
        (client, hits)
    }

    const WEEK_ONE: &str = r#"{"message": {"role": "assistant", "content": "Week 1: Basics"}}"#;

    #[tokio::test]
    async fn test_server_error_is_retried_then_succeeds() {
        let (client, hits) = fake_ollama(&[
            (StatusCode::SERVICE_UNAVAILABLE, "loading model"),
            (StatusCode::OK, WEEK_ONE),
        ])
        .await;

        let reply = client.complete("system", "prompt").await.unwrap();
        assert_eq!(reply, "Week 1: Basics");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let (client, hits) = fake_ollama(&[
            (StatusCode::TOO_MANY_REQUESTS, ""),
            (StatusCode::OK, WEEK_ONE),
        ])
        .await;

        assert!(client.complete("system", "prompt").await.is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_returns_ollama_message_without_retry() {
        let (client, hits) = fake_ollama(&[(
            StatusCode::NOT_FOUND,
            r#"{"error":"model 'x' not found"}"#,
        )])
        .await;

        match client.complete("system", "prompt").await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "model 'x' not found");
            }
            other => panic!("expected an API error, got {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_client_error_without_json_keeps_raw_body() {
        let (client, _) = fake_ollama(&[(StatusCode::BAD_REQUEST, "bad request")]).await;

        match client.call("system", "prompt").await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad request");
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_persistent_server_error_gives_up_after_three_attempts() {
        let (client, hits) =
            fake_ollama(&[(StatusCode::INTERNAL_SERVER_ERROR, "out of memory")]).await;

        match client.complete("system", "prompt").await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "out of memory");
            }
            other => panic!("expected the last API error, got {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), MAX_RETRIES as usize);
    }

    #[tokio::test]
    async fn test_whitespace_reply_is_empty_content() {
        let (client, _) = fake_ollama(&[(
            StatusCode::OK,
            r#"{"message": {"role": "assistant", "content": "  \n "}}"#,
        )])
        .await;

        assert!(matches!(
            client.complete("system", "prompt").await,
            Err(LlmError::EmptyContent)
        ));
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_parse_error() {
        let (client, _) = fake_ollama(&[(StatusCode::OK, "not json")]).await;

        assert!(matches!(
            client.complete("system", "prompt").await,
            Err(LlmError::Parse(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client =
            OllamaClient::new("http://localhost:11434/", "llama3.2:1b", Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model_name(), "llama3.2:1b");
    }
}

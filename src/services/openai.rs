use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{ChatMessage, ConversationHistory, Role};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SYSTEM_PROMPT: &str = "You are a friendly and engaging conversational assistant with a focus on providing \
personalized music recommendations based on the user's preferences, mood, emotional state, and current context. \
Your role is to engage in natural conversation with users, accurately understand their requests and preferences, \
and provide relevant recommendations tailored to their needs. When the user explicitly requests music \
recommendations or mentions specific genres, styles, or regions, prioritize those preferences in your \
recommendations. If no explicit preferences are mentioned, consider the overall conversation context and the \
user's mood to provide appropriate recommendations. Engage in back-and-forth conversation, ask clarifying \
questions when needed, and gather feedback from the user. Adapt your responses and recommendations based on the \
user's requests and preferences within the conversation flow.";

/// A hosted chat-completion model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// System prompt followed by the role-tagged conversation window.
pub fn build_messages(history: &ConversationHistory) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::new(Role::System, SYSTEM_PROMPT));
    messages.extend(history.to_messages());
    messages
}

pub struct OpenAiClient {
    api_key: String,
    model: String,
    url_chat: String,
    http_client: Client,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let url_chat = format!(
            "{}/v1/chat/completions",
            config.openai_base_url.trim_end_matches('/')
        );

        tracing::info!(model = %config.openai_model, endpoint = %url_chat, "OpenAI client initialized");

        Ok(Self {
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            url_chat,
            http_client,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
        };

        tracing::debug!(model = %self.model, messages = messages.len(), "POST {}", self.url_chat);

        let response = self
            .http_client
            .post(&self.url_chat)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Chat completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI API error {}: {}", status, error_text);
            return Err(AppError::ExternalApi(format!(
                "Chat completion returned status {}",
                status
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Failed to parse chat completion: {}", e)))?;

        first_choice_text(completion)
    }
}

fn first_choice_text(completion: ChatCompletionResponse) -> Result<String> {
    completion
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.unwrap_or_default().trim().to_string())
        .ok_or_else(|| AppError::ExternalApi("Chat completion returned no choices".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages() {
        let history = ConversationHistory::from_turn(["hi", "hello! how can I help?"], "recommend jazz music");
        let messages = build_messages(&history);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[3].role, Role::User);
        assert_eq!(messages[3].content, "recommend jazz music");
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::new(Role::User, "hey")];
        let request = ChatCompletionRequest {
            model: "gpt-3.5-turbo",
            messages: &messages,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hey");
    }

    #[test]
    fn test_first_choice_text() {
        let completion: ChatCompletionResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"  Sure thing!\n"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_text(completion).unwrap(), "Sure thing!");

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            first_choice_text(empty),
            Err(AppError::ExternalApi(_))
        ));
    }

    mod http {
        use crate::error::AppError;
        use crate::models::{ChatMessage, Role};
        use crate::services::openai::{ChatModel, OpenAiClient};
        use crate::services::test_support::{config_for, serve};
        use axum::{
            extract::State,
            http::{header, HeaderMap, StatusCode},
            response::{IntoResponse, Response},
            routing::post,
            Json, Router,
        };
        use serde_json::{json, Value};
        use std::sync::{Arc, Mutex};

        struct FakeOpenAi {
            status: StatusCode,
            requests: Mutex<Vec<(String, Value)>>,
        }

        async fn completions(
            State(fake): State<Arc<FakeOpenAi>>,
            headers: HeaderMap,
            Json(body): Json<Value>,
        ) -> Response {
            let auth = headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            fake.requests.lock().unwrap().push((auth, body));

            if !fake.status.is_success() {
                return (
                    fake.status,
                    Json(json!({"error": {"message": "Rate limit reached"}})),
                )
                    .into_response();
            }

            Json(json!({
                "id": "chatcmpl-1",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": " How about some bossa nova? "}
                }]
            }))
            .into_response()
        }

        async fn client_for(status: StatusCode) -> (OpenAiClient, Arc<FakeOpenAi>) {
            let fake = Arc::new(FakeOpenAi {
                status,
                requests: Mutex::new(Vec::new()),
            });
            let app = Router::new()
                .route("/v1/chat/completions", post(completions))
                .with_state(fake.clone());
            let base_url = serve(app).await;
            (OpenAiClient::new(&config_for(&base_url)).unwrap(), fake)
        }

        #[tokio::test]
        async fn test_complete_posts_messages() {
            let (client, fake) = client_for(StatusCode::OK).await;
            let messages = vec![
                ChatMessage::new(Role::System, "be nice"),
                ChatMessage::new(Role::User, "something relaxing"),
            ];

            let reply = client.complete(&messages).await.unwrap();

            assert_eq!(reply, "How about some bossa nova?");
            let requests = fake.requests.lock().unwrap();
            assert_eq!(requests.len(), 1);
            let (auth, body) = &requests[0];
            assert_eq!(auth, "Bearer sk-test");
            assert_eq!(body["model"], "gpt-3.5-turbo");
            assert_eq!(body["messages"][0]["role"], "system");
            assert_eq!(body["messages"][1]["content"], "something relaxing");
        }

        #[tokio::test]
        async fn test_rate_limit_is_external_api_error() {
            let (client, _fake) = client_for(StatusCode::TOO_MANY_REQUESTS).await;

            let err = client
                .complete(&[ChatMessage::new(Role::User, "hi")])
                .await
                .unwrap_err();

            match err {
                AppError::ExternalApi(msg) => assert!(msg.contains("429")),
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }
}

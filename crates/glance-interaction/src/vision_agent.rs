//! Vision chat client - direct REST implementation for the chat-completions API.
//!
//! Sends the session's prior turns plus one user turn carrying the captured
//! image as a data URL, with the configured response-length cap and
//! temperature.

use async_trait::async_trait;
use glance_core::capture::CapturedImage;
use glance_core::error::{GlanceError, Result};
use glance_core::session::{Turn, TurnRole};
use glance_core::settings::Settings;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_VISION_MODEL: &str = "gpt-4o";
const BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// A pending request is abandoned after this long; the panel's Sending
/// state is the single-flight guard on top of it.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Seam between the panel and the chat API.
#[async_trait]
pub trait VisionChat: Send + Sync {
    /// Sends `prior_turns` plus one user turn carrying `prompt` and
    /// `image`; returns the assistant's reply text.
    async fn describe(
        &self,
        prior_turns: &[Turn],
        prompt: &str,
        image: &CapturedImage,
        settings: &Settings,
    ) -> Result<String>;
}

/// Client for an OpenAI-compatible vision chat endpoint.
#[derive(Clone)]
pub struct OpenAiVisionAgent {
    client: Client,
    base_url: String,
    model: String,
}

impl OpenAiVisionAgent {
    /// Creates a client with the default model and endpoint.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| GlanceError::internal(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            model: DEFAULT_VISION_MODEL.to_string(),
        })
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Points the client at a different endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_messages(prior_turns: &[Turn], prompt: &str, image: &CapturedImage) -> Vec<ChatMessage> {
        let mut messages: Vec<ChatMessage> = prior_turns.iter().map(ChatMessage::from_turn).collect();

        messages.push(ChatMessage {
            role: "user",
            content: vec![
                MessageContent::Text {
                    text: prompt.to_string(),
                },
                MessageContent::ImageUrl {
                    image_url: ImageUrl {
                        url: image.as_data_uri().to_string(),
                    },
                },
            ],
        });

        messages
    }

    async fn send_request(&self, api_key: &str, body: &ChatCompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            GlanceError::Serialization {
                format: "JSON".to_string(),
                message: format!("failed to parse chat response: {err}"),
            }
        })?;

        extract_reply(parsed)
    }
}

#[async_trait]
impl VisionChat for OpenAiVisionAgent {
    async fn describe(
        &self,
        prior_turns: &[Turn],
        prompt: &str,
        image: &CapturedImage,
        settings: &Settings,
    ) -> Result<String> {
        let api_key = settings
            .api_key
            .as_deref()
            .ok_or_else(|| GlanceError::config("no chat API credential configured"))?;

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: Self::build_messages(prior_turns, prompt, image),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        };

        self.send_request(api_key, &request).await
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<MessageContent>,
}

impl ChatMessage {
    fn from_turn(turn: &Turn) -> Self {
        let role = match turn.role {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        };
        Self {
            role,
            content: vec![MessageContent::Text {
                text: turn.content.clone(),
            }],
        }
    }
}

enum MessageContent {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

// Custom serialization for MessageContent
impl Serialize for MessageContent {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;

        match self {
            MessageContent::Text { text } => {
                map.serialize_entry("type", "text")?;
                map.serialize_entry("text", text)?;
            }
            MessageContent::ImageUrl { image_url } => {
                map.serialize_entry("type", "image_url")?;
                map.serialize_entry("image_url", image_url)?;
            }
        }

        map.end()
    }
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_reply(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GlanceError::Serialization {
            format: "JSON".to_string(),
            message: "chat response carried no assistant content".to_string(),
        })
}

fn map_http_error(status: StatusCode, body: String) -> GlanceError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    let message = if message.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        message
    };

    GlanceError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: TurnRole, content: &str) -> Turn {
        Turn {
            role,
            content: content.to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let image = CapturedImage::from_png_bytes(&[1, 2, 3]);
        let request = ChatCompletionRequest {
            model: DEFAULT_VISION_MODEL.to_string(),
            messages: OpenAiVisionAgent::build_messages(
                &[
                    turn(TurnRole::User, "What do you see in this image?"),
                    turn(TurnRole::Assistant, "A settings dialog."),
                ],
                "What do you see in this image?",
                &image,
            ),
            max_tokens: 300,
            temperature: 0.7,
        };

        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["max_tokens"], 300);
        // f32 widens to f64 on serialization; compare in f32.
        assert_eq!(json["temperature"].as_f64().unwrap() as f32, 0.7);

        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");

        // The final user turn carries the prompt and the image data URL.
        let content = messages[2]["content"].as_array().unwrap();
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "What do you see in this image?");
        assert_eq!(content[1]["type"], "image_url");
        assert!(
            content[1]["image_url"]["url"]
                .as_str()
                .unwrap()
                .starts_with("data:image/png;base64,")
        );
    }

    #[test]
    fn test_extract_reply_success() {
        let response = ChatCompletionResponse {
            choices: vec![Choice {
                message: ResponseMessage {
                    content: Some("A bar chart.".to_string()),
                },
            }],
        };

        assert_eq!(extract_reply(response).unwrap(), "A bar chart.");
    }

    #[test]
    fn test_extract_reply_missing_content_is_a_failure() {
        let empty = ChatCompletionResponse { choices: vec![] };
        assert!(extract_reply(empty).is_err());

        let no_content = ChatCompletionResponse {
            choices: vec![Choice {
                message: ResponseMessage { content: None },
            }],
        };
        assert!(no_content.choices[0].message.content.is_none());
        assert!(extract_reply(no_content).is_err());
    }

    #[test]
    fn test_map_http_error_uses_json_error_body() {
        let err = map_http_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error": {"message": "Incorrect API key provided"}}"#.to_string(),
        );

        let GlanceError::Api { status, message } = err else {
            panic!("expected Api error");
        };
        assert_eq!(status, 401);
        assert_eq!(message, "Incorrect API key provided");
    }

    #[test]
    fn test_map_http_error_falls_back_to_status_reason() {
        let err = map_http_error(StatusCode::UNAUTHORIZED, String::new());

        assert_eq!(
            err.to_string(),
            "API error (HTTP 401): Unauthorized"
        );
    }

    #[tokio::test]
    async fn test_describe_without_credential_is_refused() {
        let agent = OpenAiVisionAgent::new().unwrap();
        let image = CapturedImage::from_png_bytes(&[1]);
        let settings = Settings::default();

        // Refused before any request goes out.
        let result = agent
            .describe(&[], "What do you see in this image?", &image, &settings)
            .await;

        assert!(result.unwrap_err().is_config());
    }
}

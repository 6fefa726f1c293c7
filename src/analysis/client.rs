use crate::errors::{AppError, AppResult};
use reqwest::Client;
use smallvec::SmallVec;

// ── Chat completion wire types (OpenAI-compatible) ──

#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: SmallVec<[ChatMessage; 2]>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, serde::Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, serde::Deserialize)]
pub struct ChoiceMessage {
    pub content: String,
}

/// Chat-completions REST client. All methods return Result, never panic.
#[derive(Clone)]
pub struct AiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AiClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .pool_max_idle_per_host(4)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// POST /chat/completions; returns the first choice's text content.
    pub async fn complete(&self, req: &ChatRequest) -> AppResult<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::AiApi {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = resp
            .json::<ChatResponse>()
            .await
            .map_err(|e| AppError::Parse(format!("chat completion: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Parse("chat completion: empty choices".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_text_message_serializes_flat() {
        let msg = ChatMessage {
            role: "user",
            content: MessageContent::Text("Analyze this bet: Lakers ML".into()),
        };
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["role"], "user");
        assert_eq!(v["content"], "Analyze this bet: Lakers ML");
    }

    #[test]
    fn test_image_message_serializes_as_parts() {
        let req = ChatRequest {
            model: "gpt-4o".into(),
            messages: smallvec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: "Analyze this bet from the screenshot:".into(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/jpeg;base64,AAAA".into(),
                        },
                    },
                ]),
            }],
            temperature: 0.8,
            max_tokens: 500,
        };
        let v = serde_json::to_value(&req).unwrap();
        let parts = v["messages"][0]["content"].as_array().unwrap();
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/jpeg;base64,AAAA");
    }
}

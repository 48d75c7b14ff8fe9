//! # Vision analysis
//!
//! The collaborator that turns a pizza photo into a two-line Persian
//! bake-quality verdict. The production implementation posts to the OpenAI
//! chat-completions endpoint with the photo embedded as a base64 data URL;
//! tests substitute a scripted analyzer through the [`VisionAnalyzer`]
//! trait.

use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::messages;

/// Brand/reference context handed to the analyzer alongside the photo.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub brand: String,
    /// Selected item; empty when skipped.
    pub item: String,
    /// Reference oven temperature for the brand, when known.
    pub oven_temp: Option<String>,
    /// Reference bake time for the brand, when known.
    pub bake_time: Option<String>,
}

/// Vision-capable analysis collaborator. May fail or time out; the
/// controller maps any error to a fixed apology reply.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    async fn analyze(&self, image: &[u8], ctx: &AnalysisContext) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageBody,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageBody {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        #[serde(rename = "type")]
        content_type: &'static str,
        text: String,
    },
    ImageUrl {
        #[serde(rename = "type")]
        content_type: &'static str,
        image_url: ImageData,
    },
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: Option<String>,
}

const SYSTEM_PROMPT: &str = "You are a pizza-baking expert. Reply in Persian. \
EXACTLY TWO LINES. No titles, numbering, bullets, emojis, or blank lines. \
Line1: verdict (good | underbaked | overbaked/burnt) with a brief reason in parentheses. \
Line2: three concise actionable tips separated by '؛'.";

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI chat-completions client for bake-quality analysis.
pub struct OpenAiVision {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiVision {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }
}

/// Persian user prompt: brand/reference metadata followed by the strict
/// two-line output instructions (mirrors the production prompt).
fn build_prompt(ctx: &AnalysisContext) -> String {
    let mut meta = Vec::new();
    if !ctx.brand.is_empty() {
        meta.push(format!("برند: {}", ctx.brand));
    }
    if !ctx.item.is_empty() {
        meta.push(format!("محصول: {}", ctx.item));
    }
    if let Some(temp) = &ctx.oven_temp {
        meta.push(format!("دمای مرجع: {temp}"));
    }
    if let Some(time) = &ctx.bake_time {
        meta.push(format!("زمان مرجع: {time}"));
    }
    let meta_txt = if meta.is_empty() {
        String::new()
    } else {
        format!("{} | ", meta.join(" | "))
    };
    format!(
        "{meta_txt}فقط نتیجه را بده.\n\
خروجی دقیقاً دو خط؛ هیچ تیتر/شماره/بولت/ایموجی/خط خالی نگذار.\n\
خط۱: یکی از خوب/کم‌پخت/بیش‌پخت یا سوخته + علت کوتاه در پرانتز.\n\
خط۲: سه توصیهٔ خیلی کوتاه و اجراپذیر (دما/زمان/پیش‌گرمایش/جایگاه فر/تاپینگ/ضخامت) با «؛» جدا شود."
    )
}

#[async_trait]
impl VisionAnalyzer for OpenAiVision {
    async fn analyze(&self, image: &[u8], ctx: &AnalysisContext) -> Result<String> {
        let encoded = general_purpose::STANDARD.encode(image);
        let data_url = format!("data:image/jpeg;base64,{encoded}");
        debug!(
            image_bytes = image.len(),
            brand = %ctx.brand,
            "sending image for analysis"
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageBody::Text(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user",
                    content: MessageBody::Parts(vec![
                        ContentPart::Text {
                            content_type: "text",
                            text: build_prompt(ctx),
                        },
                        ContentPart::ImageUrl {
                            content_type: "image_url",
                            image_url: ImageData { url: data_url },
                        },
                    ]),
                },
            ],
            temperature: 0.2,
            max_tokens: 80,
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("chat completions error ({status}): {body}");
        }

        let chat_response: ChatResponse = response.json().await?;
        let verdict = chat_response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .unwrap_or(messages::NO_RESULT)
            .to_string();

        info!(chars = verdict.len(), "analysis verdict received");
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_brand_and_reference_metadata() {
        let ctx = AnalysisContext {
            brand: "پلنت".to_string(),
            item: "پپرونی".to_string(),
            oven_temp: Some("240 درجه".to_string()),
            bake_time: Some("8:20 دقیقه".to_string()),
        };
        let prompt = build_prompt(&ctx);
        assert!(prompt.starts_with("برند: پلنت | محصول: پپرونی | دمای مرجع: 240 درجه | زمان مرجع: 8:20 دقیقه | "));
        assert!(prompt.contains("دقیقاً دو خط"));
    }

    #[test]
    fn test_prompt_without_metadata_has_no_separator_prefix() {
        let prompt = build_prompt(&AnalysisContext::default());
        assert!(prompt.starts_with("فقط نتیجه را بده."));
    }

    #[test]
    fn test_prompt_omits_skipped_item() {
        let ctx = AnalysisContext {
            brand: "پلنت".to_string(),
            ..Default::default()
        };
        let prompt = build_prompt(&ctx);
        assert!(prompt.starts_with("برند: پلنت | فقط"));
        assert!(!prompt.contains("محصول:"));
    }

    #[test]
    fn test_response_content_deserializes() {
        let raw = r#"{"choices":[{"message":{"content":"خوب (رنگ یکنواخت)\nدما را ثابت نگه دار؛ زمان را کم نکن؛ فر را پیش‌گرم کن"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.choices[0]
            .message
            .content
            .as_deref()
            .unwrap()
            .starts_with("خوب"));
    }
}

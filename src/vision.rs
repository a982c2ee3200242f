//! Client for an OpenAI-compatible chat-completions endpoint.
//!
//! Image requests send the data-URL inline as an `image_url` part. The model's
//! text comes back unprocessed; callers run it through [`crate::repair`].

use crate::config::Config;
use crate::errors::AppError;
use serde_json::{json, Value};
use tracing::{debug, error, info};

const MISSING_KEY_MESSAGE: &str =
    "OpenAI API key not configured. Please add OPENAI_API_KEY to the environment or .env file";
const UPSTREAM_FALLBACK_MESSAGE: &str = "OpenAI API request failed";

const EXTRACT_MAX_TOKENS: u32 = 500;
const SOLVE_MAX_TOKENS: u32 = 1500;
const CHAT_MAX_TOKENS: u32 = 800;

fn extract_prompt(current_year: i32) -> String {
    format!(
        r#"Extract the event title and the event date from this image.

Return only JSON in this shape:
{{
  "title": "event title",
  "date": "YYYY-MM-DD"
}}

Rules:
- title: the most prominent heading or main text
- date: convert forms like "11월 17일" or "Nov 17" to YYYY-MM-DD
- if no year is given, assume {current_year}
- use an empty string for a missing date or title
- do not include any text besides the JSON"#
    )
}

const SOLVE_PROMPT: &str = r#"Analyse the math problem in this image and write a step-by-step solution.

Return only JSON in this shape:
{
  "steps": [
    { "number": 1, "content": "analysis of the problem and strategy" },
    { "number": 2, "content": "the concrete calculation" },
    { "number": 3, "content": "final answer: [answer]" }
  ]
}

Rules:
- solve the actual problem shown in the image
- write formulas in LaTeX, inline formulas wrapped in $...$, block formulas in $$...$$
- escape LaTeX backslashes for JSON, e.g. "$\\frac{a}{b}$", "$\\sqrt{x}$", "$\\pm$"
- use between 3 and 6 steps and show the calculation in each one
- explain in Korean so that a middle-school student can follow
- do not include any text or markdown besides the JSON"#;

#[derive(Clone)]
pub struct VisionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    vision_model: String,
    chat_model: String,
}

impl VisionClient {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            vision_model: config.vision_model.clone(),
            chat_model: config.chat_model.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fails with a configuration error when no credential is present.
    pub fn ensure_configured(&self) -> Result<&str, AppError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::config(MISSING_KEY_MESSAGE))
    }

    /// Raw model text for the event-notice extraction prompt.
    pub async fn extract_event(&self, image: &str, current_year: i32) -> Result<String, AppError> {
        info!("processing image with vision model");
        let prompt = extract_prompt(current_year);
        self.describe_image(image, &prompt, EXTRACT_MAX_TOKENS).await
    }

    /// Raw model text for the step-by-step solution prompt.
    pub async fn solve_problem(&self, image: &str) -> Result<String, AppError> {
        info!("processing math problem with vision model");
        self.describe_image(image, SOLVE_PROMPT, SOLVE_MAX_TOKENS).await
    }

    async fn describe_image(
        &self,
        image: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, AppError> {
        let body = json!({
            "model": self.vision_model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url", "image_url": { "url": image } }
                ]
            }],
            "max_tokens": max_tokens,
        });
        self.chat_completion(body).await
    }

    /// Text-only completion over `messages` (`{role, content}` objects).
    pub async fn complete(&self, messages: Vec<Value>) -> Result<String, AppError> {
        let body = json!({
            "model": self.chat_model,
            "messages": messages,
            "max_tokens": CHAT_MAX_TOKENS,
        });
        self.chat_completion(body).await
    }

    async fn chat_completion(&self, body: Value) -> Result<String, AppError> {
        let api_key = self.ensure_configured()?;
        let url = format!("{}/v1/chat/completions", self.base_url);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let payload: Value = resp.json().await.unwrap_or(Value::Null);
            error!(%status, "upstream API error: {payload}");
            let message = payload["error"]["message"]
                .as_str()
                .unwrap_or(UPSTREAM_FALLBACK_MESSAGE);
            return Err(AppError::upstream(status.as_u16(), message));
        }

        let json: Value = resp.json().await?;
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(AppError::parse)?;

        debug!("model response: {content}");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_a_config_error() {
        let client = VisionClient::new(reqwest::Client::new(), &Config::default());
        assert!(!client.is_configured());
        let err = client.ensure_configured().unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn base_url_is_normalised() {
        let config = Config {
            openai_base_url: "http://localhost:9999/".to_string(),
            openai_api_key: Some("key".to_string()),
            ..Config::default()
        };
        let client = VisionClient::new(reqwest::Client::new(), &config);
        assert_eq!(client.base_url, "http://localhost:9999");
        assert_eq!(client.ensure_configured().unwrap(), "key");
    }

    #[test]
    fn extract_prompt_names_the_year() {
        assert!(extract_prompt(2026).contains("assume 2026"));
    }

    #[tokio::test]
    async fn unconfigured_client_never_calls_out() {
        let config = Config {
            openai_base_url: "http://127.0.0.1:1".to_string(),
            ..Config::default()
        };
        let client = VisionClient::new(reqwest::Client::new(), &config);
        let err = client.solve_problem("data:image/png;base64,AAAA").await.unwrap_err();
        assert!(err.message.contains("not configured"));
    }
}

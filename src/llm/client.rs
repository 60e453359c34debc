use crate::error::{Result, TreasuryError};
use crate::llm::types::*;
use reqwest::Client;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub(crate) async fn generate_content(
        &self,
        model: &str,
        system_prompt: &str,
        messages: Vec<Content>,
        response_schema: Option<serde_json::Value>,
    ) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(TreasuryError::Extraction(
                "missing API key, extraction is unavailable".to_string(),
            ));
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let system_content = Some(Content::user(system_prompt));

        let payload = GenerateContentRequest {
            contents: messages,
            system_instruction: system_content,
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema,
            },
        };

        let res = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| TreasuryError::Extraction(format!("Gemini unreachable: {}", e)))?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await.unwrap_or_default();
            return Err(TreasuryError::Extraction(format!(
                "Gemini API error (status {}): {}",
                status, err_text
            )));
        }

        let body: GenerateContentResponse = res
            .json()
            .await
            .map_err(|e| TreasuryError::Extraction(format!("malformed Gemini response: {}", e)))?;

        let part = body
            .candidates
            .ok_or_else(|| TreasuryError::Extraction("no candidates returned".to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| TreasuryError::Extraction("empty candidates list".to_string()))?
            .content
            .parts
            .into_iter()
            .next()
            .ok_or_else(|| TreasuryError::Extraction("no parts in content".to_string()))?;

        match part {
            Part::Text { text } => Ok(text),
            _ => Err(TreasuryError::Extraction(
                "model returned non-text content".to_string(),
            )),
        }
    }
}

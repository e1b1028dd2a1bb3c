//! Gemini client for answer generation
//!
//! Calls the hosted Generative Language API with an API-key credential.
//! System turns map onto `systemInstruction`; assistant turns onto the
//! wire role `model`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use crate::types::{Message, Role};

use super::llm::GenerationProvider;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Hosted Gemini generation provider
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationOptions,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationOptions {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: String,
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn new(config: &GenerationConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", API_BASE, self.model)
    }

    /// Split the conversation into the wire shape: at most one system
    /// instruction plus role-tagged contents
    fn to_wire(&self, messages: &[Message]) -> (Option<Content>, Vec<Content>) {
        let mut system_instruction = None;
        let mut contents = Vec::new();

        for message in messages {
            match message.role {
                Role::System => {
                    system_instruction = Some(Content {
                        role: None,
                        parts: vec![Part {
                            text: message.content.clone(),
                        }],
                    });
                }
                Role::User => contents.push(Content {
                    role: Some("user".to_string()),
                    parts: vec![Part {
                        text: message.content.clone(),
                    }],
                }),
                Role::Assistant => contents.push(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part {
                        text: message.content.clone(),
                    }],
                }),
            }
        }

        (system_instruction, contents)
    }
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    async fn generate(&self, messages: &[Message]) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(Error::generation(
                "generation API key is not configured (set GEMINI_API_KEY)",
            ));
        }

        let (system_instruction, contents) = self.to_wire(messages);
        if contents.is_empty() {
            return Err(Error::generation("no user content to generate from"));
        }

        let request = GenerateRequest {
            contents,
            system_instruction,
            generation_config: GenerationOptions {
                temperature: self.temperature,
                top_p: self.top_p,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::generation(format!("generation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(format!(
                "generation API returned HTTP {}: {}",
                status, body
            )));
        }

        let generate_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("invalid generation response: {}", e)))?;

        generate_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| Error::generation("no text in generation response"))
    }

    async fn health_check(&self) -> Result<bool> {
        if self.api_key.is_empty() {
            return Ok(false);
        }

        let url = format!("{}/models/{}", API_BASE, self.model);
        match self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_map_onto_wire_format() {
        let client = GeminiClient::new(&GenerationConfig::default());
        let messages = vec![
            Message::system("ground yourself"),
            Message::user("question"),
            Message::assistant("earlier answer"),
        ];

        let (system, contents) = client.to_wire(&messages);
        assert_eq!(system.unwrap().parts[0].text, "ground yourself");
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role.as_deref(), Some("user"));
        assert_eq!(contents[1].role.as_deref(), Some("model"));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_generation_error() {
        let client = GeminiClient::new(&GenerationConfig::default());
        let err = client.generate(&[Message::user("q")]).await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert!(!client.health_check().await.unwrap());
    }
}

use async_trait::async_trait;
use aura_core::{Generation, GenerationError, GenerationService, Role, Turn, Usage};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when the config does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Google Gemini `generateContent` client.
///
/// Each call replays the persona and the full context window; no remote
/// chat session is kept.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    config: GenerationConfig,
}

impl GeminiProvider {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        info!("Creating GeminiProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            config: GenerationConfig {
                temperature: None,
                max_output_tokens: None,
            },
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub const fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.config.max_output_tokens = Some(max);
        self
    }

    const fn wire_role(role: Role) -> &'static str {
        match role {
            Role::User => "user",
            Role::Assistant => "model",
        }
    }

    fn build_request<'a>(
        &self,
        persona: &'a str,
        prior_turns: &'a [Turn],
        new_message: &'a str,
    ) -> GenerateRequest<'a> {
        let system_instruction = (!persona.trim().is_empty()).then(|| Content {
            role: None,
            parts: vec![Part { text: persona }],
        });

        let mut contents: Vec<Content<'a>> = prior_turns
            .iter()
            .map(|turn| Content {
                role: Some(Self::wire_role(turn.role)),
                parts: vec![Part { text: &turn.text }],
            })
            .collect();
        contents.push(Content {
            role: Some(Self::wire_role(Role::User)),
            parts: vec![Part { text: new_message }],
        });

        let generation_config = (self.config.temperature.is_some()
            || self.config.max_output_tokens.is_some())
        .then_some(self.config);

        GenerateRequest {
            system_instruction,
            contents,
            generation_config,
        }
    }

    fn error_for_status(status: StatusCode, body: &str) -> GenerationError {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map_or_else(|_| body.to_string(), |e| e.error.message);

        if status == StatusCode::TOO_MANY_REQUESTS {
            GenerationError::Quota(message)
        } else {
            GenerationError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }

    fn parse_response(body: &str) -> Result<Generation, GenerationError> {
        let response: GenerateResponse = serde_json::from_str(body)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let usage = response.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(Generation { text, usage })
    }
}

#[async_trait]
impl GenerationService for GeminiProvider {
    async fn generate(
        &self,
        persona: &str,
        prior_turns: &[Turn],
        new_message: &str,
    ) -> Result<Generation, GenerationError> {
        let request = self.build_request(persona, prior_turns, new_message);

        debug!(
            "Sending request to Gemini API: model={}, context_turns={}",
            self.model,
            prior_turns.len()
        );

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!("Gemini API returned {status}");
            return Err(Self::error_for_status(status, &body));
        }

        let generation = Self::parse_response(&body)?;
        info!("Received response from Gemini API");
        Ok(generation)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn request_replays_context_then_new_message() {
        let provider = GeminiProvider::new("key".to_string());
        let turns = vec![Turn::user("A"), Turn::assistant("B")];
        let request = provider.build_request("Be kind.", &turns, "C");

        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be kind.");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][2]["parts"][0]["text"], "C");
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn empty_context_sends_only_new_message() {
        let provider = GeminiProvider::new("key".to_string()).with_temperature(0.5);
        let request = provider.build_request("", &[], "");

        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json.get("systemInstruction").is_none());
        assert_eq!(json["contents"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn rate_limit_maps_to_quota() {
        let err = GeminiProvider::error_for_status(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"Resource exhausted"}}"#,
        );
        assert!(matches!(err, GenerationError::Quota(ref m) if m == "Resource exhausted"));
    }

    #[test]
    fn blank_candidate_is_empty_response() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#;
        assert!(matches!(
            GeminiProvider::parse_response(body),
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn garbage_body_is_malformed() {
        assert!(matches!(
            GeminiProvider::parse_response("<html>"),
            Err(GenerationError::MalformedResponse(_))
        ));
    }
}

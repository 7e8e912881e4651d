//! Model service - service layer
//!
//! Sends one prompt to the remote model and returns the reply text. Knows
//! nothing about rubrics or submissions.
//!
//! ## Backends
//! - `GeminiClient`: native `generateContent` REST call via `reqwest`, with
//!   the response schema and permissive safety thresholds on the request
//! - `OpenAiCompatClient`: any OpenAI-compatible gateway via `async-openai`;
//!   the schema travels in a system message

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{Config, Provider};
use crate::error::EvaluationError;

/// Harm categories relaxed on every Gemini request
const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const BLOCK_NONE: &str = "BLOCK_NONE";

/// One generation call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Within [0, 1]; higher means more variation
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Object schema the reply must follow
    pub response_schema: Value,
}

/// Remote generative model
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    fn model_name(&self) -> &str;

    /// Issue exactly one call and return the reply text.
    ///
    /// Transport and HTTP failures are `ApiCall`; an empty or blocked reply
    /// is `EmptyResponse`.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, EvaluationError>;
}

/// Build the backend selected by `config.provider`
pub fn backend_for(config: &Config) -> Box<dyn GenerativeModel> {
    match config.provider {
        Provider::Gemini => Box::new(GeminiClient::new(config)),
        Provider::OpenAi => Box::new(OpenAiCompatClient::new(config)),
    }
}

// ========== Gemini ==========

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig<'a>,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    status: Option<String>,
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    api_base_url: String,
    model_name: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            api_base_url: config.api_base_url.clone(),
            model_name: config.model_name.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base_url.trim_end_matches('/'),
            self.model_name
        )
    }

    fn api_call_failed(&self, message: impl Into<String>) -> EvaluationError {
        EvaluationError::ApiCall {
            model: self.model_name.clone(),
            message: message.into(),
        }
    }
}

fn request_body<'a>(request: &'a GenerationRequest) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        contents: vec![RequestContent {
            role: "user",
            parts: vec![RequestPart {
                text: &request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
            response_mime_type: "application/json",
            response_schema: &request.response_schema,
        },
        safety_settings: HARM_CATEGORIES
            .iter()
            .map(|&category| SafetySetting {
                category,
                threshold: BLOCK_NONE,
            })
            .collect(),
    }
}

/// Text of the first candidate, or the reason the reply is empty
fn reply_text(response: GenerateContentResponse, model: &str) -> Result<String, EvaluationError> {
    let candidate = response.candidates.into_iter().next();

    let text: String = candidate
        .as_ref()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    if !text.trim().is_empty() {
        return Ok(text);
    }

    let block_reason = response.prompt_feedback.and_then(|feedback| {
        feedback.block_reason.map(|reason| match feedback.block_reason_message {
            Some(message) => format!("{}: {}", reason, message),
            None => reason,
        })
    });
    let reason = block_reason.or_else(|| candidate.and_then(|c| c.finish_reason));

    Err(EvaluationError::EmptyResponse {
        model: model.to_string(),
        reason,
    })
}

fn http_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => match parsed.error.status {
            Some(code) => format!("HTTP {} {}: {}", status.as_u16(), code, parsed.error.message),
            None => format!("HTTP {}: {}", status.as_u16(), parsed.error.message),
        },
        Err(_) => format!("HTTP {}: {}", status.as_u16(), body.trim()),
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, EvaluationError> {
        debug!("calling Gemini API, model: {}", self.model_name);
        debug!("prompt length: {} characters", request.prompt.len());

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| {
                warn!("Gemini API call failed: {}", e);
                self.api_call_failed(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.api_call_failed(e.to_string()))?;

        if !status.is_success() {
            let message = http_error_message(status, &body);
            warn!("Gemini API returned an error: {}", message);
            return Err(self.api_call_failed(message));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| self.api_call_failed(format!("unexpected response body: {}", e)))?;

        debug!("Gemini API call succeeded");
        reply_text(parsed, &self.model_name)
    }
}

// ========== OpenAI-compatible ==========

/// Chat completions client for OpenAI-compatible gateways
pub struct OpenAiCompatClient {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl OpenAiCompatClient {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.model_name.clone(),
        }
    }

    fn api_call_failed(&self, e: impl std::fmt::Display) -> EvaluationError {
        EvaluationError::ApiCall {
            model: self.model_name.clone(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl GenerativeModel for OpenAiCompatClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, EvaluationError> {
        debug!("calling chat completions API, model: {}", self.model_name);

        let system_message = format!(
            "Responde únicamente con un objeto JSON válido, sin texto adicional, que siga este esquema:\n{}",
            request.response_schema
        );

        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_message.as_str())
                    .build()
                    .map_err(|e| self.api_call_failed(e))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.prompt.as_str())
                    .build()
                    .map_err(|e| self.api_call_failed(e))?,
            ),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_output_tokens)
            .build()
            .map_err(|e| self.api_call_failed(e))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("chat completions API call failed: {}", e);
            self.api_call_failed(e)
        })?;

        let choice = response.choices.first();
        match choice.and_then(|c| c.message.content.clone()) {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(EvaluationError::EmptyResponse {
                model: self.model_name.clone(),
                reason: choice
                    .and_then(|c| c.finish_reason.as_ref())
                    .map(|r| format!("{:?}", r)),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> GenerateContentResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerationRequest {
            prompt: "evalúa".to_string(),
            temperature: 0.5,
            max_output_tokens: 1500,
            response_schema: json!({ "type": "OBJECT" }),
        };
        let body = serde_json::to_value(request_body(&request)).unwrap();

        assert_eq!(body["contents"][0]["parts"][0]["text"], "evalúa");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1500);
        assert_eq!(body["generationConfig"]["temperature"], 0.5);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");

        let safety = body["safetySettings"].as_array().unwrap();
        assert_eq!(safety.len(), HARM_CATEGORIES.len());
        assert!(safety.iter().all(|s| s["threshold"] == BLOCK_NONE));
    }

    #[test]
    fn test_reply_text_joins_parts() {
        let response = parse(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] },
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(reply_text(response, "m").unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_blocked_prompt_reports_block_reason() {
        let response = parse(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }));
        match reply_text(response, "m").unwrap_err() {
            EvaluationError::EmptyResponse { reason, .. } => assert_eq!(reason.as_deref(), Some("SAFETY")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_candidate_reports_finish_reason() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "RECITATION" }]
        }));
        match reply_text(response, "m").unwrap_err() {
            EvaluationError::EmptyResponse { reason, .. } => {
                assert_eq!(reason.as_deref(), Some("RECITATION"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_http_error_message_prefers_api_error_body() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(
            http_error_message(reqwest::StatusCode::BAD_REQUEST, body),
            "HTTP 400 INVALID_ARGUMENT: API key not valid."
        );
        assert_eq!(
            http_error_message(reqwest::StatusCode::BAD_GATEWAY, "upstream down"),
            "HTTP 502: upstream down"
        );
    }

    #[test]
    fn test_endpoint() {
        let config = Config {
            api_base_url: "https://generativelanguage.googleapis.com/v1beta/".to_string(),
            model_name: "gemini-1.5-flash".to_string(),
            ..Config::default()
        };
        assert_eq!(
            GeminiClient::new(&config).endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    /// Live call; needs GEMINI_API_KEY
    #[tokio::test]
    #[ignore]
    async fn test_gemini_live_call() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env().unwrap();
        let client = GeminiClient::new(&config);
        let request = GenerationRequest {
            prompt: "Devuelve un JSON con la clave 'saludo' igual a 'hola'.".to_string(),
            temperature: 0.0,
            max_output_tokens: 100,
            response_schema: json!({
                "type": "OBJECT",
                "properties": { "saludo": { "type": "STRING" } },
                "required": ["saludo"]
            }),
        };

        let reply = client.generate(&request).await.unwrap();
        println!("reply: {}", reply);
        assert!(reply.contains("hola"));
    }
}

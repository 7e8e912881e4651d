//! Evaluation client - service layer
//!
//! One model call per submission, then the reply is parsed into an
//! `EvaluationResult`. Missing fields keep their placeholder instead of
//! failing the submission.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::EvaluationError;
use crate::models::evaluation::response_schema;
use crate::models::{Evaluation, EvaluationResult};
use crate::services::llm_service::{GenerationRequest, GenerativeModel};
use crate::utils::logging::truncate_text;

/// Evaluation client
pub struct Evaluator {
    model: Box<dyn GenerativeModel>,
    temperature: f32,
    max_output_tokens: u32,
    include_student_name: bool,
    short_feedback_limit: usize,
}

impl Evaluator {
    pub fn new(config: &Config, model: Box<dyn GenerativeModel>) -> Self {
        Self {
            model,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            include_student_name: config.extract_student_name,
            short_feedback_limit: config.short_feedback_limit,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Send `prompt` and parse the structured reply.
    ///
    /// `display_name` fills the student name unless the model supplies one.
    pub async fn evaluate(&self, prompt: &str, display_name: &str) -> Result<Evaluation, EvaluationError> {
        let request = GenerationRequest {
            prompt: prompt.to_string(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            response_schema: response_schema(self.include_student_name),
        };

        info!("🤖 requesting evaluation from {}", self.model.model_name());
        let raw = self.model.generate(&request).await?;
        debug!("model reply: {}", truncate_text(&raw, 200));

        let evaluation = parse_reply(&raw, display_name)?;

        if evaluation.is_degraded() {
            let keys: Vec<&str> = evaluation.missing_fields.iter().map(|f| f.key()).collect();
            warn!(
                "⚠️ reply for {} is missing {}; using placeholders",
                display_name,
                keys.join(", ")
            );
        }
        let feedback_len = evaluation.result.short_feedback.chars().count();
        if feedback_len > self.short_feedback_limit {
            warn!(
                "⚠️ short feedback for {} is {} characters (target {})",
                display_name, feedback_len, self.short_feedback_limit
            );
        }

        Ok(evaluation)
    }
}

/// Parse a raw reply into an evaluation; the raw text is kept on failure
pub fn parse_reply(raw: &str, display_name: &str) -> Result<Evaluation, EvaluationError> {
    let body = strip_code_fence(raw);

    let value: Value = serde_json::from_str(body).map_err(|e| EvaluationError::MalformedResponse {
        raw: raw.to_string(),
        reason: e.to_string(),
    })?;

    let Value::Object(reply) = value else {
        return Err(EvaluationError::MalformedResponse {
            raw: raw.to_string(),
            reason: "expected a JSON object".to_string(),
        });
    };

    let mut result = EvaluationResult::with_sentinels(display_name);
    let missing_fields = result.apply_reply(&reply);
    Ok(Evaluation {
        result,
        missing_fields,
    })
}

/// Unwrap a reply wrapped in a markdown code fence
fn strip_code_fence(raw: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n(.*?)\n?\s*```\s*$").expect("valid fence regex")
    });
    match fence.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EvaluationField, MISSING_FIELD};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Replies with a fixed text, or an empty reply with the given reason
    struct ScriptedModel {
        reply: Result<String, Option<String>>,
        requests: Arc<Mutex<Vec<GenerationRequest>>>,
    }

    #[async_trait]
    impl GenerativeModel for ScriptedModel {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String, EvaluationError> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply.clone().map_err(|reason| EvaluationError::EmptyResponse {
                model: "scripted".to_string(),
                reason,
            })
        }
    }

    const FULL_REPLY: &str = r###"{
        "I_ElementosCurriculares": "4/5",
        "II_SecuenciaDidactica": "3/5",
        "III_PrincipiosDidacticos": "5/5",
        "IV_InstrumentosEvaluacion": "2/5",
        "V_EvidenciasImplementacion": "4/5",
        "Total_Calculado": "18/25",
        "Retroalimentacion_Corta": "Buen trabajo",
        "Evaluacion_Completa_Markdown": "## PUNTOS FUERTES\n- claridad"
    }"###;

    #[test]
    fn test_parse_reply_not_json_keeps_raw() {
        let err = parse_reply("not json", "ana").unwrap_err();
        match err {
            EvaluationError::MalformedResponse { raw, .. } => assert_eq!(raw, "not json"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_reply_rejects_non_object() {
        assert!(matches!(
            parse_reply("[1, 2]", "ana"),
            Err(EvaluationError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_parse_reply_missing_short_feedback() {
        let evaluation = parse_reply(
            r#"{"I_ElementosCurriculares": "4/5", "Evaluacion_Completa_Markdown": "texto"}"#,
            "ana",
        )
        .unwrap();
        assert_eq!(evaluation.result.category_i, "4/5");
        assert_eq!(evaluation.result.short_feedback, MISSING_FIELD);
        assert!(evaluation.missing_fields.contains(&EvaluationField::ShortFeedback));
        assert_eq!(evaluation.full_evaluation_markdown(), "texto");
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{}\n```\n"), "{}");
        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn test_fenced_reply_parses() {
        let fenced = format!("```json\n{}\n```", FULL_REPLY);
        let evaluation = parse_reply(&fenced, "ana").unwrap();
        assert_eq!(evaluation.result.total, "18/25");
        assert!(!evaluation.is_degraded());
    }

    #[tokio::test]
    async fn test_evaluate_sends_config_parameters() {
        let config = Config {
            temperature: 0.2,
            max_output_tokens: 900,
            ..Config::default()
        };
        let requests = Arc::new(Mutex::new(Vec::new()));
        let model = ScriptedModel {
            reply: Ok(FULL_REPLY.to_string()),
            requests: Arc::clone(&requests),
        };
        let evaluator = Evaluator::new(&config, Box::new(model));

        let evaluation = evaluator.evaluate("prompt", "ana").await.unwrap();
        let (markdown, result) = evaluation.into_parts();
        assert_eq!(markdown, "## PUNTOS FUERTES\n- claridad");
        assert_eq!(result.student_name, "ana");
        assert_eq!(result.category_ii, "3/5");

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "prompt");
        assert_eq!(requests[0].temperature, 0.2);
        assert_eq!(requests[0].max_output_tokens, 900);
        assert_eq!(requests[0].response_schema["required"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_evaluate_propagates_empty_reply() {
        let model = ScriptedModel {
            reply: Err(Some("SAFETY".to_string())),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let evaluator = Evaluator::new(&Config::default(), Box::new(model));
        let err = evaluator.evaluate("prompt", "ana").await.unwrap_err();
        assert!(matches!(err, EvaluationError::EmptyResponse { reason: Some(_), .. }));
    }
}

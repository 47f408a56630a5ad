//! services/api/src/adapters/explain_llm.rs
//!
//! This module contains the adapter for the explanation-generating LLM.
//! It implements the `ExplanationService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = r#"You are "The Universal Explainer," an elite AI educator capable of breaking down ANY concept into crystal-clear understanding at multiple levels of depth.

Your mission: Transform complex information into masterful explanations that work for EVERYONE - from complete beginners to advanced learners.

From the user's transcript, you must provide exactly these fields:

{fields}

Return ONLY valid JSON with all of these fields and nothing else. Do not wrap it in markdown."#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::responses::{CreateResponseArgs, ResponseFormatJsonSchema},
    Client,
};
use async_trait::async_trait;
use explainer_core::{
    domain::Explanation,
    ports::{ExplanationService, PortError, PortResult},
    schema,
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{error, info};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$").expect("valid regex"));

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ExplanationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiExplainAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    max_output_tokens: u32,
    instructions: String,
    format: ResponseFormatJsonSchema,
}

impl OpenAiExplainAdapter {
    /// Creates a new `OpenAiExplainAdapter` around the process-wide client.
    pub fn new(client: Client<OpenAIConfig>, model: String, max_output_tokens: u32) -> Self {
        Self {
            client,
            model,
            max_output_tokens,
            instructions: build_instructions(),
            format: response_format(),
        }
    }
}

/// The fixed instruction prompt, with the field list derived from `schema::FIELDS`.
pub fn build_instructions() -> String {
    SYSTEM_INSTRUCTIONS.replace("{fields}", &schema::prompt_field_list())
}

/// Strict structured output: the model must answer with JSON matching the schema.
pub fn response_format() -> ResponseFormatJsonSchema {
    ResponseFormatJsonSchema {
        description: Some("A multi-level explanation of the user's text.".to_string()),
        name: "explanation".to_string(),
        schema: Some(schema::response_schema()),
        strict: Some(true),
    }
}

/// Models sometimes wrap JSON in a markdown fence despite being told not to.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match CODE_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => trimmed,
    }
}

/// Validates the model's raw output text. Logs the full body on failure.
pub fn parse_model_output(raw: &str) -> PortResult<Explanation> {
    if raw.trim().is_empty() {
        error!("Explanation model returned no text content.");
        return Err(PortError::MalformedResponse("empty response".to_string()));
    }
    Explanation::from_model_json(strip_code_fence(raw)).map_err(|e| {
        error!("Failed to parse explanation response: {}. Raw body: {}", e, raw);
        e
    })
}

//=========================================================================================
// `ExplanationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ExplanationService for OpenAiExplainAdapter {
    /// Sends the user's text as the content to explain. Exactly one attempt.
    async fn explain(&self, text: &str) -> PortResult<Explanation> {
        info!(model = %self.model, chars = text.chars().count(), "Requesting explanation");

        let request = CreateResponseArgs::default()
            .model(&self.model)
            .instructions(self.instructions.as_str())
            .input(text.to_string())
            .max_output_tokens(self.max_output_tokens)
            .text(self.format.clone())
            .build()
            .map_err(|e| {
                error!("Failed to build explanation request: {:?}", e);
                PortError::GenerationFailed(e.to_string())
            })?;

        let response = self
            .client
            .responses()
            .create(request)
            .await
            .map_err(|e: OpenAIError| {
                error!("Error generating explanation: {:?}", e);
                PortError::GenerationFailed(e.to_string())
            })?;

        let raw = response.output_text().unwrap_or_default();
        let explanation = parse_model_output(&raw)?;
        info!(id = %explanation.id, subject = %explanation.subject, "Explanation generated");
        Ok(explanation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_body(subject: &str) -> String {
        let mut obj = serde_json::Map::new();
        for f in schema::FIELDS.iter() {
            let value = match f.kind {
                schema::FieldKind::Text => serde_json::json!(format!("{} text", f.key)),
                schema::FieldKind::List => serde_json::json!([format!("{} item", f.key)]),
                schema::FieldKind::Glossary => {
                    serde_json::json!([{ "term": "t", "definition": "d" }])
                }
            };
            obj.insert(f.key.to_string(), value);
        }
        obj.insert("subject".to_string(), serde_json::json!(subject));
        serde_json::Value::Object(obj).to_string()
    }

    #[test]
    fn instructions_name_every_field() {
        let instructions = build_instructions();
        for f in schema::FIELDS.iter() {
            assert!(instructions.contains(f.key));
        }
        assert!(!instructions.contains("{fields}"));
    }

    #[test]
    fn requests_strict_schema_output() {
        let format = response_format();
        assert_eq!(format.name, "explanation");
        assert_eq!(format.strict, Some(true));

        let schema_value = format.schema.unwrap();
        assert_eq!(schema_value["additionalProperties"], false);
        assert_eq!(schema_value["required"].as_array().unwrap().len(), schema::FIELDS.len());
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let body = complete_body("Quantum Entanglement");
        let fenced = format!("```json\n{}\n```", body);
        assert_eq!(strip_code_fence(&fenced), body);
        assert_eq!(strip_code_fence(&body), body);

        let explanation = parse_model_output(&fenced).unwrap();
        assert_eq!(explanation.subject, "Quantum Entanglement");
    }

    #[test]
    fn empty_output_is_malformed() {
        assert!(matches!(parse_model_output("  "), Err(PortError::MalformedResponse(_))));
    }

    #[test]
    fn missing_glossary_is_malformed() {
        let mut value: serde_json::Value = serde_json::from_str(&complete_body("X")).unwrap();
        value.as_object_mut().unwrap().remove("glossary");
        let err = parse_model_output(&value.to_string()).unwrap_err();
        assert!(matches!(err, PortError::MalformedResponse(_)));
    }
}

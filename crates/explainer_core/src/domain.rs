//! crates/explainer_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! The wire names follow the camelCase keys the generation model is asked to produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::ports::{PortError, PortResult};
use crate::schema;

/// A single `{term, definition}` pair from the glossary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
}

/// A structured, multi-level explanation of one subject.
///
/// Created once per successful generation request and never mutated afterwards;
/// starting a new topic replaces it wholesale. `id` and `generated_at` are always
/// assigned locally, never taken from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
    pub subject: String,
    pub core_message: String,
    pub eli5: String,
    pub intermediate: String,
    pub advanced: String,
    pub technical_depth: String,
    pub key_terms: Vec<String>,
    pub glossary: Vec<GlossaryEntry>,
    pub analogy: String,
    pub visual_description: String,
    pub example: String,
    pub counter_example: String,
    pub real_world_implementation: String,
    pub use_cases: Vec<String>,
    pub historical_context: String,
    pub future_implications: String,
    pub common_misconceptions: Vec<String>,
    pub related_concepts: Vec<String>,
    pub practical_exercise: String,
    pub summary: String,
}

/// A borrowed view of one schema field's value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    List(&'a [String]),
    Glossary(&'a [GlossaryEntry]),
}

impl Explanation {
    /// Validates a raw model response and turns it into an `Explanation` with a fresh id.
    ///
    /// Every key in [`schema::FIELDS`] must be present and every text field non-blank.
    /// Lists may be empty. Nothing partial is ever returned.
    pub fn from_model_json(raw: &str) -> PortResult<Self> {
        let mut value: Value = serde_json::from_str(raw)
            .map_err(|e| PortError::MalformedResponse(format!("response is not JSON: {}", e)))?;

        let missing = schema::missing_fields(&value);
        if !missing.is_empty() {
            return Err(PortError::MalformedResponse(format!(
                "response is missing required fields: {}",
                missing.join(", ")
            )));
        }

        // Identity is local; anything the model put there is dropped.
        if let Some(obj) = value.as_object_mut() {
            obj.remove("id");
            obj.remove("generatedAt");
        }
        let explanation: Explanation = serde_json::from_value(value)
            .map_err(|e| PortError::MalformedResponse(format!("response has the wrong shape: {}", e)))?;

        let blank: Vec<&str> = explanation
            .text_fields()
            .into_iter()
            .filter(|(_, text)| text.trim().is_empty())
            .map(|(key, _)| key)
            .collect();
        if !blank.is_empty() {
            return Err(PortError::MalformedResponse(format!(
                "response has empty required fields: {}",
                blank.join(", ")
            )));
        }
        if explanation
            .glossary
            .iter()
            .any(|g| g.term.trim().is_empty() || g.definition.trim().is_empty())
        {
            return Err(PortError::MalformedResponse(
                "response has a glossary entry without a term or definition".to_string(),
            ));
        }

        Ok(explanation)
    }

    /// The narrative shown for one difficulty level.
    pub fn narrative(&self, level: DifficultyLevel) -> &str {
        match level {
            DifficultyLevel::Elementary => &self.eli5,
            DifficultyLevel::Intermediate => &self.intermediate,
            DifficultyLevel::Advanced => &self.advanced,
            DifficultyLevel::Technical => &self.technical_depth,
        }
    }

    /// The value stored under a wire key, or `None` for a key outside the schema.
    pub fn value(&self, key: &str) -> Option<FieldValue<'_>> {
        use FieldValue::{Glossary, List, Text};
        let value = match key {
            "subject" => Text(&self.subject),
            "coreMessage" => Text(&self.core_message),
            "eli5" => Text(&self.eli5),
            "intermediate" => Text(&self.intermediate),
            "advanced" => Text(&self.advanced),
            "technicalDepth" => Text(&self.technical_depth),
            "keyTerms" => List(&self.key_terms),
            "glossary" => Glossary(&self.glossary),
            "analogy" => Text(&self.analogy),
            "visualDescription" => Text(&self.visual_description),
            "example" => Text(&self.example),
            "counterExample" => Text(&self.counter_example),
            "realWorldImplementation" => Text(&self.real_world_implementation),
            "useCases" => List(&self.use_cases),
            "historicalContext" => Text(&self.historical_context),
            "futureImplications" => Text(&self.future_implications),
            "commonMisconceptions" => List(&self.common_misconceptions),
            "relatedConcepts" => List(&self.related_concepts),
            "practicalExercise" => Text(&self.practical_exercise),
            "summary" => Text(&self.summary),
            _ => return None,
        };
        Some(value)
    }

    /// All scalar text fields in schema order, keyed by their wire name.
    pub fn text_fields(&self) -> Vec<(&'static str, &str)> {
        schema::FIELDS
            .iter()
            .filter_map(|f| match self.value(f.key)? {
                FieldValue::Text(text) => Some((f.key, text)),
                _ => None,
            })
            .collect()
    }

    /// All plain string lists in schema order, keyed by their wire name.
    pub fn list_fields(&self) -> Vec<(&'static str, &[String])> {
        schema::FIELDS
            .iter()
            .filter_map(|f| match self.value(f.key)? {
                FieldValue::List(items) => Some((f.key, items)),
                _ => None,
            })
            .collect()
    }
}

//=========================================================================================
// Difficulty Level
//=========================================================================================

/// Display selector for the four narrative fields. UI state only; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    #[serde(rename = "eli5", alias = "elementary")]
    Elementary,
    #[default]
    Intermediate,
    Advanced,
    #[serde(alias = "technicaldepth")]
    Technical,
}

impl DifficultyLevel {
    /// The fixed display order of the level selector.
    pub const ALL: [DifficultyLevel; 4] = [
        DifficultyLevel::Elementary,
        DifficultyLevel::Intermediate,
        DifficultyLevel::Advanced,
        DifficultyLevel::Technical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyLevel::Elementary => "eli5",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
            DifficultyLevel::Technical => "technical",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DifficultyLevel::Elementary => "Explain Like I'm 5",
            DifficultyLevel::Intermediate => "Intermediate Level",
            DifficultyLevel::Advanced => "Advanced Level",
            DifficultyLevel::Technical => "Technical Depth",
        }
    }

    /// The name shown on the level selector.
    pub fn short_label(self) -> &'static str {
        match self {
            DifficultyLevel::Elementary => "ELI5",
            DifficultyLevel::Intermediate => "Intermediate",
            DifficultyLevel::Advanced => "Advanced",
            DifficultyLevel::Technical => "Technical",
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            DifficultyLevel::Elementary => "ELI5",
            DifficultyLevel::Intermediate => "INT",
            DifficultyLevel::Advanced => "ADV",
            DifficultyLevel::Technical => "TECH",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eli5" | "elementary" => Ok(DifficultyLevel::Elementary),
            "intermediate" => Ok(DifficultyLevel::Intermediate),
            "advanced" => Ok(DifficultyLevel::Advanced),
            "technical" | "technicaldepth" => Ok(DifficultyLevel::Technical),
            other => Err(PortError::Validation(format!("unknown difficulty level '{}'", other))),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A schema-complete model response used across the crate's tests.
    pub(crate) fn sample_json(subject: &str) -> Value {
        serde_json::json!({
            "subject": subject,
            "coreMessage": "Two particles can share one quantum state.",
            "eli5": "Two magic coins that always land the same way.",
            "intermediate": "Measuring one particle tells you about the other.",
            "advanced": "The joint state cannot be factored into individual states.",
            "technicalDepth": "A non-separable state in a tensor product Hilbert space.",
            "keyTerms": ["superposition", "measurement"],
            "glossary": [{ "term": "qubit", "definition": "A two-level quantum system." }],
            "analogy": "A pair of gloves shipped to different cities.",
            "visualDescription": "Two spheres joined by a glowing thread.",
            "example": "Bell test experiments.",
            "counterExample": "Two coins flipped independently.",
            "realWorldImplementation": "Quantum key distribution.",
            "useCases": ["cryptography", "teleportation"],
            "historicalContext": "EPR paper, 1935.",
            "futureImplications": "A quantum internet.",
            "commonMisconceptions": ["It allows faster-than-light messaging."],
            "relatedConcepts": ["decoherence"],
            "practicalExercise": "Simulate a Bell pair with two qubits.",
            "summary": "Entangled particles share correlations no classical model explains."
        })
    }

    pub(crate) fn sample_explanation(subject: &str) -> Explanation {
        Explanation::from_model_json(&sample_json(subject).to_string()).unwrap()
    }

    #[test]
    fn complete_response_gets_identity() {
        let explanation = sample_explanation("Quantum Entanglement");
        assert_eq!(explanation.subject, "Quantum Entanglement");
        assert!(!explanation.id.is_nil());
        assert!(explanation.text_fields().iter().all(|(_, t)| !t.is_empty()));
    }

    #[test]
    fn identities_are_never_reused() {
        let a = sample_explanation("A");
        let b = sample_explanation("A");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn missing_glossary_is_malformed() {
        let mut value = sample_json("Quantum Entanglement");
        value.as_object_mut().unwrap().remove("glossary");
        let err = Explanation::from_model_json(&value.to_string()).unwrap_err();
        match err {
            PortError::MalformedResponse(msg) => assert!(msg.contains("glossary")),
            other => panic!("expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn blank_scalar_is_malformed() {
        let mut value = sample_json("X");
        value["analogy"] = Value::String("   ".to_string());
        let err = Explanation::from_model_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, PortError::MalformedResponse(ref m) if m.contains("analogy")));
    }

    #[test]
    fn empty_lists_are_accepted() {
        let mut value = sample_json("X");
        value["useCases"] = serde_json::json!([]);
        value["glossary"] = serde_json::json!([]);
        let explanation = Explanation::from_model_json(&value.to_string()).unwrap();
        assert!(explanation.use_cases.is_empty());
        assert!(explanation.glossary.is_empty());
    }

    #[test]
    fn non_json_is_malformed() {
        let err = Explanation::from_model_json("Sure! Here is your explanation").unwrap_err();
        assert!(matches!(err, PortError::MalformedResponse(_)));
    }

    #[test]
    fn wrong_type_is_malformed() {
        let mut value = sample_json("X");
        value["keyTerms"] = Value::String("not a list".to_string());
        let err = Explanation::from_model_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, PortError::MalformedResponse(_)));
    }

    #[test]
    fn each_level_selects_its_own_narrative() {
        let e = sample_explanation("X");
        let narratives: Vec<&str> = DifficultyLevel::ALL.iter().map(|l| e.narrative(*l)).collect();
        assert_eq!(
            narratives,
            vec![
                e.eli5.as_str(),
                e.intermediate.as_str(),
                e.advanced.as_str(),
                e.technical_depth.as_str()
            ]
        );
    }

    #[test]
    fn level_defaults_to_intermediate_and_parses_aliases() {
        assert_eq!(DifficultyLevel::default(), DifficultyLevel::Intermediate);
        assert_eq!("ELI5".parse::<DifficultyLevel>().unwrap(), DifficultyLevel::Elementary);
        assert_eq!("elementary".parse::<DifficultyLevel>().unwrap(), DifficultyLevel::Elementary);
        assert_eq!("technicalDepth".parse::<DifficultyLevel>().unwrap(), DifficultyLevel::Technical);
        assert!("expert".parse::<DifficultyLevel>().is_err());
    }

    #[test]
    fn every_schema_key_resolves_to_its_kind() {
        let e = sample_explanation("X");
        for f in schema::FIELDS.iter() {
            let kind = match e.value(f.key) {
                Some(FieldValue::Text(_)) => schema::FieldKind::Text,
                Some(FieldValue::List(_)) => schema::FieldKind::List,
                Some(FieldValue::Glossary(_)) => schema::FieldKind::Glossary,
                None => panic!("{} has no value", f.key),
            };
            assert_eq!(kind, f.kind, "{}", f.key);
        }
        assert!(e.value("id").is_none());
    }

    #[test]
    fn model_supplied_identity_is_ignored() {
        let mut value = sample_json("X");
        value["id"] = Value::String("not-a-uuid".to_string());
        value["generatedAt"] = Value::String("yesterday".to_string());
        let explanation = Explanation::from_model_json(&value.to_string()).unwrap();
        assert!(!explanation.id.is_nil());
    }

    #[test]
    fn serializes_with_wire_names() {
        let e = sample_explanation("X");
        let value = serde_json::to_value(&e).unwrap();
        assert!(value.get("technicalDepth").is_some());
        assert!(value.get("counterExample").is_some());
        assert!(value.get("generatedAt").is_some());
    }
}

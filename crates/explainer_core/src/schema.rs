//! crates/explainer_core/src/schema.rs
//!
//! The one place the explanation's required fields are enumerated. The prompt, the
//! output schema sent to the model, the required-key check and the exporter's section
//! layout are all derived from `FIELDS`.

use serde_json::{json, Map, Value};

/// The JSON shape of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    List,
    Glossary,
}

/// One required top-level key of the model's response.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub guidance: &'static str,
}

pub static FIELDS: [FieldSpec; 20] = [
    FieldSpec { key: "subject", label: "Subject", kind: FieldKind::Text, guidance: "Identify the main topic/subject being discussed" },
    FieldSpec { key: "coreMessage", label: "Core Message", kind: FieldKind::Text, guidance: "The single most critical takeaway (1-2 sentences)" },
    FieldSpec { key: "eli5", label: "ELI5 (Explain Like I'm 5)", kind: FieldKind::Text, guidance: "Explain using simple words, analogies a child would understand" },
    FieldSpec { key: "intermediate", label: "Intermediate Level", kind: FieldKind::Text, guidance: "For someone with basic background knowledge" },
    FieldSpec { key: "advanced", label: "Advanced Level", kind: FieldKind::Text, guidance: "In-depth explanation with nuances and complexities" },
    FieldSpec { key: "technicalDepth", label: "Technical Depth", kind: FieldKind::Text, guidance: "Technical/academic perspective with precise terminology" },
    FieldSpec { key: "keyTerms", label: "Key Terms", kind: FieldKind::List, guidance: "List 3-5 most important terms/concepts (array of strings)" },
    FieldSpec { key: "glossary", label: "Glossary", kind: FieldKind::Glossary, guidance: "Define each key term simply (array of objects: {term, definition})" },
    FieldSpec { key: "analogy", label: "Analogy", kind: FieldKind::Text, guidance: "Create a memorable, relatable analogy that perfectly captures the concept" },
    FieldSpec { key: "visualDescription", label: "Visual Description", kind: FieldKind::Text, guidance: "Describe how to visualize this concept (for mental models)" },
    FieldSpec { key: "example", label: "Example", kind: FieldKind::Text, guidance: "A clear, concrete example demonstrating the concept" },
    FieldSpec { key: "counterExample", label: "Counter Example", kind: FieldKind::Text, guidance: "Show what it's NOT or a common mistake" },
    FieldSpec { key: "realWorldImplementation", label: "Real-World Implementation", kind: FieldKind::Text, guidance: "How it's actually used in practice" },
    FieldSpec { key: "useCases", label: "Use Cases", kind: FieldKind::List, guidance: "3-5 specific scenarios where this applies (array of strings)" },
    FieldSpec { key: "historicalContext", label: "Historical Context", kind: FieldKind::Text, guidance: "Brief background of how this concept emerged" },
    FieldSpec { key: "futureImplications", label: "Future Implications", kind: FieldKind::Text, guidance: "Where this is heading, what it enables" },
    FieldSpec { key: "commonMisconceptions", label: "Common Misconceptions", kind: FieldKind::List, guidance: "2-3 things people often get wrong (array of strings)" },
    FieldSpec { key: "relatedConcepts", label: "Related Concepts", kind: FieldKind::List, guidance: "Other topics to explore for deeper understanding (array of strings)" },
    FieldSpec { key: "practicalExercise", label: "Practical Exercise", kind: FieldKind::Text, guidance: "A simple activity to reinforce understanding" },
    FieldSpec { key: "summary", label: "Summary", kind: FieldKind::Text, guidance: "2-3 sentence recap tying everything together" },
];

/// Looks up a field by its wire key.
pub fn field(key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.key == key)
}

/// Required keys absent from a response object. A non-object response is missing all of them.
pub fn missing_fields(value: &Value) -> Vec<&'static str> {
    match value.as_object() {
        Some(obj) => FIELDS
            .iter()
            .filter(|f| obj.get(f.key).map_or(true, Value::is_null))
            .map(|f| f.key)
            .collect(),
        None => FIELDS.iter().map(|f| f.key).collect(),
    }
}

/// The JSON schema of the model's response.
pub fn response_schema() -> Value {
    let mut properties = Map::new();
    for f in FIELDS.iter() {
        let schema = match f.kind {
            FieldKind::Text => json!({ "type": "string" }),
            FieldKind::List => json!({ "type": "array", "items": { "type": "string" } }),
            FieldKind::Glossary => json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "term": { "type": "string" },
                        "definition": { "type": "string" }
                    },
                    "required": ["term", "definition"],
                    "additionalProperties": false
                }
            }),
        };
        properties.insert(f.key.to_string(), schema);
    }
    let required: Vec<&str> = FIELDS.iter().map(|f| f.key).collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

/// The numbered field list embedded in the instruction prompt.
pub fn prompt_field_list() -> String {
    FIELDS
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{}. **{}** (`{}`): {}", i + 1, f.label, f.key, f.guidance))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tests::sample_explanation;

    #[test]
    fn schema_requires_every_field() {
        let schema = response_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), FIELDS.len());
        for f in FIELDS.iter() {
            assert!(schema["properties"].get(f.key).is_some(), "{} missing from schema", f.key);
        }
    }

    #[test]
    fn domain_covers_exactly_the_schema() {
        let e = sample_explanation("X");
        let mut keys: Vec<&str> = e.text_fields().into_iter().map(|(k, _)| k).collect();
        keys.extend(e.list_fields().into_iter().map(|(k, _)| k));
        keys.push("glossary");
        keys.sort_unstable();

        let mut expected: Vec<&str> = FIELDS.iter().map(|f| f.key).collect();
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }

    #[test]
    fn null_counts_as_missing() {
        let value = json!({ "subject": null });
        let missing = missing_fields(&value);
        assert!(missing.contains(&"subject"));
        assert_eq!(missing.len(), FIELDS.len());
        assert_eq!(missing_fields(&json!([1, 2])).len(), FIELDS.len());
    }

    #[test]
    fn prompt_lists_every_key() {
        let list = prompt_field_list();
        assert!(FIELDS.iter().all(|f| list.contains(f.key)));
        assert!(list.starts_with("1. **Subject**"));
        assert_eq!(field("eli5").map(|f| f.kind), Some(FieldKind::Text));
    }
}

//! crates/explainer_core/src/export.rs
//!
//! Assembles the printable report for an explanation. The document is self-contained
//! HTML; turning it into a PDF is the job of a `DocumentRenderer`.

use askama::Template;
use regex::Regex;
use std::sync::LazyLock;

use crate::domain::{DifficultyLevel, Explanation, FieldValue};
use crate::ports::{PortError, PortResult};
use crate::schema;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Output formats the exporter can produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Html => "html",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Html => "text/html; charset=utf-8",
        }
    }
}

/// `Quantum  Entanglement` -> `quantum_entanglement_explanation.pdf`
pub fn export_filename(subject: &str, format: ExportFormat) -> String {
    let lowered = subject.trim().to_lowercase();
    let slug = WHITESPACE.replace_all(&lowered, "_");
    format!("{}_explanation.{}", slug, format.extension())
}

/// The report's grouped sections, after the core message and the four levels.
pub const REPORT_SECTIONS: [(&str, [&str; 2]); 7] = [
    ("Key Concepts", ["keyTerms", "glossary"]),
    ("Clarity Tools", ["analogy", "visualDescription"]),
    ("Examples", ["example", "counterExample"]),
    ("Application", ["realWorldImplementation", "useCases"]),
    ("Context & Depth", ["historicalContext", "futureImplications"]),
    ("Further Learning", ["commonMisconceptions", "relatedConcepts"]),
    ("Actionable Learning", ["practicalExercise", "summary"]),
];

const STYLES: &str = r#"
    body { font-family: 'Inter', 'Helvetica', 'Arial', sans-serif; font-size: 10pt; line-height: 1.5; color: #000; margin: 0; padding: 0; background-color: #fff; }
    .page-container { padding: 12mm 15mm; max-width: 100%; }
    .header { margin-bottom: 8mm; padding-bottom: 4mm; border-bottom: 2px solid #2563eb; }
    h1 { font-size: 24pt; font-weight: 700; margin: 0; }
    .subject { font-size: 14pt; color: #1e3a8a; font-weight: 600; margin-top: 1mm; }
    h2 { font-size: 16pt; font-weight: 700; margin: 8mm 0 3mm 0; color: #1e3a8a; border-bottom: 1px solid #93c5fd; padding-bottom: 2mm; }
    h3 { font-size: 12pt; font-weight: 600; margin: 4mm 0 2mm 0; color: #1e40af; }
    h4 { font-size: 10pt; font-weight: 700; color: #1d4ed8; margin: 0 0 1mm 0; }
    p { margin: 0 0 2.5mm 0; text-align: justify; }
    ul { margin: 0 0 3mm 0; padding-left: 5mm; }
    li { margin-bottom: 1.5mm; }
    .level-badge { display: inline-block; padding: 1mm 2.5mm; border-radius: 4px; font-size: 8pt; font-weight: 700; color: #fff; margin-right: 2mm; vertical-align: middle; }
    .level-container { margin-bottom: 4mm; padding: 4mm; border: 1px solid #e5e7eb; border-radius: 5px; background-color: #f9fafb; page-break-inside: avoid; }
    .glossary-item { margin-bottom: 3mm; padding-left: 3mm; border-left: 2px solid #60a5fa; }
    .section { margin-bottom: 5mm; page-break-inside: avoid; }
    .transcript-box { background: #f3f4f6; border: 1px solid #d1d5db; border-radius: 4px; padding: 4mm; font-size: 9pt; color: #4b5563; white-space: pre-wrap; word-wrap: break-word; font-family: 'Courier New', Courier, monospace; }
    .footer { margin-top: 6mm; font-size: 8pt; color: #6b7280; }
"#;

struct LevelBlock<'a> {
    color: &'static str,
    badge: &'static str,
    label: &'static str,
    text: &'a str,
}

struct ReportPart<'a> {
    heading: &'static str,
    body: FieldValue<'a>,
}

struct ReportSection<'a> {
    title: &'static str,
    parts: Vec<ReportPart<'a>>,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>{{ subject }} - Universal Explainer Report</title>
  <style>{{ styles|safe }}</style>
</head>
<body>
  <div class="page-container">
    <div class="header">
      <h1>Universal Explainer Report</h1>
      <p class="subject">{{ subject }}</p>
    </div>
    <div class="section">
      <h2>Core Message</h2>
      <p>{{ core_message }}</p>
    </div>
    <div class="section">
      <h2>Multi-level Understanding</h2>
      {% for level in levels %}
      <div class="level-container">
        <h3><span class="level-badge" style="background-color: {{ level.color }};">{{ level.badge }}</span>{{ level.label }}</h3>
        <p>{{ level.text }}</p>
      </div>
      {% endfor %}
    </div>
    {% for section in sections %}
    <div class="section">
      <h2>{{ section.title }}</h2>
      {% for part in section.parts %}
      <h3>{{ part.heading }}</h3>
      {% match part.body %}
      {% when FieldValue::Text with (text) %}
      <p>{{ text }}</p>
      {% when FieldValue::List with (items) %}
      <ul>{% for item in items %}<li>{{ item }}</li>{% endfor %}</ul>
      {% when FieldValue::Glossary with (entries) %}
      {% for entry in entries %}<div class="glossary-item"><h4>{{ entry.term }}</h4><p>{{ entry.definition }}</p></div>{% endfor %}
      {% endmatch %}
      {% endfor %}
    </div>
    {% endfor %}
    <div class="section">
      <h2>Original Transcript</h2>
      <div class="transcript-box">{{ transcript }}</div>
    </div>
    <p class="footer">Generated {{ generated }} &middot; {{ id }}</p>
  </div>
</body>
</html>"#,
    ext = "html"
)]
struct ReportTemplate<'a> {
    styles: &'static str,
    subject: &'a str,
    core_message: &'a str,
    levels: Vec<LevelBlock<'a>>,
    sections: Vec<ReportSection<'a>>,
    transcript: &'a str,
    generated: String,
    id: String,
}

fn level_color(level: DifficultyLevel) -> &'static str {
    match level {
        DifficultyLevel::Elementary => "#16a34a",
        DifficultyLevel::Intermediate => "#2563eb",
        DifficultyLevel::Advanced => "#7c3aed",
        DifficultyLevel::Technical => "#db2777",
    }
}

/// Builds the full report: every explanation field plus the original input, escaped.
pub fn render_document(explanation: &Explanation, transcript: &str) -> PortResult<String> {
    let levels = DifficultyLevel::ALL
        .iter()
        .map(|&level| LevelBlock {
            color: level_color(level),
            badge: level.badge(),
            label: level.label(),
            text: explanation.narrative(level),
        })
        .collect();

    let sections = REPORT_SECTIONS
        .iter()
        .map(|&(title, keys)| ReportSection {
            title,
            parts: keys
                .iter()
                .filter_map(|key| {
                    Some(ReportPart {
                        heading: schema::field(key)?.label,
                        body: explanation.value(key)?,
                    })
                })
                .collect(),
        })
        .collect();

    let template = ReportTemplate {
        styles: STYLES,
        subject: &explanation.subject,
        core_message: &explanation.core_message,
        levels,
        sections,
        transcript,
        generated: explanation.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        id: explanation.id.to_string(),
    };
    template
        .render()
        .map_err(|e| PortError::Unexpected(format!("failed to render report: {}", e)))
}

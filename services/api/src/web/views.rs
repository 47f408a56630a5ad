//! services/api/src/web/views.rs
//!
//! Server-rendered HTML for the two screens of the app: the input view and the
//! explanation view. Both are askama templates, so interpolated text is escaped.

use askama::Template;
use explainer_core::domain::{DifficultyLevel, Explanation, FieldValue};
use explainer_core::export::{export_filename, ExportFormat};
use explainer_core::schema;
use tracing::error;

const PAGE_STYLES: &str = r#"
  body { margin: 0; min-height: 100vh; background: #0b0d10; color: #e7edf3; font-family: 'Inter', system-ui, sans-serif; }
  main { max-width: 72rem; margin: 0 auto; padding: 2rem 1rem; }
  .centered { max-width: 48rem; text-align: center; }
  h1 { font-size: 2.5rem; font-weight: 800; margin: 0.5rem 0; }
  .lede { color: #94a3b8; }
  textarea { width: 100%; height: 12rem; padding: 1rem; box-sizing: border-box; background: #0f1217; color: inherit; border: 1px solid rgba(255,255,255,.1); border-radius: .5rem; resize: none; font-size: 1rem; }
  button, .button { display: inline-block; padding: .6rem 1.2rem; border-radius: .4rem; border: 1px solid rgba(255,255,255,.1); background: rgba(255,255,255,.05); color: #cbd5e1; font-weight: 600; text-decoration: none; cursor: pointer; }
  button.primary { margin-top: 1.5rem; padding: 1rem 2.5rem; font-size: 1.1rem; color: #fff; background: linear-gradient(to right, #6ea8ff, #9b8cff); border: none; }
  button:disabled, .button.disabled { opacity: .5; cursor: not-allowed; pointer-events: none; }
  .error { margin-top: 1rem; text-align: left; color: #f87171; background: rgba(127,29,29,.3); border: 1px solid rgba(239,68,68,.5); border-radius: .4rem; padding: .75rem; }
  header.view { display: flex; flex-wrap: wrap; justify-content: space-between; align-items: center; gap: 1rem; margin-bottom: 2rem; }
  .actions { display: flex; gap: .5rem; align-items: center; }
  .actions form { margin: 0; }
  .grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(20rem, 1fr)); gap: 1.5rem; }
  .card { border: 1px solid rgba(255,255,255,.1); background: rgba(255,255,255,.04); border-radius: .75rem; padding: 1.5rem; }
  .card h2, .card h3 { margin-top: 0; color: #f1f5f9; }
  .card p, .card li { color: #94a3b8; line-height: 1.6; white-space: pre-wrap; }
  .badges { display: flex; flex-wrap: wrap; gap: .5rem; margin-bottom: 1rem; }
  .badge { padding: .4rem 1rem; border-radius: 999px; font-size: .75rem; font-weight: 600; text-decoration: none; color: #cbd5e1; background: rgba(255,255,255,.05); }
  .badge.active { color: #0b0d10; background: #6ea8ff; }
  .glossary-item { border-left: 2px solid #6ea8ff; padding-left: 1rem; margin-bottom: 1rem; }
  .glossary-item h4 { margin: 0 0 .25rem 0; color: #6ea8ff; }
  .wide { margin-top: 1.5rem; }
"#;

const ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8"><title>Universal Explainer</title></head>
<body><main><h1>Something went wrong</h1><p>The page could not be rendered. Please try again.</p></main></body>
</html>"#;

fn render_or_error_page<T: Template>(template: &T) -> String {
    template.render().unwrap_or_else(|err| {
        error!("Failed to render page: {}", err);
        ERROR_PAGE.to_string()
    })
}

//=========================================================================================
// Input View
//=========================================================================================

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  {% if busy %}<meta http-equiv="refresh" content="3">{% endif %}
  <title>Universal Explainer</title>
  <style>{{ styles|safe }}</style>
</head>
<body>
<main class="centered" style="margin: 0 auto;">
  <h1>Universal Explainer</h1>
  <p class="lede">Paste any text, transcript, or concept below. It will be broken down into a comprehensive, multi-layered explanation for any level of understanding.</p>
  <form method="post" action="/generate">
    <textarea name="text" placeholder="Paste your text here... For example: 'How does public-key cryptography work?'" oninput="this.form.elements.submit.disabled = !this.value.trim()"{% if busy %} disabled{% endif %}>{{ transcript }}</textarea>
    {% if has_error %}<div class="error" role="alert"><p><strong>Error:</strong> {{ error }}</p></div>{% endif %}
    <button class="primary" type="submit" name="submit"{% if submit_disabled %} disabled{% endif %}>{% if busy %}Analyzing...{% else %}Generate Explanation{% endif %}</button>
  </form>
  {% if busy %}
  <form method="post" action="/reset"><button type="submit">Cancel</button></form>
  {% endif %}
</main>
</body>
</html>"#,
    ext = "html"
)]
struct InputTemplate<'a> {
    styles: &'static str,
    transcript: &'a str,
    error: &'a str,
    has_error: bool,
    busy: bool,
    submit_disabled: bool,
}

/// The collecting screen: the text field, the submit button and the last error.
///
/// While busy the page refreshes itself and offers a way to cancel.
pub fn render_input_view(transcript: &str, error: Option<&str>, busy: bool) -> String {
    render_or_error_page(&InputTemplate {
        styles: PAGE_STYLES,
        transcript,
        error: error.unwrap_or_default(),
        has_error: error.is_some(),
        busy,
        submit_disabled: busy || transcript.trim().is_empty(),
    })
}

//=========================================================================================
// Explanation View
//=========================================================================================

/// Card rows below the header, in display order. The narrative card leads the first row.
const CARD_ROWS: [(&str, &[&str]); 4] = [
    (
        "grid",
        &[
            "keyTerms",
            "analogy",
            "visualDescription",
            "example",
            "counterExample",
            "practicalExercise",
            "glossary",
            "useCases",
            "realWorldImplementation",
        ],
    ),
    ("grid wide", &["historicalContext", "futureImplications"]),
    ("grid wide", &["commonMisconceptions", "relatedConcepts"]),
    ("wide", &["summary"]),
];

struct Badge {
    slug: &'static str,
    label: &'static str,
    active: bool,
}

struct Card<'a> {
    title: &'static str,
    body: FieldValue<'a>,
}

struct CardRow<'a> {
    class: &'static str,
    cards: Vec<Card<'a>>,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ subject }}</title>
  <style>{{ styles|safe }}</style>
</head>
<body>
<main>
  <header class="view">
    <div>
      <h1>{{ subject }}</h1>
      <p class="lede">{{ core_message }}</p>
    </div>
    <div class="actions">
      {% if pdf_ready %}
      <a class="button" href="/export?format=pdf" download="{{ pdf_filename }}">Export to PDF</a>
      {% else %}
      <span class="button disabled" aria-disabled="true" title="The PDF renderer is not ready">Export to PDF</span>
      {% endif %}
      <a class="button" href="/export?format=html">Export to HTML</a>
      <form method="post" action="/reset"><button type="submit">New Topic</button></form>
    </div>
  </header>
  {% for row in rows %}
  <div class="{{ row.class }}">
    {% if loop.first %}
    <section class="card" id="multi-level">
      <h2>Multi-Level Explanation</h2>
      <div class="badges">{% for badge in badges %}<a class="badge{% if badge.active %} active{% endif %}" href="/?level={{ badge.slug }}">{{ badge.label }}</a>{% endfor %}</div>
      <p id="narrative" data-level="{{ level }}">{{ narrative }}</p>
    </section>
    {% endif %}
    {% for card in row.cards %}
    <section class="card"><h3>{{ card.title }}</h3>
      {% match card.body %}
      {% when FieldValue::Text with (text) %}
      <p>{{ text }}</p>
      {% when FieldValue::List with (items) %}
      <ul>{% for item in items %}<li>{{ item }}</li>{% endfor %}</ul>
      {% when FieldValue::Glossary with (entries) %}
      {% for entry in entries %}<div class="glossary-item"><h4>{{ entry.term }}</h4><p>{{ entry.definition }}</p></div>{% endfor %}
      {% endmatch %}
    </section>
    {% endfor %}
  </div>
  {% endfor %}
</main>
</body>
</html>"#,
    ext = "html"
)]
struct ExplanationTemplate<'a> {
    styles: &'static str,
    subject: &'a str,
    core_message: &'a str,
    pdf_ready: bool,
    pdf_filename: String,
    badges: Vec<Badge>,
    level: &'static str,
    narrative: &'a str,
    rows: Vec<CardRow<'a>>,
}

/// The reviewing screen. Only the narrative for `level` is shown; everything else is
/// independent of the selected level.
pub fn render_explanation_view(explanation: &Explanation, level: DifficultyLevel, pdf_ready: bool) -> String {
    let badges = DifficultyLevel::ALL
        .iter()
        .map(|&l| Badge {
            slug: l.as_str(),
            label: l.short_label(),
            active: l == level,
        })
        .collect();

    let rows = CARD_ROWS
        .iter()
        .map(|&(class, keys)| CardRow {
            class,
            cards: keys
                .iter()
                .filter_map(|key| {
                    Some(Card {
                        title: schema::field(key)?.label,
                        body: explanation.value(key)?,
                    })
                })
                .collect(),
        })
        .collect();

    render_or_error_page(&ExplanationTemplate {
        styles: PAGE_STYLES,
        subject: &explanation.subject,
        core_message: &explanation.core_message,
        pdf_ready,
        pdf_filename: export_filename(&explanation.subject, ExportFormat::Pdf),
        badges,
        level: level.as_str(),
        narrative: explanation.narrative(level),
        rows,
    })
}

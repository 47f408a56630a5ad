pub mod domain;
pub mod export;
pub mod ports;
pub mod schema;
pub mod shell;

pub use domain::{DifficultyLevel, Explanation, FieldValue, GlossaryEntry};
pub use export::{export_filename, render_document, ExportFormat};
pub use ports::{DocumentRenderer, ExplanationService, PortError, PortResult};
pub use shell::{Outcome, Phase, Shell, Ticket};

pub mod explain_llm;
pub mod pdf;

pub use explain_llm::OpenAiExplainAdapter;
pub use pdf::{RendererLoader, WkhtmltopdfRenderer};

//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document of the explainer's JSON API (explanation generation,
//! file upload, document export and health) to disk. The browser pages are not part
//! of it.
//!
//! Usage: `openapi [PATH]`, defaulting to `openapi.json`.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "openapi.json".to_string());
    let document = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(&path, document)?;
    println!("Wrote the explainer API description to {}", path);
    Ok(())
}

//! services/api/src/adapters/pdf.rs
//!
//! PDF conversion for exported reports. `WkhtmltopdfRenderer` implements the
//! `DocumentRenderer` port by piping HTML through an external converter, and
//! `RendererLoader` owns the one-time discovery of that converter.

use async_trait::async_trait;
use explainer_core::ports::{DocumentRenderer, PortError, PortResult};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

//=========================================================================================
// The Renderer Adapter
//=========================================================================================

/// Renders HTML to PDF with `wkhtmltopdf` (or a compatible CLI reading stdin, writing stdout).
#[derive(Clone, Debug)]
pub struct WkhtmltopdfRenderer {
    program: PathBuf,
}

impl WkhtmltopdfRenderer {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

#[async_trait]
impl DocumentRenderer for WkhtmltopdfRenderer {
    async fn render_pdf(&self, html: &str) -> PortResult<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .args([
                "--quiet",
                "--encoding",
                "utf-8",
                "--page-size",
                "A4",
                "--orientation",
                "Portrait",
                "--margin-top",
                "10mm",
                "--margin-right",
                "10mm",
                "--margin-bottom",
                "10mm",
                "--margin-left",
                "10mm",
                "-",
                "-",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                error!("Failed to start {}: {}", self.program.display(), e);
                PortError::Unexpected(format!("failed to start PDF converter: {}", e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(html.as_bytes()).await.map_err(|e| {
                PortError::Unexpected(format!("failed to write to PDF converter: {}", e))
            })?;
            // Dropping stdin closes the pipe so the converter sees EOF.
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| PortError::Unexpected(format!("PDF converter did not finish: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                "PDF converter failed (exit {}): {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
            return Err(PortError::Unexpected("PDF conversion failed".to_string()));
        }

        Ok(output.stdout)
    }
}

//=========================================================================================
// The Resource Loader
//=========================================================================================

type Locate = Box<dyn Fn() -> Option<Arc<dyn DocumentRenderer>> + Send + Sync>;

/// Owns the readiness of the PDF renderer.
///
/// The renderer is located at most once per process; every caller of `ensure_ready`
/// awaits the same load. A failed lookup leaves export unavailable for the process
/// lifetime.
pub struct RendererLoader {
    locate: Locate,
    cell: OnceCell<Option<Arc<dyn DocumentRenderer>>>,
    attempts: AtomicUsize,
}

impl RendererLoader {
    /// A loader that looks for `program` on the `PATH` (or at that path).
    pub fn for_program(program: String) -> Self {
        Self::new(move || match which::which(&program) {
            Ok(path) => {
                info!("PDF converter found at {}", path.display());
                Some(Arc::new(WkhtmltopdfRenderer::new(path)) as Arc<dyn DocumentRenderer>)
            }
            Err(e) => {
                warn!("PDF converter '{}' not found ({}); PDF export disabled", program, e);
                None
            }
        })
    }

    pub fn new<F>(locate: F) -> Self
    where
        F: Fn() -> Option<Arc<dyn DocumentRenderer>> + Send + Sync + 'static,
    {
        Self {
            locate: Box::new(locate),
            cell: OnceCell::new(),
            attempts: AtomicUsize::new(0),
        }
    }

    /// A loader that is ready immediately with `renderer`.
    pub fn ready(renderer: Arc<dyn DocumentRenderer>) -> Self {
        let loader = Self::new(|| None);
        let _ = loader.cell.set(Some(renderer));
        loader
    }

    /// Loads the renderer if nobody has yet, and waits for the shared load to finish.
    pub async fn ensure_ready(&self) -> Option<Arc<dyn DocumentRenderer>> {
        self.cell
            .get_or_init(|| async {
                self.attempts.fetch_add(1, Ordering::SeqCst);
                (self.locate)()
            })
            .await
            .clone()
    }

    /// Non-blocking readiness check, used to enable or disable the export action.
    pub fn is_ready(&self) -> bool {
        matches!(self.cell.get(), Some(Some(_)))
    }

    /// The renderer if it has finished loading.
    pub fn renderer(&self) -> Option<Arc<dyn DocumentRenderer>> {
        self.cell.get().cloned().flatten()
    }

    /// How many times the locate step actually ran.
    pub fn load_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Returns a fixed byte payload instead of invoking a converter.
    pub(crate) struct StubRenderer;

    #[async_trait]
    impl DocumentRenderer for StubRenderer {
        async fn render_pdf(&self, html: &str) -> PortResult<Vec<u8>> {
            let mut out = b"%PDF-1.4\n".to_vec();
            out.extend_from_slice(&html.len().to_le_bytes());
            Ok(out)
        }
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_load() {
        let loader = Arc::new(RendererLoader::new(|| {
            Some(Arc::new(StubRenderer) as Arc<dyn DocumentRenderer>)
        }));
        assert!(!loader.is_ready());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = loader.clone();
                tokio::spawn(async move { loader.ensure_ready().await.is_some() })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert!(loader.is_ready());
        assert_eq!(loader.load_attempts(), 1);
        assert!(loader.renderer().is_some());
    }

    #[tokio::test]
    async fn missing_converter_is_not_retried() {
        let loader = RendererLoader::new(|| None);
        assert!(loader.ensure_ready().await.is_none());
        assert!(loader.ensure_ready().await.is_none());
        assert!(!loader.is_ready());
        assert_eq!(loader.load_attempts(), 1);
    }

    #[tokio::test]
    async fn unknown_program_leaves_export_unavailable() {
        let loader = RendererLoader::for_program("definitely-not-a-pdf-converter-1b7c".to_string());
        assert!(loader.ensure_ready().await.is_none());
        assert!(loader.renderer().is_none());
    }

    #[tokio::test]
    async fn preloaded_loader_is_ready() {
        let loader = RendererLoader::ready(Arc::new(StubRenderer));
        assert!(loader.is_ready());
        let bytes = loader.ensure_ready().await.unwrap().render_pdf("<p>x</p>").await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(loader.load_attempts(), 0);
    }
}

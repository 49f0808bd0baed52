//! Hands a snapshot of the export target to the rasterizer and checks what
//! comes back.

use crate::artifact::{ArtifactLocator, ArtifactStore};
use crate::error::ExportError;
use crate::platform::Host;
use crate::target::ExportTarget;
use folio_render_core::{ExportOptions, Rasterizer, RenderError};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::task;

pub struct RenderingAdapter<R> {
    rasterizer: Arc<R>,
    options: Arc<ExportOptions>,
}

impl<R: Rasterizer + 'static> RenderingAdapter<R> {
    pub fn new(rasterizer: Arc<R>, options: ExportOptions) -> Self {
        Self {
            rasterizer,
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Rasterizes the target as it looks right now.
    ///
    /// The rasterizer runs on the blocking pool against a snapshot. A run that
    /// exceeds the render timeout is reported as failed; its thread is left to
    /// finish on its own and its result is discarded. Never retries.
    pub async fn render_to_bytes(&self, target: &ExportTarget) -> Result<Vec<u8>, ExportError> {
        let snapshot = target.snapshot();
        let rasterizer = Arc::clone(&self.rasterizer);
        let options = Arc::clone(&self.options);
        let timeout = self.options.render_timeout();
        let started = Instant::now();

        debug!("Starting {} rasterizer", rasterizer.name());
        let handle = task::spawn_blocking(move || rasterizer.rasterize(&snapshot, &options));
        let joined = tokio::time::timeout(timeout, handle)
            .await
            .map_err(|_| RenderError::Timeout(timeout))?;
        let bytes = joined
            .map_err(|e| RenderError::Other(format!("rasterizer task failed: {}", e)))??;

        verify_pdf(&bytes)?;
        info!(
            "Rendered {} bytes in {:.2?}",
            bytes.len(),
            started.elapsed()
        );
        Ok(bytes)
    }

    pub async fn render_and_persist<H: Host>(
        &self,
        target: &ExportTarget,
        host: &H,
        filename: &str,
    ) -> Result<PathBuf, ExportError> {
        let bytes = self.render_to_bytes(target).await?;
        host.persist(filename, &bytes).await
    }

    /// Publishes the result as the current preview and opens a viewer on it.
    pub async fn render_and_open<H: Host>(
        &self,
        target: &ExportTarget,
        host: &H,
        artifacts: &ArtifactStore,
    ) -> Result<ArtifactLocator, ExportError> {
        let bytes = self.render_to_bytes(target).await?;
        let locator = artifacts.publish(bytes);
        let published = artifacts
            .resolve(&locator)
            .ok_or_else(|| RenderError::Other(format!("artifact {} vanished", locator)))?;
        host.open_viewer(&locator, &published).await?;
        Ok(locator)
    }
}

/// Parses the rasterizer output and requires at least one page.
fn verify_pdf(bytes: &[u8]) -> Result<(), RenderError> {
    if bytes.is_empty() {
        return Err(RenderError::Corrupt("empty output".into()));
    }
    let document = lopdf::Document::load_mem(bytes).map_err(|e| RenderError::Corrupt(e.to_string()))?;
    let pages = document.get_pages();
    if pages.is_empty() {
        return Err(RenderError::Corrupt("document has no pages".into()));
    }
    debug!("Verified PDF with {} page(s)", pages.len());
    Ok(())
}

//! Host facilities the export actions call out to.

use crate::artifact::ArtifactLocator;
use crate::error::ExportError;
use folio_document::Document;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// How the host can share the page, checked at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareCapability {
    NativeShare,
    ClipboardFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// Print, share, clipboard, fullscreen and file facilities of the platform.
///
/// Calls happen on the orchestrator's task; implementations are not
/// required to be `Send`.
#[allow(async_fn_in_trait)]
pub trait Host {
    /// Saves `bytes` under `filename` and returns where they ended up.
    async fn persist(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError>;

    /// Opens a viewer on a published preview.
    async fn open_viewer(&self, locator: &ArtifactLocator, bytes: &[u8]) -> Result<(), ExportError>;

    /// Prints the live document using its print-media presentation.
    async fn print(&self, document: &Document) -> Result<(), ExportError>;

    fn share_capability(&self) -> ShareCapability;

    async fn share(&self, payload: &SharePayload) -> Result<(), ExportError>;

    async fn copy_to_clipboard(&self, text: &str) -> Result<(), ExportError>;

    async fn request_fullscreen(&self) -> Result<(), ExportError>;

    async fn exit_fullscreen(&self) -> Result<(), ExportError>;

    /// Address of the page being viewed.
    fn page_address(&self) -> String;
}

/// A host for the command line: files go to an output directory and the
/// current preview is a temporary file handed to the system viewer. Sharing,
/// clipboard and printing are unavailable.
pub struct DesktopHost {
    out_dir: PathBuf,
    address: String,
    launch_viewer: bool,
    fullscreen: AtomicBool,
    preview: Mutex<Option<PathBuf>>,
}

impl DesktopHost {
    pub fn new(out_dir: impl Into<PathBuf>, address: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            address: address.into(),
            launch_viewer: true,
            fullscreen: AtomicBool::new(false),
            preview: Mutex::new(None),
        }
    }

    /// Whether previews are opened in the system viewer. When off, they are
    /// only written.
    pub fn with_viewer(mut self, launch: bool) -> Self {
        self.launch_viewer = launch;
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// The file backing the current preview, if any.
    pub fn preview(&self) -> Option<PathBuf> {
        self.preview.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Stops tracking the current preview so the file outlives the host.
    pub fn detach_preview(&self) -> Option<PathBuf> {
        self.preview.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.load(Ordering::Relaxed)
    }

    fn replace_preview(&self, path: PathBuf) {
        let previous = self
            .preview
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(path);
        if let Some(previous) = previous {
            remove_preview(&previous);
        }
    }
}

fn remove_preview(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed preview {}", path.display()),
        Err(e) => warn!("Could not remove preview {}: {}", path.display(), e),
    }
}

impl Drop for DesktopHost {
    fn drop(&mut self) {
        if let Some(path) = self.preview.get_mut().unwrap_or_else(PoisonError::into_inner).take() {
            remove_preview(&path);
        }
    }
}

impl Host for DesktopHost {
    async fn persist(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        let path = self.out_dir.join(filename);
        let persist_err = |e: std::io::Error| ExportError::Persist(format!("{}: {}", path.display(), e));
        tokio::fs::create_dir_all(&self.out_dir).await.map_err(persist_err)?;
        tokio::fs::write(&path, bytes).await.map_err(persist_err)?;
        info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    async fn open_viewer(&self, locator: &ArtifactLocator, bytes: &[u8]) -> Result<(), ExportError> {
        let mut file = tempfile::Builder::new()
            .prefix("folio-preview-")
            .suffix(".pdf")
            .tempfile()?;
        std::io::Write::write_all(&mut file, bytes)?;
        // The viewer outlives this call, so the file is kept until the next
        // preview replaces it or the host goes away.
        let (_, path) = file.keep().map_err(|e| ExportError::Io(e.error))?;
        info!("Preview {} written to {}", locator, path.display());
        self.replace_preview(path.clone());

        if self.launch_viewer {
            open::that_detached(&path)
                .map_err(|e| ExportError::Platform(format!("Could not open {}: {}", path.display(), e)))?;
        }
        Ok(())
    }

    async fn print(&self, _document: &Document) -> Result<(), ExportError> {
        Err(ExportError::UnsupportedCapability("Printing".into()))
    }

    fn share_capability(&self) -> ShareCapability {
        ShareCapability::ClipboardFallback
    }

    async fn share(&self, _payload: &SharePayload) -> Result<(), ExportError> {
        Err(ExportError::UnsupportedCapability("Native sharing".into()))
    }

    async fn copy_to_clipboard(&self, _text: &str) -> Result<(), ExportError> {
        Err(ExportError::UnsupportedCapability("Clipboard access".into()))
    }

    async fn request_fullscreen(&self) -> Result<(), ExportError> {
        self.fullscreen.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn exit_fullscreen(&self) -> Result<(), ExportError> {
        self.fullscreen.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn page_address(&self) -> String {
        self.address.clone()
    }
}

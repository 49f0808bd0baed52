#![allow(dead_code)]

pub mod fixtures;
pub mod pdf_assertions;

use folio::{
    ActionOrchestrator, ArtifactLocator, Document, ExportError, ExportOptions, ExportTarget, Host,
    OrchestratorConfig, Rasterizer, RenderError, ShareCapability, SharePayload,
};
use folio::overrides::EXPORT_MODE_CLASS;
use lopdf::{Document as LopdfDocument, dictionary};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Settle delay short enough for tests, display interval as in the viewer.
pub fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        settle_delay: Duration::from_millis(10),
        ..OrchestratorConfig::default()
    }
}

pub fn test_options() -> ExportOptions {
    ExportOptions::builder()
        .with_filename("Alex_Morgan_Resume.pdf")
        .build()
        .expect("default options are valid")
}

pub fn orchestrator<R: Rasterizer + 'static>(
    document: Document,
    host: MockHost,
    rasterizer: R,
) -> ActionOrchestrator<MockHost, R> {
    orchestrator_with(document, host, rasterizer, test_options(), fast_config())
}

pub fn orchestrator_with<R: Rasterizer + 'static>(
    document: Document,
    host: MockHost,
    rasterizer: R,
    options: ExportOptions,
    config: OrchestratorConfig,
) -> ActionOrchestrator<MockHost, R> {
    ActionOrchestrator::new(
        Arc::new(ExportTarget::new(document)),
        host,
        Arc::new(rasterizer),
        options,
        config,
    )
}

/// A one-page document that passes output verification.
pub fn stub_pdf() -> Vec<u8> {
    let mut doc = LopdfDocument::with_version("1.7");
    doc.reference_table.cross_reference_type = lopdf::xref::XrefType::CrossReferenceTable;
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 200.into(), 100.into()],
    });
    doc.set_object(
        pages_id,
        dictionary! { "Type" => "Pages", "Kids" => vec![page_id.into()], "Count" => 1 },
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("stub document serialises");
    bytes
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Persist { filename: String, bytes: Vec<u8> },
    OpenViewer(ArtifactLocator),
    Print { document: Document },
    Share(SharePayload),
    Copy(String),
    RequestFullscreen,
    ExitFullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeShare {
    Succeeds,
    Unsupported,
    Fails,
}

/// A scriptable host that records every call.
pub struct MockHost {
    pub capability: ShareCapability,
    pub native_share: NativeShare,
    pub fail_persist: bool,
    pub fail_print: bool,
    pub fail_fullscreen: bool,
    pub address: String,
    pub calls: Mutex<Vec<HostCall>>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            capability: ShareCapability::ClipboardFallback,
            native_share: NativeShare::Succeeds,
            fail_persist: false,
            fail_print: false,
            fail_fullscreen: false,
            address: "https://alexmorgan.dev/resume".to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockHost {
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn persisted(&self) -> Vec<(String, Vec<u8>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Persist { filename, bytes } => Some((filename, bytes)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Host for MockHost {
    async fn persist(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        if self.fail_persist {
            return Err(ExportError::Persist("disk full".into()));
        }
        self.record(HostCall::Persist {
            filename: filename.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(PathBuf::from("/downloads").join(filename))
    }

    async fn open_viewer(&self, locator: &ArtifactLocator, _bytes: &[u8]) -> Result<(), ExportError> {
        self.record(HostCall::OpenViewer(locator.clone()));
        Ok(())
    }

    async fn print(&self, document: &Document) -> Result<(), ExportError> {
        if self.fail_print {
            return Err(ExportError::Platform("printer offline".into()));
        }
        self.record(HostCall::Print {
            document: document.clone(),
        });
        Ok(())
    }

    fn share_capability(&self) -> ShareCapability {
        self.capability
    }

    async fn share(&self, payload: &SharePayload) -> Result<(), ExportError> {
        match self.native_share {
            NativeShare::Succeeds => {
                self.record(HostCall::Share(payload.clone()));
                Ok(())
            }
            NativeShare::Unsupported => Err(ExportError::UnsupportedCapability("Native sharing".into())),
            NativeShare::Fails => Err(ExportError::Platform("share sheet dismissed".into())),
        }
    }

    async fn copy_to_clipboard(&self, text: &str) -> Result<(), ExportError> {
        self.record(HostCall::Copy(text.to_string()));
        Ok(())
    }

    async fn request_fullscreen(&self) -> Result<(), ExportError> {
        if self.fail_fullscreen {
            return Err(ExportError::Platform("fullscreen denied".into()));
        }
        self.record(HostCall::RequestFullscreen);
        Ok(())
    }

    async fn exit_fullscreen(&self) -> Result<(), ExportError> {
        self.record(HostCall::ExitFullscreen);
        Ok(())
    }

    fn page_address(&self) -> String {
        self.address.clone()
    }
}

/// Fails every render, like an engine that chokes on the document.
pub struct FailingRasterizer;

impl Rasterizer for FailingRasterizer {
    fn rasterize(&self, _document: &Document, _options: &ExportOptions) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::Other("engine crashed".into()))
    }
}

pub struct PanickingRasterizer;

impl Rasterizer for PanickingRasterizer {
    fn rasterize(&self, _document: &Document, _options: &ExportOptions) -> Result<Vec<u8>, RenderError> {
        panic!("rasterizer bug");
    }
}

/// Returns whatever bytes it was built with.
pub struct FixedRasterizer(pub Vec<u8>);

impl FixedRasterizer {
    pub fn stub() -> Self {
        Self(stub_pdf())
    }
}

impl Rasterizer for FixedRasterizer {
    fn rasterize(&self, _document: &Document, _options: &ExportOptions) -> Result<Vec<u8>, RenderError> {
        Ok(self.0.clone())
    }
}

/// Blocks the rendering thread for a while before answering.
pub struct SlowRasterizer(pub Duration);

impl Rasterizer for SlowRasterizer {
    fn rasterize(&self, _document: &Document, _options: &ExportOptions) -> Result<Vec<u8>, RenderError> {
        std::thread::sleep(self.0);
        Ok(stub_pdf())
    }
}

/// Delegates to an inner rasterizer and records what each render saw.
pub struct RecordingRasterizer<R> {
    pub inner: R,
    pub renders: AtomicUsize,
    pub saw_override: Mutex<Vec<bool>>,
}

impl<R> RecordingRasterizer<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            renders: AtomicUsize::new(0),
            saw_override: Mutex::new(Vec::new()),
        }
    }
}

impl<R: Rasterizer> Rasterizer for RecordingRasterizer<R> {
    fn rasterize(&self, document: &Document, options: &ExportOptions) -> Result<Vec<u8>, RenderError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        self.saw_override
            .lock()
            .unwrap()
            .push(document.root.has_class(EXPORT_MODE_CLASS));
        self.inner.rasterize(document, options)
    }
}

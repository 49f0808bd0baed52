//! Sequences export actions and publishes the viewer state.
//!
//! One action runs at a time across all kinds. Every render-backed action
//! holds the export override through an [`OverrideHandle`], so the override
//! is removed whether the action succeeds, fails or is dropped midway.
//!
//! [`OverrideHandle`]: crate::overrides::OverrideHandle

use crate::adapter::RenderingAdapter;
use crate::artifact::{ArtifactLocator, ArtifactStore};
use crate::error::ExportError;
use crate::overrides::OverrideController;
use crate::platform::{Host, ShareCapability, SharePayload};
use crate::state::{ActionKind, ActionState, ViewerState};
use crate::target::ExportTarget;
use folio_render_core::{ExportOptions, Rasterizer};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Pause between applying the override and rendering, so the
    /// presentation layer can settle.
    pub settle_delay: Duration,
    /// How long a success or failure stays visible.
    pub display_interval: Duration,
    pub share_title: String,
    pub share_text: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(300),
            display_interval: Duration::from_secs(2),
            share_title: "Resume".to_string(),
            share_text: "Take a look at my resume.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Copied,
}

pub struct ActionOrchestrator<H, R> {
    target: Arc<ExportTarget>,
    adapter: RenderingAdapter<R>,
    host: H,
    artifacts: ArtifactStore,
    config: OrchestratorConfig,
    state: Arc<watch::Sender<ViewerState>>,
    action_epoch: Arc<AtomicU64>,
    copied_epoch: Arc<AtomicU64>,
}

impl<H: Host, R: Rasterizer + 'static> ActionOrchestrator<H, R> {
    pub fn new(
        target: Arc<ExportTarget>,
        host: H,
        rasterizer: Arc<R>,
        options: ExportOptions,
        config: OrchestratorConfig,
    ) -> Self {
        let (state, _) = watch::channel(ViewerState::default());
        Self {
            target,
            adapter: RenderingAdapter::new(rasterizer, options),
            host,
            artifacts: ArtifactStore::new(),
            config,
            state: Arc::new(state),
            action_epoch: Arc::new(AtomicU64::new(0)),
            copied_epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn state(&self) -> ViewerState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewerState> {
        self.state.subscribe()
    }

    pub fn target(&self) -> &ExportTarget {
        &self.target
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn options(&self) -> &ExportOptions {
        self.adapter.options()
    }

    /// Renders the target and saves it under the configured filename.
    pub async fn download(&self) -> Result<PathBuf, ExportError> {
        let gate = self.begin(ActionKind::Download)?;
        let result = self.run_download().await;
        gate.settle(&result);
        result
    }

    async fn run_download(&self) -> Result<PathBuf, ExportError> {
        let handle = OverrideController::acquire(&self.target)?;
        tokio::time::sleep(self.config.settle_delay).await;
        let result = self
            .adapter
            .render_and_persist(&self.target, &self.host, self.options().filename())
            .await;
        handle.release();
        result
    }

    /// Renders the target, publishes it as the current preview and opens it.
    pub async fn open_preview(&self) -> Result<ArtifactLocator, ExportError> {
        let gate = self.begin(ActionKind::OpenPreview)?;
        let result = self.run_open_preview().await;
        gate.settle(&result);
        result
    }

    async fn run_open_preview(&self) -> Result<ArtifactLocator, ExportError> {
        let handle = OverrideController::acquire(&self.target)?;
        tokio::time::sleep(self.config.settle_delay).await;
        let result = self
            .adapter
            .render_and_open(&self.target, &self.host, &self.artifacts)
            .await;
        handle.release();
        result
    }

    /// Prints the live document. No override, no rendering adapter.
    pub async fn print(&self) -> Result<(), ExportError> {
        let gate = self.begin(ActionKind::Print)?;
        let document = self.target.snapshot();
        let result = self.host.print(&document).await;
        gate.settle(&result);
        result
    }

    /// Shares the page address natively, or copies it when native sharing
    /// is unavailable.
    pub async fn share(&self) -> Result<ShareOutcome, ExportError> {
        let gate = self.begin(ActionKind::Share)?;
        let result = self.run_share().await;
        gate.settle(&result);
        result
    }

    async fn run_share(&self) -> Result<ShareOutcome, ExportError> {
        let address = self.host.page_address();
        if self.host.share_capability() == ShareCapability::NativeShare {
            let payload = SharePayload {
                title: self.config.share_title.clone(),
                text: self.config.share_text.clone(),
                url: address.clone(),
            };
            match self.host.share(&payload).await {
                Ok(()) => return Ok(ShareOutcome::Shared),
                Err(ExportError::UnsupportedCapability(what)) => {
                    debug!("{} unavailable, copying the address instead", what);
                }
                Err(e) => return Err(e),
            }
        }
        self.host.copy_to_clipboard(&address).await?;
        self.flag_copied();
        Ok(ShareOutcome::Copied)
    }

    /// Flips fullscreen optimistically; reverts the flag if the host refuses.
    /// Returns the new fullscreen state.
    pub async fn toggle_fullscreen(&self) -> Result<bool, ExportError> {
        let mut busy = None;
        let mut entering = false;
        self.state.send_if_modified(|state| {
            if let Some(kind) = state.action.running_kind() {
                busy = Some(kind);
                return false;
            }
            state.fullscreen = !state.fullscreen;
            entering = state.fullscreen;
            true
        });
        if let Some(kind) = busy {
            debug!("Fullscreen toggle rejected while {} is running", kind);
            return Err(ExportError::Busy(kind));
        }

        let result = if entering {
            self.host.request_fullscreen().await
        } else {
            self.host.exit_fullscreen().await
        };
        if let Err(e) = &result {
            error!("Error toggling fullscreen: {}", e);
            self.state.send_modify(|state| state.fullscreen = !entering);
        }
        result.map(|()| entering)
    }

    /// Atomically moves to `Running(kind)` unless another action runs.
    fn begin(&self, kind: ActionKind) -> Result<ActionGate, ExportError> {
        let mut running = None;
        self.state.send_if_modified(|state| match state.action.running_kind() {
            Some(current) => {
                running = Some(current);
                false
            }
            None => {
                state.action = ActionState::Running(kind);
                true
            }
        });
        match running {
            Some(current) => {
                warn!("Rejected {}: {} is still running", kind, current);
                Err(ExportError::Busy(current))
            }
            None => {
                info!("Starting {}", kind);
                Ok(ActionGate {
                    kind,
                    state: Arc::clone(&self.state),
                    epoch: Arc::clone(&self.action_epoch),
                    display_interval: self.config.display_interval,
                    settled: false,
                })
            }
        }
    }

    fn flag_copied(&self) {
        self.state.send_modify(|s| s.copied = true);
        let epoch = self.copied_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.copied_epoch);
        let state = Arc::clone(&self.state);
        let interval = self.config.display_interval;
        tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            if current.load(Ordering::SeqCst) == epoch {
                state.send_modify(|s| s.copied = false);
            }
        });
    }
}

/// Holds the single action slot while an action runs.
///
/// Settling publishes the outcome. If the action future is dropped first
/// (a caller timeout, a cancelled `select!`, a panicking host), `Drop`
/// settles the slot as failed so the gate never stays `Running`.
struct ActionGate {
    kind: ActionKind,
    state: Arc<watch::Sender<ViewerState>>,
    epoch: Arc<AtomicU64>,
    display_interval: Duration,
    settled: bool,
}

impl ActionGate {
    fn settle<T>(mut self, result: &Result<T, ExportError>) {
        let next = match result {
            Ok(_) => {
                info!("Finished {}", self.kind);
                ActionState::Succeeded(self.kind)
            }
            Err(e) => {
                let message = self.kind.failure_message(e);
                error!("{}", message);
                ActionState::Failed(self.kind, message)
            }
        };
        self.publish(next);
    }

    fn publish(&mut self, next: ActionState) {
        self.settled = true;
        self.state.send_modify(|state| state.action = next);
        self.schedule_reset();
    }

    /// Returns the settled state to idle after one display interval, unless a
    /// newer action has settled in the meantime.
    fn schedule_reset(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime to reset {} after settling", self.kind);
            return;
        };
        let current = Arc::clone(&self.epoch);
        let state = Arc::clone(&self.state);
        let interval = self.display_interval;
        runtime.spawn(async move {
            tokio::time::sleep(interval).await;
            if current.load(Ordering::SeqCst) != epoch {
                return;
            }
            state.send_if_modified(|s| {
                if s.action.is_settled() {
                    s.action = ActionState::Idle;
                    true
                } else {
                    false
                }
            });
        });
    }
}

impl Drop for ActionGate {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let message = self.kind.failure_message(&"the action was interrupted");
        warn!("{}", message);
        self.publish(ActionState::Failed(self.kind, message));
    }
}

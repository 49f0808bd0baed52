use log::debug;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Transient address of a published preview, valid until released.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactLocator(String);

impl ArtifactLocator {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Default)]
struct StoreInner {
    next_id: u64,
    current: Option<(ArtifactLocator, Arc<Vec<u8>>)>,
}

/// Holds at most one preview export. Publishing a new one releases the
/// previous; everything is released when the store is dropped.
#[derive(Default)]
pub struct ArtifactStore {
    inner: Mutex<StoreInner>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn publish(&self, bytes: Vec<u8>) -> ArtifactLocator {
        let mut inner = self.lock();
        inner.next_id += 1;
        let locator = ArtifactLocator(format!("blob:folio/{}", inner.next_id));
        if let Some((previous, _)) = inner.current.replace((locator.clone(), Arc::new(bytes))) {
            debug!("Released superseded artifact {}", previous);
        }
        debug!("Published artifact {}", locator);
        locator
    }

    pub fn resolve(&self, locator: &ArtifactLocator) -> Option<Arc<Vec<u8>>> {
        self.lock()
            .current
            .as_ref()
            .filter(|(current, _)| current == locator)
            .map(|(_, bytes)| Arc::clone(bytes))
    }

    pub fn is_live(&self, locator: &ArtifactLocator) -> bool {
        self.resolve(locator).is_some()
    }

    pub fn current(&self) -> Option<ArtifactLocator> {
        self.lock().current.as_ref().map(|(locator, _)| locator.clone())
    }

    /// Returns whether `locator` was live.
    pub fn release(&self, locator: &ArtifactLocator) -> bool {
        let mut inner = self.lock();
        if inner.current.as_ref().is_some_and(|(current, _)| current == locator) {
            inner.current = None;
            debug!("Released artifact {}", locator);
            true
        } else {
            false
        }
    }
}

impl Drop for ArtifactStore {
    fn drop(&mut self) {
        if let Some((locator, _)) = self.lock().current.take() {
            debug!("Released artifact {} with its store", locator);
        }
    }
}

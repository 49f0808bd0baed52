use crate::overrides::OverrideState;
use folio_document::Document;
use std::sync::{Mutex, MutexGuard, PoisonError};

struct TargetInner {
    document: Document,
    overrides: OverrideState,
}

/// The document subtree a viewer exports. Owned by the viewer; the export
/// pipeline only ever takes a temporary presentation override on it.
pub struct ExportTarget {
    inner: Mutex<TargetInner>,
}

impl ExportTarget {
    pub fn new(document: Document) -> Self {
        Self {
            inner: Mutex::new(TargetInner {
                document,
                overrides: OverrideState::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TargetInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the document as it currently looks.
    pub fn snapshot(&self) -> Document {
        self.lock().document.clone()
    }

    pub fn is_override_active(&self) -> bool {
        self.lock().overrides.active
    }

    pub fn is_mounted(&self) -> bool {
        self.lock().document.mounted
    }

    pub fn set_mounted(&self, mounted: bool) {
        self.lock().document.mounted = mounted;
    }

    /// Runs `f` with the document and override bookkeeping borrowed together.
    pub(crate) fn with_parts<T>(&self, f: impl FnOnce(&mut Document, &mut OverrideState) -> T) -> T {
        let mut guard = self.lock();
        let TargetInner { document, overrides } = &mut *guard;
        f(document, overrides)
    }
}

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use titlebar_core::types::PhysicalRect;

use crate::geometry::{RectSource, ViewError};

const MOUNTED: u8 = 0;
const UNMOUNTED: u8 = 1;

static NEXT_PROVIDER_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a provider. The only transition is `Mounted -> Unmounted`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderState {
    Mounted,
    Unmounted,
}

/// Registry entry backing one passthrough view.
///
/// Identity is the allocation behind the `Arc`; the numeric id only labels
/// log output.
pub struct RegionProvider {
    id: u64,
    state: AtomicU8,
    view: Mutex<Option<Arc<dyn RectSource>>>,
}

impl RegionProvider {
    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_PROVIDER_ID.fetch_add(1, Ordering::Relaxed),
            state: AtomicU8::new(MOUNTED),
            view: Mutex::new(None),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> ProviderState {
        match self.state.load(Ordering::Acquire) {
            MOUNTED => ProviderState::Mounted,
            _ => ProviderState::Unmounted,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.state() == ProviderState::Mounted
    }

    /// Performs the `Mounted -> Unmounted` transition. Returns `true` only for
    /// the caller that actually flipped the tag.
    pub(crate) fn mark_unmounted(&self) -> bool {
        self.state
            .compare_exchange(MOUNTED, UNMOUNTED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn view_slot(&self) -> MutexGuard<'_, Option<Arc<dyn RectSource>>> {
        self.view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn set_view(&self, view: Option<Arc<dyn RectSource>>) {
        *self.view_slot() = view;
    }

    pub(crate) fn view(&self) -> Option<Arc<dyn RectSource>> {
        self.view_slot().clone()
    }

    pub fn has_view(&self) -> bool {
        self.view_slot().is_some()
    }

    /// Rectangle of the attached view, or `None` while no view is attached.
    ///
    /// The view is called outside the slot lock so a view that re-enters the
    /// provider cannot deadlock.
    pub fn current_rect(&self) -> Option<Result<PhysicalRect, ViewError>> {
        let view = self.view()?;
        Some(view.passthrough_rect())
    }
}

impl std::fmt::Debug for RegionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionProvider")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("has_view", &self.has_view())
            .finish()
    }
}

/// Insertion-ordered collection of live providers.
#[derive(Debug, Default)]
pub struct RegionRegistry {
    providers: Mutex<Vec<Arc<RegionProvider>>>,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Arc<RegionProvider>>> {
        self.providers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(&self, provider: Arc<RegionProvider>) {
        self.entries().push(provider);
    }

    /// Removes the first entry identical to `provider`. Returns whether an
    /// entry was removed.
    pub fn unregister(&self, provider: &Arc<RegionProvider>) -> bool {
        let mut entries = self.entries();
        match entries.iter().position(|entry| Arc::ptr_eq(entry, provider)) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Copy of the current entries in insertion order.
    pub fn snapshot(&self) -> Vec<Arc<RegionProvider>> {
        self.entries().clone()
    }

    /// Visits a snapshot of the entries. The lock is released before the
    /// first visit, so `visitor` may register or unregister providers.
    pub fn for_each(&self, mut visitor: impl FnMut(&Arc<RegionProvider>)) {
        for provider in &self.snapshot() {
            visitor(provider);
        }
    }

    pub fn contains(&self, provider: &Arc<RegionProvider>) -> bool {
        self.entries().iter().any(|entry| Arc::ptr_eq(entry, provider))
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

use std::sync::Arc;

use crate::geometry::{LayoutMetricsChanged, RectSource};
use crate::host::HostShared;
use crate::reconciler::{ReconcileOutcome, SkipReason};
use crate::registry::RegionProvider;

/// Handle owned by a mounted passthrough component.
///
/// The provider is registered when the handle is created and removed either
/// by [`PassthroughView::unmount`] or, as a fallback, when the handle is
/// dropped. Whichever comes second does nothing.
pub struct PassthroughView {
    provider: Arc<RegionProvider>,
    host: Arc<HostShared>,
}

impl PassthroughView {
    pub(crate) fn register(host: Arc<HostShared>) -> Self {
        let provider = Arc::new(RegionProvider::new());
        host.registry.register(Arc::clone(&provider));
        tracing::debug!(provider = provider.id(), "passthrough provider registered");
        Self { provider, host }
    }

    pub fn provider(&self) -> &Arc<RegionProvider> {
        &self.provider
    }

    pub fn is_mounted(&self) -> bool {
        self.provider.is_mounted()
    }

    /// Mounting completed: `view` becomes the geometry source and the window
    /// is reconciled.
    pub fn attach(&self, view: Arc<dyn RectSource>) -> ReconcileOutcome {
        if !self.is_mounted() {
            return ReconcileOutcome::Skipped(SkipReason::ProviderUnmounted);
        }
        self.provider.set_view(Some(view));
        self.reconcile()
    }

    /// The view's frame or scale changed.
    pub fn on_layout_metrics_changed(&self, change: &LayoutMetricsChanged) -> ReconcileOutcome {
        if !self.is_mounted() {
            return ReconcileOutcome::Skipped(SkipReason::ProviderUnmounted);
        }
        if self.host.reconciler.settings().log_regions {
            tracing::debug!(
                provider = self.provider.id(),
                old = %change.old.to_physical(),
                new = %change.new.to_physical(),
                "layout metrics changed"
            );
        }
        self.reconcile()
    }

    /// Preferred cleanup, called by the host when the component unmounts.
    ///
    /// Only acts when `view` is the attached view. Returns `None` when
    /// nothing was removed.
    pub fn unmount(&self, view: &Arc<dyn RectSource>) -> Option<ReconcileOutcome> {
        let attached = self.provider.view();
        if !attached.is_some_and(|attached| Arc::ptr_eq(&attached, view)) {
            tracing::debug!(provider = self.provider.id(), "unmount for a foreign view ignored");
            return None;
        }
        self.release()
    }

    fn reconcile(&self) -> ReconcileOutcome {
        self.host.reconciler.reconcile(&self.host.registry)
    }

    /// Idempotent removal: flips the state tag, drops the provider from the
    /// registry and reconciles the remaining set.
    fn release(&self) -> Option<ReconcileOutcome> {
        if !self.provider.mark_unmounted() {
            return None;
        }
        let removed = self.host.registry.unregister(&self.provider);
        self.provider.set_view(None);
        tracing::debug!(provider = self.provider.id(), removed, "passthrough provider removed");
        Some(self.reconcile())
    }
}

impl Drop for PassthroughView {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for PassthroughView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassthroughView").field("provider", &self.provider).finish_non_exhaustive()
    }
}

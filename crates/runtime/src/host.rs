use std::sync::Arc;

use titlebar_core::platform::{RegionPlatform, RegionSourceId, region_platforms};
use titlebar_core::types::PhysicalRect;

use crate::inert::INERT_PLATFORM;
use crate::provider::PassthroughView;
use crate::reconciler::{ReconcileError, ReconcileOutcome, ReconcileReport, RegionReconciler};
use crate::registry::RegionRegistry;
use crate::settings::PassthroughSettings;

pub(crate) struct HostShared {
    pub(crate) registry: RegionRegistry,
    pub(crate) reconciler: RegionReconciler,
}

/// Service object handed to every passthrough view. Cloning is cheap and
/// shares the registry.
#[derive(Clone)]
pub struct PassthroughHost {
    shared: Arc<HostShared>,
}

impl std::fmt::Debug for PassthroughHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassthroughHost")
            .field("reconciler", &self.shared.reconciler)
            .field("registry", &self.shared.registry)
            .finish()
    }
}

impl PassthroughHost {
    pub fn new(platform: Arc<dyn RegionPlatform>, settings: PassthroughSettings) -> Self {
        let current = platform.current_process_id();
        if settings.targets_foreign_process(current) {
            tracing::warn!(
                target_pid = settings.process_id,
                current_pid = current,
                platform = platform.name(),
                "passthrough target is another process; an in-process input source cannot reach its window"
            );
        }
        let shared =
            HostShared { registry: RegionRegistry::new(), reconciler: RegionReconciler::new(platform, settings) };
        Self { shared: Arc::new(shared) }
    }

    /// Host over `platform` with default settings.
    pub fn with_platform(platform: Arc<dyn RegionPlatform>) -> Self {
        Self::new(platform, PassthroughSettings::default())
    }

    /// Host over the first registered platform, configured from the
    /// environment. Falls back to [`crate::InertPlatform`] when no backend is
    /// linked.
    pub fn discover() -> Self {
        Self::new(discover_platform(), PassthroughSettings::from_env())
    }

    /// Creates and registers a provider for a component being mounted. The
    /// view is attached once mounting completes.
    pub fn mount(&self) -> PassthroughView {
        PassthroughView::register(Arc::clone(&self.shared))
    }

    pub fn reconcile(&self) -> ReconcileOutcome {
        self.shared.reconciler.reconcile(&self.shared.registry)
    }

    pub fn try_reconcile(&self) -> Result<ReconcileReport, ReconcileError> {
        self.shared.reconciler.try_reconcile(&self.shared.registry)
    }

    /// Declares the draggable caption area of the application window, in
    /// window-relative physical pixels. Usually one band across the top of an
    /// extended title bar; mounted passthrough views punch holes into it.
    /// Replaces any earlier declaration and is left alone by reconciliation.
    pub fn set_caption(&self, rects: &[PhysicalRect]) -> Result<RegionSourceId, ReconcileError> {
        self.shared.reconciler.apply_caption(rects)
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.shared.registry
    }

    pub fn reconciler(&self) -> &RegionReconciler {
        &self.shared.reconciler
    }

    pub fn platform_name(&self) -> &'static str {
        self.shared.reconciler.platform().name()
    }
}

/// First registered region platform, or the inert fallback.
pub fn discover_platform() -> Arc<dyn RegionPlatform> {
    if let Some(platform) = region_platforms().next() {
        tracing::debug!(platform = platform.name(), "using region platform");
        Arc::new(platform)
    } else {
        tracing::info!("no region platform registered, passthrough regions disabled");
        Arc::new(&INERT_PLATFORM)
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, TryLockError};

use thiserror::Error;
use titlebar_core::platform::{PlatformError, RegionKind, RegionPlatform, RegionSourceId, WindowId};
use titlebar_core::types::PhysicalRect;

use crate::registry::RegionRegistry;
use crate::settings::PassthroughSettings;

/// Why a reconciliation stopped before touching the platform.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("no visible top-level window owned by process {process_id}")]
    NoTopLevelWindow { process_id: u32 },
    #[error("input source of {window} unavailable: {source}")]
    InputSourceUnavailable { window: WindowId, source: PlatformError },
    #[error("enumerating top-level windows failed: {0}")]
    Enumerate(#[source] PlatformError),
    #[error("clearing passthrough regions failed: {0}")]
    Clear(#[source] PlatformError),
    #[error("applying passthrough regions failed: {0}")]
    Apply(#[source] PlatformError),
    #[error("applying caption regions failed: {0}")]
    Caption(#[source] PlatformError),
    #[error("another reconciliation is in progress and will pick up this trigger")]
    Deferred,
}

impl ReconcileError {
    /// The window or its input source is not there yet (or anymore). The next
    /// trigger retries.
    pub fn is_transient(&self) -> bool {
        match self {
            ReconcileError::NoTopLevelWindow { .. }
            | ReconcileError::InputSourceUnavailable { .. }
            | ReconcileError::Deferred => true,
            ReconcileError::Enumerate(err)
            | ReconcileError::Clear(err)
            | ReconcileError::Apply(err)
            | ReconcileError::Caption(err) => err.is_transient(),
        }
    }
}

/// What a successful reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub window: WindowId,
    pub source: RegionSourceId,
    /// Rectangles handed to the platform, in registry order.
    pub rects: Vec<PhysicalRect>,
    /// Providers that have no view attached yet.
    pub without_view: usize,
    /// Providers whose view reported itself stale or detached.
    pub stale: usize,
    /// Providers whose rectangle had no area.
    pub degenerate: usize,
}

impl ReconcileReport {
    fn new(window: WindowId, source: RegionSourceId) -> Self {
        Self { window, source, rects: Vec::new(), without_view: 0, stale: 0, degenerate: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoTopLevelWindow,
    InputSourceUnavailable,
    /// The trigger came from a provider that was already removed.
    ProviderUnmounted,
    /// A pass already running (possibly further up this thread's stack)
    /// reruns for this trigger.
    Deferred,
}

/// Result of the non-failing [`RegionReconciler::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The passthrough set was replaced with `report.rects`.
    Applied(ReconcileReport),
    /// The passthrough set was cleared and nothing was applied.
    Cleared(ReconcileReport),
    Skipped(SkipReason),
    Failed(ReconcileError),
}

impl ReconcileOutcome {
    pub fn report(&self) -> Option<&ReconcileReport> {
        match self {
            ReconcileOutcome::Applied(report) | ReconcileOutcome::Cleared(report) => Some(report),
            ReconcileOutcome::Skipped(_) | ReconcileOutcome::Failed(_) => None,
        }
    }
}

/// Upper bound on back-to-back passes while triggers keep arriving during a
/// pass.
const MAX_PASSES: usize = 4;

/// Recomputes the passthrough set of the application window from a registry.
///
/// Passes never block on each other. A trigger that arrives while a pass is
/// running (from another thread, or re-entrantly from a view or the platform)
/// marks the state dirty and returns [`ReconcileError::Deferred`]; the running
/// pass then starts over with the current registry.
pub struct RegionReconciler {
    platform: Arc<dyn RegionPlatform>,
    settings: PassthroughSettings,
    apply_lock: Mutex<()>,
    pending: AtomicBool,
}

impl std::fmt::Debug for RegionReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionReconciler")
            .field("platform", &self.platform.name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl RegionReconciler {
    pub fn new(platform: Arc<dyn RegionPlatform>, settings: PassthroughSettings) -> Self {
        Self { platform, settings, apply_lock: Mutex::new(()), pending: AtomicBool::new(false) }
    }

    pub fn platform(&self) -> &Arc<dyn RegionPlatform> {
        &self.platform
    }

    pub fn settings(&self) -> &PassthroughSettings {
        &self.settings
    }

    /// Process whose window receives the regions.
    pub fn target_process_id(&self) -> u32 {
        self.settings.process_id.unwrap_or_else(|| self.platform.current_process_id())
    }

    /// First visible, parentless top-level window of the target process.
    pub fn find_application_window(&self) -> Result<WindowId, ReconcileError> {
        let process_id = self.target_process_id();
        let windows = self.platform.top_level_windows().map_err(ReconcileError::Enumerate)?;
        windows
            .iter()
            .find(|info| info.is_application_window_of(process_id))
            .map(|info| info.id)
            .ok_or(ReconcileError::NoTopLevelWindow { process_id })
    }

    /// Application window and its input source.
    fn resolve_source(&self) -> Result<(WindowId, RegionSourceId), ReconcileError> {
        let window = self.find_application_window()?;
        let source = self
            .platform
            .input_source(window)
            .map_err(|source| ReconcileError::InputSourceUnavailable { window, source })?;
        Ok((window, source))
    }

    /// Replaces the caption set of the application window with `rects`.
    /// Rectangles without area are dropped; an empty set only clears.
    ///
    /// Passthrough rectangles win over caption rectangles in hit testing, so
    /// a caption band covering the whole title bar keeps the passthrough
    /// holes clickable.
    pub fn apply_caption(&self, rects: &[PhysicalRect]) -> Result<RegionSourceId, ReconcileError> {
        let (window, source) = self.resolve_source()?;
        let rects: Vec<PhysicalRect> = rects.iter().copied().filter(PhysicalRect::has_area).collect();
        self.platform.clear_regions(source, RegionKind::Caption).map_err(ReconcileError::Caption)?;
        if !rects.is_empty() {
            self.platform.set_regions(source, RegionKind::Caption, &rects).map_err(ReconcileError::Caption)?;
        }
        tracing::debug!(%window, count = rects.len(), "caption regions applied");
        Ok(source)
    }

    /// Replaces the passthrough set of the application window with the
    /// rectangles of every live provider in `registry`.
    ///
    /// Caption and other region kinds are never touched. An empty result
    /// clears the passthrough set without a follow-up apply call.
    pub fn try_reconcile(&self, registry: &RegionRegistry) -> Result<ReconcileReport, ReconcileError> {
        self.pending.store(true, Ordering::SeqCst);
        let mut passes = 0;
        let mut last = None;
        loop {
            let guard = match self.apply_lock.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => return last.unwrap_or(Err(ReconcileError::Deferred)),
            };
            while passes < MAX_PASSES && self.pending.swap(false, Ordering::SeqCst) {
                passes += 1;
                last = Some(self.reconcile_once(registry));
            }
            drop(guard);

            // A trigger may have been deferred between the last check and the unlock.
            if passes >= MAX_PASSES || !self.pending.load(Ordering::SeqCst) {
                if passes >= MAX_PASSES && self.pending.load(Ordering::SeqCst) {
                    tracing::debug!(passes, "passthrough triggers still arriving, giving up until the next one");
                }
                return last.unwrap_or(Err(ReconcileError::Deferred));
            }
        }
    }

    fn reconcile_once(&self, registry: &RegionRegistry) -> Result<ReconcileReport, ReconcileError> {
        let (window, source) = self.resolve_source()?;

        self.platform.clear_regions(source, RegionKind::Passthrough).map_err(ReconcileError::Clear)?;

        let mut report = ReconcileReport::new(window, source);
        registry.for_each(|provider| {
            if !provider.is_mounted() {
                return;
            }
            match provider.current_rect() {
                None => report.without_view += 1,
                Some(Err(err)) => {
                    tracing::debug!(provider = provider.id(), %err, "skipping passthrough provider");
                    report.stale += 1;
                }
                Some(Ok(rect)) if rect.has_area() => {
                    if self.settings.log_regions {
                        tracing::trace!(provider = provider.id(), %rect, "passthrough rect");
                    }
                    report.rects.push(rect);
                }
                Some(Ok(rect)) => {
                    if self.settings.log_regions {
                        tracing::trace!(provider = provider.id(), %rect, "dropping degenerate rect");
                    }
                    report.degenerate += 1;
                }
            }
        });

        if !report.rects.is_empty() {
            self.platform
                .set_regions(source, RegionKind::Passthrough, &report.rects)
                .map_err(ReconcileError::Apply)?;
        }

        if self.settings.log_regions {
            tracing::debug!(
                %window,
                count = report.rects.len(),
                without_view = report.without_view,
                stale = report.stale,
                degenerate = report.degenerate,
                "passthrough regions reconciled"
            );
        }
        Ok(report)
    }

    /// [`Self::try_reconcile`] with every failure absorbed. Transient aborts
    /// become [`ReconcileOutcome::Skipped`]; anything else is logged at debug
    /// level and returned as [`ReconcileOutcome::Failed`].
    pub fn reconcile(&self, registry: &RegionRegistry) -> ReconcileOutcome {
        match self.try_reconcile(registry) {
            Ok(report) if report.rects.is_empty() => ReconcileOutcome::Cleared(report),
            Ok(report) => ReconcileOutcome::Applied(report),
            Err(ReconcileError::NoTopLevelWindow { process_id }) => {
                tracing::debug!(process_id, "no application window, passthrough sync skipped");
                ReconcileOutcome::Skipped(SkipReason::NoTopLevelWindow)
            }
            Err(ReconcileError::InputSourceUnavailable { window, source }) => {
                tracing::debug!(%window, error = %source, "input source unavailable, passthrough sync skipped");
                ReconcileOutcome::Skipped(SkipReason::InputSourceUnavailable)
            }
            Err(ReconcileError::Deferred) => {
                tracing::trace!("passthrough sync deferred to the running pass");
                ReconcileOutcome::Skipped(SkipReason::Deferred)
            }
            Err(err) => {
                tracing::debug!(error = %err, transient = err.is_transient(), "passthrough sync failed");
                ReconcileOutcome::Failed(err)
            }
        }
    }
}

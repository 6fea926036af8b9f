//! Keeps the passthrough regions of the application window in sync with the
//! set of mounted passthrough views.
//!
//! A [`PassthroughHost`] owns the [`RegionRegistry`] and the
//! [`RegionReconciler`]. Every mounted component holds a [`PassthroughView`];
//! mounting, layout changes and removal each trigger a full reconciliation
//! that replaces the window's passthrough set.

mod geometry;
mod host;
mod inert;
mod provider;
mod reconciler;
mod registry;
mod settings;

#[cfg(test)]
mod test_support;

// Links the Win32 backend so its inventory registration is visible.
#[cfg(target_os = "windows")]
use titlebar_platform_windows as _;

pub use geometry::{
    FromLayoutMetrics, FromVisual, LayoutMetrics, LayoutMetricsChanged, LayoutMetricsView,
    RectSource, ViewError, Visual, VisualView,
};
pub use host::{PassthroughHost, discover_platform};
pub use inert::{INERT_PLATFORM, InertPlatform};
pub use provider::PassthroughView;
pub use reconciler::{
    ReconcileError, ReconcileOutcome, ReconcileReport, RegionReconciler, SkipReason,
};
pub use registry::{ProviderState, RegionProvider, RegionRegistry};
pub use settings::PassthroughSettings;

//! Geometry sources for passthrough views.
//!
//! A mounted view exposes its current rectangle through [`RectSource`]. Host
//! integrations that report layout frames wrap their view in
//! [`FromLayoutMetrics`]; integrations that report visual offsets wrap it in
//! [`FromVisual`].

use thiserror::Error;
use titlebar_core::types::{PhysicalRect, Point, Rect, Size};

/// Why a view could not report its rectangle. Either way the provider is
/// skipped for the current reconciliation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("view is no longer attached to a window")]
    Detached,
    #[error("view layout is stale")]
    Stale,
}

/// Current rectangle of a mounted view in window-relative physical pixels.
pub trait RectSource: Send + Sync {
    fn passthrough_rect(&self) -> Result<PhysicalRect, ViewError>;
}

/// Layout frame in logical points plus the scale factor used to render it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutMetrics {
    pub frame: Rect,
    pub point_scale_factor: f64,
}

impl LayoutMetrics {
    pub const fn new(frame: Rect, point_scale_factor: f64) -> Self {
        Self { frame, point_scale_factor }
    }

    pub fn to_physical(&self) -> PhysicalRect {
        self.frame.to_physical(self.point_scale_factor)
    }
}

/// Payload of a layout-metrics-changed notification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutMetricsChanged {
    pub old: LayoutMetrics,
    pub new: LayoutMetrics,
}

/// A view that reports its layout frame.
pub trait LayoutMetricsView: Send + Sync {
    fn layout_metrics(&self) -> Result<LayoutMetrics, ViewError>;
}

/// Offset and size of a rendered visual relative to the window, plus the
/// rasterization scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visual {
    pub offset: Point,
    pub size: Size,
    pub scale_factor: f64,
}

impl Visual {
    pub fn to_physical(&self) -> PhysicalRect {
        Rect::from_parts(self.offset, self.size).to_physical(self.scale_factor)
    }
}

/// A view that reports its rendered visual.
pub trait VisualView: Send + Sync {
    fn visual(&self) -> Result<Visual, ViewError>;
}

/// Adapts a [`LayoutMetricsView`] into a [`RectSource`].
#[derive(Debug)]
pub struct FromLayoutMetrics<V>(pub V);

impl<V: LayoutMetricsView> RectSource for FromLayoutMetrics<V> {
    fn passthrough_rect(&self) -> Result<PhysicalRect, ViewError> {
        self.0.layout_metrics().map(|metrics| metrics.to_physical())
    }
}

/// Adapts a [`VisualView`] into a [`RectSource`].
#[derive(Debug)]
pub struct FromVisual<V>(pub V);

impl<V: VisualView> RectSource for FromVisual<V> {
    fn passthrough_rect(&self) -> Result<PhysicalRect, ViewError> {
        self.0.visual().map(|visual| visual.to_physical())
    }
}

//! Non-client region abstraction for the application window.
//!
//! The [`RegionPlatform`] trait decouples the passthrough reconciler from the
//! windowing API that actually routes mouse input. Each platform crate
//! implements the trait and registers it via [`register_region_platform!`];
//! the runtime discovers the implementation through [`region_platforms()`].

use crate::platform::PlatformError;
use crate::types::PhysicalRect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque native window handle.
///
/// Wraps the platform-native identifier (HWND on Windows) as a `u64`.
/// Consumers must treat this as opaque; only the originating
/// [`RegionPlatform`] understands how to interpret it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct WindowId(u64);

impl WindowId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowId(0x{:x})", self.0)
    }
}

/// Handle to the object that owns a window's non-client input regions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct RegionSourceId(u64);

impl RegionSourceId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegionSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegionSourceId(0x{:x})", self.0)
    }
}

/// Kinds of non-client regions a window can carry. Each kind is an
/// independent rectangle set; clearing one never touches the others.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegionKind {
    /// Draggable title bar area.
    Caption,
    /// Areas inside the caption that hand input back to the content.
    Passthrough,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKind::Caption => f.write_str("caption"),
            RegionKind::Passthrough => f.write_str("passthrough"),
        }
    }
}

/// Snapshot of a top-level window as reported by the platform.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInfo {
    pub id: WindowId,
    pub process_id: u32,
    pub is_visible: bool,
    pub has_parent: bool,
}

impl WindowInfo {
    /// A visible window without a parent owned by `process_id`; dialogs and
    /// hidden helper windows never qualify.
    pub fn is_application_window_of(&self, process_id: u32) -> bool {
        self.process_id == process_id && self.is_visible && !self.has_parent
    }
}

/// Platform-native window enumeration and non-client region operations.
pub trait RegionPlatform: Send + Sync {
    /// Human-readable name for diagnostics (e.g. `"Win32"`).
    fn name(&self) -> &'static str;

    /// Identifier of the process whose window carries the regions.
    fn current_process_id(&self) -> u32;

    /// All top-level windows in enumeration order. Filtering by process,
    /// visibility and parent is left to the caller.
    fn top_level_windows(&self) -> Result<Vec<WindowInfo>, PlatformError>;

    /// Resolve the non-client input source of `window`.
    fn input_source(&self, window: WindowId) -> Result<RegionSourceId, PlatformError>;

    /// Remove every region of `kind`; other kinds stay in place.
    fn clear_regions(&self, source: RegionSourceId, kind: RegionKind) -> Result<(), PlatformError>;

    /// Replace the complete set of regions of `kind` with `rects`.
    fn set_regions(
        &self,
        source: RegionSourceId,
        kind: RegionKind,
        rects: &[PhysicalRect],
    ) -> Result<(), PlatformError>;
}

impl<T: RegionPlatform + ?Sized> RegionPlatform for &T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn current_process_id(&self) -> u32 {
        (**self).current_process_id()
    }

    fn top_level_windows(&self) -> Result<Vec<WindowInfo>, PlatformError> {
        (**self).top_level_windows()
    }

    fn input_source(&self, window: WindowId) -> Result<RegionSourceId, PlatformError> {
        (**self).input_source(window)
    }

    fn clear_regions(&self, source: RegionSourceId, kind: RegionKind) -> Result<(), PlatformError> {
        (**self).clear_regions(source, kind)
    }

    fn set_regions(
        &self,
        source: RegionSourceId,
        kind: RegionKind,
        rects: &[PhysicalRect],
    ) -> Result<(), PlatformError> {
        (**self).set_regions(source, kind, rects)
    }
}

/// Inventory registration entry for [`RegionPlatform`].
pub struct RegionPlatformRegistration {
    pub platform: &'static dyn RegionPlatform,
}

inventory::collect!(RegionPlatformRegistration);

/// Iterate over all registered [`RegionPlatform`] implementations.
pub fn region_platforms() -> impl Iterator<Item = &'static dyn RegionPlatform> {
    inventory::iter::<RegionPlatformRegistration>.into_iter().map(|entry| entry.platform)
}

/// Register a [`RegionPlatform`] implementation.
#[macro_export]
macro_rules! register_region_platform {
    ($platform:expr) => {
        inventory::submit! {
            $crate::platform::RegionPlatformRegistration { platform: $platform }
        }
    };
}

use titlebar_core::platform::{
    PlatformError, PlatformErrorKind, RegionKind, RegionPlatform, RegionSourceId, WindowId, WindowInfo,
};
use titlebar_core::types::PhysicalRect;

pub static INERT_PLATFORM: InertPlatform = InertPlatform;

/// Fallback used when no backend is registered. It reports no top-level
/// windows, so every reconciliation is skipped and passthrough views behave
/// like ordinary views.
#[derive(Debug, Default, Clone, Copy)]
pub struct InertPlatform;

impl RegionPlatform for InertPlatform {
    fn name(&self) -> &'static str {
        "inert"
    }

    fn current_process_id(&self) -> u32 {
        std::process::id()
    }

    fn top_level_windows(&self) -> Result<Vec<WindowInfo>, PlatformError> {
        Ok(Vec::new())
    }

    fn input_source(&self, _window: WindowId) -> Result<RegionSourceId, PlatformError> {
        Err(PlatformError::simple(PlatformErrorKind::UnsupportedPlatform))
    }

    fn clear_regions(&self, _source: RegionSourceId, _kind: RegionKind) -> Result<(), PlatformError> {
        Err(PlatformError::simple(PlatformErrorKind::UnsupportedPlatform))
    }

    fn set_regions(
        &self,
        _source: RegionSourceId,
        _kind: RegionKind,
        _rects: &[PhysicalRect],
    ) -> Result<(), PlatformError> {
        Err(PlatformError::simple(PlatformErrorKind::UnsupportedPlatform))
    }
}

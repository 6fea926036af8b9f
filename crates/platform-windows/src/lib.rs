//! Windows specific platform integration for titlebar.
//!
//! Registers a Win32 [`titlebar_core::platform::RegionPlatform`] that
//! enumerates top-level windows and answers non-client hit tests for caption
//! and passthrough regions through a window subclass.

mod hit_test;
#[cfg(target_os = "windows")]
mod region;

pub use hit_test::{NonClientHit, WindowRegions, screen_coordinates};
#[cfg(target_os = "windows")]
pub use region::Win32RegionPlatform;

#[cfg(not(target_os = "windows"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowsPlatformStub;

use crate::PassthroughHost;
use crate::geometry::{RectSource, ViewError};
use crate::registry::{RegionProvider, RegionRegistry};
use rstest::fixture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use titlebar_core::types::PhysicalRect;
use titlebar_platform_mock::{MOCK_APPLICATION_WINDOW, MockRegionPlatform};

/// View with a settable rectangle that can be marked stale.
#[derive(Debug)]
pub struct StubView {
    rect: Mutex<PhysicalRect>,
    stale: AtomicBool,
}

impl StubView {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Arc<Self> {
        Arc::new(Self { rect: Mutex::new(PhysicalRect::new(x, y, width, height)), stale: AtomicBool::new(false) })
    }

    pub fn set_rect(&self, rect: PhysicalRect) {
        *self.rect.lock().unwrap() = rect;
    }

    pub fn invalidate(&self) {
        self.stale.store(true, Ordering::SeqCst);
    }
}

impl RectSource for StubView {
    fn passthrough_rect(&self) -> Result<PhysicalRect, ViewError> {
        if self.stale.load(Ordering::SeqCst) {
            return Err(ViewError::Stale);
        }
        Ok(*self.rect.lock().unwrap())
    }
}

/// Provider registered directly in a registry, bypassing the host.
pub struct RegisteredView {
    pub provider: Arc<RegionProvider>,
    pub view: Arc<StubView>,
}

pub fn register_view(registry: &RegionRegistry, view: Arc<StubView>) -> RegisteredView {
    let provider = Arc::new(RegionProvider::new());
    provider.set_view(Some(view.clone()));
    registry.register(Arc::clone(&provider));
    RegisteredView { provider, view }
}

/// rstest fixture: fresh mock platform with one application window.
#[fixture]
pub fn mock_platform() -> Arc<MockRegionPlatform> {
    let platform = Arc::new(MockRegionPlatform::new());
    platform.add_application_window(MOCK_APPLICATION_WINDOW);
    platform
}

/// rstest fixture: host over a fresh mock platform.
#[fixture]
pub fn mock_host(mock_platform: Arc<MockRegionPlatform>) -> PassthroughHost {
    PassthroughHost::with_platform(mock_platform)
}

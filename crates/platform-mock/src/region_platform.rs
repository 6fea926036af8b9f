use std::collections::BTreeMap;
use std::sync::Mutex;
use titlebar_core::platform::{
    PlatformError, PlatformErrorKind, RegionKind, RegionPlatform, RegionSourceId, WindowId, WindowInfo,
};
use titlebar_core::types::PhysicalRect;

/// Process identifier reported by the mock.
pub const MOCK_PROCESS_ID: u32 = 4242;

/// Handle used for the mock application window.
pub const MOCK_APPLICATION_WINDOW: WindowId = WindowId::new(0x1000);

pub static MOCK_REGION_PLATFORM: MockRegionPlatform = MockRegionPlatform::new();

/// Log entry for region platform operations.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionLogEntry {
    TopLevelWindows,
    InputSource(WindowId),
    Clear(RegionSourceId, RegionKind),
    Set(RegionSourceId, RegionKind, Vec<PhysicalRect>),
}

/// Operations that can be forced to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Enumerate,
    InputSource,
    Clear,
    Set,
}

#[derive(Debug)]
struct MockState {
    windows: Vec<WindowInfo>,
    failures: Vec<(MockFailure, PlatformErrorKind)>,
    regions: BTreeMap<(RegionSourceId, RegionKind), Vec<PhysicalRect>>,
    log: Vec<RegionLogEntry>,
}

impl MockState {
    const fn new() -> Self {
        Self { windows: Vec::new(), failures: Vec::new(), regions: BTreeMap::new(), log: Vec::new() }
    }

    fn check(&self, failure: MockFailure) -> Result<(), PlatformError> {
        match self.failures.iter().find(|(candidate, _)| *candidate == failure) {
            Some((_, kind)) => {
                Err(PlatformError::new(kind.clone(), format!("mock failure injected for {failure:?}")))
            }
            None => Ok(()),
        }
    }
}

/// Region platform backed by an in-memory window list and region table.
///
/// Input source ids mirror the raw window handle. Windows that are not in the
/// window list resolve to [`PlatformErrorKind::WindowUnavailable`].
#[derive(Debug)]
pub struct MockRegionPlatform {
    state: Mutex<MockState>,
}

impl Default for MockRegionPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRegionPlatform {
    pub const fn new() -> Self {
        Self { state: Mutex::new(MockState::new()) }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        let mut state = self.state.lock().expect("mock region state poisoned");
        f(&mut state)
    }

    /// Adds a visible, parentless window owned by [`MOCK_PROCESS_ID`].
    pub fn add_application_window(&self, id: WindowId) {
        self.push_window(WindowInfo { id, process_id: MOCK_PROCESS_ID, is_visible: true, has_parent: false });
    }

    /// Appends an arbitrary window to the enumeration order.
    pub fn push_window(&self, info: WindowInfo) {
        self.with_state(|state| state.windows.push(info));
    }

    pub fn remove_window(&self, id: WindowId) {
        self.with_state(|state| state.windows.retain(|info| info.id != id));
    }

    /// Makes every subsequent call of the given operation fail with `kind`.
    pub fn fail_on(&self, failure: MockFailure, kind: PlatformErrorKind) {
        self.with_state(|state| {
            state.failures.retain(|(candidate, _)| *candidate != failure);
            state.failures.push((failure, kind));
        });
    }

    pub fn clear_failures(&self) {
        self.with_state(|state| state.failures.clear());
    }

    /// Currently installed rectangles of `kind` for `source`.
    pub fn regions(&self, source: RegionSourceId, kind: RegionKind) -> Vec<PhysicalRect> {
        self.with_state(|state| state.regions.get(&(source, kind)).cloned().unwrap_or_default())
    }

    /// Installs regions without recording a log entry.
    pub fn seed_regions(&self, source: RegionSourceId, kind: RegionKind, rects: &[PhysicalRect]) {
        self.with_state(|state| {
            state.regions.insert((source, kind), rects.to_vec());
        });
    }

    pub fn take_log(&self) -> Vec<RegionLogEntry> {
        self.with_state(|state| state.log.drain(..).collect())
    }

    /// Drops windows, failures, regions and the log.
    pub fn reset(&self) {
        self.with_state(|state| *state = MockState::new());
    }
}

impl RegionPlatform for MockRegionPlatform {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn current_process_id(&self) -> u32 {
        MOCK_PROCESS_ID
    }

    fn top_level_windows(&self) -> Result<Vec<WindowInfo>, PlatformError> {
        self.with_state(|state| {
            state.log.push(RegionLogEntry::TopLevelWindows);
            state.check(MockFailure::Enumerate)?;
            Ok(state.windows.clone())
        })
    }

    fn input_source(&self, window: WindowId) -> Result<RegionSourceId, PlatformError> {
        self.with_state(|state| {
            state.log.push(RegionLogEntry::InputSource(window));
            state.check(MockFailure::InputSource)?;
            if state.windows.iter().any(|info| info.id == window) {
                Ok(RegionSourceId::new(window.raw()))
            } else {
                Err(PlatformError::new(PlatformErrorKind::WindowUnavailable, format!("{window} is gone")))
            }
        })
    }

    fn clear_regions(&self, source: RegionSourceId, kind: RegionKind) -> Result<(), PlatformError> {
        self.with_state(|state| {
            state.log.push(RegionLogEntry::Clear(source, kind));
            state.check(MockFailure::Clear)?;
            state.regions.remove(&(source, kind));
            Ok(())
        })
    }

    fn set_regions(
        &self,
        source: RegionSourceId,
        kind: RegionKind,
        rects: &[PhysicalRect],
    ) -> Result<(), PlatformError> {
        self.with_state(|state| {
            state.log.push(RegionLogEntry::Set(source, kind, rects.to_vec()));
            state.check(MockFailure::Set)?;
            tracing::trace!(%source, %kind, count = rects.len(), "mock regions replaced");
            state.regions.insert((source, kind), rects.to_vec());
            Ok(())
        })
    }
}

/// The shared mock instance as a trait object.
pub fn region_platform() -> &'static dyn RegionPlatform {
    &MOCK_REGION_PLATFORM
}

pub fn take_region_log() -> Vec<RegionLogEntry> {
    MOCK_REGION_PLATFORM.take_log()
}

pub fn reset_region_state() {
    MOCK_REGION_PLATFORM.reset();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serial_test::serial;
    use titlebar_core::platform::region_platforms;

    fn source() -> RegionSourceId {
        RegionSourceId::new(MOCK_APPLICATION_WINDOW.raw())
    }

    #[rstest]
    #[serial]
    fn region_platform_not_auto_registered() {
        reset_region_state();
        let mock_in_registry =
            region_platforms().any(|platform| std::ptr::eq(platform, region_platform()));
        assert!(!mock_in_registry, "Mock region platform should not be auto-registered");
    }

    #[rstest]
    #[serial]
    fn set_records_entry_and_replaces_regions() {
        reset_region_state();
        MOCK_REGION_PLATFORM.add_application_window(MOCK_APPLICATION_WINDOW);
        let rects = vec![PhysicalRect::new(0, 0, 10, 10)];

        MOCK_REGION_PLATFORM.set_regions(source(), RegionKind::Passthrough, &rects).unwrap();
        MOCK_REGION_PLATFORM.set_regions(source(), RegionKind::Passthrough, &rects[..0]).unwrap();

        assert!(MOCK_REGION_PLATFORM.regions(source(), RegionKind::Passthrough).is_empty());
        let log = take_region_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], RegionLogEntry::Set(source(), RegionKind::Passthrough, rects));
    }

    #[test]
    fn clear_leaves_other_kinds_untouched() {
        let platform = MockRegionPlatform::new();
        let caption = [PhysicalRect::new(0, 0, 800, 32)];
        platform.seed_regions(source(), RegionKind::Caption, &caption);
        platform.seed_regions(source(), RegionKind::Passthrough, &[PhysicalRect::new(5, 5, 20, 20)]);

        platform.clear_regions(source(), RegionKind::Passthrough).unwrap();

        assert_eq!(platform.regions(source(), RegionKind::Caption), caption.to_vec());
        assert!(platform.regions(source(), RegionKind::Passthrough).is_empty());
    }

    #[test]
    fn unknown_window_is_unavailable() {
        let platform = MockRegionPlatform::new();
        let err = platform.input_source(WindowId::new(1)).unwrap_err();
        assert_eq!(err.kind, PlatformErrorKind::WindowUnavailable);
        assert_eq!(platform.take_log(), vec![RegionLogEntry::InputSource(WindowId::new(1))]);
    }

    #[rstest]
    #[case(MockFailure::Enumerate, PlatformErrorKind::OperationFailed)]
    #[case(MockFailure::InputSource, PlatformErrorKind::InputSourceUnavailable)]
    #[case(MockFailure::Clear, PlatformErrorKind::OperationFailed)]
    #[case(MockFailure::Set, PlatformErrorKind::OperationFailed)]
    fn injected_failures_surface(#[case] failure: MockFailure, #[case] kind: PlatformErrorKind) {
        let platform = MockRegionPlatform::new();
        platform.add_application_window(MOCK_APPLICATION_WINDOW);
        platform.fail_on(failure, kind.clone());

        let result = match failure {
            MockFailure::Enumerate => platform.top_level_windows().map(|_| ()),
            MockFailure::InputSource => platform.input_source(MOCK_APPLICATION_WINDOW).map(|_| ()),
            MockFailure::Clear => platform.clear_regions(source(), RegionKind::Passthrough),
            MockFailure::Set => platform.set_regions(source(), RegionKind::Passthrough, &[]),
        };
        assert_eq!(result.unwrap_err().kind, kind);

        platform.clear_failures();
        assert!(platform.top_level_windows().is_ok());
    }

    #[test]
    fn remove_window_drops_from_enumeration() {
        let platform = MockRegionPlatform::new();
        platform.add_application_window(MOCK_APPLICATION_WINDOW);
        platform.remove_window(MOCK_APPLICATION_WINDOW);
        assert!(platform.top_level_windows().unwrap().is_empty());
    }
}

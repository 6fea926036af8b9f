//! In-memory mock platform implementation for titlebar tests.
//!
//! Exposes a deterministic top-level window list and a per-source region
//! table so reconciliation can be exercised without native APIs. Every call
//! is recorded and can be drained with [`MockRegionPlatform::take_log`].

mod region_platform;

pub use region_platform::{
    MOCK_APPLICATION_WINDOW, MOCK_PROCESS_ID, MOCK_REGION_PLATFORM, MockFailure,
    MockRegionPlatform, RegionLogEntry, region_platform, reset_region_state, take_region_log,
};

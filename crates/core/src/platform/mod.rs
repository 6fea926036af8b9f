mod error;
mod region;

pub use error::{PlatformError, PlatformErrorKind};
pub use region::{
    RegionKind, RegionPlatform, RegionPlatformRegistration, RegionSourceId, WindowId, WindowInfo,
    region_platforms,
};

pub use crate::register_region_platform;

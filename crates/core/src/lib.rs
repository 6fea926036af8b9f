//! Core types and platform traits shared by the titlebar crates.
//!
//! Platform backends implement [`platform::RegionPlatform`] and register it
//! with [`register_region_platform!`]; the runtime discovers them through
//! [`platform::region_platforms()`].

pub mod platform;
pub mod types;

pub mod replay;
pub mod windows;

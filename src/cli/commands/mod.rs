//! CLI command implementations

pub mod completions;
pub mod export;
pub mod import;
pub mod indented;
pub mod init;
pub mod offer;
pub mod part;

pub mod config;
pub mod logging;
pub mod releases;
pub mod select;
pub mod version;

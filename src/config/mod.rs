//! Configuration module for the album-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Collision policy definitions
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{Config, CookieConfig, NetworkConfig, OptionsConfig, DEFAULT_OUTPUT_DIR};
pub use modes::CollisionPolicy;
pub use validation::{validate_concurrency, validate_config, validate_cookie, validate_headers};

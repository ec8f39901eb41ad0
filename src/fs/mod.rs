//! Filesystem module.
//!
//! Provides:
//! - Filename sanitization
//! - Album and per-kind directory placement
//! - File checksums

pub mod checksum;
pub mod naming;
pub mod paths;

pub use checksum::{md5_file, same_contents};
pub use naming::{sanitize_filename, sanitize_path_component};
pub use paths::{album_directory, item_directory, partial_path, URL_LOG_NAME};

//! Download module.
//!
//! This module provides:
//! - The download engine (placement, collisions, layered retries, URL log)
//! - Streaming transfer to disk
//! - Batch statistics

pub mod engine;
pub mod state;
pub mod transfer;

pub use engine::{DownloadEngine, DownloadOptions, DownloadOutcome};
pub use state::DownloadStats;
pub use transfer::stream_to_file;

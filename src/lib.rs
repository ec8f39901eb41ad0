//! Album Downloader - download albums and files from media hosting sites
//!
//! A URL is dispatched through a [`Registry`] of site extractors to a list of
//! [`Item`]s, which the [`DownloadEngine`] then fetches into
//! `<output>/<album>/[<kind>/]<name><ext>`.
//!
//! # Features
//!
//! - Extractor registry with start-up overlap checks
//! - Crawlers whose pages are searched for links other extractors claim
//! - Retries with a separate back-off for rate limiting
//! - Streamed, atomic writes with overwrite, skip and verify collision policies
//! - Optional `urls.txt` audit log per album
//!
//! # Example
//!
//! ```no_run
//! use album_downloader::{sites, Config, DownloadEngine, DownloadOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let engine = DownloadEngine::from_config(&config, CancellationToken::new())?;
//!     let registry = sites::default_registry()?;
//!
//!     let items = registry
//!         .resolve(engine.session(), "https://bunkr.is/a/rXQtFw5W")
//!         .await?;
//!     let stats = engine
//!         .download_all(&items, &DownloadOptions::from_config(&config.options), 1)
//!         .await;
//!     println!("{} downloaded", stats.total_downloaded());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod fs;
pub mod http;
pub mod output;
pub mod sites;

// Re-exports for convenience
pub use config::{CollisionPolicy, Config};
pub use download::{DownloadEngine, DownloadOptions, DownloadOutcome, DownloadStats};
pub use error::{Error, Result};
pub use extract::{Capability, ContentKind, Item, Registry};
pub use http::Session;

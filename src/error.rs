//! Error types for the album-downloader application.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Dispatch errors
    #[error("No suitable extractor for URL: {url}")]
    NoSuitableExtractor { url: String },

    #[error("Multiple extractors match URL {url}: {}", candidates.join(", "))]
    AmbiguousExtractor { url: String, candidates: Vec<String> },

    #[error("Extractors '{first}' and '{second}' both match sample URL {url}")]
    OverlappingPatterns {
        first: String,
        second: String,
        url: String,
    },

    #[error("Extractor '{name}' does not match its own sample URL {url}")]
    SampleMismatch { name: String, url: String },

    #[error("Invalid URL pattern: {0}")]
    Pattern(#[from] regex::Error),

    // Extraction errors
    #[error("Extraction failed for {url}: {message}")]
    Extraction { url: String, message: String },

    // Transport errors
    #[error("Request to {url} failed after {attempts} attempt(s): {message}")]
    Transport {
        url: String,
        attempts: u32,
        message: String,
    },

    #[error("Rate limited by {url} after {attempts} attempt(s)")]
    RateLimited { url: String, attempts: u32 },

    #[error("Operation cancelled")]
    Cancelled,

    // Download errors
    #[error("Download failed: {0}")]
    Download(String),

    #[error("No album name for {url}; pass an album name explicitly")]
    MissingAlbumName { url: String },

    // Item errors
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("Invalid item: {0}")]
    InvalidItem(String),

    // File system errors
    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Build an extraction error for the given page.
    pub fn extraction(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Extraction {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Whether a fresh attempt at the whole fetch could succeed.
    ///
    /// Covers exhausted transport retries, persistent rate limiting and
    /// body/stream failures raised by reqwest after the response started.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport { .. } | Error::RateLimited { .. } => true,
            Error::Http(e) => !e.is_builder(),
            _ => false,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ABORT: i32 = 1;
    pub const EXTRACTION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}

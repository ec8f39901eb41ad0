//! Configuration validation logic.

use crate::config::loader::{Config, CookieConfig};
use crate::error::{Error, Result};
use crate::http::request::header_map;

/// Upper bound on parallel item downloads.
const MAX_CONCURRENCY: usize = 16;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_attempts("network.request_attempts", config.network.request_attempts)?;
    validate_attempts(
        "network.download_attempts",
        config.network.download_attempts,
    )?;
    validate_concurrency(config.options.concurrency)?;
    validate_delay_range(config.options.item_delay_ms)?;
    validate_headers(config.network.headers.iter())?;

    if let Some(album) = &config.options.album_name {
        if album.trim().is_empty() {
            return Err(Error::ConfigValidation {
                field: "options.album_name".to_string(),
                message: "Album name cannot be empty".to_string(),
            });
        }
    }

    for cookie in &config.cookies {
        validate_cookie(cookie)?;
    }

    Ok(())
}

fn validate_attempts(field: &str, attempts: u32) -> Result<()> {
    if attempts == 0 {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: "At least one attempt is required".to_string(),
        });
    }
    Ok(())
}

/// Validate the number of parallel downloads.
pub fn validate_concurrency(concurrency: usize) -> Result<()> {
    if concurrency == 0 || concurrency > MAX_CONCURRENCY {
        return Err(Error::ConfigValidation {
            field: "options.concurrency".to_string(),
            message: format!(
                "Concurrency must be between 1 and {} (got {})",
                MAX_CONCURRENCY, concurrency
            ),
        });
    }
    Ok(())
}

fn validate_delay_range([min, max]: [u64; 2]) -> Result<()> {
    if min > max {
        return Err(Error::ConfigValidation {
            field: "options.item_delay_ms".to_string(),
            message: format!("Minimum delay {} exceeds maximum {}", min, max),
        });
    }
    Ok(())
}

/// Validate that header names and values are legal HTTP.
pub fn validate_headers<'a, I>(headers: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    header_map(headers).map(|_| ())
}

/// Validate a cookie entry.
pub fn validate_cookie(cookie: &CookieConfig) -> Result<()> {
    if cookie.name.trim().is_empty() {
        return Err(Error::ConfigValidation {
            field: "cookies.name".to_string(),
            message: "Cookie name cannot be empty".to_string(),
        });
    }

    if cookie.name.contains(['=', ';', ' ']) {
        return Err(Error::ConfigValidation {
            field: "cookies.name".to_string(),
            message: format!("Cookie name '{}' contains invalid characters", cookie.name),
        });
    }

    if cookie.value.contains(';') {
        return Err(Error::ConfigValidation {
            field: "cookies.value".to_string(),
            message: format!("Value of cookie '{}' contains ';'", cookie.name),
        });
    }

    if cookie.domain.trim().is_empty() {
        return Err(Error::ConfigValidation {
            field: "cookies.domain".to_string(),
            message: format!("Cookie '{}' has no domain", cookie.name),
        });
    }

    Ok(())
}

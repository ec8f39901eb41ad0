//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{validate_concurrency, CollisionPolicy, Config, CookieConfig};

/// Album and file downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "album-downloader",
    version,
    about = "Download albums and files from media hosting sites",
    long_about = "A CLI tool to download images, videos, archives and audio from album pages,\n\
                  file-host pages and direct links."
)]
pub struct Args {
    /// Album, file page or direct link URL(s).
    #[arg(required_unless_present = "list_extractors")]
    pub urls: Vec<String>,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory")]
    pub output_directory: Option<PathBuf>,

    /// Put images, videos, archives and audio in separate folders.
    #[arg(long)]
    pub separate: bool,

    /// Record each item's source URL in urls.txt.
    #[arg(long)]
    pub save_urls: bool,

    /// Album folder name, overriding the name found on the page.
    #[arg(long = "album")]
    pub album_name: Option<String>,

    /// What to do with files that already exist.
    #[arg(long, value_enum)]
    pub collision: Option<CollisionArg>,

    /// Number of items downloaded at the same time.
    #[arg(long, value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// Cookie to send, as name=value@domain. Can be repeated.
    #[arg(long = "cookie", value_parser = parse_cookie)]
    pub cookies: Vec<CookieConfig>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Hide download progress information.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,

    /// List supported sites and exit.
    #[arg(long)]
    pub list_extractors: bool,
}

/// CLI collision policy argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CollisionArg {
    /// Download again and replace the file.
    Overwrite,
    /// Keep the existing file.
    Skip,
    /// Download and replace the file only if it differs.
    Verify,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(arg: CollisionArg) -> Self {
        match arg {
            CollisionArg::Overwrite => CollisionPolicy::Overwrite,
            CollisionArg::Skip => CollisionPolicy::Skip,
            CollisionArg::Verify => CollisionPolicy::Verify,
        }
    }
}

/// Parse a `name=value@domain` cookie argument.
pub fn parse_cookie(s: &str) -> Result<CookieConfig, String> {
    let (pair, domain) = s
        .rsplit_once('@')
        .ok_or_else(|| format!("Expected name=value@domain, got '{}'", s))?;
    let (name, value) = pair
        .split_once('=')
        .ok_or_else(|| format!("Expected name=value@domain, got '{}'", s))?;

    if name.is_empty() || domain.is_empty() {
        return Err(format!("Cookie name and domain must not be empty: '{}'", s));
    }

    Ok(CookieConfig {
        name: name.to_string(),
        value: value.to_string(),
        domain: domain.to_string(),
    })
}

fn parse_concurrency(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("Not a number: '{}'", s))?;
    validate_concurrency(n).map_err(|e| e.to_string())?;
    Ok(n)
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        if let Some(dir) = self.output_directory {
            config.options.output_directory = dir;
        }

        if let Some(album) = self.album_name {
            config.options.album_name = Some(album);
        }

        if let Some(collision) = self.collision {
            config.options.collision_policy = collision.into();
        }

        if let Some(concurrency) = self.concurrency {
            config.options.concurrency = concurrency;
        }

        // Boolean flags (only override if set to non-default)
        if self.separate {
            config.options.separate_content = true;
        }

        if self.save_urls {
            config.options.save_urls = true;
        }

        if self.quiet {
            config.options.show_progress = false;
        }

        config.cookies.extend(self.cookies);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookie() {
        let cookie = parse_cookie("session=a=b@bunkr.is").unwrap();
        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value, "a=b");
        assert_eq!(cookie.domain, "bunkr.is");

        assert!(parse_cookie("session=abc").is_err());
        assert!(parse_cookie("=abc@bunkr.is").is_err());
        assert!(parse_cookie("session@bunkr.is").is_err());
    }

    #[test]
    fn test_merge_overrides_config() {
        let args = Args::parse_from([
            "album-downloader",
            "https://bunkr.is/a/rXQtFw5W",
            "-d",
            "/tmp/out",
            "--separate",
            "--album",
            "Mine",
            "--collision",
            "verify",
            "--concurrency",
            "4",
            "--cookie",
            "token=x@example.com",
            "--quiet",
        ]);
        assert_eq!(args.urls, vec!["https://bunkr.is/a/rXQtFw5W".to_string()]);

        let mut config = Config::default();
        args.merge_into_config(&mut config);

        assert_eq!(config.options.output_directory, PathBuf::from("/tmp/out"));
        assert!(config.options.separate_content);
        assert!(!config.options.save_urls);
        assert_eq!(config.options.album_name.as_deref(), Some("Mine"));
        assert_eq!(config.options.collision_policy, CollisionPolicy::Verify);
        assert_eq!(config.options.concurrency, 4);
        assert!(!config.options.show_progress);
        assert_eq!(config.cookies.len(), 1);
    }

    #[test]
    fn test_urls_required_unless_listing() {
        assert!(Args::try_parse_from(["album-downloader"]).is_err());
        assert!(Args::try_parse_from(["album-downloader", "--list-extractors"]).is_ok());
    }

    #[test]
    fn test_concurrency_bounds() {
        assert!(Args::try_parse_from(["album-downloader", "u", "--concurrency", "0"]).is_err());
    }
}

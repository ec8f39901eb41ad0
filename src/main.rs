//! Album Downloader - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use album_downloader::{
    cli::Args,
    config::{validate_config, Config},
    download::{DownloadEngine, DownloadOptions, DownloadStats},
    error::{exit_codes, Error, Result},
    output::{
        create_spinner, print_banner, print_config_summary, print_error, print_extractors,
        print_info, print_stats, print_success, print_summary, print_warning,
    },
    sites::default_registry,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            let code = match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::InvalidHeader(_)
                | Error::TomlParse(_) => exit_codes::CONFIG_ERROR,
                Error::NoSuitableExtractor { .. }
                | Error::AmbiguousExtractor { .. }
                | Error::Extraction { .. }
                | Error::OverlappingPatterns { .. }
                | Error::SampleMismatch { .. }
                | Error::Pattern(_) => exit_codes::EXTRACTION_ERROR,
                Error::Transport { .. } | Error::RateLimited { .. } | Error::Download(_) => {
                    exit_codes::DOWNLOAD_ERROR
                }
                Error::Cancelled => exit_codes::ABORT,
                _ => exit_codes::UNEXPECTED_ERROR,
            };
            ExitCode::from(code as u8)
        }
    }
}

async fn run() -> Result<i32> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    let registry = default_registry()?;
    if args.list_extractors {
        print_extractors(registry.descriptors());
        return Ok(exit_codes::SUCCESS);
    }

    print_banner();

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        tracing::debug!(
            "Configuration file not found: {}, using defaults",
            config_path.display()
        );
        Config::default()
    };

    let urls = args.urls.clone();
    args.merge_into_config(&mut config);
    validate_config(&config)?;

    print_config_summary(
        &urls,
        &config.output_directory().display().to_string(),
        &config.options.collision_policy.to_string(),
    );

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            print_warning("Interrupted, stopping...");
            ctrl_c.cancel();
        }
    });

    let engine = DownloadEngine::from_config(&config, cancel.clone())?;
    let options = DownloadOptions::from_config(&config.options);

    let mut stats = DownloadStats::default();
    let mut extraction_failed = false;

    for url in &urls {
        if cancel.is_cancelled() {
            break;
        }

        let spinner = config
            .options
            .show_progress
            .then(|| create_spinner(&format!("Extracting {}", url)));
        let resolved = registry.resolve(engine.session(), url).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        let items = match resolved {
            Ok(items) => items,
            Err(Error::Cancelled) => break,
            Err(e) => {
                print_error(&format!("{}: {}", url, e));
                extraction_failed = true;
                continue;
            }
        };

        if items.is_empty() {
            print_warning(&format!("Nothing to download at {}", url));
            continue;
        }

        print_info(&format!("Found {} item(s) at {}", items.len(), url));
        let batch = engine
            .download_all(&items, &options, config.options.concurrency)
            .await;
        stats.merge(&batch);
    }

    if config.options.show_progress {
        print_stats(&stats);
    } else {
        print_summary(&stats);
    }

    if cancel.is_cancelled() {
        return Ok(exit_codes::ABORT);
    }
    if extraction_failed {
        return Ok(exit_codes::EXTRACTION_ERROR);
    }
    if stats.has_failures() {
        print_warning(&format!("{} item(s) failed", stats.failed_count));
        return Ok(exit_codes::DOWNLOAD_ERROR);
    }

    print_success("Done");
    Ok(exit_codes::SUCCESS)
}

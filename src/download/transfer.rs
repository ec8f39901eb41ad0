//! Streaming a response body to disk.

use std::path::Path;

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::http::Response;
use crate::output::progress::create_download_bar;

/// Minimum file size to show progress bar (20 MB).
const PROGRESS_THRESHOLD: u64 = 20 * 1024 * 1024;

/// Stream the response body into `path`, returning the bytes written.
///
/// The file is removed again if the copy fails or is cancelled.
pub async fn stream_to_file(
    response: Response,
    path: &Path,
    show_progress: bool,
    cancel: &CancellationToken,
) -> Result<u64> {
    let result = copy_body(response, path, show_progress, cancel).await;

    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::debug!("Could not remove partial file {}: {}", path.display(), e);
        }
    }

    result
}

async fn copy_body(
    response: Response,
    path: &Path,
    show_progress: bool,
    cancel: &CancellationToken,
) -> Result<u64> {
    let url = response.url().to_string();
    let content_length = response.content_length();

    let progress = if show_progress && content_length.is_some_and(|l| l > PROGRESS_THRESHOLD) {
        Some(create_download_bar(content_length.unwrap_or(0)))
    } else {
        None
    };

    let mut file = File::create(path).await?;
    let mut stream = response.into_inner().bytes_stream();
    let mut downloaded: u64 = 0;

    loop {
        let chunk = tokio::select! {
            chunk = stream.next() => chunk,
            _ = cancel.cancelled() => return Err(Error::Cancelled),
        };
        let Some(chunk) = chunk else { break };
        let chunk = chunk?;

        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        if let Some(ref pb) = progress {
            pb.set_position(downloaded);
        }
    }

    file.flush().await?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    // Content-Length is dropped by reqwest for decoded bodies, so this only
    // checks identity-encoded transfers.
    if let Some(expected) = content_length {
        if downloaded < expected {
            return Err(Error::Transport {
                url,
                attempts: 1,
                message: format!("body ended after {} of {} bytes", downloaded, expected),
            });
        }
    }

    tracing::debug!("Wrote {} bytes to {}", downloaded, path.display());
    Ok(downloaded)
}

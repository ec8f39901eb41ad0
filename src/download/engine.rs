//! Item downloading: placement, collision handling, retries and the
//! source-URL log.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures::StreamExt;
use rand::Rng;
use reqwest::Method;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::{CollisionPolicy, Config, OptionsConfig};
use crate::download::state::DownloadStats;
use crate::download::transfer::stream_to_file;
use crate::error::{Error, Result};
use crate::extract::Item;
use crate::fs::{album_directory, item_directory, partial_path, same_contents, URL_LOG_NAME};
use crate::http::{
    pause, Backoff, PreparedRequest, RequestOptions, RetryDecision, RetryPolicy, Session,
};

/// Per-run download settings.
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Put each kind of content in its own subdirectory.
    pub separate_content: bool,
    /// Append each item's source to `urls.txt` in the album directory.
    pub save_urls: bool,
    /// Album directory to use instead of the items' own album titles.
    pub album_name: Option<String>,
    pub collision_policy: CollisionPolicy,
    pub show_progress: bool,
    /// Random pause range between items, in milliseconds.
    pub item_delay_ms: [u64; 2],
}

impl DownloadOptions {
    pub fn from_config(options: &OptionsConfig) -> Self {
        Self {
            separate_content: options.separate_content,
            save_urls: options.save_urls,
            album_name: options.album_name.clone(),
            collision_policy: options.collision_policy,
            show_progress: options.show_progress,
            item_delay_ms: options.item_delay_ms,
        }
    }
}

/// What happened to one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// File written to the path.
    Saved(PathBuf),
    /// Existing file had identical contents and was kept.
    Unchanged(PathBuf),
    /// Existing file kept without any request.
    SkippedExisting(PathBuf),
    /// Server answered with an error status; nothing written.
    Invalid { status: u16 },
}

/// Downloads items into an output directory through a shared session.
pub struct DownloadEngine {
    session: Session,
    output_root: PathBuf,
    policy: RetryPolicy,
    url_log: Mutex<()>,
}

impl DownloadEngine {
    pub fn new(session: Session, output_root: impl Into<PathBuf>, policy: RetryPolicy) -> Self {
        Self {
            session,
            output_root: output_root.into(),
            policy,
            url_log: Mutex::new(()),
        }
    }

    /// Build the session, inject configured cookies and resolve the output root.
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Result<Self> {
        let session = Session::from_config(&config.network, cancel)?;
        for cookie in &config.cookies {
            session.set_cookie(&cookie.name, &cookie.value, &cookie.domain)?;
        }

        Ok(Self::new(
            session,
            config.output_directory(),
            config.network.download_policy(),
        ))
    }

    /// Session shared with extractors.
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Store a cookie for `domain` in the shared session.
    pub fn set_cookie(&self, name: &str, value: &str, domain: &str) -> Result<()> {
        self.session.set_cookie(name, value, domain)
    }

    /// Download one item.
    ///
    /// An error status from the server is reported as
    /// [`DownloadOutcome::Invalid`] so a batch can carry on.
    pub async fn download(
        &self,
        item: &Item,
        options: &DownloadOptions,
    ) -> Result<DownloadOutcome> {
        let album_dir = album_directory(&self.output_root, item, options.album_name.as_deref())?;
        let target_dir = item_directory(&album_dir, item, options.separate_content);
        let target = target_dir.join(item.file_name());

        let exists = tokio::fs::try_exists(&target).await?;
        if exists {
            match options.collision_policy {
                CollisionPolicy::Skip => {
                    tracing::info!("Skipping existing file: {}", target.display());
                    return Ok(DownloadOutcome::SkippedExisting(target));
                }
                CollisionPolicy::Overwrite => {
                    tracing::warn!("{} already exists, overwriting", target.display());
                }
                CollisionPolicy::Verify => {
                    tracing::debug!("{} already exists, verifying contents", target.display());
                }
            }
        }

        tokio::fs::create_dir_all(&target_dir).await?;

        let verify = exists && options.collision_policy == CollisionPolicy::Verify;
        let outcome = self
            .fetch_with_retry(item, &target, verify, options.show_progress)
            .await?;

        match &outcome {
            DownloadOutcome::Saved(path) => {
                tracing::info!("Downloaded: {}", path.display());
                if options.save_urls {
                    self.record_source(&album_dir, item).await?;
                }
            }
            DownloadOutcome::Unchanged(path) => {
                tracing::info!("Unchanged: {}", path.display());
                if options.save_urls {
                    self.record_source(&album_dir, item).await?;
                }
            }
            DownloadOutcome::Invalid { status } => {
                tracing::warn!("Skipping {}: HTTP {}", item.source(), status);
            }
            DownloadOutcome::SkippedExisting(_) => {}
        }

        Ok(outcome)
    }

    /// Fetch and persist, retrying the whole operation on transient failures.
    async fn fetch_with_retry(
        &self,
        item: &Item,
        target: &Path,
        verify: bool,
        show_progress: bool,
    ) -> Result<DownloadOutcome> {
        let request = self
            .session
            .build(Method::GET, item.source(), &RequestOptions::new())?;
        let deadline = self.policy.deadline(Instant::now(), None);
        let mut attempt = 1;

        loop {
            let error = match self
                .fetch_once(&request, deadline, target, verify, show_progress)
                .await
            {
                Err(e) if e.is_transient() => e,
                other => return other,
            };

            match self.policy.should_retry(Backoff::Transient, attempt, deadline) {
                RetryDecision::Retry {
                    delay,
                    attempt: next,
                } => {
                    tracing::warn!(
                        "Download of {} failed ({}), retrying in {:?} (attempt {}/{})",
                        item.source(),
                        error,
                        delay,
                        next,
                        self.policy.max_attempts()
                    );
                    pause(delay, self.session.cancel_token()).await?;
                    attempt = next;
                }
                RetryDecision::DoNotRetry { reason } => {
                    tracing::debug!("Giving up on {}: {}", item.source(), reason);
                    return Err(error);
                }
            }
        }
    }

    async fn fetch_once(
        &self,
        request: &PreparedRequest,
        deadline: Option<Instant>,
        target: &Path,
        verify: bool,
        show_progress: bool,
    ) -> Result<DownloadOutcome> {
        let response = self.session.send_until(request, deadline).await?;
        if response.is_invalid() {
            return Ok(DownloadOutcome::Invalid {
                status: response.status().as_u16(),
            });
        }

        let part = partial_path(target);
        stream_to_file(response, &part, show_progress, self.session.cancel_token()).await?;

        if verify {
            let (a, b) = (part.clone(), target.to_path_buf());
            let same = tokio::task::spawn_blocking(move || same_contents(&a, &b))
                .await
                .map_err(|e| Error::Download(format!("Checksum task failed: {}", e)))
                .and_then(|r| r);

            match same {
                Ok(true) => {
                    tokio::fs::remove_file(&part).await?;
                    return Ok(DownloadOutcome::Unchanged(target.to_path_buf()));
                }
                Ok(false) => {
                    tracing::info!("{} changed, replacing", target.display());
                }
                Err(e) => {
                    let _ = tokio::fs::remove_file(&part).await;
                    return Err(e);
                }
            }
        }

        tokio::fs::rename(&part, target).await?;
        Ok(DownloadOutcome::Saved(target.to_path_buf()))
    }

    async fn record_source(&self, album_dir: &Path, item: &Item) -> Result<()> {
        let _guard = self.url_log.lock().await;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(album_dir.join(URL_LOG_NAME))
            .await?;
        file.write_all(format!("{}\n", item.source()).as_bytes())
            .await?;
        file.flush().await?;
        Ok(())
    }

    /// Download every item, `concurrency` at a time, in order.
    ///
    /// Per-item failures are logged and counted. Stops early when the
    /// session is cancelled.
    pub async fn download_all(
        &self,
        items: &[Item],
        options: &DownloadOptions,
        concurrency: usize,
    ) -> DownloadStats {
        let mut stats = DownloadStats::default();
        let cancel = self.session.cancel_token();

        let mut results = futures::stream::iter(items.iter().enumerate())
            .map(|(index, item)| async move {
                if index > 0 {
                    self.item_delay(options).await?;
                }
                self.download(item, options).await
            })
            .buffered(concurrency.max(1));

        let mut finished = items.iter();
        while let Some(result) = results.next().await {
            let Some(item) = finished.next() else { break };
            match result {
                Ok(outcome) => stats.record(item, &outcome),
                Err(Error::Cancelled) => {
                    stats.record_failure();
                    tracing::warn!("Download of {} cancelled", item.source());
                }
                Err(e) => {
                    stats.record_failure();
                    tracing::error!("Failed to download {}: {}", item.source(), e);
                }
            }

            if cancel.is_cancelled() {
                break;
            }
        }

        stats
    }

    async fn item_delay(&self, options: &DownloadOptions) -> Result<()> {
        let [min, max] = options.item_delay_ms;
        if max == 0 {
            return Ok(());
        }

        let millis = rand::thread_rng().gen_range(min..=max.max(min));
        pause(Duration::from_millis(millis), self.session.cancel_token()).await
    }
}

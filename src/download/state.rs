//! Download statistics.

use crate::download::engine::DownloadOutcome;
use crate::extract::{ContentKind, Item};

/// Counts for one batch of downloads.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownloadStats {
    pub image_count: u64,
    pub video_count: u64,
    pub archive_count: u64,
    pub audio_count: u64,

    /// Existing files left alone by the skip policy.
    pub skipped_existing: u64,
    /// Existing files found identical by the verify policy.
    pub unchanged_count: u64,
    /// Items the server answered with an error status.
    pub invalid_count: u64,
    pub failed_count: u64,
}

impl DownloadStats {
    /// Record a finished item.
    pub fn record(&mut self, item: &Item, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Saved(_) => match item.content_kind() {
                ContentKind::Image => self.image_count += 1,
                ContentKind::Video => self.video_count += 1,
                ContentKind::Archive => self.archive_count += 1,
                ContentKind::Audio => self.audio_count += 1,
            },
            DownloadOutcome::Unchanged(_) => self.unchanged_count += 1,
            DownloadOutcome::SkippedExisting(_) => self.skipped_existing += 1,
            DownloadOutcome::Invalid { .. } => self.invalid_count += 1,
        }
    }

    pub fn record_failure(&mut self) {
        self.failed_count += 1;
    }

    /// Add the counts of another batch.
    pub fn merge(&mut self, other: &DownloadStats) {
        self.image_count += other.image_count;
        self.video_count += other.video_count;
        self.archive_count += other.archive_count;
        self.audio_count += other.audio_count;
        self.skipped_existing += other.skipped_existing;
        self.unchanged_count += other.unchanged_count;
        self.invalid_count += other.invalid_count;
        self.failed_count += other.failed_count;
    }

    /// Get total downloaded count.
    pub fn total_downloaded(&self) -> u64 {
        self.image_count + self.video_count + self.archive_count + self.audio_count
    }

    /// Items not downloaded for a non-fatal reason.
    pub fn total_skipped(&self) -> u64 {
        self.skipped_existing + self.unchanged_count + self.invalid_count
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn item(name: &str) -> Item {
        Item::from_file_name(name, format!("https://host/{}", name), None).unwrap()
    }

    #[test]
    fn test_record_by_kind_and_outcome() {
        let mut stats = DownloadStats::default();
        let saved = DownloadOutcome::Saved(PathBuf::from("x"));

        stats.record(&item("a.jpg"), &saved);
        stats.record(&item("b.mp4"), &saved);
        stats.record(&item("c.zip"), &saved);
        stats.record(&item("d.flac"), &saved);
        stats.record(&item("e.png"), &DownloadOutcome::Invalid { status: 404 });
        stats.record(&item("f.png"), &DownloadOutcome::Unchanged(PathBuf::from("f")));
        stats.record(&item("g.png"), &DownloadOutcome::SkippedExisting(PathBuf::from("g")));
        stats.record_failure();

        assert_eq!(stats.total_downloaded(), 4);
        assert_eq!(stats.total_skipped(), 3);
        assert!(stats.has_failures());
    }

    #[test]
    fn test_merge() {
        let mut total = DownloadStats::default();
        let batch = DownloadStats {
            image_count: 2,
            failed_count: 1,
            ..Default::default()
        };
        total.merge(&batch);
        total.merge(&batch);

        assert_eq!(total.image_count, 4);
        assert_eq!(total.failed_count, 2);
    }
}

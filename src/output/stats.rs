//! Statistics reporting.

use console::style;

use crate::download::DownloadStats;

/// Print statistics for a finished run.
pub fn print_stats(stats: &DownloadStats) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Statistics:").bold());
    println!("  Images:   {}", stats.image_count);
    println!("  Videos:   {}", stats.video_count);
    println!("  Archives: {}", stats.archive_count);
    println!("  Audio:    {}", stats.audio_count);
    println!(
        "  Skipped:  {} ({} existing, {} unchanged, {} unavailable)",
        stats.total_skipped(),
        stats.skipped_existing,
        stats.unchanged_count,
        stats.invalid_count
    );
    if stats.has_failures() {
        println!("  Failed:   {}", style(stats.failed_count).red());
    }
    println!("  Total:    {} downloaded", stats.total_downloaded());
    println!("{}", style("═".repeat(50)).dim());
}

/// Print a summary line for quick viewing.
pub fn print_summary(stats: &DownloadStats) {
    println!(
        "Downloaded: {} images, {} videos, {} archives, {} audio ({} skipped, {} failed)",
        style(stats.image_count).green(),
        style(stats.video_count).green(),
        style(stats.archive_count).green(),
        style(stats.audio_count).green(),
        style(stats.total_skipped()).yellow(),
        style(stats.failed_count).red()
    );
}

//! Transfer progress: human-readable sizes and the in-place progress line.

use std::fmt::Write as _;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};

use super::constants::PROGRESS_BAR_WIDTH;

const SIZE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Formats a byte count with 1024-based units, rounded to two decimals.
///
/// Whole values keep one decimal: `1024` is `"1.0 KB"`, `1536` is `"1.5 KB"`.
/// Halves round to even, so `1152` is `"1.12 KB"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn human_readable_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut scaled = bytes as f64;
    let mut unit = 0;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let rounded = (scaled * 100.0).round_ties_even() / 100.0;
    if rounded.fract().abs() < f64::EPSILON {
        format!("{rounded:.1} {}", SIZE_UNITS[unit])
    } else {
        format!("{rounded} {}", SIZE_UNITS[unit])
    }
}

/// Renders the progress text after the `Progress: ` prefix.
///
/// With a known positive total: a bar, a one-decimal percentage and the
/// downloaded/total pair. Without one: only the running byte count.
#[must_use]
pub fn render_transfer(downloaded: u64, total: Option<u64>) -> String {
    let Some(total) = total.filter(|total| *total > 0) else {
        return format!("{} downloaded...", human_readable_size(downloaded));
    };

    let filled = usize::try_from(
        (u128::from(downloaded) * PROGRESS_BAR_WIDTH as u128 / u128::from(total))
            .min(PROGRESS_BAR_WIDTH as u128),
    )
    .unwrap_or(PROGRESS_BAR_WIDTH);

    let mut line = String::with_capacity(PROGRESS_BAR_WIDTH * 3 + 40);
    line.push_str(&"█".repeat(filled));
    line.push_str(&"-".repeat(PROGRESS_BAR_WIDTH - filled));
    let _ = write!(
        line,
        "| {:.1}% ({}/{})",
        percent(downloaded, total),
        human_readable_size(downloaded),
        human_readable_size(total)
    );
    line
}

#[allow(clippy::cast_precision_loss)]
fn percent(downloaded: u64, total: u64) -> f64 {
    100.0 * (downloaded as f64 / total as f64)
}

/// Progress line for one transfer, redrawn in place.
#[derive(Debug)]
pub struct TransferProgress {
    bar: ProgressBar,
}

impl TransferProgress {
    /// Creates a progress line drawn to `target`.
    ///
    /// `total` is the declared size; `None` switches to byte-count-only mode.
    #[must_use]
    pub fn new(total: Option<u64>, target: ProgressDrawTarget) -> Self {
        let style = ProgressStyle::with_template("Progress: {transfer}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key("transfer", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = w.write_str(&render_transfer(state.pos(), state.len()));
            });
        let bar = ProgressBar::with_draw_target(total.filter(|t| *t > 0), target).with_style(style);
        Self { bar }
    }

    /// Creates a progress line that draws nothing.
    #[must_use]
    pub fn hidden(total: Option<u64>) -> Self {
        Self::new(total, ProgressDrawTarget::hidden())
    }

    /// Records `bytes` more bytes written.
    pub fn advance(&self, bytes: u64) {
        self.bar.inc(bytes);
    }

    /// Bytes recorded so far.
    #[must_use]
    pub fn downloaded(&self) -> u64 {
        self.bar.position()
    }

    /// Draws the final state and terminates the line.
    pub fn finish(&self) {
        self.bar.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_readable_size_zero() {
        assert_eq!(human_readable_size(0), "0 B");
    }

    #[test]
    fn test_human_readable_size_scales_by_1024() {
        assert_eq!(human_readable_size(1024), "1.0 KB");
        assert_eq!(human_readable_size(1536), "1.5 KB");
        assert_eq!(human_readable_size(1024 * 1024), "1.0 MB");
        assert_eq!(human_readable_size(5 * 1024 * 1024 * 1024), "5.0 GB");
    }

    #[test]
    fn test_human_readable_size_rounds_halves_to_even() {
        assert_eq!(human_readable_size(1152), "1.12 KB");
        assert_eq!(human_readable_size(1664), "1.62 KB");
        assert_eq!(human_readable_size(1140), "1.11 KB");
    }

    #[test]
    fn test_human_readable_size_below_one_kilobyte() {
        assert_eq!(human_readable_size(1), "1.0 B");
        assert_eq!(human_readable_size(1000), "1000.0 B");
    }

    #[test]
    fn test_human_readable_size_rounds_to_two_decimals() {
        assert_eq!(human_readable_size(1126), "1.1 KB");
        assert_eq!(human_readable_size(1500), "1.46 KB");
    }

    #[test]
    fn test_human_readable_size_u64_max_stays_in_range() {
        assert!(human_readable_size(u64::MAX).ends_with(" EB"));
    }

    #[test]
    fn test_render_transfer_unknown_total_shows_byte_count_only() {
        let line = render_transfer(2048, None);
        assert_eq!(line, "2.0 KB downloaded...");
        assert!(!line.contains('%'));
        assert!(!line.contains('█'));
    }

    #[test]
    fn test_render_transfer_zero_total_treated_as_unknown() {
        assert_eq!(render_transfer(10, Some(0)), "10.0 B downloaded...");
    }

    #[test]
    fn test_render_transfer_half_done() {
        let line = render_transfer(1024, Some(2048));
        let expected_bar = format!("{}{}", "█".repeat(25), "-".repeat(25));
        assert_eq!(line, format!("{expected_bar}| 50.0% (1.0 KB/2.0 KB)"));
    }

    #[test]
    fn test_render_transfer_complete_and_overshoot_clamp_bar() {
        let done = render_transfer(2048, Some(2048));
        assert!(done.starts_with(&"█".repeat(50)));
        assert!(done.contains("100.0%"));

        let over = render_transfer(4096, Some(2048));
        assert!(over.starts_with(&"█".repeat(50)));
        assert!(!over.contains('-'));
    }

    #[test]
    fn test_transfer_progress_counts_bytes() {
        let progress = TransferProgress::hidden(Some(2048));
        progress.advance(1024);
        progress.advance(1000);
        assert_eq!(progress.downloaded(), 2024);
        progress.finish();
        assert_eq!(progress.downloaded(), 2024);
    }
}

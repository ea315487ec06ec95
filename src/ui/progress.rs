use crate::pdf::SplitProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(100);
const PAGE_TEMPLATE: &str =
    "{spinner:.green} {prefix:>12.bold} [{bar:32.cyan/blue}] {pos}/{len} {wide_msg}";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {prefix:>12.bold} {msg} ({elapsed})";

/// Owns the terminal area used for progress bars. When disabled every bar it hands
/// out is hidden, so callers never branch on the output mode.
pub struct ProgressManager {
    bars: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            bars: MultiProgress::new(),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Bar advanced once per single-page file written.
    pub fn pages(&self, prefix: &str, total: usize) -> StageProgress {
        let style = ProgressStyle::with_template(PAGE_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        self.start(ProgressBar::new(total as u64), style, prefix)
    }

    /// Spinner for stages with no page count, such as merging.
    pub fn spinner(&self, prefix: &str, message: &str) -> StageProgress {
        let style = ProgressStyle::with_template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let stage = self.start(ProgressBar::new_spinner(), style, prefix);
        stage.bar.set_message(message.to_string());
        stage
    }

    fn start(&self, bar: ProgressBar, style: ProgressStyle, prefix: &str) -> StageProgress {
        let bar = if self.enabled {
            let bar = self.bars.add(bar);
            bar.set_style(style);
            bar.set_prefix(prefix.to_string());
            bar.enable_steady_tick(TICK);
            bar
        } else {
            ProgressBar::hidden()
        };

        StageProgress {
            bar,
            started: Instant::now(),
        }
    }

    /// Run `f` with the bars hidden, for prompts and messages printed mid-stage.
    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if self.enabled {
            self.bars.suspend(f)
        } else {
            f()
        }
    }

    pub fn clear(&self) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.bars.clear() {
            tracing::debug!(error = %e, "could not clear progress bars");
        }
    }
}

/// One bar or spinner tied to a pipeline stage.
pub struct StageProgress {
    bar: ProgressBar,
    started: Instant,
}

impl StageProgress {
    pub fn page(&self, progress: &SplitProgress) {
        self.bar.set_length(progress.total as u64);
        self.bar.set_position(progress.current as u64);
        self.bar.set_message(progress.file_name.clone());
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(format!(
            "{} in {}",
            message,
            format_duration(self.started.elapsed())
        ));
    }

    pub fn fail(&self, message: &str) {
        self.bar.abandon_with_message(message.to_string());
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

pub(crate) fn format_duration(duration: Duration) -> String {
    match duration.as_secs() {
        0 => format!("{}ms", duration.as_millis()),
        secs @ 1..=59 => format!("{}s", secs),
        secs => format!("{}m {}s", secs / 60, secs % 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_manager_hands_out_hidden_bars() {
        let manager = ProgressManager::new(false);
        assert!(!manager.is_enabled());
        assert!(manager.pages("Receipt", 3).bar().is_hidden());
        assert!(manager.spinner("Receipt", "merging").bar().is_hidden());
    }

    #[test]
    fn page_bar_tracks_split_progress() {
        let manager = ProgressManager::new(false);
        let stage = manager.pages("Receipt", 9);

        stage.page(&SplitProgress {
            current: 2,
            total: 5,
            file_name: "Bob_CS101_Receipt.pdf".to_string(),
        });

        assert_eq!(stage.bar().position(), 2);
        assert_eq!(stage.bar().length(), Some(5));
        assert_eq!(stage.bar().message(), "Bob_CS101_Receipt.pdf");
    }

    #[test]
    fn finish_and_fail_end_the_bar() {
        let manager = ProgressManager::new(false);

        let done = manager.pages("Certificate", 1);
        done.finish("Wrote 1 certificates");
        assert!(done.bar().is_finished());
        assert!(done.bar().message().starts_with("Wrote 1 certificates in "));

        let failed = manager.spinner("Certificate", "merging");
        failed.fail("Merge failed");
        assert!(failed.bar().is_finished());
        assert_eq!(failed.bar().message(), "Merge failed");
    }

    #[test]
    fn clear_after_stages_leaves_bars_finished() {
        let manager = ProgressManager::new(true);
        let stage = manager.pages("Receipt", 2);
        stage.finish("wrote 2 files");

        manager.clear();
        manager.clear();
        assert!(stage.bar().is_finished());
    }

    #[test]
    fn durations_are_compact() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "61m 1s");
    }
}

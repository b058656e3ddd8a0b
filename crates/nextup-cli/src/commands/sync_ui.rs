use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use nextup_core::SyncProgress;
use std::io::IsTerminal;
use std::sync::Mutex;
use std::time::Duration;

/// Spinner plus one bar per library section. Without a terminal, progress is
/// reported through structured logs instead.
pub struct SyncUI {
    multi: MultiProgress,
    spinner: ProgressBar,
    section: Mutex<Option<ProgressBar>>,
    interactive: bool,
}

impl SyncUI {
    pub fn new() -> Self {
        let interactive = is_interactive();
        let multi = MultiProgress::new();

        let spinner = multi.add(ProgressBar::new_spinner());
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        if interactive {
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner.set_message("Connecting to Plex...");
        } else {
            spinner.finish_and_clear();
            tracing::info!(operation = "sync_ui", interactive = false, "No terminal attached, reporting sync progress via logs");
        }

        Self {
            multi,
            spinner,
            section: Mutex::new(None),
            interactive,
        }
    }

    pub fn finish(&self, msg: &str) {
        if self.interactive {
            self.spinner.finish_with_message(msg.to_string());
        }
    }

    pub fn abandon(&self) {
        if self.interactive {
            self.spinner.abandon_with_message("Sync failed");
        }
    }
}

impl SyncProgress for SyncUI {
    fn section_started(&self, title: &str, items: usize) {
        if !self.interactive {
            tracing::info!(operation = "progress", section = %title, total = items, "Section sync started");
            return;
        }

        self.spinner.set_message(format!("Syncing {}", title));
        let bar = self.multi.add(ProgressBar::new(items as u64));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.yellow} [{wide_bar:.yellow/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        if let Ok(mut section) = self.section.lock() {
            *section = Some(bar);
        }
    }

    fn item_synced(&self, title: &str) {
        if !self.interactive {
            return;
        }
        if let Ok(section) = self.section.lock() {
            if let Some(bar) = section.as_ref() {
                bar.inc(1);
                bar.set_message(title.to_string());
            }
        }
    }

    fn section_finished(&self, title: &str) {
        if !self.interactive {
            tracing::info!(operation = "progress", section = %title, "Section sync finished");
            return;
        }
        if let Ok(mut section) = self.section.lock() {
            if let Some(bar) = section.take() {
                bar.finish_with_message(format!("{} done", title));
            }
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

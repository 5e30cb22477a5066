//! Download progress on the terminal.

use std::io::{self, IsTerminal};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use modelres::repository::{TransferListener, TransportError};

const TEMPLATE: &str = "{spinner:.green} {msg} {bytes} ({bytes_per_sec})";

/// Shows one spinner line per fetched resource.
pub struct ProgressListener {
    bar: ProgressBar,
}

impl ProgressListener {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template(TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        if !io::stderr().is_terminal() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        Self { bar }
    }

    /// Remove the spinner from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressListener {
    fn default() -> Self {
        Self::new()
    }
}

fn file_name(resource: &str) -> &str {
    resource.rsplit('/').next().unwrap_or(resource)
}

impl TransferListener for ProgressListener {
    fn transfer_initiated(&self, resource: &str) {
        self.bar.reset();
        self.bar.set_message(file_name(resource).to_string());
    }

    fn transfer_progressed(&self, _resource: &str, transferred: u64) {
        self.bar.set_position(transferred);
    }

    fn transfer_failed(&self, resource: &str, error: &TransportError) {
        if !error.is_not_found() {
            self.bar
                .println(format!("  {} {}", console::style("failed").red(), file_name(resource)));
        }
    }

    fn transfer_corrupted(&self, resource: &str, expected: &str, actual: &str) {
        self.bar.println(format!(
            "  {} {} (expected {}, got {})",
            console::style("checksum mismatch").yellow(),
            file_name(resource),
            expected,
            actual
        ));
    }
}

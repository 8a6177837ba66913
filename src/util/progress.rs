//! Terminal progress bar for file corpus generation (§2: "~2%").
//!
//! Grounded on the original `Core/progress.go` bar (total/current, elapsed
//! time, percentage), rendered here with `indicatif` rather than a
//! hand-rolled `\r`-carriage-return loop.

use indicatif::{ProgressBar, ProgressStyle};

/// Thin wrapper around `indicatif::ProgressBar` sized to the number of
/// files the corpus builder is about to create.
pub struct CorpusProgress {
    bar: ProgressBar,
}

impl CorpusProgress {
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files.max(1));
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} generating files [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({percent}%)",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

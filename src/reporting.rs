use chrono::Local;
use std::path::PathBuf;
use std::time::Duration;

/// Formats a stderr line with timestamp, level, and crate prefix.
fn format_line(level: &str, message: &str) -> String {
    format!(
        "{} [{}] (code_listing): {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        level,
        message
    )
}

/// Outcome counts for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub rendered: usize,
    pub suppressed: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// Tally `results`; an empty listing counts as suppressed.
    pub fn from_results(results: &[(PathBuf, anyhow::Result<String>)]) -> Self {
        let mut summary = Self::default();
        for (_, result) in results {
            match result {
                Ok(listing) if listing.is_empty() => summary.suppressed += 1,
                Ok(_) => summary.rendered += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.rendered + self.suppressed + self.failed
    }
}

/// Reports every failed file to stderr.
pub fn report_failures(results: &[(PathBuf, anyhow::Result<String>)]) {
    for (path, result) in results {
        if let Err(e) = result {
            eprintln!("{}", format_line("ERROR", &format!("{}", path.display())));
            for line in format!("{:#}", e).lines() {
                eprintln!("{}", format_line("ERROR", &format!("  {}", line)));
            }
        }
    }
}

/// Prints the batch summary to stderr.
///
/// Per-file detail is only logged at debug level (`RUST_LOG=debug`).
pub fn print_summary(summary: &BatchSummary, elapsed: Duration) {
    let level = if summary.failed > 0 { "ERROR" } else { "INFO" };
    eprintln!(
        "{}",
        format_line(
            level,
            &format!(
                "Total: {}, Rendered: {}, Suppressed: {}, Errors: {} in {}ms",
                summary.total(),
                summary.rendered,
                summary.suppressed,
                summary.failed,
                elapsed.as_millis()
            )
        )
    );
}

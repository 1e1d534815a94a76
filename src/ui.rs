// UI layer: plain-text rendering of a verification result plus the spinner
// shown while the request is in flight. Output goes through any `Write` so
// the binary can hand in stdout and tests a buffer.

use crate::api::VerificationResult;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// Print elapsed time, status, accuracy and every sample that carries errors.
pub fn render_result(out: &mut impl Write, result: &VerificationResult, elapsed: Duration) -> io::Result<()> {
    writeln!(out, "Total execution time: {:?}", elapsed)?;
    writeln!(out)?;
    writeln!(out, "Verification Status: {}", result.success)?;
    writeln!(out, "Verification Accuracy Level: {}", result.accuracy_level)?;

    for (i, sample) in result.samples.iter().enumerate() {
        if sample.errors.is_empty() {
            continue;
        }
        writeln!(out, "Sample {} Errors:", i + 1)?;
        for err in &sample.errors {
            writeln!(out, "\tCode: {}, Message: {}, Details: {}", err.code, err.message, err.details)?;
        }
    }
    out.flush()
}

/// Spinner on stderr; hidden automatically when stderr is not a terminal.
pub fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

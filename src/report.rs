//! Human and machine readable reporting for a directory run.
//!
//! The default report goes to stderr with color so it survives piping
//! rewritten output elsewhere. `--json` swaps it for a single JSON
//! document on stdout.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use restyle_core::RestyleError;

use crate::driver::RunSummary;

/// Print the colorized human report to stderr.
pub fn print_human(summary: &RunSummary) -> Result<(), RestyleError> {
    let mut stream = StandardStream::stderr(ColorChoice::Auto);
    render_human(summary, &mut stream)?;
    Ok(())
}

/// Print the run summary as JSON on stdout.
pub fn print_json(summary: &RunSummary) -> Result<(), RestyleError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, summary)
        .map_err(|err| RestyleError::internal(format!("summary serialization failed: {err}")))?;
    writeln!(handle)?;
    Ok(())
}

fn render_human(summary: &RunSummary, out: &mut dyn WriteColor) -> io::Result<()> {
    for report in &summary.reports {
        for diagnostic in &report.diagnostics {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
            write!(
                out,
                "Manual edits needed in {} on line {}",
                report.path.display(),
                diagnostic.line
            )?;
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
            writeln!(out, " - {}", diagnostic.message)?;
            out.reset()?;
        }
    }

    for failure in &summary.failures {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        writeln!(out, "Skipped {}: {}", failure.path.display(), failure.message)?;
        out.reset()?;
    }

    writeln!(
        out,
        "{} files seen, {} rewritten, {} need manual edits, {} skipped",
        summary.seen,
        summary.changed,
        summary.reports.len(),
        summary.failures.len()
    )
}

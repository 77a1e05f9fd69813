//! Directory driver: walks a tree, runs one transform over every
//! JavaScript source file, and writes results back in place.
//!
//! Failure isolation is per file. A parse or structural failure in one
//! file is recorded and logged; the walk continues. Only files whose
//! text actually changed are rewritten on disk, so untouched files keep
//! their timestamps.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use restyle_core::Diagnostic;
use restyle_core::RestyleError;
use restyle_transforms::{SourceFile, TransformFn};

/// Diagnostics attached to one file after a successful transform.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
}

/// A file the transform gave up on entirely.
#[derive(Debug, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of one directory run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    /// Files visited (extension matched and contents read).
    pub seen: usize,
    /// Files whose text changed and was written back.
    pub changed: usize,
    /// Per-file diagnostics, in walk order. Files with no diagnostics
    /// are omitted.
    pub reports: Vec<FileReport>,
    /// Files skipped because the transform failed on them.
    pub failures: Vec<FileFailure>,
}

impl RunSummary {
    /// True when at least one file needs manual attention.
    pub fn needs_attention(&self) -> bool {
        !self.reports.is_empty() || !self.failures.is_empty()
    }
}

const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx"];

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && matches!(entry.file_name().to_str(), Some("node_modules") | Some(".git"))
}

/// Run `transform` over every `.js`/`.jsx` file under `root`, rewriting
/// changed files in place.
pub fn run(transform: TransformFn, root: &Path) -> Result<RunSummary, RestyleError> {
    if !root.is_dir() {
        return Err(RestyleError::usage(format!(
            "not a directory: {}",
            root.display()
        )));
    }

    let mut summary = RunSummary {
        seen: 0,
        changed: 0,
        reports: Vec::new(),
        failures: Vec::new(),
    };

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry));

    for entry in walker {
        let entry = entry.map_err(|err| match err.into_io_error() {
            Some(io) => RestyleError::Io(io),
            None => RestyleError::internal("walk entry without an IO cause"),
        })?;
        if !entry.file_type().is_file() || !is_source_file(entry.path()) {
            continue;
        }
        process_file(transform, entry.path(), &mut summary);
    }

    debug!(
        seen = summary.seen,
        changed = summary.changed,
        failures = summary.failures.len(),
        "run complete"
    );
    Ok(summary)
}

fn process_file(transform: TransformFn, path: &Path, summary: &mut RunSummary) {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "skipping unreadable file");
            summary.failures.push(FileFailure {
                path: path.to_path_buf(),
                message: err.to_string(),
            });
            return;
        }
    };
    summary.seen += 1;

    let file = SourceFile::new(path, source);
    let output = match transform(&file) {
        Ok(output) => output,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "transform failed, file left as-is");
            summary.failures.push(FileFailure {
                path: path.to_path_buf(),
                message: err.to_string(),
            });
            return;
        }
    };

    if output.changed(&file.source) {
        if let Err(err) = fs::write(path, &output.source) {
            warn!(path = %path.display(), error = %err, "could not write rewritten file");
            summary.failures.push(FileFailure {
                path: path.to_path_buf(),
                message: err.to_string(),
            });
            return;
        }
        summary.changed += 1;
    }

    if !output.diagnostics.is_empty() {
        summary.reports.push(FileReport {
            path: path.to_path_buf(),
            diagnostics: output.diagnostics,
        });
    }
}

//! Rewrite rules, one module per rule.
//!
//! Every rule has the same shape: `apply(&mut SyntaxTree, &FileContext)
//! -> Result<Vec<Diagnostic>, TransformError>`. Rules mutate the tree
//! through the replace/insert API and return their diagnostics; they
//! never share mutable state with each other. `Err` is reserved for
//! structurally impossible input — everything recoverable is an
//! abstention or a diagnostic.

use std::path::Path;

pub mod class_name;
pub mod cleanup;
pub mod deprecated;
pub mod imports;
pub mod style_prop;
pub mod theme_inline;
pub mod theme_module;

/// Directory of the canonical theme module, relative to `src/`.
const THEME_DIR: &[&str] = &["components"];
/// Module name of the canonical theme module.
const THEME_MODULE: &str = "Theme";

/// Compute the import path for the canonical theme module
/// (`src/components/Theme`) relative to the consuming file.
///
/// A file outside any `src/` directory falls back to the degenerate
/// sibling form `./Theme`.
pub(crate) fn theme_import_path(file: &Path) -> String {
    let components: Vec<&str> = file
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();
    let Some(src_index) = components.iter().position(|&c| c == "src") else {
        return format!("./{}", THEME_MODULE);
    };

    // Directories between src/ and the file itself.
    let dir = &components[src_index + 1..components.len().saturating_sub(1)];

    let mut common = 0;
    while common < dir.len() && common < THEME_DIR.len() && dir[common] == THEME_DIR[common] {
        common += 1;
    }

    let ups = dir.len() - common;
    let mut parts: Vec<&str> = Vec::new();
    for _ in 0..ups {
        parts.push("..");
    }
    parts.extend(&THEME_DIR[common..]);
    parts.push(THEME_MODULE);

    if ups == 0 {
        format!("./{}", parts.join("/"))
    } else {
        parts.join("/")
    }
}

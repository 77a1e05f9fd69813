//! Flat CSS declaration text → JS object literal text.
//!
//! Input is the raw text of a `css` tagged template with no
//! interpolations: newline-delimited `property: value;` declarations.
//! Output is an object-literal string like
//! `{ color: "red", fontWeight: "600" }`.
//!
//! Only flat declarations convert. A `{` anywhere in the text means a
//! selector or nested rule, which has no object-literal equivalent; the
//! caller abstains with a diagnostic.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StyleObjectError {
    /// The declaration text contains a nested block or selector.
    #[error("nested selector in declaration block")]
    NestedSelector,
}

/// Convert newline-delimited CSS declarations into a JS object literal.
///
/// Trailing semicolons are stripped, values are quoted, and hyphenated
/// property names are camel-cased. Declarations without a `:` are
/// carried through as-is rather than dropped.
pub fn flatten_declarations(raw: &str) -> Result<String, StyleObjectError> {
    if raw.contains('{') || raw.contains('}') {
        return Err(StyleObjectError::NestedSelector);
    }

    let mut properties = Vec::new();
    for line in raw.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let declaration = line.replace(';', "");
        match declaration.split_once(':') {
            Some((name, value)) => {
                let name = camelize(name.trim());
                let value = quote_value(value.trim());
                properties.push(format!("{}: {}", name, value));
            }
            None => properties.push(declaration),
        }
    }

    Ok(format!("{{ {} }}", properties.join(", ")))
}

/// Camel-case a hyphenated CSS property name: `font-weight` →
/// `fontWeight`, `-webkit-box` → `WebkitBox` (React's convention for
/// vendor prefixes).
pub fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Quote a declaration value unless it is already a quoted string.
fn quote_value(value: &str) -> String {
    let already_quoted = (value.starts_with('"') && value.ends_with('"') && value.len() >= 2)
        || (value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2);
    if already_quoted {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('"', "\\\""))
    }
}

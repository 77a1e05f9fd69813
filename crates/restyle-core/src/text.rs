//! Text position utilities for byte offset and line:column conversions.
//!
//! Lines and columns are 1-indexed (matching editor conventions);
//! byte offsets are 0-indexed. Columns count bytes, which is what the
//! parser and diagnostics need here.

use crate::span::Span;

/// Convert a byte offset to 1-indexed line and column.
///
/// If `offset` exceeds content length, returns the position at the end
/// of content.
pub fn byte_offset_to_position(content: &str, offset: usize) -> (u32, u32) {
    let offset = offset.min(content.len());
    let mut line = 1u32;
    let mut col = 1u32;

    for (i, byte) in content.bytes().enumerate() {
        if i >= offset {
            break;
        }
        if byte == b'\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// The 1-indexed line containing a byte offset.
pub fn line_of_offset(content: &str, offset: usize) -> u32 {
    byte_offset_to_position(content, offset).0
}

/// Extract the text content of a span.
///
/// Returns `None` if the span extends beyond content bounds or splits a
/// UTF-8 sequence.
pub fn extract_span<'a>(content: &'a str, span: &Span) -> Option<&'a str> {
    content.get(span.start..span.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod position_tests {
        use super::*;

        #[test]
        fn offset_to_position_simple() {
            let content = "line1\nline2\nline3\n";
            assert_eq!(byte_offset_to_position(content, 0), (1, 1));
            assert_eq!(byte_offset_to_position(content, 4), (1, 5));
            assert_eq!(byte_offset_to_position(content, 5), (1, 6)); // newline char
            assert_eq!(byte_offset_to_position(content, 6), (2, 1));
            assert_eq!(byte_offset_to_position(content, 12), (3, 1));
        }

        #[test]
        fn offset_beyond_content() {
            let content = "short";
            let (line, col) = byte_offset_to_position(content, 100);
            assert_eq!(line, 1);
            assert_eq!(col, 6);
        }

        #[test]
        fn empty_content() {
            assert_eq!(byte_offset_to_position("", 0), (1, 1));
        }

        #[test]
        fn line_of_offset_counts_newlines() {
            let content = "a\nb\nc";
            assert_eq!(line_of_offset(content, 0), 1);
            assert_eq!(line_of_offset(content, 2), 2);
            assert_eq!(line_of_offset(content, 4), 3);
        }
    }

    mod span_tests {
        use super::*;

        #[test]
        fn extract_span_valid() {
            let content = "hello world";
            let span = Span::new(0, 5);
            assert_eq!(extract_span(content, &span), Some("hello"));
        }

        #[test]
        fn extract_span_out_of_bounds() {
            let content = "short";
            let span = Span::new(0, 100);
            assert_eq!(extract_span(content, &span), None);
        }
    }
}

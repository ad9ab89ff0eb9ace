//! Span replacement editor for minimal-diff source rewriting.
//!
//! [`SpanEditor`] collects replacements against an immutable source text and
//! applies them in a single ascending pass. Bytes outside the recorded spans
//! are copied through verbatim, so a rewritten file stays diffable against
//! its upstream origin except for the intended substitutions.
//!
//! # Example
//!
//! ```
//! use vendir_core::edit::SpanEditor;
//! use vendir_core::text::Span;
//!
//! let source = "import \"github.com/foo/bar\"\n";
//!
//! let mut editor = SpanEditor::new(source);
//! editor.replace(Span::new(7, 27), "\"example.com/app/internal/vendor/github.com/foo/bar\"");
//!
//! let result = editor.apply().unwrap();
//! assert_eq!(result, "import \"example.com/app/internal/vendor/github.com/foo/bar\"\n");
//! ```

use thiserror::Error;

use crate::text::Span;

/// A single replacement of the bytes at `span` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub span: Span,
    pub new_text: String,
}

/// Error type for span edit operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Two replacements touch the same bytes.
    #[error("overlapping edits: {first} and {second}")]
    OverlappingEdits { first: Span, second: Span },

    /// A replacement span extends beyond the source or splits a character.
    #[error("span {span} is out of bounds for source of length {source_len}")]
    SpanOutOfBounds { span: Span, source_len: usize },
}

/// Result type for span edit operations.
pub type EditResult<T> = Result<T, EditError>;

/// Collects replacements against a source text and applies them atomically.
#[derive(Debug)]
pub struct SpanEditor<'src> {
    source: &'src str,
    edits: Vec<Replacement>,
}

impl<'src> SpanEditor<'src> {
    /// Create a new editor for the given source.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            edits: Vec::new(),
        }
    }

    /// Queue a replacement.
    pub fn replace(&mut self, span: Span, new_text: impl Into<String>) {
        self.edits.push(Replacement {
            span,
            new_text: new_text.into(),
        });
    }

    /// Apply all queued replacements and return the new text.
    ///
    /// With nothing queued the source is returned unchanged.
    ///
    /// # Errors
    ///
    /// - `EditError::SpanOutOfBounds` if a span exceeds the source or does not
    ///   fall on character boundaries
    /// - `EditError::OverlappingEdits` if two spans share any byte
    pub fn apply(mut self) -> EditResult<String> {
        let source_len = self.source.len();

        for edit in &self.edits {
            let span = edit.span;
            if span.end > source_len
                || !self.source.is_char_boundary(span.start)
                || !self.source.is_char_boundary(span.end)
            {
                return Err(EditError::SpanOutOfBounds { span, source_len });
            }
        }

        // Stable sort keeps insertion order for identical starts
        self.edits.sort_by_key(|edit| (edit.span.start, edit.span.end));

        for pair in self.edits.windows(2) {
            if pair[0].span.overlaps(&pair[1].span) {
                return Err(EditError::OverlappingEdits {
                    first: pair[0].span,
                    second: pair[1].span,
                });
            }
        }

        let growth: usize = self.edits.iter().map(|e| e.new_text.len()).sum();
        let mut result = String::with_capacity(source_len + growth);
        let mut cursor = 0;
        for edit in &self.edits {
            result.push_str(&self.source[cursor..edit.span.start]);
            result.push_str(&edit.new_text);
            cursor = edit.span.end;
        }
        result.push_str(&self.source[cursor..]);

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_editor_returns_source() {
        let source = "package main\n";
        let editor = SpanEditor::new(source);
        assert_eq!(editor.apply().unwrap(), source);
    }

    #[test]
    fn replacements_applied_regardless_of_queue_order() {
        let source = "aa bb cc";
        let mut editor = SpanEditor::new(source);
        editor.replace(Span::new(6, 8), "CCC");
        editor.replace(Span::new(0, 2), "A");
        assert_eq!(editor.apply().unwrap(), "A bb CCC");
    }

    #[test]
    fn adjacent_replacements_allowed() {
        let source = "abcdef";
        let mut editor = SpanEditor::new(source);
        editor.replace(Span::new(0, 3), "X");
        editor.replace(Span::new(3, 6), "Y");
        assert_eq!(editor.apply().unwrap(), "XY");
    }

    #[test]
    fn overlapping_replacements_rejected() {
        let mut editor = SpanEditor::new("abcdef");
        editor.replace(Span::new(0, 4), "X");
        editor.replace(Span::new(3, 6), "Y");
        assert_eq!(
            editor.apply(),
            Err(EditError::OverlappingEdits {
                first: Span::new(0, 4),
                second: Span::new(3, 6),
            })
        );
    }

    #[test]
    fn out_of_bounds_rejected() {
        let mut editor = SpanEditor::new("abc");
        editor.replace(Span::new(1, 10), "X");
        assert!(matches!(
            editor.apply(),
            Err(EditError::SpanOutOfBounds { source_len: 3, .. })
        ));
    }

    #[test]
    fn split_character_rejected() {
        let mut editor = SpanEditor::new("é");
        editor.replace(Span::new(0, 1), "e");
        assert!(matches!(
            editor.apply(),
            Err(EditError::SpanOutOfBounds { .. })
        ));
    }

    #[test]
    fn bytes_outside_spans_preserved() {
        let source = "package x\r\n\timport  \"a\" // trailing\r\n";
        let mut editor = SpanEditor::new(source);
        editor.replace(Span::new(20, 23), "\"p/a\"");
        let result = editor.apply().unwrap();
        assert_eq!(result, "package x\r\n\timport  \"p/a\" // trailing\r\n");
    }
}

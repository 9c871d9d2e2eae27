use std::ops::Range;

use crate::builders::rules::{CLOSE_COMMENT, OPEN_COMMENT};

/// The full text of a build descriptor.
///
/// A `Document` is threaded through rule applications by value: each step
/// consumes the previous document and returns the next one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    content: String,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Byte ranges of every XML comment, from `<!--` through `-->`.
    ///
    /// Comments do not nest: a comment ends at the first `-->` after its
    /// opening. An unterminated comment runs to the end of the text.
    pub fn comment_spans(&self) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        let mut cursor = 0;

        while let Some(offset) = self.content[cursor..].find(OPEN_COMMENT) {
            let start = cursor + offset;
            let body = start + OPEN_COMMENT.len();
            let end = match self.content[body..].find(CLOSE_COMMENT) {
                Some(close) => body + close + CLOSE_COMMENT.len(),
                None => self.content.len(),
            };
            spans.push(start..end);
            cursor = end;
        }

        spans
    }

    /// Whether the byte at `position` sits inside an XML comment.
    pub fn is_commented(&self, position: usize) -> bool {
        self.comment_spans()
            .iter()
            .any(|span| span.contains(&position))
    }
}

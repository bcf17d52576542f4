//! Byte-range safe code rewriter.
//!
//! Applies code edits using byte ranges, preserving formatting outside the
//! edited spans and refusing overlapping edits.
//!
//! # Usage
//!
//! ```
//! use deoptlint::fix::{ByteRangeRewriter, Edit};
//!
//! let source = "const a = { b: 1 };";
//! let mut rewriter = ByteRangeRewriter::new(source);
//! rewriter.add_edit(Edit::new(12, 16, "c: 2"));
//! let fixed = rewriter.apply().expect("should apply");
//! assert_eq!(fixed, "const a = { c: 2 };");
//! ```

use serde::Serialize;

/// A single edit operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    /// Start byte offset (inclusive)
    pub start_byte: usize,
    /// End byte offset (exclusive)
    pub end_byte: usize,
    /// Replacement content
    pub replacement: String,
    /// Optional description for logging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Edit {
    /// Create a new edit
    #[must_use]
    pub fn new(start_byte: usize, end_byte: usize, replacement: impl Into<String>) -> Self {
        Self {
            start_byte,
            end_byte,
            replacement: replacement.into(),
            description: None,
        }
    }

    /// Attach a description
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Create a deletion edit
    #[must_use]
    pub fn delete(start_byte: usize, end_byte: usize) -> Self {
        Self::new(start_byte, end_byte, "")
    }

    /// Create an insertion edit (insert before position)
    #[must_use]
    pub fn insert(position: usize, content: impl Into<String>) -> Self {
        Self::new(position, position, content)
    }

    /// Length of the range being replaced
    #[must_use]
    pub const fn range_len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    /// Check if this edit overlaps with another.
    ///
    /// Touching ranges do not overlap; two insertions at the same offset do
    /// (their relative order would be ambiguous).
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        if self.start_byte == self.end_byte && other.start_byte == other.end_byte {
            return self.start_byte == other.start_byte;
        }
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }
}

/// Error during rewriting
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// Two or more edits have overlapping ranges
    #[error("Overlapping edits at indices {edit_a} and {edit_b}")]
    OverlappingEdits {
        /// Index of first overlapping edit
        edit_a: usize,
        /// Index of second overlapping edit
        edit_b: usize,
    },
    /// Edit range is out of bounds or reversed
    #[error("Edit {edit_index} out of bounds: range {start_byte}..{end_byte} in source of length {source_len}")]
    OutOfBounds {
        /// Index of the bad edit
        edit_index: usize,
        /// Start byte of the edit
        start_byte: usize,
        /// End byte of the edit
        end_byte: usize,
        /// Length of the source
        source_len: usize,
    },
    /// An edit boundary splits a UTF-8 character
    #[error("Edit {edit_index} does not fall on a character boundary")]
    NotCharBoundary {
        /// Index of the bad edit
        edit_index: usize,
    },
}

/// Check bounds, char boundaries and pairwise overlap of `edits` against `source`.
pub(crate) fn validate_edits(source: &str, edits: &[Edit]) -> Result<(), RewriteError> {
    for (i, edit) in edits.iter().enumerate() {
        if edit.end_byte > source.len() || edit.start_byte > edit.end_byte {
            return Err(RewriteError::OutOfBounds {
                edit_index: i,
                start_byte: edit.start_byte,
                end_byte: edit.end_byte,
                source_len: source.len(),
            });
        }
        if !source.is_char_boundary(edit.start_byte) || !source.is_char_boundary(edit.end_byte) {
            return Err(RewriteError::NotCharBoundary { edit_index: i });
        }
    }

    for i in 0..edits.len() {
        for j in (i + 1)..edits.len() {
            if edits[i].overlaps(&edits[j]) {
                return Err(RewriteError::OverlappingEdits {
                    edit_a: i,
                    edit_b: j,
                });
            }
        }
    }

    Ok(())
}

/// Safe code rewriter using byte ranges
///
/// This rewriter applies edits in reverse order to preserve byte positions,
/// and validates that edits don't overlap.
#[derive(Debug, Clone)]
pub struct ByteRangeRewriter {
    /// Original source code
    source: String,
    /// Pending edits
    edits: Vec<Edit>,
}

impl ByteRangeRewriter {
    /// Create a new rewriter for the given source
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            edits: Vec::new(),
        }
    }

    /// Add an edit to the pending list
    pub fn add_edit(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Add multiple edits
    pub fn add_edits(&mut self, edits: impl IntoIterator<Item = Edit>) {
        self.edits.extend(edits);
    }

    /// Get the number of pending edits
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    /// Check if there are any pending edits
    #[must_use]
    pub fn has_edits(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Validate edits without applying them
    ///
    /// # Errors
    /// Returns error if edits overlap or are out of bounds
    pub fn validate(&self) -> Result<(), RewriteError> {
        validate_edits(&self.source, &self.edits)
    }

    /// Apply all edits and return the modified source
    ///
    /// Edits are applied in reverse order (by start position) to preserve
    /// byte offsets as we modify the string.
    ///
    /// # Errors
    /// Returns error if edits overlap or are out of bounds
    pub fn apply(self) -> Result<String, RewriteError> {
        self.validate()?;

        let mut result = self.source;
        let mut sorted_edits = self.edits;

        // Descending start; at equal start the deletion goes first so an
        // insertion at the same offset ends up in front of what remains.
        sorted_edits.sort_by(|a, b| {
            b.start_byte
                .cmp(&a.start_byte)
                .then_with(|| b.end_byte.cmp(&a.end_byte))
        });

        for edit in sorted_edits {
            result.replace_range(edit.start_byte..edit.end_byte, &edit.replacement);
        }

        Ok(result)
    }
}

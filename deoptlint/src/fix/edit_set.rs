//! Validated edit set attached to a finding.

use super::rewriter::{validate_edits, ByteRangeRewriter, Edit, RewriteError};
use serde::Serialize;

/// A proposed fix: edits against the original source that never overlap.
///
/// Only constructible through [`Fix::new`], which validates the edits, so a
/// `Fix` handed to the host can always be applied to the source it was built
/// for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fix {
    edits: Vec<Edit>,
}

impl Fix {
    /// Validate `edits` against `source` and sort them by position.
    ///
    /// # Errors
    /// Returns an error if an edit is out of bounds, splits a character, or
    /// overlaps another edit.
    pub fn new(mut edits: Vec<Edit>, source: &str) -> Result<Self, RewriteError> {
        validate_edits(source, &edits)?;
        edits.sort_by_key(|edit| (edit.start_byte, edit.end_byte));
        Ok(Self { edits })
    }

    /// Edits in source order
    #[must_use]
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Smallest byte range covering every edit, as `(start, end)`.
    #[must_use]
    pub fn span(&self) -> (usize, usize) {
        let start = self.edits.iter().map(|e| e.start_byte).min().unwrap_or(0);
        let end = self.edits.iter().map(|e| e.end_byte).max().unwrap_or(0);
        (start, end)
    }

    /// Whether two fixes touch the same region. Hosts apply at most one of a
    /// conflicting pair per pass.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        let (a_start, a_end) = self.span();
        let (b_start, b_end) = other.span();
        a_start <= b_end && b_start <= a_end
    }

    /// Apply this fix alone to `source`.
    ///
    /// # Errors
    /// Returns an error if `source` is not the text the fix was built for.
    pub fn apply(&self, source: &str) -> Result<String, RewriteError> {
        let mut rewriter = ByteRangeRewriter::new(source);
        rewriter.add_edits(self.edits.iter().cloned());
        rewriter.apply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_overlap() {
        let source = "abcdef";
        let result = Fix::new(vec![Edit::delete(0, 3), Edit::delete(2, 4)], source);
        assert!(matches!(result, Err(RewriteError::OverlappingEdits { .. })));
    }

    #[test]
    fn test_sorted_and_applied() {
        let source = "const o = { a: 1 };";
        let fix = Fix::new(
            vec![Edit::insert(source.len(), "\nx;"), Edit::delete(12, 16)],
            source,
        )
        .expect("valid fix");
        assert_eq!(fix.edits()[0].start_byte, 12);
        assert_eq!(fix.apply(source).expect("applies"), "const o = {  };\nx;");
    }

    #[test]
    fn test_conflicts_by_span() {
        let source = "0123456789";
        let a = Fix::new(vec![Edit::delete(1, 2), Edit::insert(5, "x")], source).expect("a");
        let b = Fix::new(vec![Edit::delete(3, 4)], source).expect("b");
        let c = Fix::new(vec![Edit::delete(7, 8)], source).expect("c");
        assert!(a.conflicts_with(&b));
        assert!(!a.conflicts_with(&c));
    }
}

//! Source edits produced by rules and the machinery that applies them.
//!
//! - `Edit`: one byte-range replacement in the original source
//! - `Fix`: the validated, non-overlapping edit set attached to a finding
//! - `ByteRangeRewriter`: applies edits back to front so offsets stay valid
//!
//! Rules only say *what* to change. Writing results back to disk and
//! choosing which fixes to combine in one pass is the host's job
//! (see `crate::commands::fix`).

mod edit_set;
mod rewriter;

pub use edit_set::Fix;
pub use rewriter::{ByteRangeRewriter, Edit, RewriteError};

//! Tree-sitter based parsing of JavaScript source.
//!
//! Lowers a `tree-sitter-javascript` concrete syntax tree into the same
//! [`SyntaxTree`](crate::ast::SyntaxTree) the ESTree adapter produces, so the
//! rules never see which parser ran.
//!
//! # Feature Gate
//!
//! The parser is only available with the `cst` feature (on by default).
//! Without it, [`parse_source`] fails with [`CstError::Unavailable`] and
//! callers must supply ESTree JSON instead.

#[cfg(feature = "cst")]
mod parser;

#[cfg(feature = "cst")]
pub use parser::CstParser;

use crate::ast::SyntaxTree;

/// Error during CST parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CstError {
    /// Failed to create parser
    #[error("Failed to create CST parser: {0}")]
    ParserCreation(String),
    /// Parser gave up
    #[error("Failed to parse source as JavaScript")]
    ParseFailed,
    /// Source has syntax errors; reported at the first one
    #[error("Syntax error at line {line}, column {column}")]
    Syntax {
        /// 1-indexed line
        line: usize,
        /// 1-indexed column (bytes)
        column: usize,
    },
    /// Built without the `cst` feature
    #[error("parsing JavaScript source requires the `cst` feature; supply ESTree JSON instead")]
    Unavailable,
}

/// Parse JavaScript `source` with a fresh parser.
///
/// # Errors
/// Returns an error if the source has syntax errors or the parser is not
/// compiled in.
pub fn parse_source(source: &str) -> Result<SyntaxTree, CstError> {
    #[cfg(feature = "cst")]
    {
        CstParser::new()?.parse(source)
    }
    #[cfg(not(feature = "cst"))]
    {
        let _ = source;
        Err(CstError::Unavailable)
    }
}

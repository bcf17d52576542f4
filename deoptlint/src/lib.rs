//! Core library for the deoptlint static analysis tool.
//!
//! deoptlint finds object literal entries that pair a computed key with an
//! inline function (`{ [key]: function () {} }`, `{ [key]: () => {} }`,
//! `{ [key]() {} }`) and offers a fix that assigns the function after the
//! declaration instead (`obj[key] = function () {};`).
//!
//! Trees come either from JavaScript source, parsed with tree-sitter
//! ([`cst`], `cst` feature), or from ESTree JSON produced by any JavaScript
//! parser ([`ast::estree`]). The core entry point is [`analyze`]:
//!
//! ```
//! let source = "const obj = { [key]() {} };";
//! let json = r#"{"type":"Program","start":0,"end":27,"body":[
//!   {"type":"VariableDeclaration","kind":"const","start":0,"end":27,"declarations":[
//!     {"type":"VariableDeclarator","start":6,"end":26,
//!      "id":{"type":"Identifier","name":"obj","start":6,"end":9},
//!      "init":{"type":"ObjectExpression","start":12,"end":26,"properties":[
//!        {"type":"Property","kind":"init","computed":true,"method":true,"shorthand":false,
//!         "start":14,"end":24,
//!         "key":{"type":"Identifier","name":"key","start":15,"end":18},
//!         "value":{"type":"FunctionExpression","id":null,"params":[],"async":false,
//!                  "generator":false,"start":19,"end":24,
//!                  "body":{"type":"BlockStatement","start":22,"end":24,"body":[]}}}]}}]}]}"#;
//!
//! let tree = deoptlint::ast::estree::from_json(json, source).unwrap();
//! let findings = deoptlint::analyze(&tree);
//! assert_eq!(findings.len(), 1);
//!
//! let fixed = findings[0].fix.as_ref().unwrap().apply(source).unwrap();
//! assert_eq!(fixed, "const obj = {};\nobj[key] = function() {};");
//! ```

#![allow(
    clippy::similar_names,
    clippy::map_unwrap_or,
    clippy::items_after_statements
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Module containing the host analyzer: file discovery, parallel analysis
/// and aggregation.
pub mod analyzer;

/// Syntax tree model shared by both parsers, plus the ESTree JSON adapter.
pub mod ast;

/// Module defining the command-line interface arguments and structs.
pub mod cli;

/// Module for handling CLI commands and their execution logic.
pub mod commands;

/// Module for loading configuration.
pub mod config;

/// Module containing shared constants and regex patterns.
pub mod constants;

/// Tree-sitter parsing of JavaScript source.
pub mod cst;

/// Module defining the entry point logic shared by every binary.
pub mod entry_point;

/// Byte-range edits and validated fixes.
pub mod fix;

/// Module containing the linter logic and visitor.
pub mod linter;

/// Module for rich CLI output formatting with colored text and progress bars.
pub mod output;

/// Machine-readable report formats (SARIF, GitHub annotations).
pub mod report;

/// Module containing the rules.
pub mod rules;

/// Module containing utility functions.
pub mod utils;

pub use fix::Fix;
pub use linter::analyze;
pub use rules::Finding;

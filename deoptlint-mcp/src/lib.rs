//! MCP server exposing deoptlint's analysis and auto-fix as tools.

pub mod tools;

pub use tools::DeoptLintServer;

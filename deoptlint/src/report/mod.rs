//! Machine-readable report formats.

/// `GitHub` Actions annotations report generator.
pub mod github;
/// SARIF report generator.
pub mod sarif;

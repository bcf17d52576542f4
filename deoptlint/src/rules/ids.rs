//! Centralized Rule IDs.

/// Performance: computed property key with an inline function value
pub const RULE_ID_COMPUTED_INLINE_FUNCTION: &str = "DL-P001";
/// Kebab-case name of [`RULE_ID_COMPUTED_INLINE_FUNCTION`]
pub const RULE_NAME_COMPUTED_INLINE_FUNCTION: &str = "no-computed-inline-function";

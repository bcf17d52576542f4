//! Commands module - CLI subcommand implementations.

mod fix;
mod init;
mod rules;

pub use fix::{fix_source, fix_tree, run_fix, select_fixes, FixOptions, FixOutcome, FixResult};
pub use init::{run_init, run_init_in};
pub use rules::run_rules;

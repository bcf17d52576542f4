//! Rule listing command.

use crate::rules::{all_rules_metadata, RuleMetadata};

use anyhow::Result;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use std::io::Write;

/// Print every available rule, as a table or as JSON.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn run_rules<W: Write>(json: bool, mut writer: W) -> Result<()> {
    let rules = all_rules_metadata();
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&rules)?)?;
        return Ok(());
    }

    writeln!(writer, "\n{}", "Available Rules".bold().underline())?;
    writeln!(writer, "{}", rules_table(&rules))?;
    Ok(())
}

fn rules_table(rules: &[RuleMetadata]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Rule ID", "Name", "Category", "Fixable", "Description"]);

    for rule in rules {
        let fixable = if rule.fixable {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").add_attribute(Attribute::Dim)
        };
        table.add_row(vec![
            Cell::new(rule.id).add_attribute(Attribute::Bold),
            Cell::new(rule.name),
            Cell::new(rule.category),
            fixable,
            Cell::new(rule.summary),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_table_lists_rule() {
        let mut out = Vec::new();
        run_rules(false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("DL-P001"));
        assert!(text.contains("no-computed-inline-function"));
    }

    #[test]
    fn test_rules_json() {
        let mut out = Vec::new();
        run_rules(true, &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json[0]["id"], "DL-P001");
        assert_eq!(json[0]["fixable"], true);
    }
}

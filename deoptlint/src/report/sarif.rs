use crate::analyzer::AnalysisResult;
use crate::fix::Fix;
use crate::rules::{all_rules_metadata, Finding};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

#[derive(Serialize)]
struct SarifLog {
    version: String,
    #[serde(rename = "$schema")]
    schema: String,
    runs: Vec<Run>,
}

#[derive(Serialize)]
struct Run {
    tool: Tool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct Tool {
    driver: Driver,
}

#[derive(Serialize)]
struct Driver {
    name: String,
    version: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rules: Vec<Rule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Rule {
    id: String,
    name: String,
    short_description: Message,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    level: String, // "error", "warning", "note", "none"
    message: Message,
    locations: Vec<Location>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fixes: Vec<SarifFix>,
}

#[derive(Serialize)]
struct Message {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    physical_location: PhysicalLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PhysicalLocation {
    artifact_location: ArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<Region>,
}

#[derive(Serialize)]
struct ArtifactLocation {
    uri: String,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct Region {
    #[serde(skip_serializing_if = "Option::is_none")]
    start_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    byte_offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    byte_length: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifFix {
    description: Message,
    artifact_changes: Vec<ArtifactChange>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactChange {
    artifact_location: ArtifactLocation,
    replacements: Vec<Replacement>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Replacement {
    deleted_region: Region,
    inserted_content: Message,
}

/// Generates a SARIF (Static Analysis Results Interchange Format) report.
///
/// # Errors
///
/// Returns an error if writing to the `writer` fails.
pub fn print_sarif(writer: &mut impl Write, result: &AnalysisResult) -> std::io::Result<()> {
    print_sarif_with_root(writer, result, None)
}

/// Generates a SARIF report with artifact URIs relative to `root`.
///
/// Fixes are emitted as SARIF `fixes` with byte-offset replacements.
///
/// # Errors
///
/// Returns an error if writing to the `writer` or JSON serialization fails.
pub fn print_sarif_with_root(
    writer: &mut impl Write,
    result: &AnalysisResult,
    root: Option<&Path>,
) -> std::io::Result<()> {
    let mut results: Vec<SarifResult> = result
        .findings
        .iter()
        .map(|finding| make_finding_result(finding, root))
        .collect();

    for e in &result.parse_errors {
        results.push(SarifResult {
            rule_id: "parse-error".to_owned(),
            level: "error".to_owned(),
            message: Message {
                text: format!("Parse error: {}", e.error),
            },
            locations: vec![location(artifact_uri(&e.file, root), None)],
            fixes: Vec::new(),
        });
    }

    let rules = all_rules_metadata()
        .into_iter()
        .map(|meta| Rule {
            id: meta.id.to_owned(),
            name: meta.name.to_owned(),
            short_description: Message {
                text: meta.summary.to_owned(),
            },
        })
        .collect();

    let log = SarifLog {
        version: "2.1.0".to_owned(),
        schema: SARIF_SCHEMA.to_owned(),
        runs: vec![Run {
            tool: Tool {
                driver: Driver {
                    name: "deoptlint".to_owned(),
                    version: env!("CARGO_PKG_VERSION").to_owned(),
                    rules,
                },
            },
            results,
        }],
    };

    serde_json::to_writer_pretty(&mut *writer, &log)?;
    writeln!(writer)
}

fn make_finding_result(finding: &Finding, root: Option<&Path>) -> SarifResult {
    let level = match finding.severity.to_lowercase().as_str() {
        "error" => "error",
        "warning" => "warning",
        _ => "note",
    };
    let uri = artifact_uri(&finding.file, root);
    let region = Region {
        start_line: Some(finding.line),
        start_column: Some(finding.col),
        byte_offset: Some(finding.start_byte),
        byte_length: Some(finding.end_byte.saturating_sub(finding.start_byte)),
    };
    let fixes = finding
        .fix
        .as_ref()
        .map(|fix| vec![make_fix(fix, &uri)])
        .unwrap_or_default();

    SarifResult {
        rule_id: finding.rule_id.clone(),
        level: level.to_owned(),
        message: Message {
            text: finding.message.clone(),
        },
        locations: vec![location(uri, Some(region))],
        fixes,
    }
}

fn make_fix(fix: &Fix, uri: &str) -> SarifFix {
    let replacements = fix
        .edits()
        .iter()
        .map(|edit| Replacement {
            deleted_region: Region {
                byte_offset: Some(edit.start_byte),
                byte_length: Some(edit.range_len()),
                ..Region::default()
            },
            inserted_content: Message {
                text: edit.replacement.clone(),
            },
        })
        .collect();

    SarifFix {
        description: Message {
            text: "Move the function out of the object literal".to_owned(),
        },
        artifact_changes: vec![ArtifactChange {
            artifact_location: ArtifactLocation {
                uri: uri.to_owned(),
            },
            replacements,
        }],
    }
}

fn location(uri: String, region: Option<Region>) -> Location {
    Location {
        physical_location: PhysicalLocation {
            artifact_location: ArtifactLocation { uri },
            region,
        },
    }
}

fn artifact_uri(file: &Path, root: Option<&Path>) -> String {
    let relative = match root {
        Some(r) if !(r.as_os_str() == "." || r.as_os_str().is_empty()) => {
            file.strip_prefix(r).unwrap_or(file)
        }
        _ => file,
    };
    let s = relative.to_string_lossy().replace('\\', "/");
    s.strip_prefix("./").unwrap_or(&s).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix::Edit;
    use std::path::PathBuf;

    #[test]
    fn test_sarif_includes_fix_replacements() {
        let source = "const o = { [k]: function() {} };";
        let fix = Fix::new(
            vec![Edit::delete(11, 31), Edit::insert(33, "\no[k] = function() {};")],
            source,
        )
        .unwrap();
        let result = AnalysisResult {
            findings: vec![Finding {
                rule_id: "DL-P001".to_owned(),
                rule_name: "no-computed-inline-function".to_owned(),
                category: "Performance".to_owned(),
                severity: "warning".to_owned(),
                message: "msg".to_owned(),
                file: PathBuf::from("/repo/src/a.js"),
                line: 1,
                col: 13,
                start_byte: 12,
                end_byte: 30,
                fix: Some(fix),
                notes: vec![],
            }],
            ..AnalysisResult::default()
        };

        let mut out = Vec::new();
        print_sarif_with_root(&mut out, &result, Some(Path::new("/repo"))).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(json["version"], "2.1.0");
        let sarif_result = &json["runs"][0]["results"][0];
        assert_eq!(sarif_result["ruleId"], "DL-P001");
        assert_eq!(sarif_result["level"], "warning");
        assert_eq!(
            sarif_result["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
            "src/a.js"
        );
        let replacements = &sarif_result["fixes"][0]["artifactChanges"][0]["replacements"];
        assert_eq!(replacements[0]["deletedRegion"]["byteOffset"], 11);
        assert_eq!(replacements[0]["deletedRegion"]["byteLength"], 20);
        assert_eq!(replacements[1]["insertedContent"]["text"], "\no[k] = function() {};");
        assert_eq!(json["runs"][0]["tool"]["driver"]["rules"][0]["id"], "DL-P001");
    }
}

//! Analysis of trees supplied as ESTree JSON, as produced by espree or acorn.
#![recursion_limit = "256"]
#![allow(clippy::unwrap_used)]

use deoptlint::analyze;
use deoptlint::analyzer::DeoptLint;
use deoptlint::ast::estree::{from_json, from_value, EstreeError};
use deoptlint::commands::fix_tree;
use serde_json::{json, Value};
use std::path::Path;

/// ESTree for `const o = { [k]: () => 1 };`, every UTF-16 offset moved by
/// `shift` to account for a prefix.
fn arrow_program(shift: u64, total: u64) -> Value {
    let r = |start: u64, end: u64| json!([start + shift, end + shift]);
    json!({
        "type": "Program", "range": [0, total], "sourceType": "module",
        "body": [{
            "type": "VariableDeclaration", "kind": "const", "range": r(0, 27),
            "declarations": [{
                "type": "VariableDeclarator", "range": r(6, 26),
                "id": {"type": "Identifier", "name": "o", "range": r(6, 7)},
                "init": {
                    "type": "ObjectExpression", "range": r(10, 26),
                    "properties": [{
                        "type": "Property", "range": r(12, 24),
                        "kind": "init", "computed": true, "method": false, "shorthand": false,
                        "key": {"type": "Identifier", "name": "k", "range": r(13, 14)},
                        "value": {
                            "type": "ArrowFunctionExpression", "range": r(17, 24),
                            "id": null, "params": [], "async": false, "generator": false,
                            "expression": true,
                            "body": {"type": "Literal", "value": 1, "raw": "1", "range": r(23, 24)}
                        }
                    }]
                }
            }]
        }]
    })
}

#[test]
fn test_estree_arrow_fix() {
    let source = "const o = { [k]: () => 1 };";
    let tree = from_value(&arrow_program(0, 27), source).unwrap();
    let findings = analyze(&tree);

    assert_eq!(findings.len(), 1);
    assert_eq!((findings[0].start_byte, findings[0].end_byte), (12, 24));
    let fixed = findings[0].fix.as_ref().unwrap().apply(source).unwrap();
    assert_eq!(fixed, "const o = {};\no[k] = () => 1;");
}

#[test]
fn test_estree_utf16_offsets() {
    // "é" is one UTF-16 unit and two bytes, "😀" two units and four bytes
    let prefix = "// é😀\n";
    let source = format!("{prefix}const o = {{ [k]: () => 1 }};");
    let tree = from_value(&arrow_program(7, 34), source.as_str()).unwrap();
    let findings = analyze(&tree);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].start_byte, 22);
    assert_eq!(findings[0].line, 2);
    assert_eq!(findings[0].col, 13);
    let fixed = findings[0].fix.as_ref().unwrap().apply(&source).unwrap();
    assert_eq!(fixed, format!("{prefix}const o = {{}};\no[k] = () => 1;"));
}

#[test]
fn test_estree_start_end_spans() {
    let source = "x = { [k]() {} };";
    let json = r#"{
        "type": "Program", "start": 0, "end": 17,
        "body": [{
            "type": "ExpressionStatement", "start": 0, "end": 17,
            "expression": {
                "type": "AssignmentExpression", "operator": "=", "start": 0, "end": 16,
                "left": {"type": "Identifier", "name": "x", "start": 0, "end": 1},
                "right": {
                    "type": "ObjectExpression", "start": 4, "end": 16,
                    "properties": [{
                        "type": "Property", "kind": "init", "computed": true, "method": true,
                        "shorthand": false, "start": 6, "end": 14,
                        "key": {"type": "Identifier", "name": "k", "start": 7, "end": 8},
                        "value": {
                            "type": "FunctionExpression", "id": null, "params": [],
                            "async": false, "generator": false, "start": 9, "end": 14,
                            "body": {"type": "BlockStatement", "body": [], "start": 12, "end": 14}
                        }
                    }]
                }
            }
        }]
    }"#;
    let tree = from_json(json, source).unwrap();
    let findings = analyze(&tree);

    // Assignment targets are not simple bindings
    assert_eq!(findings.len(), 1);
    assert!(findings[0].fix.is_none());
}

#[test]
fn test_estree_babel_file_wrapper() {
    let wrapped = json!({"type": "File", "program": arrow_program(0, 27)});
    let tree = from_value(&wrapped, "const o = { [k]: () => 1 };").unwrap();
    assert_eq!(analyze(&tree).len(), 1);
}

#[test]
fn test_babel_object_members() {
    // Babel's default AST, without the `estree` plugin
    let source = "const o = { a: 'x', [k]() {} };";
    let program = json!({
        "type": "File", "start": 0, "end": 31,
        "program": {
            "type": "Program", "start": 0, "end": 31, "sourceType": "module",
            "body": [{
                "type": "VariableDeclaration", "kind": "const", "start": 0, "end": 31,
                "declarations": [{
                    "type": "VariableDeclarator", "start": 6, "end": 30,
                    "id": {"type": "Identifier", "name": "o", "start": 6, "end": 7},
                    "init": {
                        "type": "ObjectExpression", "start": 10, "end": 30,
                        "properties": [{
                            "type": "ObjectProperty", "start": 12, "end": 18,
                            "computed": false, "shorthand": false, "method": false,
                            "key": {"type": "Identifier", "name": "a", "start": 12, "end": 13},
                            "value": {
                                "type": "StringLiteral", "value": "x", "start": 15, "end": 18,
                                "extra": {"rawValue": "x", "raw": "'x'"}
                            }
                        }, {
                            "type": "ObjectMethod", "kind": "method", "start": 20, "end": 28,
                            "computed": true, "method": true, "id": null,
                            "async": false, "generator": false, "params": [],
                            "key": {"type": "Identifier", "name": "k", "start": 21, "end": 22},
                            "body": {
                                "type": "BlockStatement", "start": 26, "end": 28,
                                "body": [], "directives": []
                            }
                        }]
                    }
                }]
            }]
        }
    });
    let tree = from_value(&program, source).unwrap();
    let findings = analyze(&tree);

    assert_eq!(findings.len(), 1);
    assert_eq!((findings[0].start_byte, findings[0].end_byte), (20, 28));
    let fixed = findings[0].fix.as_ref().unwrap().apply(source).unwrap();
    assert_eq!(fixed, "const o = { a: 'x' };\no[k] = function() {};");
}

#[test]
fn test_estree_deep_nesting() {
    let depth = 1_000;
    let mut expression = json!({"type": "Identifier", "name": "x", "start": 0, "end": 1});
    for _ in 0..depth {
        expression = json!({
            "type": "ArrayExpression", "start": 0, "end": 1, "elements": [expression]
        });
    }
    let program = json!({
        "type": "Program", "start": 0, "end": 1,
        "body": [{"type": "ExpressionStatement", "start": 0, "end": 1, "expression": expression}]
    });
    let tree = from_value(&program, "x").unwrap();

    assert_eq!(tree.preorder(tree.root()).count(), depth + 3);
    assert!(analyze(&tree).is_empty());
}

#[test]
fn test_estree_invalid_input() {
    assert!(matches!(from_json("not json", ""), Err(EstreeError::Json(_))));
    assert!(matches!(
        from_json(r#"{"type": "ExpressionStatement"}"#, ""),
        Err(EstreeError::NotAProgram(_))
    ));
}

#[test]
fn test_estree_fix_tree_single_pass() {
    let source = "const o = { [k]: () => 1 };";
    let tree = from_value(&arrow_program(0, 27), source).unwrap();
    let outcome = fix_tree(&DeoptLint::default(), &tree, Path::new("a.js")).unwrap();

    assert_eq!(outcome.applied, 1);
    assert_eq!(outcome.passes, 1);
    assert!(outcome.remaining.is_empty());
    assert_eq!(outcome.source, "const o = {};\no[k] = () => 1;");
}

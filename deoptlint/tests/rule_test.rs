//! Detection and fix behavior of the computed inline function rule on
//! JavaScript source.
#![cfg(feature = "cst")]
#![allow(clippy::unwrap_used)]

use deoptlint::cst::parse_source;
use deoptlint::{analyze, Finding};

fn findings(code: &str) -> Vec<Finding> {
    let tree = parse_source(code).unwrap();
    analyze(&tree)
}

/// Applies the fix of the only finding in `code`.
fn fixed(code: &str) -> String {
    let found = findings(code);
    assert_eq!(found.len(), 1, "expected one finding in {code:?}");
    found[0]
        .fix
        .as_ref()
        .expect("finding should carry a fix")
        .apply(code)
        .unwrap()
}

/// Note attached to the only finding in `code`, which must carry no fix.
fn withheld(code: &str) -> String {
    let found = findings(code);
    assert_eq!(found.len(), 1, "expected one finding in {code:?}");
    assert!(found[0].fix.is_none(), "unexpected fix for {code:?}");
    found[0].notes.join("\n")
}

fn assert_withheld(code: &str, reason: &str) {
    let note = withheld(code);
    assert!(
        note.starts_with("auto-fix unavailable: ") && note.contains(reason),
        "{code:?}: {note:?}"
    );
}

#[test]
fn test_method_shorthand_only_entry() {
    let code = "const obj = { [computedKey]() {} };";
    let found = findings(code);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].rule_id, "DL-P001");
    assert_eq!(found[0].rule_name, "no-computed-inline-function");
    assert_eq!(found[0].line, 1);
    assert_eq!(found[0].col, 15);
    assert!(found[0].message.contains("deoptimize"));

    assert_eq!(
        fixed(code),
        "const obj = {};\nobj[computedKey] = function() {};"
    );
}

#[test]
fn test_interior_entry_collapses_separators() {
    assert_eq!(
        fixed("const obj = { a: 1, [k]: function(){} , b: 2 };"),
        "const obj = { a: 1, b: 2 };\nobj[k] = function(){};"
    );
}

#[test]
fn test_last_entry_strips_preceding_comma() {
    assert_eq!(
        fixed("let o = { a: 1, [k]: (x) => x * 2 };"),
        "let o = { a: 1 };\no[k] = (x) => x * 2;"
    );
}

#[test]
fn test_first_entry() {
    assert_eq!(
        fixed("var o = { [k]: function named() {}, a: 1, b: 'two' };"),
        "var o = { a: 1, b: 'two' };\no[k] = function named() {};"
    );
}

#[test]
fn test_static_keys_not_flagged() {
    assert!(findings("const o = { dispose() {} };").is_empty());
    assert!(findings("const o = { a: function() {}, 'b': () => 1, 3() {} };").is_empty());
}

#[test]
fn test_reference_value_not_flagged() {
    assert!(findings("const f = function(){}; ({ [k]: f });").is_empty());
    assert!(findings("const o = { [k]: 1, [j]: 'x', [m]: f.bind(null) };").is_empty());
}

#[test]
fn test_class_members_not_flagged() {
    assert!(findings("class C { [Symbol.x]() {} }").is_empty());
    assert!(findings("class C { static [k]() {} get [j]() { return 1; } }").is_empty());
}

#[test]
fn test_fix_withheld_without_binding() {
    let found = findings("function f() { return { [k]: function(){} }; }");
    assert_eq!(found.len(), 1);
    assert!(found[0].fix.is_none());
    assert!(!found[0].notes.is_empty());
}

#[test]
fn test_fix_withheld_for_destructuring_and_multiple_declarators() {
    for code in [
        "const { a } = { [k]() {} };",
        "const x = 1, o = { [k]() {} };",
        "foo({ [k]() {} });",
        "o = { [k]() {} };",
    ] {
        let found = findings(code);
        assert_eq!(found.len(), 1, "{code}");
        assert!(found[0].fix.is_none(), "{code}");
    }
}

#[test]
fn test_accessors_detected_but_not_fixed() {
    let found = findings("const o = { get [k]() { return 1; }, set [j](v) {} };");
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|f| f.fix.is_none()));
}

#[test]
fn test_async_and_generator_markers_preserved() {
    assert_eq!(
        fixed("const o = { async *[k]() { yield 1; } };"),
        "const o = {};\no[k] = async function*() { yield 1; };"
    );
    assert_eq!(
        fixed("const o = { [k]: async () => 1 };"),
        "const o = {};\no[k] = async () => 1;"
    );
}

#[test]
fn test_fixed_output_is_clean() {
    for code in [
        "const obj = { [computedKey]() {} };",
        "const obj = { a: 1, [k]: function(){} , b: 2 };",
    ] {
        let output = fixed(code);
        assert!(findings(&output).is_empty(), "{output}");
    }
}

#[test]
fn test_static_property_order_preserved() {
    let output = fixed("const o = { a: 1, b: 2, [k]() {}, c: 3, d: 4 };");
    assert_eq!(output, "const o = { a: 1, b: 2, c: 3, d: 4 };\no[k] = function() {};");
}

#[test]
fn test_later_computed_entry_withholds_fix() {
    let found = findings("const o = { [a]() {}, [b]: 1 };");
    assert_eq!(found.len(), 1);
    assert!(found[0].fix.is_none());
}

#[test]
fn test_insertion_keeps_block_indentation() {
    let code = "function make() {\n  const o = { [k]() { return 1; } };\n  return o;\n}\n";
    assert_eq!(
        fixed(code),
        "function make() {\n  const o = {};\n  o[k] = function() { return 1; };\n  return o;\n}\n"
    );
}

#[test]
fn test_export_declaration() {
    assert_eq!(
        fixed("export const o = { [k]: () => 1 };"),
        "export const o = {};\no[k] = () => 1;"
    );
}

#[test]
fn test_unterminated_declaration_gets_semicolon() {
    assert_eq!(
        fixed("const o = { [k]: () => 1 }\nfoo()\n"),
        "const o = {};\no[k] = () => 1;\nfoo()\n"
    );
}

#[test]
fn test_unterminated_declaration_with_trailing_comment() {
    assert_eq!(
        fixed("const o = { [k]() {} } // c\nnext();"),
        "const o = {}; // c\no[k] = function() {};\nnext();"
    );
    assert_eq!(
        fixed("const o = { [k]() {} } // c;\nnext();"),
        "const o = {}; // c;\no[k] = function() {};\nnext();"
    );
}

#[test]
fn test_terminated_declaration_keeps_trailing_comment() {
    assert_eq!(
        fixed("const o = { [k]() {} }; // c\nnext();"),
        "const o = {}; // c\no[k] = function() {};\nnext();"
    );
}

#[test]
fn test_key_reading_declared_variable_withholds_fix() {
    assert_withheld(
        "const o = { [o]() {} };",
        "computed key reads the variable being declared",
    );
    assert_withheld(
        "var o = { [o.x]() {} };",
        "computed key reads the variable being declared",
    );
    // a different root is fine
    assert_eq!(
        fixed("const o = { [other.o]() {} };"),
        "const o = {};\no[other.o] = function() {};"
    );
}

#[test]
fn test_key_with_side_effects_withholds_fix() {
    for code in [
        "const o = { [f()]() {} };",
        "const o = { [a[b]]() {} };",
        "const o = { [a?.b]() {} };",
        "const o = { [`k${i}`]() {} };",
    ] {
        assert_withheld(code, "computed key may have side effects");
    }
}

#[test]
fn test_proto_withholds_fix() {
    assert_withheld("const o = { ['__proto__']() {} };", "`__proto__`");
    assert_withheld("const o = { __proto__: p, [k]() {} };", "`__proto__`");
}

#[test]
fn test_spread_after_entry_withholds_fix() {
    assert_withheld(
        "const o = { [k]() {}, ...rest };",
        "a spread element follows the entry",
    );
    assert_eq!(
        fixed("const o = { ...rest, [k]() {} };"),
        "const o = { ...rest };\no[k] = function() {};"
    );
}

#[test]
fn test_later_duplicate_key_withholds_fix() {
    assert_withheld(
        "const o = { ['a']() {}, a: 1 };",
        "a later entry defines the same key",
    );
    assert_withheld(
        "const o = { [1]() {}, '1': 2 };",
        "a later entry defines the same key",
    );
}

#[test]
fn test_impure_later_value_withholds_fix() {
    assert_withheld(
        "const o = { [k]() {}, b: g() };",
        "a later entry's value may have side effects",
    );
    assert_eq!(
        fixed("const o = { [k]() {}, b: { c: 1, d: x.y } };"),
        "const o = { b: { c: 1, d: x.y } };\no[k] = function() {};"
    );
}

#[test]
fn test_later_computed_entry_note() {
    let found = findings("const o = { [a]() {}, [b]() {} };");
    assert_eq!(found.len(), 2);
    assert!(found[0].fix.is_none());
    assert!(found[0].notes[0].contains("a later entry has a computed key"));
    assert!(found[1].fix.is_some());
}

#[test]
fn test_accessor_notes() {
    assert_withheld(
        "const o = { get [k]() { return 1; } };",
        "getters and setters cannot be replaced by an assignment",
    );
    assert_withheld(
        "const o = { [k]() {}, get x() { return 1; } };",
        "object literal defines getters or setters",
    );
}

#[test]
fn test_binding_shape_notes() {
    assert_withheld(
        "foo({ [k]() {} });",
        "object literal is not the initializer of a simple variable binding",
    );
    assert_withheld(
        "const x = 1, o = { [k]() {} };",
        "declaration declares more than one variable",
    );
    assert_withheld(
        "for (const o = { [k]() {} }; ; ) { break; }",
        "declaration is not a standalone statement",
    );
    assert_withheld(
        "if (ok) var o = { [k]() {} };",
        "declaration is not a standalone statement",
    );
}

#[test]
fn test_super_note() {
    assert_withheld(
        "const o = { [k]() { return super.x; } };",
        "method body references `super`",
    );
}

#[test]
fn test_super_reference_withholds_fix() {
    let found = findings("const o = { [k]() { return super.x; } };");
    assert_eq!(found.len(), 1);
    assert!(found[0].fix.is_none());
}

#[test]
fn test_nested_objects_report_each() {
    let found = findings("const o = { a: { [k]: () => 1 }, [j]() {} };");
    assert_eq!(found.len(), 2);
    assert!(found[0].start_byte < found[1].start_byte);
}

use indoc::indoc;

use super::Violation;
use super::parse::{BindingDecl, ImportDecl, parse};

#[test]
fn parses_package_imports_and_bindings() {
    let source = parse(indoc! {r#"
        -- network addresses
        package net
        import num, word as w

        alias octet = [0-9]{1,3}
        ipv4 = ${octet}\.${octet}\.${octet}\.${octet}
    "#})
    .unwrap();

    assert_eq!(source.package.as_deref(), Some("net"));
    assert_eq!(
        source.imports,
        vec![
            ImportDecl {
                package: "num".into(),
                alias: None,
                line: 3,
            },
            ImportDecl {
                package: "word".into(),
                alias: Some("w".into()),
                line: 3,
            },
        ]
    );
    assert_eq!(
        source.bindings[0],
        BindingDecl {
            name: "octet".into(),
            expression: "[0-9]{1,3}".into(),
            alias: true,
            line: 5,
        }
    );
    assert_eq!(source.bindings[1].name, "ipv4");
    assert!(!source.bindings[1].alias);
    assert_eq!(source.imports[1].prefix(), "w");
}

#[test]
fn expression_may_contain_equals_sign() {
    let source = parse("kv = [a-z]+=[0-9]+").unwrap();
    assert_eq!(source.bindings[0].expression, "[a-z]+=[0-9]+");
    assert_eq!(source.package, None);
}

#[test]
fn package_must_come_first() {
    let errors = parse("x = a\npackage late").unwrap_err();
    assert_eq!(
        errors,
        vec![Violation::new("package declaration must come first").at_line(2)]
    );
}

#[test]
fn collects_every_violation() {
    let errors = parse(indoc! {"
        1bad = x
        ok = y
        ok = z
        just some words
        empty =
        import a b
    "})
    .unwrap_err();

    let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "line 1: invalid binding name: 1bad",
            "line 3: duplicate binding: ok",
            "line 4: expected a binding: just some words",
            "line 5: empty: empty expression",
            "line 6: malformed import: a b",
        ]
    );
}

#[test]
fn keyword_prefix_is_not_a_keyword() {
    let source = parse("packages = p+\nimported = i+").unwrap();
    assert_eq!(source.package, None);
    assert_eq!(source.bindings.len(), 2);
}

use std::fs;

use indoc::indoc;

use super::Environment;
use super::expand::EXPANSION_TOO_LARGE;
use super::load::Loader;
use crate::runtime::{Module, ModuleOrigin, ModuleTable};

fn modules() -> ModuleTable {
    let mut table = ModuleTable::new();
    table.insert(
        "digits".into(),
        Module {
            name: "digits".into(),
            source: "package digits\nd = [0-9]\nalias dd = ${d}${d}".into(),
            assigned: false,
            origin: ModuleOrigin::Builtin,
        },
    );
    table
}

#[test]
fn top_level_load_adds_bindings() {
    let mut env = Environment::default();
    let modules = modules();
    let mut loader = Loader::new(&mut env, &[], &modules);

    let package = loader.load_source("a = x+\nb = ${a}y").unwrap();

    assert_eq!(package, None);
    assert_eq!(env.top.bindings.len(), 2);
    assert!(env.resolve(None, "b").is_some());
}

#[test]
fn package_load_creates_package() {
    let mut env = Environment::default();
    let modules = modules();
    let mut loader = Loader::new(&mut env, &[], &modules);

    let package = loader
        .load_source(indoc! {"
            package greet
            import digits
            hello = hello${digits.d}
        "})
        .unwrap();

    assert_eq!(package.as_deref(), Some("greet"));
    assert!(env.top.bindings.is_empty());
    assert!(env.packages.contains_key("digits"));
    assert_eq!(
        env.resolve(Some("greet"), "digits.d").map(|r| r.display_name()),
        Some("digits.d".to_owned())
    );
}

#[test]
fn imports_come_from_libpath() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("color.rpl"), "package color\nname = red|green").unwrap();

    let mut env = Environment::default();
    let modules = modules();
    let libpath = [dir.path().to_path_buf()];
    let mut loader = Loader::new(&mut env, &libpath, &modules);

    assert_eq!(loader.import("color").unwrap(), "color");
    assert!(env.packages["color"].bindings.contains_key("name"));
}

#[test]
fn missing_package_is_a_violation() {
    let mut env = Environment::default();
    let modules = modules();
    let mut loader = Loader::new(&mut env, &[], &modules);

    let errors = loader.load_source("import nowhere\nx = a").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].to_string(), "line 1: cannot find package: nowhere");
}

#[test]
fn import_cycles_are_detected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ping.rpl"), "package ping\nimport pong\np = a").unwrap();
    fs::write(dir.path().join("pong.rpl"), "package pong\nimport ping\nq = b").unwrap();

    let mut env = Environment::default();
    let modules = modules();
    let libpath = [dir.path().to_path_buf()];
    let mut loader = Loader::new(&mut env, &libpath, &modules);

    let errors = loader.import("ping").unwrap_err();
    assert_eq!(errors[0].message, "import cycle: ping");
}

#[test]
fn source_without_package_cannot_be_imported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("loose.rpl"), "x = a").unwrap();

    let mut env = Environment::default();
    let modules = modules();
    let libpath = [dir.path().to_path_buf()];
    let mut loader = Loader::new(&mut env, &libpath, &modules);

    let errors = loader.import("loose").unwrap_err();
    assert_eq!(
        errors[0].message,
        "not a package (no package declaration): loose"
    );
}

#[test]
fn bad_bindings_are_reported_per_binding() {
    let mut env = Environment::default();
    let modules = modules();
    let mut loader = Loader::new(&mut env, &[], &modules);

    let errors = loader
        .load_source("ok = a\nbroken = (unclosed\nlost = ${ghost}")
        .unwrap_err();

    let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "broken: unclosed group",
            "lost: undefined identifier: ghost",
        ]
    );
}

#[test]
fn doubled_reference_chain_is_too_large() {
    let mut env = Environment::default();
    let modules = modules();
    let mut loader = Loader::new(&mut env, &[], &modules);
    // Each binding doubles the previous one: b24 would expand to gigabytes.
    let mut text = String::from("b0 = x\n");
    for i in 1..=24 {
        text.push_str(&format!("b{i} = ${{b{p}}}${{b{p}}}\n", p = i - 1));
    }

    let errors = loader.load_source(&text).unwrap_err();

    assert!(errors.iter().all(|e| e.message == EXPANSION_TOO_LARGE));
    let failed: Vec<_> = errors.iter().filter_map(|e| e.binding.as_deref()).collect();
    assert!(!failed.contains(&"b8"));
    assert_eq!(failed.last(), Some(&"b24"));
}

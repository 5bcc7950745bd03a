use std::fs;
use std::sync::Arc;

use indoc::indoc;
use parking_lot::RwLock;
use rosie_core::Status;
use tempfile::TempDir;

use super::{Encoder, Engine, PatternId, exceeds_limit};
use crate::config::SetBy;
use crate::runtime::{ModuleTable, RuntimeConfig};
use crate::Error;

fn engine(home: &TempDir) -> Engine {
    let config = RuntimeConfig::new(home.path()).libpath(vec![home.path().join("rpl")]);
    Engine::new(&config, Arc::new(RwLock::new(ModuleTable::new())))
}

fn compile(engine: &mut Engine, expression: &str) -> PatternId {
    let compiled = engine.compile(expression);
    assert!(compiled.errors.is_empty(), "{:?}", compiled.errors);
    compiled.pattern.unwrap()
}

const DATES: &str = indoc! {"
    d = [0-9]+
    alias sep = -
    date = ${d}${sep}${d}
"};

#[test]
fn compile_assigns_increasing_ids() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);

    let a = compile(&mut engine, "a+");
    let b = compile(&mut engine, "b+");

    assert_eq!(a.get(), 1);
    assert_eq!(b.get(), 2);
    assert_eq!(engine.patterns().len(), 2);
}

#[test]
fn compile_errors_are_data() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);

    let compiled = engine.compile("${missing}");
    assert_eq!(compiled.pattern, None);
    assert_eq!(compiled.errors[0].message, "undefined identifier: missing");

    let compiled = engine.compile("(unclosed");
    assert_eq!(compiled.pattern, None);
    assert_eq!(compiled.errors.len(), 1);

    let compiled = engine.compile("   ");
    assert_eq!(compiled.errors[0].message, "empty expression");
}

#[test]
fn freed_ids_are_not_reused() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);

    let a = compile(&mut engine, "a");
    engine.free_pattern(a).unwrap();
    let b = compile(&mut engine, "b");

    assert_ne!(a, b);
    assert!(matches!(engine.free_pattern(a), Err(Error::InvalidPattern(1))));
    assert!(matches!(
        engine.match_input(a, b"a", 1, Encoder::Json),
        Err(Error::InvalidPattern(1))
    ));
}

#[test]
fn match_json_tree() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);
    assert!(engine.load(DATES).ok);
    let date = compile(&mut engine, "date");

    let result = engine.match_input(date, b"12-34 x", 1, Encoder::Json).unwrap();

    assert!(result.matched);
    assert_eq!(result.leftover, 2);
    assert!(!result.abend);
    insta::assert_snapshot!(String::from_utf8(result.data).unwrap(), @r#"{"type":"date","s":1,"e":6,"data":"12-34","subs":[{"type":"d","s":1,"e":3,"data":"12"},{"type":"d","s":4,"e":6,"data":"34"}]}"#);
}

#[test]
fn anonymous_expression_has_star_type() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);
    assert!(engine.load(DATES).ok);
    let id = compile(&mut engine, "x${d}");

    let result = engine.match_input(id, b"x7", 1, Encoder::Json).unwrap();

    insta::assert_snapshot!(String::from_utf8(result.data).unwrap(), @r#"{"type":"*","s":1,"e":3,"data":"x7","subs":[{"type":"d","s":2,"e":3,"data":"7"}]}"#);
}

#[test]
fn match_is_anchored_at_start() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);
    let id = compile(&mut engine, "[0-9]+");

    let miss = engine.match_input(id, b"ab12", 1, Encoder::Data).unwrap();
    assert!(!miss.matched);
    assert!(miss.data.is_empty());
    assert_eq!(miss.leftover, 4);

    let hit = engine.match_input(id, b"ab12", 3, Encoder::Data).unwrap();
    assert!(hit.matched);
    assert_eq!(hit.data, b"12");
    assert_eq!(hit.leftover, 0);
}

#[test]
fn start_outside_input_is_invalid() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);
    let id = compile(&mut engine, "a*");

    let err = engine.match_input(id, b"aa", 0, Encoder::Data).unwrap_err();
    assert_eq!(err.status(), Status::InvalidArgument);
    let err = engine.match_input(id, b"aa", 4, Encoder::Data).unwrap_err();
    assert_eq!(err.status(), Status::InvalidArgument);

    // One past the end is the empty suffix.
    let result = engine.match_input(id, b"aa", 3, Encoder::Data).unwrap();
    assert!(result.matched);
    assert!(result.data.is_empty());
}

#[test]
fn failed_load_commits_nothing() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);

    let loaded = engine.load("good = a\nbad = ${nowhere}");

    assert!(!loaded.ok);
    assert_eq!(loaded.errors[0].message, "undefined identifier: nowhere");
    assert!(engine.bindings().is_empty());
    assert!(engine.compile("${good}").pattern.is_none());
}

#[test]
fn load_then_compile_binding() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);

    let loaded = engine.load(DATES);

    assert!(loaded.ok);
    assert_eq!(loaded.package, None);
    let names: Vec<_> = engine.bindings().into_iter().map(|b| b.name).collect();
    assert_eq!(names, ["d", "sep", "date"]);
}

#[test]
fn import_from_libpath() {
    let home = TempDir::new().unwrap();
    let rpl = home.path().join("rpl");
    fs::create_dir(&rpl).unwrap();
    fs::write(rpl.join("hex.rpl"), "package hex\ndigit = [0-9a-f]\n").unwrap();
    let mut engine = engine(&home);

    let loaded = engine.import("hex", Some("h"));
    assert!(loaded.ok, "{:?}", loaded.errors);
    assert_eq!(loaded.package.as_deref(), Some("hex"));

    let id = compile(&mut engine, "${h.digit}+");
    let result = engine.match_input(id, b"beef", 1, Encoder::Json).unwrap();
    insta::assert_snapshot!(String::from_utf8(result.data).unwrap(), @r#"{"type":"*","s":1,"e":5,"data":"beef","subs":[{"type":"hex.digit","s":4,"e":5,"data":"f"}]}"#);
}

#[test]
fn import_unknown_package_fails() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);

    let loaded = engine.import("nothere", None);

    assert!(!loaded.ok);
    assert_eq!(loaded.errors[0].message, "cannot find package: nothere");

    let loaded = engine.import("bad name", None);
    assert_eq!(loaded.errors[0].message, "invalid package name: bad name");
}

#[test]
fn loadfile_missing_is_io_error() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);

    let err = engine.loadfile(&home.path().join("none.rpl")).unwrap_err();

    assert_eq!(err.status(), Status::Io);
}

#[test]
fn alloc_limit_bounds() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);

    assert_eq!(engine.alloc_limit(None).unwrap().limit, 0);
    let err = engine.alloc_limit(Some(100)).unwrap_err();
    assert_eq!(err.status(), Status::InvalidArgument);

    let limit = engine.alloc_limit(Some(8192)).unwrap();
    assert_eq!(limit.limit, 8192);
    let limit = engine.alloc_limit(Some(0)).unwrap();
    assert_eq!(limit.limit, 0);
}

#[test]
fn alloc_limit_check() {
    assert!(!exceeds_limit(usize::MAX, 0));
    assert!(!exceeds_limit(8192 * 1024, 8192));
    assert!(exceeds_limit(8193 * 1024, 8192));
}

#[test]
fn compile_over_alloc_limit_is_not_stored() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);
    compile(&mut engine, "a+");
    let before = engine.alloc_limit(Some(8192)).unwrap();
    let stored = engine.patterns().len();

    // Unicode `\w` repeated 200 times compiles to well over 8 MB.
    let compiled = engine.compile(r"\w{200}");

    assert_eq!(compiled.pattern, None);
    assert_eq!(compiled.errors.len(), 1);
    assert_eq!(compiled.errors[0].message, "allocation limit exceeded");
    assert_eq!(engine.patterns().len(), stored);
    assert_eq!(engine.alloc_limit(None).unwrap().usage, before.usage);
}

#[test]
fn escaped_reference_matches_literally() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);
    let id = compile(&mut engine, r"a\${x}");

    let result = engine.match_input(id, b"a${x}", 1, Encoder::Data).unwrap();

    assert!(result.matched);
    assert_eq!(result.data, b"a${x}");
}

#[test]
fn usage_grows_with_patterns() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);
    let before = engine.patterns().memory_usage();

    compile(&mut engine, r"\w+@\w+\.com");

    assert!(engine.patterns().memory_usage() > before);
}

#[test]
fn color_spec_is_validated() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);

    let err = engine.set_colors("*=chartreuse", SetBy::Api).unwrap_err();
    assert_eq!(err.status(), Status::InvalidArgument);

    engine.set_colors("*=red", SetBy::Api).unwrap();
    let id = compile(&mut engine, "ab");
    let result = engine.match_input(id, b"abc", 1, Encoder::Color).unwrap();
    assert_eq!(result.data, b"\x1b[31mab\x1b[0mc");
}

#[test]
fn config_listing() {
    let home = TempDir::new().unwrap();
    let mut engine = engine(&home);
    engine.alloc_limit(Some(10000)).unwrap();

    let config = engine.config();
    let names: Vec<_> = config.iter().map(|c| c.name).collect();
    assert_eq!(
        names,
        [
            "ROSIE_VERSION",
            "ROSIE_HOME",
            "ROSIE_LIBPATH",
            "ROSIE_ALLOC_LIMIT",
            "ROSIE_COLORS",
            "ROSIE_ENCODERS",
            "ROSIE_MODULES",
        ]
    );
    assert_eq!(config[3].value, "10000");
    assert_eq!(config[3].set_by, SetBy::Api);
    assert_eq!(config[2].set_by, SetBy::Api);
    assert_eq!(config[5].value, "json,jsonpp,line,data,subs,color,bool");
}

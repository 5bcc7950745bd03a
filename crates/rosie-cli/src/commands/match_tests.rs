use std::fs;
use std::path::PathBuf;

use indoc::indoc;
use tempfile::TempDir;

use super::CommandError;
use super::match_cmd::{MatchArgs, execute};
use super::session::SessionArgs;

fn args(home: &TempDir, expression: &str, files: Vec<PathBuf>, output: &str) -> MatchArgs {
    MatchArgs {
        session: SessionArgs {
            home: Some(home.path().to_path_buf()),
            libpath: None,
            rcfile: None,
            norcfile: true,
            loads: Vec::new(),
            imports: vec!["num".to_owned()],
        },
        expression: expression.to_owned(),
        files,
        output: output.to_owned(),
        wholefile: false,
    }
}

fn input(home: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = home.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn run(args: &MatchArgs) -> (bool, String) {
    let mut out = Vec::new();
    let matched = execute(args, &mut out).unwrap();
    (matched, String::from_utf8(out).unwrap())
}

#[test]
fn prints_matching_lines_only() {
    let home = TempDir::new().unwrap();
    let file = input(&home, "in.txt", "42 apples\nnone here\r\n-7 pears\n");

    let (matched, out) = run(&args(&home, "num.int", vec![file], "data"));

    assert!(matched);
    insta::assert_snapshot!(out, @r"
    42
    -7
    ");
}

#[test]
fn json_is_the_default_tree() {
    let home = TempDir::new().unwrap();
    let file = input(&home, "in.txt", "12 x\n");

    let (_, out) = run(&args(&home, "num.int", vec![file], "json"));

    insta::assert_snapshot!(out, @r#"{"type":"num.int","s":1,"e":3,"data":"12"}"#);
}

#[test]
fn nothing_matched() {
    let home = TempDir::new().unwrap();
    let file = input(&home, "in.txt", "abc\ndef\n");

    let (matched, out) = run(&args(&home, "num.int", vec![file], "data"));

    assert!(!matched);
    assert_eq!(out, "");
}

#[test]
fn bool_encoder_prints_nothing() {
    let home = TempDir::new().unwrap();
    let file = input(&home, "in.txt", "1\n2\n");

    let (matched, out) = run(&args(&home, "num.int", vec![file], "bool"));

    assert!(matched);
    assert_eq!(out, "");
}

#[test]
fn files_are_read_in_order() {
    let home = TempDir::new().unwrap();
    let a = input(&home, "a.txt", "1\n");
    let b = input(&home, "b.txt", "x\n2\n");

    let (_, out) = run(&args(&home, "[0-9]", vec![a, b], "line"));

    assert_eq!(out, "1\n2\n");
}

#[test]
fn wholefile_is_one_record() {
    let home = TempDir::new().unwrap();
    let file = input(&home, "in.txt", indoc! {"
        10
        20
    "});
    let mut args = args(&home, "[0-9]+", vec![file], "data");
    args.wholefile = true;

    let (_, out) = run(&args);

    assert_eq!(out, "10\n");
}

#[test]
fn invalid_expression_is_an_error() {
    let home = TempDir::new().unwrap();
    let file = input(&home, "in.txt", "1\n");

    let err = execute(&args(&home, "${nope}", vec![file], "data"), &mut Vec::new()).unwrap_err();

    assert!(matches!(err, CommandError::Compile(_)), "{err}");
}

#[test]
fn missing_input_is_an_error() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("missing.txt");

    let err = execute(&args(&home, "[0-9]", vec![missing], "data"), &mut Vec::new()).unwrap_err();

    assert!(matches!(err, CommandError::Io { .. }), "{err}");
}

#[test]
fn unknown_encoder_is_an_error() {
    let home = TempDir::new().unwrap();

    let err = execute(&args(&home, "[0-9]", Vec::new(), "xml"), &mut Vec::new()).unwrap_err();

    assert!(
        matches!(err, CommandError::Engine(rosie_engine::Error::InvalidEncoder(_))),
        "{err}"
    );
}

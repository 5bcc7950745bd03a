use std::fs;
use std::path::PathBuf;

use indoc::indoc;
use tempfile::TempDir;

use super::CommandError;
use super::session::{Session, SessionArgs, parse_import};

fn args(home: &TempDir) -> SessionArgs {
    SessionArgs {
        home: Some(home.path().to_path_buf()),
        libpath: None,
        rcfile: None,
        norcfile: true,
        loads: Vec::new(),
        imports: Vec::new(),
    }
}

fn binding_names(session: &Session) -> Vec<String> {
    session
        .with_engine(|engine| Ok(engine.bindings()))
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect()
}

#[test]
fn import_specs() {
    assert_eq!(parse_import("num"), ("num", None));
    assert_eq!(parse_import(" net as n "), ("net", Some("n")));
    assert_eq!(parse_import("net as"), ("net as", None));
}

#[test]
fn standard_modules_are_importable() {
    let home = TempDir::new().unwrap();
    let mut args = args(&home);
    args.imports = vec!["num".to_owned(), "net as n".to_owned()];

    let session = Session::open(&args).unwrap();

    let names = binding_names(&session);
    assert!(names.contains(&"num.int".to_owned()));
    assert!(names.contains(&"n.ipv4".to_owned()));
}

#[test]
fn rcfile_is_applied() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("defs.rpl"), "year = [0-9]{4}\n").unwrap();
    let rc = home.path().join("rosierc");
    fs::write(
        &rc,
        indoc! {r#"
            -- test settings
            loadfile = "defs.rpl"
            import = word
        "#},
    )
    .unwrap();
    let mut args = args(&home);
    args.norcfile = false;
    args.rcfile = Some(rc);

    let session = Session::open(&args).unwrap();

    let names = binding_names(&session);
    assert!(names.contains(&"year".to_owned()));
    assert!(names.contains(&"word.any".to_owned()));
}

#[test]
fn libpath_flag_overrides_rcfile() {
    let home = TempDir::new().unwrap();
    let rc = home.path().join("rosierc");
    fs::write(&rc, "libpath = from-rc\n").unwrap();
    let mut args = args(&home);
    args.norcfile = false;
    args.rcfile = Some(rc);
    args.libpath = Some("/x:/y".to_owned());

    let session = Session::open(&args).unwrap();

    let libpath = session
        .with_engine(|engine| Ok(engine.libpath().to_vec()))
        .unwrap();
    assert_eq!(libpath, [PathBuf::from("/x"), PathBuf::from("/y")]);
}

#[test]
fn missing_rcfile_is_not_fatal() {
    let home = TempDir::new().unwrap();
    let mut args = args(&home);
    args.norcfile = false;
    args.rcfile = Some(home.path().join("absent"));

    assert!(Session::open(&args).is_ok());
}

#[test]
fn failed_load_is_an_error() {
    let home = TempDir::new().unwrap();
    let bad = home.path().join("bad.rpl");
    fs::write(&bad, "x = ${undefined}\n").unwrap();
    let mut args = args(&home);
    args.loads = vec![bad];

    let err = Session::open(&args).err().unwrap();

    assert!(matches!(err, CommandError::Load { .. }), "{err}");
}

#[test]
fn failed_import_is_an_error() {
    let home = TempDir::new().unwrap();
    let mut args = args(&home);
    args.imports = vec!["nothere".to_owned()];

    let err = Session::open(&args).err().unwrap();

    insta::assert_snapshot!(err.to_string(), @"cannot import nothere: cannot find package: nothere");
}

#[test]
fn home_must_exist() {
    let home = TempDir::new().unwrap();
    let mut args = args(&home);
    args.home = Some(home.path().join("missing"));

    let err = Session::open(&args).err().unwrap();

    assert!(matches!(err, CommandError::Engine(_)), "{err}");
}

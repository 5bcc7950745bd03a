use tempfile::TempDir;

use super::config::{ConfigArgs, execute};
use super::session::SessionArgs;

fn args(home: &TempDir) -> ConfigArgs {
    ConfigArgs {
        session: SessionArgs {
            home: Some(home.path().to_path_buf()),
            libpath: Some("/opt/rpl:/usr/share/rpl".to_owned()),
            rcfile: None,
            norcfile: true,
            loads: Vec::new(),
            imports: Vec::new(),
        },
        json: true,
        color: false,
    }
}

fn run(args: &ConfigArgs) -> String {
    let mut out = Vec::new();
    execute(args, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn json_entries_record_provenance() {
    let home = TempDir::new().unwrap();

    let out = run(&args(&home));

    let entries: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    let libpath = entries
        .iter()
        .find(|e| e["name"] == "ROSIE_LIBPATH")
        .unwrap();
    assert_eq!(libpath["value"], "/opt/rpl:/usr/share/rpl");
    assert_eq!(libpath["set_by"], "api");

    let modules = entries
        .iter()
        .find(|e| e["name"] == "ROSIE_MODULES")
        .unwrap();
    assert_eq!(modules["value"], "num,word,net");
}

#[test]
fn table_pairs_value_with_description() {
    let home = TempDir::new().unwrap();
    let mut args = args(&home);
    args.json = false;

    let out = run(&args);

    assert!(out.contains("ROSIE_LIBPATH     = /opt/rpl:/usr/share/rpl\n"));
    assert!(out.contains("directories searched for packages (set by api)"));
    assert!(out.contains("ROSIE_ENCODERS    = json,jsonpp,line,data,subs,color,bool\n"));
}

use std::path::PathBuf;

use rosie_core::Status;

use crate::config::{
    ConfigEntry, SetBy, check_alloc_limit, join_libpath, split_libpath,
};

#[test]
fn libpath_split_and_join() {
    let dirs = split_libpath("/a::/b/c:");

    assert_eq!(dirs, [PathBuf::from("/a"), PathBuf::from("/b/c")]);
    assert_eq!(join_libpath(&dirs), "/a:/b/c");
    assert!(split_libpath("").is_empty());
}

#[test]
fn alloc_limit_minimum() {
    assert!(check_alloc_limit(0).is_ok());
    assert!(check_alloc_limit(8192).is_ok());
    assert_eq!(
        check_alloc_limit(8191).unwrap_err().status(),
        Status::InvalidArgument
    );
}

#[test]
fn entry_serialization() {
    let entry = ConfigEntry::new("ROSIE_LIBPATH", "/a", SetBy::Rcfile, "package dirs");

    insta::assert_snapshot!(serde_json::to_string(&entry).unwrap(), @r#"{"name":"ROSIE_LIBPATH","value":"/a","set_by":"rcfile","description":"package dirs"}"#);
}

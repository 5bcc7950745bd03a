use rosie_core::{Status, VERSION};
use serde_json::Value;
use tempfile::TempDir;

use crate::api::Request;
use crate::runtime::{Runtime, RuntimeConfig};
use crate::{Encoder, Error, TraceStyle};

fn runtime() -> (TempDir, Runtime) {
    let home = TempDir::new().unwrap();
    let runtime = Runtime::with_config(RuntimeConfig::new(home.path()).libpath(Vec::new())).unwrap();
    (home, runtime)
}

fn call(runtime: &Runtime, op: &str, args: &[&str]) -> Result<String, Error> {
    let args: Vec<&[u8]> = args.iter().map(|a| a.as_bytes()).collect();
    runtime
        .dispatch_raw(op, &args)
        .map(|bytes| String::from_utf8(bytes).unwrap())
}

fn status(runtime: &Runtime, op: &str, args: &[&str]) -> Status {
    call(runtime, op, args).unwrap_err().status()
}

fn json(runtime: &Runtime, op: &str, args: &[&str]) -> Value {
    serde_json::from_str(&call(runtime, op, args).unwrap()).unwrap()
}

#[test]
fn parse_match_with_defaults() {
    let request = Request::from_raw("match", &[b"engine-1", b"2", b"abc"]).unwrap();

    assert_eq!(
        request,
        Request::Match {
            engine: "engine-1".into(),
            pattern: 2,
            input: b"abc".to_vec(),
            start: 1,
            encoder: Encoder::Json,
        }
    );
}

#[test]
fn parse_trace_with_all_args() {
    let request = Request::from_raw("trace", &[b"e", b"1", b"x", b"2", b"full"]).unwrap();

    assert_eq!(
        request,
        Request::Trace {
            engine: "e".into(),
            pattern: 1,
            input: b"x".to_vec(),
            start: 2,
            style: TraceStyle::Full,
        }
    );
}

#[test]
fn parse_errors() {
    let err = |op: &str, args: &[&[u8]]| Request::from_raw(op, args).unwrap_err().status();

    assert_eq!(err("launch", &[]), Status::UnknownOperation);
    assert_eq!(err("compile", &[b"e"]), Status::InvalidArgument);
    assert_eq!(err("finalize", &[b"e", b"extra"]), Status::InvalidArgument);
    assert_eq!(err("free_pattern", &[b"e", b"one"]), Status::InvalidArgument);
    assert_eq!(err("compile", &[b"e", b"\xff"]), Status::InvalidArgument);
    assert_eq!(err("match", &[b"e", b"1", b"x", b"1", b"yaml"]), Status::InvalidEncoder);
    assert_eq!(err("trace", &[b"e", b"1", b"x", b"1", b"loud"]), Status::InvalidTraceStyle);
}

#[test]
fn match_input_may_hold_any_bytes() {
    let request = Request::from_raw("match", &[b"e", b"1", b"a\0\xff"]).unwrap();

    assert!(matches!(request, Request::Match { ref input, .. } if input == b"a\0\xff"));
}

#[test]
fn matchfile_empty_paths_are_std_streams() {
    let request =
        Request::from_raw("matchfile", &[b"e", b"1", b"line", b"in.txt", b"", b"", b"1"]).unwrap();

    let Request::MatchFile { files, encoder, .. } = request else {
        panic!("expected matchfile");
    };
    assert_eq!(encoder, Encoder::Line);
    assert_eq!(files.infile.as_deref(), Some(std::path::Path::new("in.txt")));
    assert_eq!(files.outfile, None);
    assert_eq!(files.errfile, None);
    assert!(files.wholefile);
}

#[test]
fn version_and_unknown_operation() {
    let (_home, runtime) = runtime();

    assert_eq!(call(&runtime, "version", &[]).unwrap(), VERSION);
    assert_eq!(status(&runtime, "reboot", &[]), Status::UnknownOperation);
}

#[test]
fn compile_and_match() {
    let (_home, runtime) = runtime();
    let eid = call(&runtime, "new_engine", &[]).unwrap();
    assert_eq!(eid, "engine-1");

    insta::assert_snapshot!(
        call(&runtime, "load", &[eid.as_str(), "w = [a-z]+"]).unwrap(),
        @r#"{"ok":true,"package":null,"errors":[]}"#
    );
    insta::assert_snapshot!(
        call(&runtime, "compile", &[eid.as_str(), "w"]).unwrap(),
        @r#"{"pattern":1,"errors":[]}"#
    );

    let result = json(&runtime, "match", &[eid.as_str(), "1", "abc1", "1", "data"]);
    assert_eq!(result["matched"], true);
    assert_eq!(result["data"], "abc");
    assert_eq!(result["leftover"], 1);
    assert_eq!(result["abend"], false);
    assert!(result["ttotal"].is_u64());
    assert!(result["tmatch"].is_u64());

    let result = json(&runtime, "match", &[eid.as_str(), "1", "123"]);
    assert_eq!(result["matched"], false);
    assert_eq!(result["data"], "");
}

#[test]
fn compile_errors_in_response() {
    let (_home, runtime) = runtime();
    let eid = call(&runtime, "new_engine", &[]).unwrap();

    insta::assert_snapshot!(
        call(&runtime, "compile", &[eid.as_str(), "${nope}"]).unwrap(),
        @r#"{"pattern":null,"errors":[{"message":"undefined identifier: nope"}]}"#
    );
}

#[test]
fn bad_requests_have_distinct_statuses() {
    let (_home, runtime) = runtime();
    let eid = call(&runtime, "new_engine", &[]).unwrap();
    call(&runtime, "compile", &[eid.as_str(), "a"]).unwrap();

    assert_eq!(status(&runtime, "match", &[eid.as_str(), "9", "a"]), Status::InvalidPattern);
    assert_eq!(status(&runtime, "match", &[eid.as_str(), "0", "a"]), Status::InvalidPattern);
    assert_eq!(status(&runtime, "match", &[eid.as_str()]), Status::InvalidArgument);
    assert_eq!(status(&runtime, "match", &[eid.as_str(), "1", "a", "9"]), Status::InvalidArgument);
    assert_eq!(status(&runtime, "match", &["engine-99", "1", "a"]), Status::UnknownEngine);
    assert_eq!(status(&runtime, "alloc_limit", &[eid.as_str(), "10"]), Status::InvalidArgument);
}

#[test]
fn free_pattern_then_reuse_fails() {
    let (_home, runtime) = runtime();
    let eid = call(&runtime, "new_engine", &[]).unwrap();
    call(&runtime, "compile", &[eid.as_str(), "a"]).unwrap();

    assert_eq!(call(&runtime, "free_pattern", &[eid.as_str(), "1"]).unwrap(), "");
    assert_eq!(status(&runtime, "free_pattern", &[eid.as_str(), "1"]), Status::InvalidPattern);
    assert_eq!(status(&runtime, "match", &[eid.as_str(), "1", "a"]), Status::InvalidPattern);
}

#[test]
fn libpath_and_alloc_limit() {
    let (_home, runtime) = runtime();
    let eid = call(&runtime, "new_engine", &[]).unwrap();

    insta::assert_snapshot!(
        call(&runtime, "libpath", &[eid.as_str(), "/a:/b"]).unwrap(),
        @r#"{"libpath":"/a:/b"}"#
    );
    insta::assert_snapshot!(call(&runtime, "libpath", &[eid.as_str()]).unwrap(), @r#"{"libpath":"/a:/b"}"#);

    let limit = json(&runtime, "alloc_limit", &[eid.as_str(), "9000"]);
    assert_eq!(limit["limit"], 9000);
    assert!(limit["usage"].is_u64());
}

#[test]
fn trace_response() {
    let (_home, runtime) = runtime();
    let eid = call(&runtime, "new_engine", &[]).unwrap();
    call(&runtime, "compile", &[eid.as_str(), "ab"]).unwrap();

    let result = json(&runtime, "trace", &[eid.as_str(), "1", "abc"]);

    assert_eq!(result["matched"], true);
    assert!(result["trace"].as_str().unwrap().contains("Matched 2 bytes"));
}

#[test]
fn finalize_forgets_engine() {
    let (_home, runtime) = runtime();
    let eid = call(&runtime, "new_engine", &[]).unwrap();

    assert_eq!(call(&runtime, "finalize", &[eid.as_str()]).unwrap(), "");

    assert_eq!(status(&runtime, "config", &[eid.as_str()]), Status::UnknownEngine);
    assert_eq!(status(&runtime, "finalize", &[eid.as_str()]), Status::UnknownEngine);
}

#[test]
fn config_is_a_json_list() {
    let (_home, runtime) = runtime();
    let eid = call(&runtime, "new_engine", &[]).unwrap();

    let config = json(&runtime, "config", &[eid.as_str()]);

    let entries = config.as_array().unwrap();
    assert_eq!(entries.len(), 7);
    assert_eq!(entries[0]["name"], "ROSIE_VERSION");
    assert_eq!(entries[0]["value"], VERSION);
    assert_eq!(entries[2]["set_by"], "api");
}

#[test]
fn rcfile_operations() {
    let (home, runtime) = runtime();
    let eid = call(&runtime, "new_engine", &[]).unwrap();
    let rc = home.path().join("rc");
    std::fs::write(&rc, "libpath = /x\n").unwrap();
    let rc = rc.to_str().unwrap();

    insta::assert_snapshot!(
        call(&runtime, "read_rcfile", &[eid.as_str(), rc]).unwrap(),
        @r#"{"exists":true,"options":[{"libpath":"/x"}]}"#
    );
    insta::assert_snapshot!(
        call(&runtime, "execute_rcfile", &[eid.as_str(), rc]).unwrap(),
        @r#"{"exists":true,"ok":true}"#
    );
    insta::assert_snapshot!(call(&runtime, "libpath", &[eid.as_str()]).unwrap(), @r#"{"libpath":"/x"}"#);
}

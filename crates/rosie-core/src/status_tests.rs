use crate::Status;

#[test]
fn ok_is_zero() {
    assert_eq!(Status::Ok.code(), 0);
    assert!(Status::Ok.is_ok());
    assert!(!Status::Internal.is_ok());
}

#[test]
fn codes_are_distinct_and_dense() {
    for (i, status) in Status::ALL.iter().enumerate() {
        assert_eq!(status.code(), i as i32);
    }
}

#[test]
fn from_code_roundtrip() {
    for status in Status::ALL {
        assert_eq!(Status::from_code(status.code()), Some(status));
    }
    assert_eq!(Status::from_code(-1), None);
    assert_eq!(Status::from_code(13), None);
}

#[test]
fn display_uses_snake_case_name() {
    assert_eq!(Status::UnknownOperation.to_string(), "unknown_operation");
    assert_eq!(Status::Io.to_string(), "io");
}

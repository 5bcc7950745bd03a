//! Result codes shared by every layer that crosses the C boundary.
//!
//! Codes are stable: a host compiled against one release must be able to
//! interpret the codes of the next. New codes are only ever appended.

use std::fmt;

/// Outcome of a boundary call. `Ok` is always `0`.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    Ok = 0,
    InvalidArgument = 1,
    NotInitialized = 2,
    AlreadyInitialized = 3,
    EngineCreationFailed = 4,
    UnknownOperation = 5,
    UnknownEngine = 6,
    InvalidPattern = 7,
    InvalidEncoder = 8,
    InvalidTraceStyle = 9,
    ModuleNotFound = 10,
    Io = 11,
    Internal = 12,
}

impl Status {
    pub const ALL: [Status; 13] = [
        Status::Ok,
        Status::InvalidArgument,
        Status::NotInitialized,
        Status::AlreadyInitialized,
        Status::EngineCreationFailed,
        Status::UnknownOperation,
        Status::UnknownEngine,
        Status::InvalidPattern,
        Status::InvalidEncoder,
        Status::InvalidTraceStyle,
        Status::ModuleNotFound,
        Status::Io,
        Status::Internal,
    ];

    /// Raw integer code as returned by the C ABI.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map a raw code back to a status. Unknown codes yield `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    #[inline]
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }

    /// Stable snake_case name, used in logs and JSON.
    pub fn name(self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::InvalidArgument => "invalid_argument",
            Status::NotInitialized => "not_initialized",
            Status::AlreadyInitialized => "already_initialized",
            Status::EngineCreationFailed => "engine_creation_failed",
            Status::UnknownOperation => "unknown_operation",
            Status::UnknownEngine => "unknown_engine",
            Status::InvalidPattern => "invalid_pattern",
            Status::InvalidEncoder => "invalid_encoder",
            Status::InvalidTraceStyle => "invalid_trace_style",
            Status::ModuleNotFound => "module_not_found",
            Status::Io => "io",
            Status::Internal => "internal",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Rosie: an embeddable pattern-matching engine.
//!
//! # Example
//!
//! ```
//! use rosie_engine::{Encoder, Runtime};
//!
//! let runtime = Runtime::initialize(std::env::temp_dir())?;
//! let id = runtime.new_engine()?;
//! let result = runtime.with_engine(id.as_str(), |engine| {
//!     let compiled = engine.compile("[0-9]+");
//!     let pattern = compiled.pattern.expect("valid pattern");
//!     engine.match_input(pattern, b"2024-10", 1, Encoder::Data)
//! })?;
//! assert_eq!(result.data, b"2024");
//! assert_eq!(result.leftover, 3);
//! # Ok::<(), rosie_engine::Error>(())
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod log;
pub mod package;
pub mod registry;
pub mod runtime;
pub mod stdlib;

#[cfg(test)]
mod api_tests;
#[cfg(test)]
mod config_tests;

pub use api::{Request, Response};
pub use config::{ConfigEntry, SetBy};
pub use engine::{
    AllocLimit, BindingInfo, Compiled, Encoder, Engine, Loaded, MatchFileCounts, MatchFileIo,
    MatchNode, MatchResult, PatternId, RcExecution, RcFile, TraceResult, TraceStyle,
};
pub use error::{Error, Result};
pub use package::Violation;
pub use registry::EngineId;
pub use runtime::{Module, ModuleOrigin, ModuleTable, Runtime, RuntimeConfig, RuntimeState};

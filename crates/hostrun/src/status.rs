//! # Engine Status
//!
//! Every call across the engine boundary either succeeds or yields a `Status`:
//! a 32-bit result code in the HRESULT layout (high bit set on failure) plus
//! the engine's own description of what went wrong.
//!
//! The codes below are the ones the host and the bundled backends emit.
//! Engines are free to report any other failure code.

use std::fmt;

/// Unspecified failure.
pub const FAIL: u32 = 0x8000_4005;
/// An argument was rejected by the engine.
pub const INVALID_ARG: u32 = 0x8007_0057;
/// The engine could not allocate memory.
pub const OUT_OF_MEMORY: u32 = 0x8007_000E;
/// The module image is not in a format the engine accepts.
pub const BAD_IMAGE_FORMAT: u32 = 0x8007_000B;
/// No installed runtime matches the requested version.
pub const RUNTIME_NOT_FOUND: u32 = 0x8013_1700;
/// The host was asked to do something its current state forbids
/// (start twice, stop while stopped, hand out a domain before start).
pub const HOST_STATE: u32 = 0x8013_1022;
/// The type exists but has no usable default constructor.
pub const MISSING_METHOD: u32 = 0x8013_1513;
/// The constructor ran and failed inside the engine.
pub const TARGET_INVOCATION: u32 = 0x8013_1604;

/// A failed engine call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub code: u32,
    pub message: String,
}

impl Status {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for a generic failure.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(FAIL, message)
    }

    /// True when the code has the failure bit set.
    pub fn is_failure(&self) -> bool {
        self.code & 0x8000_0000 != 0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "0x{:08X}", self.code)
        } else {
            write!(f, "0x{:08X}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for Status {}

impl From<wasmtime::Error> for Status {
    fn from(e: wasmtime::Error) -> Self {
        Self::fail(format!("{:#}", e))
    }
}

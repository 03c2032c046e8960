//! Error taxonomy for the observation store core.
//!
//! Every fallible operation in this crate returns [`Result`]. Construction
//! goes through the crate-local [`err_at!`] macro so that every error
//! carries the file/line at which it was raised, matching the style used
//! throughout the rest of this codebase.

use std::{fmt, result};

/// Crate-wide result alias.
pub type Result<T> = result::Result<T, Error>;

/// Error taxonomy for every fallible operation this crate exposes.
#[derive(Debug)]
pub enum Error {
    /// Named group/variable/attribute absent.
    NotFound(String),
    /// Create collision.
    AlreadyExists(String),
    /// Requested tag does not match the stored tag.
    TypeMismatch(String),
    /// Selection or shape does not agree with the variable's shape.
    ShapeMismatch(String),
    /// Buffer length does not agree with the requested range.
    LengthMismatch(String),
    /// Selection falls outside the variable's current shape.
    OutOfRange(String),
    /// Underlying format library (NetCDF/HDF5) failed.
    BackendIOError(String),
    /// Unknown ObsType, unparseable window, unknown distribution, etc.
    InvalidConfig(String),
    /// Internal consistency check failed; this is an assertion-class bug.
    InvariantViolation(String),
}

impl Error {
    /// Offending (group, variable) pair, when the error carries one.
    pub fn what(&self) -> &str {
        match self {
            Error::NotFound(s)
            | Error::AlreadyExists(s)
            | Error::TypeMismatch(s)
            | Error::ShapeMismatch(s)
            | Error::LengthMismatch(s)
            | Error::OutOfRange(s)
            | Error::BackendIOError(s)
            | Error::InvalidConfig(s)
            | Error::InvariantViolation(s) => s,
        }
    }

    /// True for the assertion-class errors: the caller is expected to log
    /// and abort rather than recover.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::InvariantViolation(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        match self {
            Error::NotFound(s) => write!(f, "NotFound: {}", s),
            Error::AlreadyExists(s) => write!(f, "AlreadyExists: {}", s),
            Error::TypeMismatch(s) => write!(f, "TypeMismatch: {}", s),
            Error::ShapeMismatch(s) => write!(f, "ShapeMismatch: {}", s),
            Error::LengthMismatch(s) => write!(f, "LengthMismatch: {}", s),
            Error::OutOfRange(s) => write!(f, "OutOfRange: {}", s),
            Error::BackendIOError(s) => write!(f, "BackendIOError: {}", s),
            Error::InvalidConfig(s) => write!(f, "InvalidConfig: {}", s),
            Error::InvariantViolation(s) => write!(f, "InvariantViolation: {}", s),
        }
    }
}

impl std::error::Error for Error {}

/// Construct an [`Error`] stamped with the call site, mirroring three
/// shapes used across this codebase:
///
/// * `err_at!(Kind, result_expr)`: map `Err(e)` from `result_expr` into
///   `Error::Kind` carrying `e`'s Display and the call site, passing
///   `Ok(v)` through unchanged.
/// * `err_at!(Kind, result_expr, "fmt", args...)`: same, with a custom
///   message prepended.
/// * `err_at!(Kind, msg: "fmt", args...)`: directly construct `Err`.
#[macro_export]
macro_rules! err_at {
    ($v:ident, msg: $($arg:expr),+) => {{
        let msg = format!($($arg),+);
        Err($crate::Error::$v(format!("{}:{} {}", file!(), line!(), msg)))
    }};
    ($v:ident, $e:expr) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => Err($crate::Error::$v(format!("{}:{} {}", file!(), line!(), err))),
        }
    }};
    ($v:ident, $e:expr, $($arg:expr),+) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let msg = format!($($arg),+);
                Err($crate::Error::$v(format!(
                    "{}:{} {} ({})",
                    file!(),
                    line!(),
                    msg,
                    err
                )))
            }
        }
    }};
}

//! Error types for the gdbstub command

use thiserror::Error;

/// Result type alias for gdbstub operations
pub type Result<T> = std::result::Result<T, StubError>;

/// I/O error
pub const EIO: i32 = 5;
/// File exists
pub const EEXIST: i32 = 17;
/// No such device
pub const ENODEV: i32 = 19;
/// Invalid argument
pub const EINVAL: i32 = 22;
/// Operation not supported
pub const ENOTSUP: i32 = 95;
/// Transport endpoint is not connected
pub const ENOTCONN: i32 = 107;
/// Operation canceled
pub const ECANCELED: i32 = 125;

/// Error types for gdbstub operations
#[derive(Error, Debug)]
pub enum StubError {
    /// Malformed command line (unknown option, bad positional count)
    #[error("{0}")]
    Options(String),

    /// `--help` was given; usage has already been printed
    #[error("help requested")]
    HelpRequested,

    /// Transport name did not resolve
    #[error("\"{0}\": no such transport (is it compiled in?)")]
    NoSuchTransport(String),

    /// Two descriptors registered under the same name
    #[error("transport \"{0}\" is already registered")]
    DuplicateTransport(String),

    /// A transport rejected its arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Requested network interface does not exist
    #[error("No such device: {0}")]
    NoSuchDevice(String),

    /// Transport has no peer to talk to yet
    #[error("Not connected: {0}")]
    NotConnected(String),

    /// Malformed data on the wire
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StubError {
    /// Negative errno-style status code for this error
    pub fn code(&self) -> i32 {
        let errno = match self {
            StubError::Options(_) | StubError::InvalidArgument(_) => EINVAL,
            StubError::HelpRequested => ECANCELED,
            StubError::NoSuchTransport(_) => ENOTSUP,
            StubError::DuplicateTransport(_) => EEXIST,
            StubError::NoSuchDevice(_) => ENODEV,
            StubError::NotConnected(_) => ENOTCONN,
            StubError::Protocol(_) => EIO,
            StubError::Io(e) => e.raw_os_error().filter(|&n| n > 0).unwrap_or(EIO),
        };
        -errno
    }
}

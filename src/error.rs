//! The error type returned by every operation in this crate.

use std::fmt;
use std::io;

/// An error produced by a layout, allocator, directory-stream, path, or command operation.
#[derive(Debug)]
pub enum Error {
    /// Malformed arguments: a non-absolute path, an empty path component, or similar.
    Invalid,
    /// A path component, host source file, or restore target does not exist.
    NotFound,
    /// The target leaf already exists in its parent directory.
    Exists,
    /// The operation requires a non-directory but the target is a directory.
    IsDir,
    /// The inode or block allocator is exhausted.
    NoSpace,
    /// An on-disk invariant is violated in a way the caller cannot safely proceed through.
    Corrupt,
    /// Backing image access failed (open, map, sync).
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => write!(f, "invalid argument"),
            Self::NotFound => write!(f, "no such file or directory"),
            Self::Exists => write!(f, "file exists"),
            Self::IsDir => write!(f, "is a directory"),
            Self::NoSpace => write!(f, "no space left on device"),
            Self::Corrupt => write!(f, "filesystem is corrupt"),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Maps an error to a process exit code conventionally matching POSIX errno values.
///
/// CLI front-ends use this; the core itself never calls it.
pub fn exit_code(e: &Error) -> i32 {
    match e {
        Error::Invalid => libc::EINVAL,
        Error::NotFound => libc::ENOENT,
        Error::Exists => libc::EEXIST,
        Error::IsDir => libc::EISDIR,
        Error::NoSpace => libc::ENOSPC,
        Error::Corrupt => libc::EIO,
        Error::Io(e) => e.raw_os_error().unwrap_or(libc::EIO),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

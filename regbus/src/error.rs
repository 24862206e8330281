//! Error types for bus operations.
//!
//! Every public operation in this crate returns [`Result`]. Failures are
//! classified into exactly three kinds (see [`ErrorKind`]) so a boundary layer
//! can translate them into whatever its caller expects without inspecting the
//! details.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The device node could not be opened.
    OpenFailed,
    /// The device node could not be closed.
    CloseFailed,
    /// A bus transfer failed or completed only partially.
    TransferFailed,
}

/// Reason a transfer did not complete.
#[derive(Debug)]
pub enum TransferFailure {
    /// The controller rejected the transfer.
    Status(io::Error),

    /// The controller completed fewer messages than were submitted.
    Incomplete { submitted: usize, completed: usize },

    /// The worker running the transfer went away before reporting back.
    Aborted,
}

impl fmt::Display for TransferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(err) => write!(f, "{}", err),
            Self::Incomplete {
                submitted,
                completed,
            } => write!(f, "only {} of {} messages completed", completed, submitted),
            Self::Aborted => write!(f, "transfer aborted"),
        }
    }
}

/// Error returned by bus operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Opening the device node failed (missing node, permission denied, ...).
    #[error("Failed to open I2C device {}: {source}", .path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Releasing the device node failed.
    #[error("Failed to close I2C device: {0}")]
    CloseFailed(#[source] io::Error),

    /// A transfer to `slave` failed. No partial data is returned.
    #[error("I2C transfer to 0x{slave:02x} failed: {reason}")]
    TransferFailed {
        slave: u16,
        reason: TransferFailure,
    },
}

impl Error {
    pub(crate) fn transfer(slave: u16, reason: TransferFailure) -> Self {
        Self::TransferFailed { slave, reason }
    }

    /// The kind of failure, for callers that only need the classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OpenFailed { .. } => ErrorKind::OpenFailed,
            Self::CloseFailed(_) => ErrorKind::CloseFailed,
            Self::TransferFailed { .. } => ErrorKind::TransferFailed,
        }
    }

    /// The OS status code behind this error, if there is one.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            Self::OpenFailed { source, .. } => source.raw_os_error(),
            Self::CloseFailed(source) => source.raw_os_error(),
            Self::TransferFailed {
                reason: TransferFailure::Status(err),
                ..
            } => err.raw_os_error(),
            Self::TransferFailed { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let err = Error::OpenFailed {
            path: PathBuf::from("/dev/i2c-9"),
            source: io::Error::from_raw_os_error(libc::ENOENT),
        };
        assert_eq!(err.kind(), ErrorKind::OpenFailed);
        assert_eq!(err.status_code(), Some(libc::ENOENT));

        let err = Error::CloseFailed(io::Error::from_raw_os_error(libc::EBADF));
        assert_eq!(err.kind(), ErrorKind::CloseFailed);

        let err = Error::transfer(0x50, TransferFailure::Aborted);
        assert_eq!(err.kind(), ErrorKind::TransferFailed);
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn transfer_status_code_is_exposed() {
        let err = Error::transfer(
            0x50,
            TransferFailure::Status(io::Error::from_raw_os_error(libc::ENXIO)),
        );
        assert_eq!(err.status_code(), Some(libc::ENXIO));
    }

    #[test]
    fn display_includes_slave_address() {
        let err = Error::transfer(
            0x1a,
            TransferFailure::Incomplete {
                submitted: 2,
                completed: 1,
            },
        );
        assert_eq!(
            err.to_string(),
            "I2C transfer to 0x1a failed: only 1 of 2 messages completed"
        );
    }
}

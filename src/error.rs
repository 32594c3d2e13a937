use std::path::PathBuf;
use thiserror::Error;
use crate::platform::{Bits, Platform};

/// Everything that can go wrong between a version token and a printed path.
///
/// Components surface these to their immediate caller; only the CLI driver
/// turns them into a message and an exit code.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection-level failure: refused, dropped mid-stream, DNS, TLS.
    #[error("network error requesting {url}: {detail}")]
    Network { url: String, detail: String },
    /// The release host does not know this path (HTTP 4xx).
    #[error("{url} was not found on the release host")]
    NotFound { url: String },
    /// The release host failed (HTTP 5xx).
    #[error("release host returned HTTP {status} for {url}")]
    Server { url: String, status: u16 },
    /// No entry matched the token for the requested platform and bits.
    #[error("no release matching '{token}' for {platform} ({bits}-bit)")]
    VersionNotFound {
        token: String,
        platform: Platform,
        bits: Bits,
    },
    /// Format/platform combination this host cannot handle (e.g. mounting
    /// a disk image outside macOS).
    #[error("{0}")]
    Unsupported(String),
    /// Extraction finished but none of the known executable paths exist.
    #[error("no Blender executable found under {}", .root.display())]
    ExecutableNotFound { root: PathBuf },
    /// The filesystem ran out of space while streaming the archive.
    #[error("disk full while writing {}", .path.display())]
    DiskFull { path: PathBuf },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code for this error kind. Stability across versions is
    /// not promised; `0` is reserved for success.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Network { .. } => 2,
            Error::NotFound { .. } => 3,
            Error::Server { .. } => 4,
            Error::VersionNotFound { .. } => 5,
            Error::Unsupported(_) => 6,
            Error::ExecutableNotFound { .. } => 7,
            Error::DiskFull { .. } => 8,
            Error::Config(_) | Error::Io(_) => 1,
        }
    }

    /// Maps an unexpected HTTP status to the matching error, if any.
    pub(crate) fn from_status(url: &str, status: reqwest::StatusCode) -> Option<Error> {
        if status.is_server_error() {
            Some(Error::Server {
                url: url.to_string(),
                status: status.as_u16(),
            })
        } else if status.is_client_error() {
            Some(Error::NotFound {
                url: url.to_string(),
            })
        } else if status.is_success() {
            None
        } else {
            Some(Error::Network {
                url: url.to_string(),
                detail: format!("unexpected HTTP status {}", status.as_u16()),
            })
        }
    }
}

use std::io;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("command execution failed: {0}")]
    Command(#[from] io::Error),

    /// The tool exited non-zero without writing anything to stderr.
    #[error("[{0}]: Unknown error.")]
    ProcessFailure(i32),

    /// Carries the budget in milliseconds.
    #[error("Timed out after {0} milliseconds.")]
    Timeout(u64),

    #[error("gpg exited with status {status}: {stderr}")]
    Gpg { status: i32, stderr: String },

    #[error("invalid key ID '{keyid}': {reason}")]
    InvalidKeyId { keyid: String, reason: String },

    #[error("cannot parse user string '{0}'")]
    UserString(String),

    #[error("no {record} record found for '{keyid}': {stderr}")]
    NotFound {
        keyid: String,
        record: &'static str,
        stderr: String,
    },

    #[error("failed to capture {0} from subprocess")]
    CaptureFailed(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

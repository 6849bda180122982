// Error taxonomy for the library. The binary wraps these in `anyhow` at
// the edge; inside the crate every fallible call returns `Result<T>`.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GistError>;

#[derive(Error, Debug)]
pub enum GistError {
    /// Caller broke the contract, e.g. neither an id nor a file name.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot read {}: {source}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No gist contains a file named {file_name}")]
    NotFound { file_name: String },

    /// More than one remote gist holds the requested file name.
    #[error("Number of gist IDs is ambiguous for {file_name}\nIDs: {}", .conflicting_ids.join(", "))]
    Ambiguous {
        file_name: String,
        conflicting_ids: Vec<String>,
    },

    #[error("Remote error {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Unexpected response payload: {0}")]
    Decode(String),
}

impl GistError {
    /// True for both kinds of caller mistakes: missing arguments and
    /// unreadable local paths.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            GistError::InvalidArgument(_) | GistError::FileNotFound { .. }
        )
    }

    /// True for anything that went wrong on the wire or on the service side.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            GistError::Remote { .. }
                | GistError::Timeout(_)
                | GistError::Transport(_)
                | GistError::Decode(_)
        )
    }

    /// Status code attached by the service, if the failure came with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            GistError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Ids behind an ambiguous name; empty for every other error.
    pub fn conflicting_ids(&self) -> &[String] {
        match self {
            GistError::Ambiguous {
                conflicting_ids, ..
            } => conflicting_ids,
            _ => &[],
        }
    }
}

impl From<reqwest::Error> for GistError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GistError::Timeout(e.to_string())
        } else {
            GistError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for GistError {
    fn from(e: serde_json::Error) -> Self {
        GistError::Decode(e.to_string())
    }
}

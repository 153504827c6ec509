use thiserror::Error;

/// Required fields that were empty when a record was created or saved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// A stored blob could not be decoded into an account record.
    #[error("corrupted data for account '{account}': {source}")]
    Parse {
        account: String,
        #[source]
        source: serde_json::Error,
    },
    /// The system keychain rejected or failed an operation.
    #[error("keychain error: {0}")]
    Store(#[from] keyring::Error),
    /// `git config` exited with a failure status.
    #[error("git command failed: {0}")]
    Git(String),
    #[error("git is not installed or not in PATH")]
    GitMissing,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no saved account named '{0}'")]
    NotFound(String),
    /// The account name cannot be used as a file name.
    #[error("invalid account name '{0}'")]
    InvalidName(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

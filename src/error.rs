use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the simulation core.
///
/// Degenerate geometry (coincident bodies, zero extent) never shows up here:
/// the tree and force law absorb it. Only preconditions on the external
/// interface and scenario loading fail.
#[derive(Debug, Error)]
pub enum Error {
    /// A scenario or runtime setting violates a precondition.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Scenario file could not be parsed.
    #[error("scenario parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Scenario file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }
}

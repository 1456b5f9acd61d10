use chainscan_core::{CoreError, SourceError, SourceErrorKind};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] chainscan_core::ValidationError),

    #[error(transparent)]
    Config(#[from] CoreError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Config(_) => 2,
            Self::Source(error) => match error.kind() {
                SourceErrorKind::Misconfigured
                | SourceErrorKind::UnknownSource
                | SourceErrorKind::InvalidRequest => 2,
                SourceErrorKind::Unsupported => 3,
                _ => 4,
            },
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

use std::io;
use thiserror::Error;

/// Errors surfaced by a dictionary.
///
/// Soft outcomes (missing key, end of sequence, a tolerated duplicate) are
/// never errors; they are reported through return values. Every variant here
/// means the environment can no longer be trusted, and hosts normally log it
/// and terminate.
#[derive(Error, Debug)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("{dict}: duplicate entry: \"{key}\"")]
    DuplicateEntry { dict: String, key: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DictError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_names_dict_and_key() {
        let err = DictError::DuplicateEntry {
            dict: "/etc/aliases".into(),
            key: "root".into(),
        };
        assert_eq!(err.to_string(), "/etc/aliases: duplicate entry: \"root\"");
    }

    #[test]
    fn test_io_conversion() {
        let err: DictError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, DictError::Io(_)));
    }
}

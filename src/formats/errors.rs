use crate::codec::CodecError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("cannot tell the document format of {path}")]
    UnknownFormat { path: PathBuf },

    #[error("malformed {format} document: {message}")]
    Malformed {
        format: &'static str,
        message: String,
    },

    #[error("document nesting exceeds {limit} levels")]
    TooDeep { limit: usize },

    #[error("no catalog entry with source id {msgid:?}")]
    UnknownEntry { msgid: String },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormatError {
    pub(super) fn malformed(format: &'static str, message: impl ToString) -> Self {
        FormatError::Malformed {
            format,
            message: message.to_string(),
        }
    }
}

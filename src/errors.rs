use crate::Position;
use std::io;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CsvError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Field lookup by name is only usable when there is a header")]
    NoHeader,

    #[error("End of input")]
    EndOfInput,

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Row too short ({position:?}): only {len} fields")]
    ShortRow { position: Position, len: usize },
}

impl CsvError {
    /// True for the normal "no more lines" signal, as opposed to a real fault.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, CsvError::EndOfInput)
    }
}

impl From<io::Error> for CsvError {
    fn from(error: io::Error) -> Self {
        CsvError::Io(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CsvError>;

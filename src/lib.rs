//! Read delimited text one line at a time
//!
//! Lines are split on a single literal character. There is no quoting or
//! escaping, so a field can never contain the delimiter or a line break.
mod csv;
mod errors;

pub use crate::csv::{
    DelimitedReader, HeaderMap, HeaderMode, ReaderBuilder, ReaderConfig, Row, Rows, Source,
};
pub use crate::errors::{CsvError, Result};

/// A location in the input: 1-based line, 0-based column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

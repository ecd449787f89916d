//! Naive delimited-line parsing
//!
//! Each line of the source is one row, and each occurrence of the delimiter
//! ends a field. This is simpler than CSV proper: quotes are
//! ordinary characters, so input containing quoted delimiters will be split
//! into more fields than the writer intended.
//!
//! Column names come from the first line, from the caller, or not at all.
mod config;
mod header;
mod reader;
mod split;

pub use config::{HeaderMode, ReaderBuilder, ReaderConfig, Source};
pub use header::HeaderMap;
pub use reader::{DelimitedReader, Row, Rows};

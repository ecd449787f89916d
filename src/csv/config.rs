use super::header::HeaderMap;
use super::reader::DelimitedReader;
use crate::errors::{CsvError, Result};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

const DEFAULT_DELIMITER: char = ',';

/// Where column names come from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// Split the first line of the source and index its fields
    Derive,
    /// No header; lookup by name is unavailable
    #[default]
    Absent,
    /// Names supplied by the caller; every line is data
    Provided(HeaderMap),
}

/// The text to read: a path to open, or something already open
pub enum Source {
    Path(PathBuf),
    Handle(Box<dyn Read>),
}

impl Source {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Source::Path(path.into())
    }

    pub fn handle<R: Read + 'static>(handle: R) -> Self {
        Source::Handle(Box::new(handle))
    }

    fn into_lines(self) -> Result<Box<dyn BufRead>> {
        match self {
            Source::Path(path) => {
                let file = File::open(&path)
                    .map_err(|error| CsvError::Io(format!("{}: {}", path.display(), error)))?;
                Ok(Box::new(BufReader::new(file)))
            }
            Source::Handle(handle) => Ok(Box::new(BufReader::new(handle))),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Source::Handle(_) => f.write_str("Handle(..)"),
        }
    }
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        Source::path(path)
    }
}

impl From<String> for Source {
    fn from(path: String) -> Self {
        Source::path(path)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::path(path)
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl From<File> for Source {
    fn from(file: File) -> Self {
        Source::handle(file)
    }
}

/// Validated reader settings
///
/// Produced by [`ReaderBuilder::config`]; can open any number of sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    delimiter: char,
    header: HeaderMode,
}

impl ReaderConfig {
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn header_mode(&self) -> &HeaderMode {
        &self.header
    }

    /// Open `source` and consume the header line if one is to be derived.
    pub fn open(&self, source: impl Into<Source>) -> Result<DelimitedReader> {
        DelimitedReader::open(source.into().into_lines()?, self)
    }
}

/// Collects reader settings; nothing is checked until [`ReaderBuilder::build`].
///
/// `with_header` takes precedence over a provided header until a later
/// `without_header` or `with_provided_header` turns derivation off again.
#[derive(Debug, Default)]
pub struct ReaderBuilder {
    delimiter: Option<String>,
    derive_header: bool,
    provided_header: Option<HeaderMap>,
    source: Option<Source>,
}

impl ReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self) -> Self {
        self.derive_header = true;
        self
    }

    /// Don't read names from the source. A provided header is kept.
    pub fn without_header(mut self) -> Self {
        self.derive_header = false;
        self
    }

    /// Use these column names instead of reading them from the source.
    ///
    /// Accepts a ready `HashMap<String, usize>` or a sequence of names, where
    /// each name is indexed by its position.
    pub fn with_provided_header(mut self, header: impl Into<HeaderMap>) -> Self {
        self.derive_header = false;
        self.provided_header = Some(header.into());
        self
    }

    /// Must be exactly one character. Defaults to `,`.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn source(mut self, source: impl Into<Source>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Validate the settings without touching the source.
    pub fn config(&self) -> Result<ReaderConfig> {
        let delimiter = match &self.delimiter {
            None => DEFAULT_DELIMITER,
            Some(text) => single_char(text)?,
        };
        let header = match (&self.provided_header, self.derive_header) {
            (_, true) => HeaderMode::Derive,
            (Some(provided), false) => HeaderMode::Provided(provided.clone()),
            (None, false) => HeaderMode::Absent,
        };
        Ok(ReaderConfig { delimiter, header })
    }

    pub fn build(self) -> Result<DelimitedReader> {
        let config = self.config()?;
        let source = self
            .source
            .ok_or_else(|| CsvError::Config("no source to read from".to_string()))?;
        config.open(source)
    }
}

fn single_char(text: &str) -> Result<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(CsvError::Config(format!(
            "delimiter must be of length 1 but it is {}",
            text.chars().count()
        ))),
    }
}

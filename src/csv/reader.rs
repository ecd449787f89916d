use super::config::{HeaderMode, ReaderBuilder, ReaderConfig};
use super::header::HeaderMap;
use super::split::{split_fields, trim_line_terminator};
use crate::errors::{CsvError, Result};
use crate::Position;
use itertools::Itertools;
use std::fmt;
use std::io::BufRead;
use std::rc::Rc;
use tracing::{debug, trace};

/// Reads a delimited source one line at a time.
///
/// There is a single forward-only cursor. [`DelimitedReader::next_row`] and
/// [`DelimitedReader::rows`] both read from it, so interleaving them never
/// returns the same line twice.
pub struct DelimitedReader {
    delimiter: char,
    header: Option<Rc<HeaderMap>>,
    lines: Option<Box<dyn BufRead>>,
    line_number: usize,
}

impl DelimitedReader {
    pub fn builder() -> ReaderBuilder {
        ReaderBuilder::new()
    }

    pub(crate) fn open(lines: Box<dyn BufRead>, config: &ReaderConfig) -> Result<Self> {
        let mut reader = DelimitedReader {
            delimiter: config.delimiter(),
            header: None,
            lines: Some(lines),
            line_number: 0,
        };
        reader.header = match config.header_mode() {
            HeaderMode::Derive => Some(Rc::new(reader.read_header()?)),
            HeaderMode::Absent => None,
            HeaderMode::Provided(header) => Some(Rc::new(header.clone())),
        };
        debug!(
            delimiter = %reader.delimiter,
            columns = reader.header.as_ref().map(|header| header.len()),
            "opened delimited reader"
        );
        Ok(reader)
    }

    fn read_header(&mut self) -> Result<HeaderMap> {
        let line = self
            .read_line()?
            .ok_or_else(|| CsvError::Io("cannot read header: the source is empty".to_string()))?;
        Ok(HeaderMap::from_names(split_fields(&line, self.delimiter)))
    }

    /// The next line without its terminator, or `None` at end of input
    fn read_line(&mut self) -> Result<Option<String>> {
        let lines = self
            .lines
            .as_mut()
            .ok_or_else(|| CsvError::Io("the reader is closed".to_string()))?;
        let mut line = String::new();
        if lines.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        trim_line_terminator(&mut line);
        self.line_number += 1;
        Ok(Some(line))
    }

    /// Read and split the next line.
    ///
    /// Returns [`CsvError::EndOfInput`] once every line has been read.
    pub fn next_row(&mut self) -> Result<Row> {
        let line = self.read_line()?.ok_or(CsvError::EndOfInput)?;
        trace!(line = self.line_number, "read row");
        Ok(Row {
            fields: split_fields(&line, self.delimiter),
            header: self.header.clone(),
            line_number: self.line_number,
        })
    }

    /// The remaining rows, read lazily through the same cursor as `next_row`
    pub fn rows(&mut self) -> Rows<'_> {
        Rows {
            reader: self,
            failed: false,
        }
    }

    /// Release the source. Later reads fail with an IO error.
    pub fn close(&mut self) {
        if self.lines.take().is_some() {
            debug!(lines_read = self.line_number, "closed delimited reader");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lines.is_none()
    }

    pub fn header(&self) -> Option<&HeaderMap> {
        self.header.as_deref()
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Lines consumed so far, including a derived header line
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl fmt::Debug for DelimitedReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelimitedReader")
            .field("delimiter", &self.delimiter)
            .field("header", &self.header)
            .field("line_number", &self.line_number)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<'r> IntoIterator for &'r mut DelimitedReader {
    type Item = Result<Row>;
    type IntoIter = Rows<'r>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows()
    }
}

/// Lazy view over the rows left in a [`DelimitedReader`]
///
/// Ends at end of input. After yielding an error it yields nothing more.
#[derive(Debug)]
pub struct Rows<'r> {
    reader: &'r mut DelimitedReader,
    failed: bool,
}

impl Iterator for Rows<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.reader.next_row() {
            Ok(row) => Some(Ok(row)),
            Err(CsvError::EndOfInput) => None,
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }
}

/// The fields of one line
///
/// Holds a shared handle to the reader's header for lookup by name.
#[derive(Debug, Clone)]
pub struct Row {
    fields: Vec<String>,
    header: Option<Rc<HeaderMap>>,
    line_number: usize,
}

impl Row {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Look up a field by column name.
    ///
    /// Fails if there is no header, if the header has no such column, or if
    /// this row is too short to reach the column's index.
    pub fn field(&self, name: &str) -> Result<&str> {
        let header = self.header.as_deref().ok_or(CsvError::NoHeader)?;
        let index = header
            .index_of(name)
            .ok_or_else(|| CsvError::UnknownColumn(name.to_string()))?;
        self.get(index).ok_or(CsvError::ShortRow {
            position: Position {
                line: self.line_number,
                column: index,
            },
            len: self.fields.len(),
        })
    }

    pub fn header(&self) -> Option<&HeaderMap> {
        self.header.as_deref()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 1-based line in the source this row was read from
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Rebuild the line. Exact unless a field contains the delimiter.
    pub fn join(&self, delimiter: char) -> String {
        self.fields.iter().join(&delimiter.to_string())
    }
}

// rows are equal when their fields are
impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for Row {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::config::Source;
    use std::collections::HashMap;
    use std::io::Cursor;

    fn reader(builder: ReaderBuilder, input: &'static str) -> DelimitedReader {
        builder.source(Source::handle(Cursor::new(input))).build().unwrap()
    }

    #[test]
    fn test_derived_header() {
        let mut csv = reader(
            DelimitedReader::builder().with_header().delimiter(","),
            "ID,FIRST_NAME,LAST_NAME\n101,Foo,Bar\n",
        );
        let header = csv.header().unwrap();
        assert_eq!(header.index_of("ID"), Some(0));
        assert_eq!(header.index_of("FIRST_NAME"), Some(1));
        assert_eq!(header.index_of("LAST_NAME"), Some(2));

        let row = csv.next_row().unwrap();
        csv.close();
        assert_eq!(row.fields(), ["101", "Foo", "Bar"]);
        assert_eq!(row.len(), 3);
        assert_eq!(row.field("ID"), Ok("101"));
        assert_eq!(row.field("FIRST_NAME"), Ok("Foo"));
        assert_eq!(row.fields()[2], "Bar");
        assert_eq!(row.line_number(), 2);
    }

    #[test]
    fn test_provided_names_and_map_agree() {
        let by_names = reader(
            DelimitedReader::builder()
                .without_header()
                .with_provided_header(["id", "firstName", "lastName"]),
            "101,Foo,Bar\n",
        )
        .next_row()
        .unwrap();
        let by_map = reader(
            DelimitedReader::builder().with_provided_header(HashMap::from([
                ("id".to_string(), 0),
                ("firstName".to_string(), 1),
                ("lastName".to_string(), 2),
            ])),
            "101,Foo,Bar\n",
        )
        .next_row()
        .unwrap();

        for row in [&by_names, &by_map] {
            assert_eq!(row.field("id"), Ok("101"));
            assert_eq!(row.field("firstName"), Ok("Foo"));
            assert_eq!(row.field("lastName"), Ok("Bar"));
            assert_eq!(row.line_number(), 1);
        }
        assert_eq!(by_names, by_map);
    }

    #[test]
    fn test_without_header_after_provided_header() {
        let mut csv = reader(
            DelimitedReader::builder()
                .with_provided_header(["id", "firstName", "lastName"])
                .without_header(),
            "101,Foo,Bar\n",
        );
        let row = csv.next_row().unwrap();
        assert_eq!(row.field("id"), Ok("101"));
        assert_eq!(row.field("firstName"), Ok("Foo"));
    }

    #[test]
    fn test_field_without_header() {
        let mut csv = reader(DelimitedReader::builder().without_header(), "101,Foo,Bar\n");
        assert!(csv.header().is_none());
        let row = csv.next_row().unwrap();
        assert_eq!(row.field("ID"), Err(CsvError::NoHeader));
        assert_eq!(row.get(0), Some("101"));
    }

    #[test]
    fn test_lookup_errors() {
        let mut csv = reader(
            DelimitedReader::builder().with_header(),
            "a,b,c\n1,2,3,4\n1\n",
        );
        let long = csv.next_row().unwrap();
        assert_eq!(long.fields(), ["1", "2", "3", "4"]);
        assert_eq!(long.field("c"), Ok("3"));
        assert_eq!(
            long.field("d"),
            Err(CsvError::UnknownColumn("d".to_string()))
        );

        let short = csv.next_row().unwrap();
        assert_eq!(short.field("a"), Ok("1"));
        assert_eq!(
            short.field("c"),
            Err(CsvError::ShortRow {
                position: Position { line: 3, column: 2 },
                len: 1,
            })
        );
    }

    #[test]
    fn test_end_of_input() {
        let mut csv = reader(DelimitedReader::builder().with_header(), "a,b\n1,2");
        assert_eq!(csv.next_row().unwrap().fields(), ["1", "2"]);
        let error = csv.next_row().unwrap_err();
        assert_eq!(error, CsvError::EndOfInput);
        assert!(error.is_end_of_input());
        assert_eq!(csv.next_row().unwrap_err(), CsvError::EndOfInput);
    }

    #[test]
    fn test_header_from_empty_source() {
        let error = DelimitedReader::builder()
            .with_header()
            .source(Source::handle(Cursor::new("")))
            .build()
            .unwrap_err();
        assert!(matches!(error, CsvError::Io(_)));
    }

    #[test]
    fn test_header_only_source_has_no_rows() {
        let mut csv = reader(DelimitedReader::builder().with_header(), "a,b\n");
        assert_eq!(csv.header().unwrap().len(), 2);
        assert_eq!(csv.rows().count(), 0);
        assert_eq!(csv.line_number(), 1);
    }

    #[test]
    fn test_rows_yields_every_data_line_in_order() {
        let mut csv = reader(
            DelimitedReader::builder().with_header(),
            "n\none\ntwo\nthree\n",
        );
        let rows = csv.rows().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(
            rows.iter().map(|row| row.field("n").unwrap()).collect::<Vec<_>>(),
            vec!["one", "two", "three"]
        );
        assert!(csv.rows().next().is_none());
        assert_eq!(csv.next_row().unwrap_err(), CsvError::EndOfInput);
    }

    #[test]
    fn test_rows_and_next_row_share_cursor() {
        let mut csv = reader(DelimitedReader::builder(), "1\n2\n3\n4\n5\n");
        assert_eq!(csv.next_row().unwrap().fields(), ["1"]);
        assert_eq!(csv.rows().next().unwrap().unwrap().fields(), ["2"]);
        assert_eq!(csv.next_row().unwrap().fields(), ["3"]);

        let mut rest = Vec::new();
        for row in &mut csv {
            rest.push(row.unwrap().into_fields());
        }
        assert_eq!(rest, vec![vec!["4"], vec!["5"]]);
        assert_eq!(csv.next_row().unwrap_err(), CsvError::EndOfInput);
    }

    #[test]
    fn test_read_after_close() {
        let mut csv = reader(DelimitedReader::builder(), "1\n2\n");
        csv.close();
        assert!(csv.is_closed());
        assert_eq!(
            csv.next_row().unwrap_err(),
            CsvError::Io("the reader is closed".to_string())
        );

        let mut rows = csv.rows();
        assert!(matches!(rows.next(), Some(Err(CsvError::Io(_)))));
        assert!(rows.next().is_none());

        csv.close();
        assert!(csv.is_closed());
    }

    #[test]
    fn test_line_terminators_and_empty_fields() {
        let mut csv = reader(
            DelimitedReader::builder().delimiter(';'),
            "a;;b\r\n;\r\n\nlast;",
        );
        assert_eq!(csv.next_row().unwrap().fields(), ["a", "", "b"]);
        assert_eq!(csv.next_row().unwrap().fields(), ["", ""]);
        assert_eq!(csv.next_row().unwrap().fields(), [""]);
        let last = csv.next_row().unwrap();
        assert_eq!(last.fields(), ["last", ""]);
        assert_eq!(last.join(';'), "last;");
        assert_eq!(csv.next_row().unwrap_err(), CsvError::EndOfInput);
    }

    #[test]
    fn test_rows_share_one_header() {
        let mut csv = reader(DelimitedReader::builder().with_header(), "a\n1\n2\n");
        let first = csv.next_row().unwrap();
        let second = csv.next_row().unwrap();
        assert!(std::ptr::eq(first.header().unwrap(), second.header().unwrap()));
        assert!(std::ptr::eq(first.header().unwrap(), csv.header().unwrap()));
    }

    #[test]
    fn test_invalid_utf8_is_io_error() {
        let mut csv = DelimitedReader::builder()
            .source(Source::handle(Cursor::new(vec![0xff, 0xfe, b'\n'])))
            .build()
            .unwrap();
        assert!(matches!(csv.next_row(), Err(CsvError::Io(_))));
    }
}

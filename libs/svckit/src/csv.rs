// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Minimal CSV line splitter
//!
//! One line is one record, fields are separated by a single delimiter
//! character. There is no quoting and no escaping. Bytes that are not
//! valid UTF-8 are replaced with U+FFFD.

use std::borrow::Cow;
use std::io::{self, BufRead};
use thiserror::Error;

pub const DEFAULT_DELIMITER: char = ';';

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("end of input")]
    EndOfInput,

    #[error("failed to read line: {0}")]
    Io(#[from] io::Error),
}

pub struct Reader<R> {
    inner: R,
    delimiter: char,
    line: Vec<u8>,
}

impl<R: BufRead> Reader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_delimiter(inner, DEFAULT_DELIMITER)
    }

    pub fn with_delimiter(inner: R, delimiter: char) -> Self {
        Self { inner, delimiter, line: Vec::new() }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn set_delimiter(&mut self, delimiter: char) {
        self.delimiter = delimiter;
    }

    /// Read the next record
    ///
    /// An empty line is treated as the end of input.
    pub fn read(&mut self) -> Result<Vec<String>, CsvError> {
        let delimiter = self.delimiter;
        let line = self.next_line()?;
        Ok(line.split(delimiter).map(str::to_string).collect())
    }

    /// Read the next record into `dst`, returning the number of fields written
    ///
    /// Fields beyond `dst.len()` are dropped and slots beyond the record
    /// length are left untouched.
    pub fn read_to(&mut self, dst: &mut [String]) -> Result<usize, CsvError> {
        let delimiter = self.delimiter;
        let line = self.next_line()?;

        let mut written = 0;
        for (slot, field) in dst.iter_mut().zip(line.split(delimiter)) {
            slot.clear();
            slot.push_str(field);
            written += 1;
        }

        Ok(written)
    }

    /// Iterate over records until end of input
    pub fn records(&mut self) -> Records<'_, R> {
        Records { reader: self }
    }

    fn next_line(&mut self) -> Result<Cow<'_, str>, CsvError> {
        self.line.clear();

        if self.inner.read_until(b'\n', &mut self.line)? == 0 {
            return Err(CsvError::EndOfInput);
        }

        let line = self.line.strip_suffix(b"\n").unwrap_or(&self.line);
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        if line.is_empty() {
            return Err(CsvError::EndOfInput);
        }

        Ok(String::from_utf8_lossy(line))
    }
}

pub struct Records<'a, R> {
    reader: &'a mut Reader<R>,
}

impl<R: BufRead> Iterator for Records<'_, R> {
    type Item = Result<Vec<String>, CsvError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read() {
            Err(CsvError::EndOfInput) => None,
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_trailing_delimiter() {
        let mut reader = Reader::with_delimiter(Cursor::new("123,ABC,A_C,A C,\n"), ',');
        assert_eq!(reader.read().unwrap(), vec!["123", "ABC", "A_C", "A C", ""]);
        assert!(matches!(reader.read(), Err(CsvError::EndOfInput)));
    }

    #[test]
    fn test_long_record() {
        let mut reader =
            Reader::with_delimiter(Cursor::new("123,ABC,A_C,A C,123,ABC,A_C,A C\n"), ',');
        assert_eq!(
            reader.read().unwrap(),
            vec!["123", "ABC", "A_C", "A C", "123", "ABC", "A_C", "A C"]
        );
    }

    #[test]
    fn test_default_delimiter_and_crlf() {
        let mut reader = Reader::new(Cursor::new("a;b\r\nc;d;e\r\nlast"));
        assert_eq!(reader.delimiter(), ';');
        assert_eq!(reader.read().unwrap(), vec!["a", "b"]);
        assert_eq!(reader.read().unwrap(), vec!["c", "d", "e"]);
        assert_eq!(reader.read().unwrap(), vec!["last"]);
        assert!(matches!(reader.read(), Err(CsvError::EndOfInput)));
    }

    #[test]
    fn test_empty_line_ends_input() {
        let mut reader = Reader::new(Cursor::new("a;b\n\nc;d\n"));
        assert_eq!(reader.read().unwrap(), vec!["a", "b"]);
        assert!(matches!(reader.read(), Err(CsvError::EndOfInput)));
    }

    #[test]
    fn test_multibyte_delimiter() {
        let mut reader = Reader::with_delimiter(Cursor::new("α→β→\n"), '→');
        assert_eq!(reader.read().unwrap(), vec!["α", "β", ""]);

        let mut reader = Reader::new(Cursor::new("x|y\n"));
        reader.set_delimiter('|');
        assert_eq!(reader.read().unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn test_invalid_utf8() {
        let mut reader = Reader::with_delimiter(Cursor::new(b"a,\xff\xfe,c\nd,e\n".to_vec()), ',');
        assert_eq!(reader.read().unwrap(), vec!["a", "\u{fffd}\u{fffd}", "c"]);
        assert_eq!(reader.read().unwrap(), vec!["d", "e"]);
        assert!(matches!(reader.read(), Err(CsvError::EndOfInput)));
    }

    #[test]
    fn test_read_to() {
        let mut reader = Reader::with_delimiter(Cursor::new("1,2,3\n4\n"), ',');

        let mut short = vec![String::new(); 2];
        assert_eq!(reader.read_to(&mut short).unwrap(), 2);
        assert_eq!(short, vec!["1", "2"]);

        let mut wide = vec!["x".to_string(); 3];
        assert_eq!(reader.read_to(&mut wide).unwrap(), 1);
        assert_eq!(wide, vec!["4", "x", "x"]);

        assert!(matches!(reader.read_to(&mut wide), Err(CsvError::EndOfInput)));
    }

    #[test]
    fn test_records() {
        let mut reader = Reader::new(Cursor::new("a;1\nb;2\n"));
        let records: Vec<Vec<String>> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records, vec![vec!["a", "1"], vec!["b", "2"]]);
    }
}

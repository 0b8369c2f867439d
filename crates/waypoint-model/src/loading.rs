// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Instance loader for distance matrices.
//!
//! The text format is whitespace-delimited: the order `n` first, followed by
//! the `n * n` distances in row-major order. Line breaks carry no meaning, and
//! anything after a `#` up to the end of the line is a comment.
//!
//! ```raw
//! # five cities
//! 5
//! 0 3 4 2 7
//! 3 0 4 6 3
//! 4 4 0 5 8
//! 2 6 5 0 6
//! 7 3 8 6 0
//! ```
//!
//! Tokens after the last distance are rejected so that a truncated order
//! header cannot silently produce a smaller matrix.

use crate::matrix::{DistanceMatrix, MatrixError};
use num_traits::{PrimInt, Signed};
use std::{
    collections::VecDeque,
    fmt::Display,
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr,
};

/// The error type for matrix loading.
#[derive(Debug)]
pub enum MatrixLoaderError {
    /// An I/O error occurred while reading the input stream.
    Io(std::io::Error),
    /// The input ended before all distances were read.
    UnexpectedEof,
    /// A token could not be parsed into the expected numeric type.
    Parse(ParseTokenError),
    /// There were tokens left after the last distance.
    TrailingInput(String),
    /// The matrix itself is invalid.
    Matrix(MatrixError),
}

/// Details about a failed token parsing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTokenError {
    /// The token that failed to parse.
    pub token: String,
    /// The name of the target type (e.g. `"i64"`).
    pub type_name: &'static str,
}

impl std::fmt::Display for ParseTokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Could not parse token '{}' as type {}",
            self.token, self.type_name
        )
    }
}

impl std::error::Error for ParseTokenError {}

impl Display for MatrixLoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnexpectedEof => write!(f, "Unexpected end of input while reading matrix"),
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::TrailingInput(token) => {
                write!(f, "Unexpected token '{token}' after the last distance")
            }
            Self::Matrix(e) => write!(f, "Invalid matrix: {e}"),
        }
    }
}

impl std::error::Error for MatrixLoaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Matrix(e) => Some(e),
            Self::UnexpectedEof | Self::TrailingInput(_) => None,
        }
    }
}

impl From<std::io::Error> for MatrixLoaderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ParseTokenError> for MatrixLoaderError {
    fn from(e: ParseTokenError) -> Self {
        Self::Parse(e)
    }
}

impl From<MatrixError> for MatrixLoaderError {
    fn from(e: MatrixError) -> Self {
        Self::Matrix(e)
    }
}

/// Reads `DistanceMatrix` instances from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixLoader<T> {
    _marker: std::marker::PhantomData<T>,
}

impl<T> Default for MatrixLoader<T> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T> MatrixLoader<T>
where
    T: PrimInt + Signed + FromStr,
{
    /// Creates a new `MatrixLoader`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a matrix from a type implementing `BufRead`.
    pub fn from_bufread<R: BufRead>(&self, rdr: R) -> Result<DistanceMatrix<T>, MatrixLoaderError> {
        let mut tokens = Tokens::new(rdr);

        let order: usize = tokens.parse()?;
        let count = order.saturating_mul(order);
        let mut distances = Vec::with_capacity(count.min(1 << 16));
        for _ in 0..count {
            distances.push(tokens.parse::<T>()?);
        }

        if let Some(extra) = tokens.next_token()? {
            return Err(MatrixLoaderError::TrailingInput(extra));
        }

        Ok(DistanceMatrix::new(order, distances)?)
    }

    /// Loads a matrix from a file path.
    #[inline]
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<DistanceMatrix<T>, MatrixLoaderError> {
        let file = File::open(path)?;
        self.from_bufread(BufReader::new(file))
    }

    /// Loads a matrix from a generic reader.
    #[inline]
    pub fn from_reader<R: Read>(&self, r: R) -> Result<DistanceMatrix<T>, MatrixLoaderError> {
        self.from_bufread(BufReader::new(r))
    }

    /// Loads a matrix from a string slice.
    #[inline]
    pub fn from_str(&self, s: &str) -> Result<DistanceMatrix<T>, MatrixLoaderError> {
        self.from_bufread(s.as_bytes())
    }
}

/// Line-buffered token stream that drops `#` comments.
struct Tokens<R> {
    rdr: R,
    line: String,
    pending: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(rdr: R) -> Self {
        Self {
            rdr,
            line: String::new(),
            pending: VecDeque::new(),
        }
    }

    /// Returns the next token, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<String>, MatrixLoaderError> {
        while self.pending.is_empty() {
            self.line.clear();
            if self.rdr.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            let content = match self.line.find('#') {
                Some(at) => &self.line[..at],
                None => &self.line,
            };
            self.pending
                .extend(content.split_whitespace().map(str::to_owned));
        }
        Ok(self.pending.pop_front())
    }

    fn parse<U: FromStr>(&mut self) -> Result<U, MatrixLoaderError> {
        let token = self
            .next_token()?
            .ok_or(MatrixLoaderError::UnexpectedEof)?;
        token.parse::<U>().map_err(|_| {
            MatrixLoaderError::Parse(ParseTokenError {
                type_name: std::any::type_name::<U>(),
                token,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type IntegerType = i64;

    const FIVE_CITIES: &str = r#"
        # five cities
        5
        0 3 4 2 7   # row 0
        3 0 4 6 3
        4 4 0 5 8
        2 6 5 0 6
        7 3 8 6 0
    "#;

    #[test]
    fn test_loads_commented_input() {
        let m = MatrixLoader::<IntegerType>::new()
            .from_str(FIVE_CITIES)
            .expect("Failed to load");
        assert_eq!(m.order(), 5);
        assert_eq!(m.distance(4, 2), 8);
        assert_eq!(m.distance(0, 3), 2);
    }

    #[test]
    fn test_rows_span_lines() {
        let m = MatrixLoader::<IntegerType>::new()
            .from_str("2 0\n5\n5 0")
            .expect("Failed to load");
        assert_eq!(m.distance(0, 1), 5);
    }

    #[test]
    fn test_comment_glued_to_token() {
        let m = MatrixLoader::<IntegerType>::new()
            .from_str("1#order\n0#self")
            .expect("Failed to load");
        assert_eq!(m.order(), 1);
    }

    #[test]
    fn test_from_reader() {
        let m = MatrixLoader::<IntegerType>::new()
            .from_reader(FIVE_CITIES.as_bytes())
            .expect("Failed to load");
        assert_eq!(m.order(), 5);
    }

    #[test]
    fn test_missing_entries() {
        let res = MatrixLoader::<IntegerType>::new().from_str("3 0 1 2 1 0");
        assert!(matches!(res, Err(MatrixLoaderError::UnexpectedEof)));
    }

    #[test]
    fn test_trailing_tokens() {
        let res = MatrixLoader::<IntegerType>::new().from_str("1 0 7");
        match res {
            Err(MatrixLoaderError::TrailingInput(t)) => assert_eq!(t, "7"),
            other => panic!("Expected TrailingInput, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_structure() {
        let res = MatrixLoader::<IntegerType>::new().from_str("2 0 x 1 0");
        match res {
            Err(MatrixLoaderError::Parse(e)) => {
                assert_eq!(e.token, "x");
                assert!(e.type_name.contains("i64"));
            }
            other => panic!("Expected Parse error with context, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_order_is_parse_error() {
        let res = MatrixLoader::<IntegerType>::new().from_str("-2");
        assert!(matches!(res, Err(MatrixLoaderError::Parse(_))));
    }

    #[test]
    fn test_matrix_validation_propagates() {
        let res = MatrixLoader::<IntegerType>::new().from_str("0");
        assert!(matches!(res, Err(MatrixLoaderError::Matrix(MatrixError::Empty))));

        let res = MatrixLoader::<IntegerType>::new().from_str("2 0 1 2 0");
        assert!(matches!(
            res,
            Err(MatrixLoaderError::Matrix(MatrixError::Asymmetric { row: 0, col: 1 }))
        ));
    }

    #[test]
    fn test_from_path_missing_file_is_io() {
        let res = MatrixLoader::<IntegerType>::new().from_path("/nonexistent/waypoint/matrix.txt");
        assert!(matches!(res, Err(MatrixLoaderError::Io(_))));
    }

    #[test]
    fn test_display_round_trip_through_loader() {
        let original = MatrixLoader::<IntegerType>::new()
            .from_str(FIVE_CITIES)
            .expect("Failed to load");
        let printed = original.to_string();
        let body: Vec<&str> = printed.lines().skip(1).collect();
        let text = format!("{}\n{}", original.order(), body.join("\n"));
        let reloaded = MatrixLoader::<IntegerType>::new()
            .from_str(&text)
            .expect("Failed to reload");
        assert_eq!(original, reloaded);
    }
}

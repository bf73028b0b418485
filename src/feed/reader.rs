//! Line reader for the event feed
//!
//! Reads from a file or standard input, one line at a time.

use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tracing::{debug, info};

use crate::error::{PricerError, Result};

/// Boxed input used when the source is chosen at runtime
pub type InputStream = BufReader<Box<dyn AsyncRead + Unpin + Send>>;

/// One raw feed line with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLine {
    pub number: usize,
    pub text: String,
}

/// Reader over a line-oriented feed
pub struct FeedReader<R> {
    lines: Lines<R>,
    line_number: usize,
    source: String,
}

impl FeedReader<InputStream> {
    /// Open a file, or standard input when no path is given
    pub async fn open(input: Option<&Path>) -> Result<Self> {
        let (stream, source): (Box<dyn AsyncRead + Unpin + Send>, String) = match input {
            Some(path) => {
                let file = File::open(path).await.map_err(|e| {
                    PricerError::IoError(format!("Failed to open {}: {}", path.display(), e))
                })?;
                (Box::new(file), path.display().to_string())
            }
            None => (Box::new(tokio::io::stdin()), "stdin".to_string()),
        };

        info!(source = %source, "Opened feed");
        Ok(Self::new(BufReader::new(stream), source))
    }
}

impl<R: AsyncBufRead + Unpin> FeedReader<R> {
    /// Wrap an already buffered reader
    pub fn new(reader: R, source: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            source: source.into(),
        }
    }

    /// Receive the next line, `None` at end of input
    pub async fn recv(&mut self) -> Result<Option<FeedLine>> {
        match self.lines.next_line().await? {
            Some(text) => {
                self.line_number += 1;
                Ok(Some(FeedLine {
                    number: self.line_number,
                    text,
                }))
            }
            None => {
                debug!(source = %self.source, lines = self.line_number, "Feed ended");
                Ok(None)
            }
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Lines read so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_recv_numbers_lines() {
        let mut reader = FeedReader::new(&b"1 A a B 1.00 1\n\n2 R a 1"[..], "memory");

        let first = reader.recv().await.unwrap().unwrap();
        assert_eq!(first, FeedLine { number: 1, text: "1 A a B 1.00 1".to_string() });
        assert_eq!(reader.recv().await.unwrap().unwrap().text, "");
        assert_eq!(reader.recv().await.unwrap().unwrap().number, 3);
        assert!(reader.recv().await.unwrap().is_none());
        assert_eq!(reader.line_number(), 3);
    }

    #[tokio::test]
    async fn test_open_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "28800744 R b 100").unwrap();

        let mut reader = FeedReader::open(Some(file.path())).await.unwrap();
        assert_eq!(reader.recv().await.unwrap().unwrap().text, "28800744 R b 100");
        assert!(reader.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let result = FeedReader::open(Some(Path::new("/nonexistent/pricer.in"))).await;
        assert!(matches!(result, Err(PricerError::IoError(_))));
    }
}

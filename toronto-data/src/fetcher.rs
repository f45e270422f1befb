//! Reads the first lines of a remote text file without downloading the rest.

use futures::TryStreamExt;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::io::StreamReader;

use crate::error::{Result, TorontoDataError};

/// Line cap when the caller gives none
pub const DEFAULT_MAX_LINES: usize = 50;

/// Lines read from the head of a remote file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedText {
    pub lines: Vec<String>,
    /// At least one more line exists past the cap
    pub truncated: bool,
}

impl FetchedText {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// No lines read, or nothing but a single blank one
    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }
}

/// Streams a remote text file and stops after a bounded number of lines
#[derive(Debug, Clone)]
pub struct LineBoundedFetcher {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl LineBoundedFetcher {
    pub fn new(http_client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            http_client,
            timeout,
        }
    }

    /// Fetch at most `max_lines` lines of `url`.
    ///
    /// The URL must be `http://` or `https://`; anything else fails before a
    /// request is made.
    pub async fn fetch(&self, url: &str, max_lines: usize) -> Result<FetchedText> {
        if !has_http_scheme(url) {
            return Err(TorontoDataError::invalid_url(url));
        }

        tracing::debug!(%url, max_lines, "fetching file head");

        let response = self
            .http_client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TorontoDataError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let mut reader = StreamReader::new(Box::pin(stream));

        read_bounded_lines(&mut reader, max_lines)
            .await
            .map_err(|e| match e {
                ReadError::Io(e) => self.map_io_error(url, e),
                ReadError::Decode(line) => TorontoDataError::Decode { line },
            })
    }

    fn map_reqwest_error(&self, url: &str, err: reqwest::Error) -> TorontoDataError {
        if err.is_timeout() {
            TorontoDataError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            TorontoDataError::Transport(err.to_string())
        }
    }

    fn map_io_error(&self, url: &str, err: std::io::Error) -> TorontoDataError {
        let timed_out = err.kind() == std::io::ErrorKind::TimedOut
            || err
                .get_ref()
                .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
                .is_some_and(reqwest::Error::is_timeout);
        if timed_out {
            TorontoDataError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            TorontoDataError::Transport(err.to_string())
        }
    }
}

pub fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[derive(Debug)]
enum ReadError {
    Io(std::io::Error),
    /// 1-based line number
    Decode(usize),
}

async fn read_bounded_lines<R>(
    reader: &mut R,
    max_lines: usize,
) -> std::result::Result<FetchedText, ReadError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = Vec::with_capacity(max_lines.min(1024));
    let mut buf = Vec::new();

    while lines.len() < max_lines {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).await.map_err(ReadError::Io)?;
        if read == 0 {
            break;
        }
        let line_number = lines.len() + 1;
        let line = decode_line(&buf).ok_or(ReadError::Decode(line_number))?;
        lines.push(line);
    }

    let mut truncated = false;
    if lines.len() == max_lines {
        buf.clear();
        // Probe only: the extra line is discarded
        truncated = reader.read_until(b'\n', &mut buf).await.map_err(ReadError::Io)? > 0;
    }

    Ok(FetchedText { lines, truncated })
}

/// Decode one raw line with its terminator stripped: UTF-8 first, then
/// Latin-1. Latin-1 maps every byte, so only NUL bytes (binary content)
/// make a line undecodable.
fn decode_line(raw: &[u8]) -> Option<String> {
    let mut end = raw.len();
    while end > 0 && matches!(raw[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    let bytes = &raw[..end];

    if bytes.contains(&0) {
        return None;
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Some(text.to_string()),
        Err(_) => Some(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

//! Request parsing.
//!
//! # Responsibilities
//! - Decode the first block of a connection leniently (invalid UTF-8 dropped)
//! - Split out the request line and `key: value` headers
//! - Keep the raw bytes and the body text for the read loop's length math
//! - Extract the image URL from the request target
//!
//! # Design Decisions
//! - Hand-rolled: duplicate headers overwrite, the last line of the first
//!   block is taken as the body, and anything else a strict parser would
//!   reject is accepted as long as every header line has a `:`
//! - Header names are lowercased, values kept verbatim apart from leading
//!   whitespace

use std::collections::HashMap;
use thiserror::Error;

/// Header whose value drives the read loop.
pub const CONTENT_LENGTH: &str = "content-length";

/// Target that never triggers an image lookup.
pub const FAVICON: &str = "favicon.ico";

/// Error produced while parsing the first block of a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed header line {0:?}")]
    MalformedHeader(String),
}

/// Error produced while interpreting a parsed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("request line {0:?} has no target")]
    MissingTarget(String),
}

/// Decode bytes as UTF-8, dropping invalid sequences.
///
/// Dropping (rather than substituting U+FFFD) keeps the decoded byte length
/// no larger than the input.
pub fn decode_lenient(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// A request reconstructed from a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRequest {
    request_line: String,
    headers: HashMap<String, String>,
    raw: Vec<u8>,
    body: String,
}

impl ParsedRequest {
    /// Parse the first block read from a connection.
    pub fn parse(first_chunk: &[u8]) -> Result<Self, ParseError> {
        let text = decode_lenient(first_chunk);
        let lines: Vec<&str> = text.split("\r\n").collect();

        let mut headers = HashMap::new();
        // The final line is the body and is never read as a header.
        let header_lines = lines.get(1..lines.len() - 1).unwrap_or_default();
        for line in header_lines.iter().take_while(|l| !l.is_empty()) {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| ParseError::MalformedHeader((*line).to_string()))?;
            headers.insert(
                name.to_lowercase(),
                value.trim_start_matches([' ', '\t']).to_string(),
            );
        }

        Ok(Self {
            request_line: lines[0].to_string(),
            headers,
            raw: first_chunk.to_vec(),
            body: lines[lines.len() - 1].to_string(),
        })
    }

    /// The first line: method, target and protocol.
    pub fn request_line(&self) -> &str {
        &self.request_line
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Every byte consumed from the connection so far.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Body text decoded so far.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Byte length of everything before the body in the first block.
    pub fn header_byte_len(&self) -> usize {
        self.raw.len().saturating_sub(self.body.len())
    }

    /// Add a later block to the raw bytes and the body text.
    pub fn append(&mut self, chunk: &[u8]) {
        self.raw.extend_from_slice(chunk);
        self.body.push_str(&decode_lenient(chunk));
    }

    /// The image URL: second space-separated token of the request line with
    /// its first character removed.
    ///
    /// `Ok(None)` for an empty request line.
    pub fn target(&self) -> Result<Option<&str>, RequestError> {
        if self.request_line.is_empty() {
            return Ok(None);
        }
        let token = self
            .request_line
            .split(' ')
            .nth(1)
            .ok_or_else(|| RequestError::MissingTarget(self.request_line.clone()))?;
        let mut chars = token.chars();
        chars.next();
        Ok(Some(chars.as_str()))
    }
}

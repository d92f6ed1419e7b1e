//! `multipart/form-data` parsing.
//!
//! The whole body is already buffered by the server, so parsing is a single
//! pass over a byte slice: find each `--boundary` delimiter, read the part
//! headers up to the blank line, and slice the part data up to the next
//! `\r\n--boundary`. Limits on file size, total size and part count are
//! enforced while walking.

use std::collections::HashMap;
use std::fmt;

use memchr::memmem;

/// Default maximum size of one uploaded file (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Default maximum size of all part data together (50 MiB).
pub const DEFAULT_MAX_TOTAL_SIZE: usize = 50 * 1024 * 1024;

/// Default maximum number of parts, files and plain fields together.
pub const DEFAULT_MAX_PARTS: usize = 100;

/// RFC 2046 §5.1.1: boundaries are 1 to 70 characters.
const MAX_BOUNDARY_LEN: usize = 70;

/// Limits applied while parsing.
#[derive(Clone, Copy, Debug)]
pub struct MultipartConfig {
    pub max_file_size: usize,
    pub max_total_size: usize,
    pub max_parts: usize,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_total_size: DEFAULT_MAX_TOTAL_SIZE,
            max_parts: DEFAULT_MAX_PARTS,
        }
    }
}

/// Reasons a multipart body could not be parsed.
#[derive(Debug, PartialEq, Eq)]
pub enum MultipartError {
    NotMultipart,
    MissingBoundary,
    InvalidBoundary,
    FileTooLarge { size: usize, max: usize },
    TotalTooLarge { size: usize, max: usize },
    TooManyParts { max: usize },
    MissingContentDisposition,
    InvalidContentDisposition(&'static str),
    UnexpectedEof,
    InvalidFormat(&'static str),
}

impl fmt::Display for MultipartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMultipart      => f.write_str("content type is not multipart/form-data"),
            Self::MissingBoundary   => f.write_str("missing boundary in multipart content type"),
            Self::InvalidBoundary   => f.write_str("invalid multipart boundary"),
            Self::FileTooLarge { size, max } => {
                write!(f, "file too large: {size} bytes exceeds limit of {max}")
            }
            Self::TotalTooLarge { size, max } => {
                write!(f, "upload too large: {size} bytes exceeds limit of {max}")
            }
            Self::TooManyParts { max } => write!(f, "too many parts: limit is {max}"),
            Self::MissingContentDisposition => {
                f.write_str("part is missing a content-disposition header")
            }
            Self::InvalidContentDisposition(detail) => {
                write!(f, "invalid content-disposition: {detail}")
            }
            Self::UnexpectedEof       => f.write_str("unexpected end of multipart data"),
            Self::InvalidFormat(detail) => write!(f, "invalid multipart format: {detail}"),
        }
    }
}

impl std::error::Error for MultipartError {}

/// One part of a multipart body: a file upload or a plain form field.
#[derive(Clone, Debug)]
pub struct Part {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Part {
    pub fn is_file(&self) -> bool { self.filename.is_some() }

    /// The part data as text, for plain form fields.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    pub fn size(&self) -> usize { self.data.len() }
}

/// Extracts the boundary parameter from a `multipart/form-data` content type.
pub fn parse_boundary(content_type: &str) -> Result<String, MultipartError> {
    let mut params = content_type.split(';');
    let main = params.next().unwrap_or("").trim();
    if !main.eq_ignore_ascii_case("multipart/form-data") {
        return Err(MultipartError::NotMultipart);
    }

    for param in params {
        let Some((k, v)) = param.trim().split_once('=') else { continue };
        if k.trim().eq_ignore_ascii_case("boundary") {
            let boundary = v.trim().trim_matches('"');
            if boundary.is_empty() || boundary.len() > MAX_BOUNDARY_LEN {
                return Err(MultipartError::InvalidBoundary);
            }
            return Ok(boundary.to_owned());
        }
    }

    Err(MultipartError::MissingBoundary)
}

/// Boundary-based parser for a fully buffered body.
#[derive(Debug)]
pub struct MultipartParser {
    delimiter: Vec<u8>,
    config: MultipartConfig,
}

impl MultipartParser {
    pub fn new(boundary: &str, config: MultipartConfig) -> Self {
        let mut delimiter = b"--".to_vec();
        delimiter.extend_from_slice(boundary.as_bytes());
        Self { delimiter, config }
    }

    pub fn parse(&self, body: &[u8]) -> Result<Vec<Part>, MultipartError> {
        let mut parts = Vec::new();
        let mut total = 0usize;

        // Skip the preamble.
        let mut pos = memmem::find(body, &self.delimiter).ok_or(MultipartError::UnexpectedEof)?;

        loop {
            let after = pos + self.delimiter.len();
            let rest = body.get(after..).ok_or(MultipartError::UnexpectedEof)?;
            if rest.starts_with(b"--") {
                break;
            }
            if !rest.starts_with(b"\r\n") {
                return Err(MultipartError::InvalidFormat("expected CRLF after boundary"));
            }
            if parts.len() == self.config.max_parts {
                return Err(MultipartError::TooManyParts { max: self.config.max_parts });
            }

            let (headers, data_start) = parse_part_headers(body, after + 2)?;
            let disposition = headers
                .get("content-disposition")
                .ok_or(MultipartError::MissingContentDisposition)?;
            let (name, filename) = parse_content_disposition(disposition)?;

            let mut next = b"\r\n".to_vec();
            next.extend_from_slice(&self.delimiter);
            let data_end = memmem::find(&body[data_start..], &next)
                .map(|i| data_start + i)
                .ok_or(MultipartError::UnexpectedEof)?;
            let data = &body[data_start..data_end];

            if filename.is_some() && data.len() > self.config.max_file_size {
                return Err(MultipartError::FileTooLarge {
                    size: data.len(),
                    max: self.config.max_file_size,
                });
            }
            total += data.len();
            if total > self.config.max_total_size {
                return Err(MultipartError::TotalTooLarge {
                    size: total,
                    max: self.config.max_total_size,
                });
            }

            parts.push(Part {
                name,
                filename,
                content_type: headers.get("content-type").cloned(),
                data: data.to_vec(),
            });
            pos = data_end + 2;
        }

        Ok(parts)
    }
}

/// Reads `Name: value` lines up to the blank line. Returns the headers
/// (lowercased names) and the offset where part data begins.
fn parse_part_headers(
    body: &[u8],
    start: usize,
) -> Result<(HashMap<String, String>, usize), MultipartError> {
    let mut headers = HashMap::new();
    let mut pos = start;
    loop {
        let line_len = memmem::find(&body[pos..], b"\r\n").ok_or(MultipartError::UnexpectedEof)?;
        let line = &body[pos..pos + line_len];
        pos += line_len + 2;
        if line.is_empty() {
            return Ok((headers, pos));
        }
        let line = std::str::from_utf8(line)
            .map_err(|_| MultipartError::InvalidFormat("part header is not UTF-8"))?;
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_owned());
        }
    }
}

/// Parses `form-data; name="field"; filename="file.txt"`.
fn parse_content_disposition(value: &str) -> Result<(String, Option<String>), MultipartError> {
    let mut name = None;
    let mut filename = None;

    for param in value.split(';').map(str::trim) {
        let Some((key, raw)) = param.split_once('=') else { continue };
        let unquoted = unquote(raw);
        match key.trim().to_ascii_lowercase().as_str() {
            "name" => name = Some(unquoted),
            "filename" => {
                if unquoted.contains("..") || unquoted.contains(['/', '\\', '\0']) {
                    return Err(MultipartError::InvalidContentDisposition(
                        "filename contains path traversal characters",
                    ));
                }
                filename = Some(unquoted);
            }
            _ => {}
        }
    }

    let name = name.ok_or(MultipartError::InvalidContentDisposition("missing name parameter"))?;
    Ok((name, filename))
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
        .to_owned()
}

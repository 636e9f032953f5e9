//! Minimal HTTP/1.1 request parsing and response writing.
//!
//! Only what the gallery server needs: the request line and headers are
//! parsed, bodies are ignored, and every response closes the connection.

use serde::Serialize;
use std::fmt;
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;

/// Upper bound on the request line plus headers.
pub const MAX_HEAD_BYTES: usize = 16 * 1024;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("connection closed before a request was received")]
    Empty,
    #[error("malformed request line: {0:?}")]
    BadRequestLine(String),
    #[error("malformed header line: {0:?}")]
    BadHeader(String),
    #[error("request head exceeds {MAX_HEAD_BYTES} bytes")]
    HeadTooLarge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Other(String),
}

impl Method {
    /// Methods are case-sensitive tokens (RFC 9110 §9.1).
    pub fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "PATCH" => Method::Patch,
            "OPTIONS" => Method::Options,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
            Method::Other(s) => s,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed request head.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Request target as sent, including any query string
    pub target: String,
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Target with the query string and fragment removed.
    pub fn path(&self) -> &str {
        self.target
            .split(['?', '#'])
            .next()
            .unwrap_or(&self.target)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Read a request head from `reader`.
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Self, HttpError> {
        let mut budget = MAX_HEAD_BYTES;

        let request_line = read_line(reader, &mut budget)?.ok_or(HttpError::Empty)?;
        let mut parts = request_line.split_whitespace();
        let (method, target, version) = match (parts.next(), parts.next(), parts.next()) {
            (Some(m), Some(t), Some(v)) if parts.next().is_none() => (m, t, v),
            _ => return Err(HttpError::BadRequestLine(request_line.clone())),
        };
        if !version.starts_with("HTTP/") || !target.starts_with('/') {
            return Err(HttpError::BadRequestLine(request_line.clone()));
        }
        let method = Method::parse(method);
        let target = target.to_string();

        let mut headers = Vec::new();
        loop {
            let line = read_line(reader, &mut budget)?.ok_or(HttpError::Empty)?;
            if line.is_empty() {
                break;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| HttpError::BadHeader(line.clone()))?;
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }

        Ok(Request {
            method,
            target,
            headers,
        })
    }
}

/// Read one CRLF- or LF-terminated line, charging its length to `budget`.
/// Returns `None` at EOF.
fn read_line<R: BufRead>(reader: &mut R, budget: &mut usize) -> Result<Option<String>, HttpError> {
    let mut buf = Vec::new();
    let n = reader
        .by_ref()
        .take(*budget as u64 + 1)
        .read_until(b'\n', &mut buf)?;
    if n == 0 {
        return Ok(None);
    }
    if n > *budget {
        return Err(HttpError::HeadTooLarge);
    }
    *budget -= n;
    if buf.last() != Some(&b'\n') {
        // EOF mid-line
        return Err(HttpError::Empty);
    }
    buf.pop();
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
            Status::InternalServerError => 500,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::InternalServerError => "Internal Server Error",
        }
    }
}

/// JSON body used for every non-200 API answer.
#[derive(Debug, Serialize)]
pub struct Message<'a> {
    pub message: &'a str,
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: Status,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: Status, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body,
        }
    }

    /// Serialize `value` as a JSON body. Falls back to a bare 500 if
    /// serialization itself fails.
    pub fn json<T: Serialize + ?Sized>(status: Status, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::new(status, "application/json", body),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response body");
                Self::new(
                    Status::InternalServerError,
                    "application/json",
                    br#"{"message":"Internal server error"}"#.to_vec(),
                )
            }
        }
    }

    /// `{"message": "..."}` with the given status.
    pub fn message(status: Status, message: &str) -> Self {
        Self::json(status, &Message { message })
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Write status line, headers and (unless `include_body` is false, as for
    /// `HEAD`) the body. `Content-Length` always reflects the full body.
    pub fn write_to<W: Write>(&self, writer: &mut W, include_body: bool) -> io::Result<()> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\n",
            self.status.code(),
            self.status.reason()
        );
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n",
            self.body.len()
        ));
        writer.write_all(head.as_bytes())?;
        if include_body {
            writer.write_all(&self.body)?;
        }
        writer.flush()
    }
}

//! What handlers hand back.
//!
//! Handlers rarely build a [`Response`] by hand. They return a [`Json`] value,
//! a `(Status, body)` pair, or a `Result` whose arms both implement
//! [`IntoResponse`], and the dispatcher converts at the edge.

use bytes::Bytes;
use http_body_util::Full;
use serde::Serialize;
use tracing::warn;

use crate::status::Status;

const CONTENT_TYPE: &str = "content-type";
const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

// ── Response ─────────────────────────────────────────────────────────────────

/// A fully buffered response: status, headers in insertion order, body.
///
/// ```rust
/// use persona::{Response, Status};
///
/// let plain = Response::text("hello");
/// let empty = Response::status(Status::NoContent);
/// let made = Response::builder()
///     .status(Status::Created)
///     .header("location", "/person/42")
///     .json(br#"{"id":42}"#.to_vec());
/// assert_eq!(made.header("Location"), Some("/person/42"));
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: u16,
}

impl Response {
    /// `200` with an already-encoded JSON body.
    pub fn json(body: Vec<u8>) -> Self {
        Self::with_content_type(JSON, body)
    }

    /// `200` with a UTF-8 text body.
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_content_type(TEXT, body.into().into_bytes())
    }

    /// Bare status line, empty body.
    pub fn status(code: Status) -> Self {
        Self { body: Vec::new(), headers: Vec::new(), status: code.into() }
    }

    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { status: Status::Ok, extra: Vec::new() }
    }

    pub fn status_code(&self) -> u16 { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    /// First header called `name`, compared without case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find_map(|(k, v)| k.eq_ignore_ascii_case(name).then_some(v.as_str()))
    }

    /// Appends a header to an already-built response.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    fn with_content_type(content_type: &str, body: Vec<u8>) -> Self {
        Self { body, headers: vec![(CONTENT_TYPE.to_owned(), content_type.to_owned())], status: 200 }
    }

    /// Converts into the hyper response type. Headers that are not valid HTTP
    /// are dropped with a warning rather than failing the whole response.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            match (
                http::HeaderName::from_bytes(name.as_bytes()),
                http::HeaderValue::from_str(value),
            ) {
                (Ok(n), Ok(v)) => builder = builder.header(n, v),
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }
        builder.body(Full::new(Bytes::from(self.body))).unwrap_or_else(|e| {
            warn!("response build failed: {e}");
            let mut fallback = http::Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// For responses that need a non-200 status or extra headers. The body call
/// ends the chain; `content-type` always comes first in the header list.
pub struct ResponseBuilder {
    status: Status,
    extra: Vec<(String, String)>,
}

impl ResponseBuilder {
    pub fn status(self, status: Status) -> Self {
        Self { status, ..self }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.extra.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish(JSON, body)
    }

    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(TEXT, body.into().into_bytes())
    }

    fn finish(self, content_type: &str, body: Vec<u8>) -> Response {
        let mut res = Response::with_content_type(content_type, body);
        res.status = self.status.into();
        res.headers.extend(self.extra);
        res
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Anything a handler may return.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}

/// `(Status::Created, Json(out))` keeps the body and headers of `out`.
impl<T: IntoResponse> IntoResponse for (Status, T) {
    fn into_response(self) -> Response {
        let mut res = self.1.into_response();
        res.status = self.0.into();
        res
    }
}

impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(v)  => v.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

// ── Json ─────────────────────────────────────────────────────────────────────

/// Typed JSON response body.
///
/// ```rust
/// use persona::Json;
/// use serde_json::json;
///
/// async fn home(_req: persona::Request) -> Json<serde_json::Value> {
///     Json(json!({ "Hello": "World!" }))
/// }
/// ```
#[derive(Debug)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(bytes) => Response::json(bytes),
            Err(e) => {
                warn!("response serialization failed: {e}");
                Response::status(Status::InternalServerError)
            }
        }
    }
}

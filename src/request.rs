//! Incoming HTTP request type.
//!
//! The server buffers the whole body before the handler runs, so every
//! accessor here is synchronous. Decoding helpers report failures as
//! [`ValidationErrors`] on the `body` location so handlers can fold them into
//! the same `422` as field-level violations.

use std::collections::HashMap;

use bytes::Bytes;
use http::HeaderMap;
use serde_json::Value;

use crate::method::Method;
use crate::multipart::{MultipartConfig, MultipartParser, Part, parse_boundary};
use crate::query::FormData;
use crate::validation::ValidationErrors;

/// An incoming HTTP request with its body already collected.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        query: String,
        headers: HeaderMap,
        body: Bytes,
        params: HashMap<String, String>,
    ) -> Self {
        Self { method, path, query, headers, body, params }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query_string(&self) -> &str { &self.query }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Values that are not visible ASCII are
    /// treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The media type of the body, without parameters, e.g. `application/json`.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
            .map(|ct| ct.split(';').next().unwrap_or("").trim())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/person/{person_id}`, `req.param("person_id")` on
    /// `/person/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The decoded query string.
    pub fn query(&self) -> FormData {
        FormData::parse(&self.query)
    }

    /// Value of the named cookie across every `Cookie` header.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all("cookie")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.trim_matches('"').to_owned())
    }

    /// Parses the body as JSON. An empty body is a missing `body`.
    pub fn json(&self) -> Result<Value, ValidationErrors> {
        if self.body.is_empty() {
            return Err(ValidationErrors::single("body", "field required"));
        }
        serde_json::from_slice(&self.body)
            .map_err(|e| ValidationErrors::single("body", format!("invalid JSON: {e}")))
    }

    /// Decodes a form body: URL-encoded, or the plain (non-file) fields of a
    /// multipart body. A request without a content type is read as
    /// URL-encoded so missing fields surface individually.
    pub fn form(&self) -> Result<FormData, ValidationErrors> {
        match self.content_type() {
            None | Some("application/x-www-form-urlencoded") => {
                Ok(FormData::parse(&String::from_utf8_lossy(&self.body)))
            }
            Some(ct) if ct.eq_ignore_ascii_case("multipart/form-data") => {
                let mut form = FormData::default();
                for part in self.multipart()?.into_iter().filter(|p| !p.is_file()) {
                    let value = String::from_utf8_lossy(&part.data).into_owned();
                    form.push(part.name, value);
                }
                Ok(form)
            }
            Some(ct) => Err(ValidationErrors::single(
                "body",
                format!("unsupported content type `{ct}` for form data"),
            )),
        }
    }

    /// Parses a `multipart/form-data` body with the default limits.
    pub fn multipart(&self) -> Result<Vec<Part>, ValidationErrors> {
        self.multipart_with(MultipartConfig::default())
    }

    pub fn multipart_with(&self, config: MultipartConfig) -> Result<Vec<Part>, ValidationErrors> {
        let boundary = self
            .header("content-type")
            .ok_or_else(|| ValidationErrors::single("body", "field required"))
            .and_then(|ct| {
                parse_boundary(ct).map_err(|e| ValidationErrors::single("body", e.to_string()))
            })?;
        MultipartParser::new(&boundary, config)
            .parse(&self.body)
            .map_err(|e| ValidationErrors::single("body", e.to_string()))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::request;
    use super::*;

    #[test]
    fn cookies_across_headers() {
        let req = request(
            Method::Post,
            "/contact",
            &[("cookie", "a=1; ads=yes"), ("cookie", "b=\"q\"")],
            Bytes::new(),
        );
        assert_eq!(req.cookie("ads").as_deref(), Some("yes"));
        assert_eq!(req.cookie("b").as_deref(), Some("q"));
        assert_eq!(req.cookie("missing"), None);
    }

    #[test]
    fn content_type_drops_parameters() {
        let req = request(
            Method::Post,
            "/",
            &[("Content-Type", "application/json; charset=utf-8")],
            Bytes::new(),
        );
        assert_eq!(req.content_type(), Some("application/json"));
    }

    #[test]
    fn json_errors_are_body_validation_errors() {
        let empty = request(Method::Post, "/", &[], Bytes::new());
        assert_eq!(empty.json().unwrap_err(), ValidationErrors::single("body", "field required"));

        let broken = request(Method::Post, "/", &[], "{nope");
        let err = broken.json().unwrap_err();
        assert!(err.iter().all(|e| e.field == "body" && e.message.starts_with("invalid JSON")));
    }

    #[test]
    fn form_reads_urlencoded_and_multipart_fields() {
        let urlencoded = request(
            Method::Post,
            "/login",
            &[("content-type", "application/x-www-form-urlencoded")],
            "username=ana&password=s3cret%21",
        );
        let form = urlencoded.form().unwrap();
        assert_eq!(form.get("password"), Some("s3cret!"));

        let multipart = request(
            Method::Post,
            "/login",
            &[("content-type", "multipart/form-data; boundary=b")],
            "--b\r\nContent-Disposition: form-data; name=\"username\"\r\n\r\nana\r\n--b--\r\n",
        );
        assert_eq!(multipart.form().unwrap().get("username"), Some("ana"));
    }

    #[test]
    fn form_rejects_json_bodies() {
        let req = request(Method::Post, "/login", &[("content-type", "application/json")], "{}");
        assert!(req.form().is_err());
    }

    #[test]
    fn query_is_decoded() {
        let req = request(Method::Get, "/person/detail?name=Ana+Mar%C3%ADa&age=30", &[], Bytes::new());
        assert_eq!(req.path(), "/person/detail");
        assert_eq!(req.query().get("name"), Some("Ana María"));
    }
}

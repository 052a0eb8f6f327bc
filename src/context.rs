//! Per-request transport context.
//!
//! [`RequestContext`] is the one value a canonical handler receives: the
//! parsed request on the way in, and the response slot the renderer (or the
//! handler itself) fills on the way out. The routing engine constructs one
//! per request, hands it to the canonical handler, and drains the response
//! with [`RequestContext::take_response`] afterwards.

use std::sync::Arc;

use anyhow::anyhow;
use http::Method;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use tracing::debug;

use crate::ids::RequestId;

/// Maximum inline path/query/form parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated parameter storage for the request hot path.
///
/// Names use `Arc<str>` because parameter names repeat across requests while
/// values are per-request data.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Stack-allocated header storage for the request hot path.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Response data accumulated on the context: status, headers, body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseParts {
    pub status: u16,
    pub headers: HeaderVec,
    pub body: Vec<u8>,
}

impl ResponseParts {
    #[must_use]
    pub fn new(status: u16, content_type: &'static str, body: Vec<u8>) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), content_type.to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Get a response header by name (case-insensitive).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Response body interpreted as UTF-8.
    #[must_use]
    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or("")
    }

    /// Response body parsed as JSON.
    #[must_use]
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

/// Per-request transport context handed to canonical handlers.
///
/// Request data is parsed once at construction; the response slot starts
/// empty and [`written`](RequestContext::written) reports whether anything
/// has claimed it yet.
#[derive(Debug)]
pub struct RequestContext {
    /// Unique request ID for tracing and correlation.
    pub request_id: RequestId,
    /// HTTP method.
    pub method: Method,
    /// Request path without the query string.
    pub path: String,
    /// Path parameters extracted by the routing engine.
    pub path_params: ParamVec,
    /// Parsed query string parameters.
    pub query_params: ParamVec,
    /// HTTP headers.
    pub headers: HeaderVec,
    body: Option<Value>,
    body_error: Option<String>,
    form_params: ParamVec,
    response: Option<ResponseParts>,
}

/// Parse query string parameters from a request target.
#[must_use]
pub fn parse_query_params(target: &str) -> ParamVec {
    match target.find('?') {
        Some(pos) => url::form_urlencoded::parse(target[pos + 1..].as_bytes())
            .map(|(k, v)| (Arc::from(k.as_ref()), v.to_string()))
            .collect(),
        None => ParamVec::new(),
    }
}

/// Coerce a string parameter into the JSON scalar its literal form suggests.
///
/// Query and form sources carry only strings; bool/integer/float literals
/// become typed scalars so they can deserialize into typed struct fields,
/// everything else stays a string.
fn coerce_param_value(raw: &str) -> Value {
    if let Ok(b) = raw.parse::<bool>() {
        return Value::Bool(b);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    Value::String(raw.to_string())
}

fn object_from_pairs(pairs: &ParamVec) -> Value {
    let mut map = Map::new();
    for (name, value) in pairs {
        map.insert(name.to_string(), coerce_param_value(value));
    }
    Value::Object(map)
}

impl RequestContext {
    /// Parse an incoming request into a context.
    ///
    /// `target` is the request target including any query string. The body,
    /// when present, is decoded according to its `content-type`: JSON bodies
    /// are parsed eagerly, form bodies into form parameters; anything else is
    /// ignored by the binding machinery.
    #[must_use]
    pub fn new(method: Method, target: &str, headers: HeaderVec, body: Option<&[u8]>) -> Self {
        let path = target.split('?').next().unwrap_or("/").to_string();
        let query_params = parse_query_params(target);

        let request_id = RequestId::from_header_or_new(
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("x-request-id"))
                .map(|(_, v)| v.as_str()),
        );

        let content_type = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.split(';').next().unwrap_or("").trim().to_string())
            .unwrap_or_default();

        let mut parsed_body = None;
        let mut body_error = None;
        let mut form_params = ParamVec::new();
        if let Some(bytes) = body.filter(|b| !b.is_empty()) {
            match content_type.as_str() {
                "application/json" => match serde_json::from_slice::<Value>(bytes) {
                    Ok(value) => parsed_body = Some(value),
                    Err(err) => body_error = Some(err.to_string()),
                },
                "application/x-www-form-urlencoded" => {
                    form_params = url::form_urlencoded::parse(bytes)
                        .map(|(k, v)| (Arc::from(k.as_ref()), v.to_string()))
                        .collect();
                }
                _ => {}
            }
        }

        debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            query_count = query_params.len(),
            has_body = parsed_body.is_some(),
            "request parsed"
        );

        Self {
            request_id,
            method,
            path,
            path_params: ParamVec::new(),
            query_params,
            headers,
            body: parsed_body,
            body_error,
            form_params,
            response: None,
        }
    }

    /// Get a path parameter by name (last write wins on duplicates).
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name (last write wins on duplicates).
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parsed JSON body, if the request carried one.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Default structural bind: content-negotiated deserialization of the
    /// request data into `T`.
    ///
    /// Source selection: the JSON body when one was sent, else form fields,
    /// else query parameters. String-pair sources coerce scalar literals
    /// before deserializing; missing required fields and type mismatches
    /// surface as errors.
    pub fn bind_into<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        if let Some(err) = &self.body_error {
            return Err(anyhow!("invalid request body: {err}"));
        }
        let source = match &self.body {
            Some(value) => value.clone(),
            None if !self.form_params.is_empty() => object_from_pairs(&self.form_params),
            None => object_from_pairs(&self.query_params),
        };
        serde_json::from_value(source).map_err(|err| anyhow!("{err}"))
    }

    /// Has a response already been written?
    #[inline]
    #[must_use]
    pub fn written(&self) -> bool {
        self.response.is_some()
    }

    /// Write a JSON response.
    pub fn write_json(&mut self, status: u16, body: &Value) {
        self.response = Some(ResponseParts::new(
            status,
            "application/json",
            body.to_string().into_bytes(),
        ));
    }

    /// Write a plain-text response.
    pub fn write_text(&mut self, status: u16, body: &str) {
        self.response = Some(ResponseParts::new(
            status,
            "text/plain",
            body.as_bytes().to_vec(),
        ));
    }

    /// Write a payload value: strings go out raw as `text/plain`, any other
    /// value as JSON.
    pub fn write_payload(&mut self, status: u16, body: Value) {
        match body {
            Value::String(s) => self.write_text(status, &s),
            other => self.write_json(status, &other),
        }
    }

    /// Add or replace a header on the pending response.
    pub fn set_header(&mut self, name: &str, value: String) {
        if let Some(response) = &mut self.response {
            response.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
            response.headers.push((Arc::from(name), value));
        }
    }

    /// The pending response, if any.
    #[must_use]
    pub fn response(&self) -> Option<&ResponseParts> {
        self.response.as_ref()
    }

    /// Drain the response for the engine to put on the wire.
    #[must_use]
    pub fn take_response(&mut self) -> Option<ResponseParts> {
        self.response.take()
    }
}

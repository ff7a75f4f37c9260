//! Request abstraction consumed by fields and processors.

use indexmap::IndexMap;

use crate::upload::UploadedFile;

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
}

impl Method {
    /// Parses a method from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }

    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The inbound request as seen by a form.
///
/// Host frameworks implement this for their own request type. [`Request`]
/// is a plain in-memory implementation.
pub trait FormRequest {
    /// Method of the request.
    fn method(&self) -> Method;

    /// Value of a body parameter.
    fn post(&self, key: &str) -> Option<&str>;

    /// Value of a query string parameter.
    fn query(&self, key: &str) -> Option<&str>;

    /// Uploaded files keyed by field name.
    fn files(&self) -> &IndexMap<String, UploadedFile>;

    /// Uploaded file of a single field.
    fn file(&self, key: &str) -> Option<&UploadedFile> {
        self.files().get(key)
    }
}

/// An in-memory request.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Query string parameters.
    pub query: IndexMap<String, String>,
    /// Decoded body parameters.
    pub post: IndexMap<String, String>,
    /// Uploaded files keyed by field name.
    pub files: IndexMap<String, UploadedFile>,
}

impl Request {
    /// Creates a new request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: IndexMap::new(),
            post: IndexMap::new(),
            files: IndexMap::new(),
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Sets a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Sets a body parameter.
    #[must_use]
    pub fn form_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.post.insert(key.into(), value.into());
        self
    }

    /// Replaces the body parameters with a decoded urlencoded body.
    #[must_use]
    pub fn urlencoded_body(mut self, body: &str) -> Self {
        self.post = Self::parse_query_string(body);
        self
    }

    /// Adds an uploaded file.
    #[must_use]
    pub fn file(mut self, key: impl Into<String>, file: UploadedFile) -> Self {
        self.files.insert(key.into(), file);
        self
    }

    /// Parses `application/x-www-form-urlencoded` pairs.
    ///
    /// Later occurrences of a key win.
    pub fn parse_query_string(query: &str) -> IndexMap<String, String> {
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let mut parts = pair.splitn(2, '=');
                let key = parts.next()?;
                let value = parts.next().unwrap_or("");
                Some((urlencoding_decode(key), urlencoding_decode(value)))
            })
            .collect()
    }
}

impl FormRequest for Request {
    fn method(&self) -> Method {
        self.method
    }

    fn post(&self, key: &str) -> Option<&str> {
        self.post.get(key).map(String::as_str)
    }

    fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    fn files(&self) -> &IndexMap<String, UploadedFile> {
        &self.files
    }
}

/// Percent-decodes a urlencoded component as UTF-8.
fn urlencoding_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let decoded = bytes
                    .get(i + 1..i + 3)
                    .and_then(|hex| std::str::from_utf8(hex).ok())
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(byte) = decoded {
                    out.push(byte);
                    i += 3;
                    continue;
                }
                out.push(b'%');
            }
            b'+' => out.push(b' '),
            other => out.push(other),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

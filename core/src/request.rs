use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::HeaderValue;
use http::Method;

use crate::{Error, Result};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Signing context for request.
///
/// The request is kept as plain key/value lists until it is turned into an
/// [`http::Request`], so the signer can see exactly the bytes the server will
/// use to verify the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP path, for example `/api/application/view`.
    pub path: String,
    /// Query parameters, in the order they are sent.
    pub query: Vec<(String, String)>,
    /// Form encoded body arguments.
    pub form: Vec<(String, String)>,
}

impl SigningRequest {
    /// Create a new `POST` signing request for the given path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            form: Vec::new(),
        }
    }

    /// Push a new query pair into query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Get the first query value with the given key.
    pub fn query_get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove all query pairs with the given key.
    pub fn query_remove(&mut self, key: &str) {
        self.query.retain(|(k, _)| k != key);
    }

    /// Push a new form argument.
    #[inline]
    pub fn form_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.form.push((key.into(), value.into()));
    }

    /// Convert pairs into a sorted, form urlencoded string.
    ///
    /// ```shell
    /// [(b, "x y"), (a, 1)] => "a=1&b=x+y"
    /// ```
    pub fn pairs_to_sorted_string(mut pairs: Vec<(String, String)>) -> String {
        pairs.sort();

        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    }

    /// Convert pairs into a form urlencoded string, keeping their order.
    pub fn pairs_to_string(pairs: &[(String, String)]) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    }

    /// Build the canonical string for the current query and form.
    ///
    /// ```text
    /// path + "?" + sorted(query) + "&" + sorted(form)
    /// ```
    ///
    /// The separator is always present, even when the form is empty.
    pub fn string_to_sign(&self) -> String {
        let query = Self::pairs_to_sorted_string(self.query.clone());
        let form = Self::pairs_to_sorted_string(self.form.clone());

        let mut s = String::with_capacity(self.path.len() + query.len() + form.len() + 2);
        s.push_str(&self.path);
        s.push('?');
        s.push_str(&query);
        s.push('&');
        s.push_str(&form);
        s
    }

    /// Encoded query string in send order.
    pub fn query_string(&self) -> String {
        Self::pairs_to_string(&self.query)
    }

    /// Encoded form body.
    pub fn form_string(&self) -> String {
        Self::pairs_to_string(&self.form)
    }

    /// Build the [`http::Request`] against `endpoint`, for example `http://api.example.com`.
    pub fn to_http_request(&self, endpoint: &str) -> Result<http::Request<Bytes>> {
        let endpoint = endpoint.trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(Error::config_invalid("endpoint must not be empty"));
        }

        let mut uri = format!("{endpoint}{}", self.path);
        if !self.query.is_empty() {
            uri.push('?');
            uri.push_str(&self.query_string());
        }

        let req = http::Request::builder()
            .method(self.method.clone())
            .uri(uri)
            .header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
            .body(Bytes::from(self.form_string()))?;

        Ok(req)
    }
}

//! Request construction.
//!
//! A [`PreparedRequest`] is a fully resolved, immutable request value. It can
//! be sent any number of times, which is what the retry loops rely on.

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use url::{form_urlencoded, Url};

use crate::error::{Error, Result};

/// Optional request parts supplied by a caller.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    /// Form fields, sent url-encoded in the body.
    pub data: Option<Vec<(String, String)>>,
    /// Query parameters appended to the URL.
    pub params: Vec<(String, String)>,
    /// Cookies for this request only, merged over the session's cookies.
    pub cookies: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn form(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.data
            .get_or_insert_with(Vec::new)
            .push((name.into(), value.into()));
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }
}

/// A request ready to be sent.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl PreparedRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Creates a reqwest builder for one attempt.
    pub(crate) fn to_builder(&self, client: &Client) -> RequestBuilder {
        let builder = client
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone());

        match &self.body {
            Some(body) => builder.body(body.clone()),
            None => builder,
        }
    }
}

/// Builds a request from its parts.
///
/// Caller headers are merged over `defaults`; on a name collision the caller
/// wins. `jar_cookies` is the session's `Cookie` header for this URL and is
/// only consulted when the caller passes cookies of its own, because reqwest
/// skips the jar once a request carries an explicit `Cookie` header.
pub fn build_request(
    defaults: &HeaderMap,
    jar_cookies: Option<&str>,
    method: Method,
    url: &str,
    options: &RequestOptions,
) -> Result<PreparedRequest> {
    let mut url = Url::parse(url)?;
    if !options.params.is_empty() {
        url.query_pairs_mut().extend_pairs(&options.params);
    }

    let mut headers = defaults.clone();
    for (name, value) in &options.headers {
        headers.insert(parse_header_name(name)?, parse_header_value(name, value)?);
    }

    let body = options.data.as_ref().map(|fields| {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish()
            .into_bytes()
    });
    if body.is_some() && !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
    }

    if !options.cookies.is_empty() {
        let cookie = merge_cookies(jar_cookies, &options.cookies);
        headers.insert(header::COOKIE, parse_header_value("Cookie", &cookie)?);
    }

    Ok(PreparedRequest {
        method,
        url,
        headers,
        body,
    })
}

/// Converts a name/value map into a header map.
pub fn header_map<'a, I>(pairs: I) -> Result<HeaderMap>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        headers.insert(parse_header_name(name)?, parse_header_value(name, value)?);
    }
    Ok(headers)
}

fn parse_header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| Error::InvalidHeader(format!("invalid header name '{}'", name)))
}

fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| Error::InvalidHeader(format!("invalid value for header '{}'", name)))
}

/// Merges request cookies over a `Cookie` header, keeping first-seen order.
fn merge_cookies(existing: Option<&str>, overrides: &[(String, String)]) -> String {
    let mut merged: Vec<(String, String)> = existing
        .unwrap_or("")
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            Some((name.to_string(), value.to_string()))
        })
        .collect();

    for (name, value) in overrides {
        match merged.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.clone(),
            None => merged.push((name.clone(), value.clone())),
        }
    }

    merged
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

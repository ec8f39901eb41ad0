//! Shared HTTP session.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::http::request::{build_request, header_map, PreparedRequest, RequestOptions};
use crate::http::retry::RetryPolicy;
use crate::http::transport::{Response, Transport};

/// Cookie jar, default headers and transport shared by every extractor and
/// the download engine.
///
/// Cloning is cheap and every clone sees the same cookie jar, so a cookie
/// set through one handle is sent by all later requests from any other.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    jar: Arc<Jar>,
    default_headers: HeaderMap,
    transport: Transport,
    cancel: CancellationToken,
}

impl Session {
    /// Create a session with default network settings.
    pub fn new() -> Result<Self> {
        Self::from_config(&NetworkConfig::default(), CancellationToken::new())
    }

    /// Create a session from network settings.
    pub fn from_config(network: &NetworkConfig, cancel: CancellationToken) -> Result<Self> {
        let jar = Arc::new(Jar::default());

        let mut builder = Client::builder()
            .user_agent(&network.user_agent)
            .cookie_provider(Arc::clone(&jar))
            .connect_timeout(network.connect_timeout());
        if let Some(timeout) = network.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            inner: Arc::new(SessionInner {
                jar,
                default_headers: header_map(&network.headers)?,
                transport: Transport::new(client, network.request_policy(), cancel.clone()),
                cancel,
            }),
        })
    }

    /// Headers merged into every request.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.inner.default_headers
    }

    pub fn request_policy(&self) -> &RetryPolicy {
        self.inner.transport.policy()
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.inner.cancel
    }

    /// Store a cookie for `domain` and its subdomains.
    ///
    /// IP-address domains get a host-only cookie.
    pub fn set_cookie(&self, name: &str, value: &str, domain: &str) -> Result<()> {
        let host = domain.trim_start_matches('.');
        let url = Url::parse(&format!("https://{}/", host))?;

        let cookie = if host.parse::<IpAddr>().is_ok() {
            format!("{}={}; Path=/", name, value)
        } else {
            format!("{}={}; Domain={}; Path=/", name, value, host)
        };

        tracing::debug!("Setting cookie '{}' for {}", name, host);
        self.inner.jar.add_cookie_str(&cookie, &url);
        Ok(())
    }

    /// The `Cookie` header the jar would send to `url`.
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        self.inner
            .jar
            .cookies(url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// Build a request with this session's default headers and cookies.
    pub fn build(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
    ) -> Result<PreparedRequest> {
        let jar_cookies = if options.cookies.is_empty() {
            None
        } else {
            self.cookie_header(&Url::parse(url)?)
        };

        build_request(
            &self.inner.default_headers,
            jar_cookies.as_deref(),
            method,
            url,
            options,
        )
    }

    /// Send a prepared request through the retrying transport.
    pub async fn send(&self, request: &PreparedRequest) -> Result<Response> {
        self.inner.transport.send(request, None).await
    }

    /// Like [`Session::send`], bounded by an enclosing retry deadline.
    pub async fn send_until(
        &self,
        request: &PreparedRequest,
        deadline: Option<Instant>,
    ) -> Result<Response> {
        self.inner.transport.send(request, deadline).await
    }

    /// Fetch a page: GET, or POST when form data is supplied.
    pub async fn request(&self, url: &str, options: RequestOptions) -> Result<Response> {
        let method = if options.data.is_some() {
            Method::POST
        } else {
            Method::GET
        };
        let request = self.build(method, url, &options)?;
        self.send(&request).await
    }

    /// Fetch a page and return its body, failing on an invalid response.
    pub async fn get_text(&self, url: &str, options: RequestOptions) -> Result<String> {
        let response = self.request(url, options).await?;
        if response.is_invalid() {
            return Err(Error::extraction(
                url,
                format!("HTTP {}", response.status()),
            ));
        }
        response.text().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_visible_to_subdomains() {
        let session = Session::new().unwrap();
        session.set_cookie("session", "abc", "bunkr.is").unwrap();

        let cdn = Url::parse("https://cdn3.bunkr.is/file.jpg").unwrap();
        assert_eq!(session.cookie_header(&cdn).as_deref(), Some("session=abc"));

        let other = Url::parse("https://example.com/").unwrap();
        assert_eq!(session.cookie_header(&other), None);
    }

    #[test]
    fn test_cookie_shared_between_clones() {
        let session = Session::new().unwrap();
        let clone = session.clone();
        clone.set_cookie("token", "xyz", "127.0.0.1").unwrap();

        let url = Url::parse("http://127.0.0.1:8080/page").unwrap();
        assert_eq!(session.cookie_header(&url).as_deref(), Some("token=xyz"));
    }

    #[test]
    fn test_build_merges_jar_and_request_cookies() {
        let session = Session::new().unwrap();
        session.set_cookie("token", "old", "example.com").unwrap();

        let options = RequestOptions::new().cookie("lang", "en");
        let request = session
            .build(Method::GET, "https://example.com/page", &options)
            .unwrap();

        assert_eq!(
            request.headers()[reqwest::header::COOKIE],
            "token=old; lang=en"
        );
    }

    #[test]
    fn test_default_headers_from_config() {
        let session = Session::new().unwrap();
        assert!(session.default_headers().contains_key("accept-language"));
    }
}

//! HTTP request construction and execution.
//!
//! [`ServiceClient`] is the single place where requests are built and
//! responses are read. Each call performs exactly one round trip: there is
//! no retry, no queuing and no background work. Timeouts, redirects and
//! authentication belong to the wrapped [`reqwest::Client`].

use crate::config::ClientConfig;
use crate::error::{check_response, Error, Result};
use crate::response::{Rate, Response};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, Request};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.digitalocean.com/";

/// Default `User-Agent` header value
pub const DEFAULT_USER_AGENT: &str = concat!("godo/", env!("CARGO_PKG_VERSION"));

/// Media type of request and response bodies
pub const MEDIA_TYPE: &str = "application/json";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Default idle timeout for connection pools in seconds
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Builder for [`ServiceClient`].
#[derive(Debug)]
pub struct ServiceClientBuilder {
    base_url: String,
    user_agent: String,
    token: Option<SecretString>,
    timeout: Duration,
    pool_idle_timeout: Duration,
    pool_max_idle_per_host: usize,
    http: Option<reqwest::Client>,
}

impl ServiceClientBuilder {
    /// Create a builder targeting the default endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            http: None,
        }
    }

    /// Create a builder from a validated [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration fails validation.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.check()?;

        let mut builder = Self::new()
            .with_base_url(config.base_url.clone())
            .with_user_agent(config.user_agent.clone())
            .with_timeout(config.timeout());
        builder.pool_idle_timeout = Duration::from_secs(config.pool_idle_timeout_secs);
        builder.pool_max_idle_per_host = config.pool_max_idle_per_host;
        if let Some(token) = &config.token {
            builder = builder.with_token(token.clone());
        }
        Ok(builder)
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Authenticate with a personal access token.
    ///
    /// The token is installed on the built transport, not on individual
    /// requests.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Override the transport timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use an existing transport instead of building one.
    ///
    /// The transport is then responsible for timeouts and authentication.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for an unparseable base URL and
    /// [`Error::Config`] for an invalid user agent or token, or if the
    /// transport cannot be built.
    pub fn build(self) -> Result<ServiceClient> {
        let base_url = parse_base_url(&self.base_url)?;
        let user_agent_header = HeaderValue::from_str(&self.user_agent)
            .map_err(|err| Error::Config(format!("Invalid user agent: {err}")))?;

        let http = match self.http {
            Some(http) => {
                if self.token.is_some() {
                    warn!("token ignored: a custom HTTP client was supplied");
                }
                http
            }
            None => {
                let mut headers = HeaderMap::new();
                if let Some(token) = &self.token {
                    let mut value =
                        HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                            .map_err(|err| Error::Config(format!("Invalid token: {err}")))?;
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }

                reqwest::Client::builder()
                    .default_headers(headers)
                    .timeout(self.timeout)
                    .pool_idle_timeout(self.pool_idle_timeout)
                    .pool_max_idle_per_host(self.pool_max_idle_per_host)
                    .build()
                    .map_err(|err| {
                        Error::Config(format!("Failed to build HTTP client: {err}"))
                    })?
            }
        };

        debug!(base_url = %base_url, "built API client");

        Ok(ServiceClient {
            http,
            base_url,
            user_agent: self.user_agent,
            user_agent_header,
            rate: Arc::new(RwLock::new(Rate::default())),
        })
    }
}

impl Default for ServiceClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a base URL, appending the trailing `/` relative resolution needs.
pub(crate) fn parse_base_url(input: &str) -> Result<Url> {
    let mut url = Url::parse(input)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Shared transport for every resource service.
///
/// Cloning is cheap; clones share the transport and the rate snapshot. The
/// snapshot sits behind a lock, so one client may be used from several tasks.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    base_url: Url,
    user_agent: String,
    user_agent_header: HeaderValue,
    rate: Arc<RwLock<Rate>>,
}

impl ServiceClient {
    /// Create a client for the default endpoint with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be built.
    pub fn new() -> Result<Self> {
        ServiceClientBuilder::new().build()
    }

    /// Start a builder.
    #[must_use]
    pub fn builder() -> ServiceClientBuilder {
        ServiceClientBuilder::new()
    }

    /// Return the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Point the client at another base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `base_url` cannot be parsed.
    pub fn set_base_url(&mut self, base_url: &str) -> Result<()> {
        self.base_url = parse_base_url(base_url)?;
        Ok(())
    }

    /// Return the configured `User-Agent` value.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Return the last-observed rate snapshot.
    #[must_use]
    pub fn rate(&self) -> Rate {
        match self.rate.read() {
            Ok(rate) => *rate,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn store_rate(&self, rate: Rate) {
        match self.rate.write() {
            Ok(mut current) => *current = rate,
            Err(poisoned) => *poisoned.into_inner() = rate,
        }
    }

    /// Build a request for `path`, resolved against the base URL.
    ///
    /// `path` may be relative (`v2/droplets`) or absolute. When a body is
    /// given it is encoded as JSON and `Content-Type` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `path` cannot be resolved and
    /// [`Error::Serialization`] if the body cannot be encoded.
    pub fn new_request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Request>
    where
        B: Serialize + ?Sized,
    {
        let url = self.base_url.join(path)?;
        let mut request = Request::new(method, url);

        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(Error::Serialization)?;
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE));
            *request.body_mut() = Some(bytes.into());
        }
        request
            .headers_mut()
            .insert(USER_AGENT, self.user_agent_header.clone());

        debug!(method = %request.method(), url = %request.url(), "built API request");
        Ok(request)
    }

    /// Send `request` and decode a success body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the round trip fails, [`Error::Api`]
    /// for a status outside `200..300`, and [`Error::Decoding`] if a success
    /// body is not valid JSON for `T`.
    pub async fn execute<T>(&self, request: Request) -> Result<(T, Response)>
    where
        T: DeserializeOwned,
    {
        let (response, body) = self.round_trip(request).await?;
        let value = serde_json::from_slice(&body).map_err(Error::Decoding)?;
        Ok((value, response))
    }

    /// Send `request` and discard the body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the round trip fails and
    /// [`Error::Api`] for a status outside `200..300`.
    pub async fn execute_discard(&self, request: Request) -> Result<Response> {
        let (response, _) = self.round_trip(request).await?;
        Ok(response)
    }

    async fn round_trip(&self, request: Request) -> Result<(Response, Bytes)> {
        let method = request.method().clone();
        let raw = self.http.execute(request).await?;

        let status = raw.status();
        let url = raw.url().clone();
        let headers = raw.headers().clone();

        // Read the body to the end on every path so the connection can be reused.
        let body = raw.bytes().await;

        let response = Response::new(method, url, status, headers);
        debug!(
            method = %response.method(),
            url = %response.url(),
            status = status.as_u16(),
            "received API response"
        );
        if let Some(rate) = response.rate() {
            self.store_rate(rate);
        }

        let body = if status.is_success() {
            body?
        } else {
            body.unwrap_or_default()
        };

        let response = check_response(response, &body)?;
        Ok((response, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ServiceClient {
        ServiceClient::builder()
            .with_base_url(server.uri())
            .build()
            .unwrap()
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Foo {
        #[serde(rename = "A")]
        a: String,
    }

    #[test]
    fn new_client_defaults() {
        let client = ServiceClient::new().unwrap();
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(client.user_agent(), DEFAULT_USER_AGENT);
        assert_eq!(client.rate(), Rate::default());
    }

    #[test]
    fn builder_appends_trailing_slash() {
        let client = ServiceClient::builder()
            .with_base_url("https://api.example.com/v1")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.example.com/v1/");
    }

    #[test]
    fn builder_rejects_bad_base_url() {
        let err = ServiceClient::builder()
            .with_base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn new_request_resolves_relative_path() {
        let client = ServiceClient::builder()
            .with_base_url("https://api.example.com/")
            .build()
            .unwrap();

        let request = client.new_request::<()>(Method::GET, "foo", None).unwrap();
        assert_eq!(request.url().as_str(), "https://api.example.com/foo");

        let request = client.new_request::<()>(Method::GET, "/foo", None).unwrap();
        assert_eq!(request.url().as_str(), "https://api.example.com/foo");
    }

    #[test]
    fn new_request_encodes_body_and_headers() {
        let client = ServiceClient::new().unwrap();
        let body = json!({"name": "l", "ssh_keys": [1, "aa:bb"]});

        let request = client
            .new_request(Method::POST, "v2/droplets", Some(&body))
            .unwrap();

        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap();
        let decoded: serde_json::Value = serde_json::from_slice(bytes).unwrap();
        assert_eq!(decoded, json!({"name": "l", "ssh_keys": [1, "aa:bb"]}));
        assert_eq!(request.headers()[CONTENT_TYPE], MEDIA_TYPE);
        assert_eq!(request.headers()[USER_AGENT], DEFAULT_USER_AGENT);
    }

    #[test]
    fn new_request_rejects_unserializable_body() {
        #[derive(Serialize)]
        struct Bad {
            a: std::collections::BTreeMap<(u8, u8), String>,
        }

        let client = ServiceClient::new().unwrap();
        let body = Bad {
            a: [((1, 2), "x".to_string())].into_iter().collect(),
        };
        let err = client
            .new_request(Method::POST, "v2/droplets", Some(&body))
            .unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn new_request_without_body_has_no_content_type() {
        let client = ServiceClient::builder()
            .with_user_agent("custom/1.0")
            .build()
            .unwrap();

        let request = client.new_request::<()>(Method::GET, "v2/images", None).unwrap();
        assert!(request.body().is_none());
        assert!(request.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(request.headers()[USER_AGENT], "custom/1.0");
    }

    #[test]
    fn user_agent_getter_matches_sent_header() {
        let client = ServiceClient::builder()
            .with_user_agent("outil/1.0 (déploiement)")
            .build()
            .unwrap();

        let request = client.new_request::<()>(Method::GET, "v2/images", None).unwrap();
        assert_eq!(client.user_agent(), "outil/1.0 (déploiement)");
        assert_eq!(
            request.headers()[USER_AGENT].as_bytes(),
            client.user_agent().as_bytes()
        );
    }

    #[test]
    fn new_request_rejects_bad_url() {
        let client = ServiceClient::new().unwrap();
        let err = client
            .new_request::<()>(Method::GET, "http://[::1", None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn execute_decodes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"A":"a"}"#))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = client.new_request::<()>(Method::GET, "/", None).unwrap();
        let (body, response): (Foo, _) = client.execute(request).await.unwrap();

        assert_eq!(body, Foo { a: "a".into() });
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    #[tokio::test]
    async fn execute_reports_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Bad Request"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = client.new_request::<()>(Method::GET, "/", None).unwrap();
        let err = client.execute_discard(request).await.unwrap_err();

        assert_eq!(err.status(), Some(reqwest::StatusCode::BAD_REQUEST));
        assert!(err.to_string().starts_with("GET "));
        assert!(err.to_string().contains(": 400"));
    }

    #[tokio::test]
    async fn execute_reports_decoding_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = client.new_request::<()>(Method::GET, "/", None).unwrap();
        let err = client.execute::<Foo>(request).await.unwrap_err();

        assert!(matches!(err, Error::Decoding(_)));
    }

    #[tokio::test]
    async fn execute_passes_redirect_loop_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = client.new_request::<()>(Method::GET, "/", None).unwrap();
        let err = client.execute_discard(request).await.unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn execute_updates_rate_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/limited"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("RateLimit-Limit", "60")
                    .insert_header("RateLimit-Remaining", "59")
                    .insert_header("RateLimit-Reset", "1372700873"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/plain"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = test_client(&server);
        assert_eq!(client.rate(), Rate::default());

        let request = client.new_request::<()>(Method::GET, "limited", None).unwrap();
        client.execute_discard(request).await.unwrap();

        let expected = Rate {
            limit: 60,
            remaining: 59,
            reset: Some(Utc.with_ymd_and_hms(2013, 7, 1, 17, 47, 53).unwrap()),
        };
        assert_eq!(client.rate(), expected);

        let request = client.new_request::<()>(Method::GET, "plain", None).unwrap();
        client.execute_discard(request).await.unwrap();
        assert_eq!(client.rate(), expected);
    }

    #[tokio::test]
    async fn execute_updates_rate_snapshot_on_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(400)
                    .insert_header("RateLimit-Limit", "60")
                    .insert_header("RateLimit-Remaining", "59")
                    .insert_header("RateLimit-Reset", "1372700873"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = client.new_request::<()>(Method::GET, "/", None).unwrap();
        assert!(client.execute_discard(request).await.is_err());

        assert_eq!(client.rate().limit, 60);
        assert_eq!(client.rate().remaining, 59);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_clones_store_whole_snapshots() {
        let server = MockServer::start().await;
        for (route, limit, remaining, reset) in [
            ("/a", "60", "59", "1372700873"),
            ("/b", "5000", "1", "1372700900"),
        ] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header("RateLimit-Limit", limit)
                        .insert_header("RateLimit-Remaining", remaining)
                        .insert_header("RateLimit-Reset", reset),
                )
                .mount(&server)
                .await;
        }

        let client = test_client(&server);
        let mut tasks = Vec::new();
        for i in 0..20 {
            let client = client.clone();
            let route = if i % 2 == 0 { "a" } else { "b" };
            tasks.push(tokio::spawn(async move {
                let request = client.new_request::<()>(Method::GET, route, None).unwrap();
                client.execute_discard(request).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let a = Rate {
            limit: 60,
            remaining: 59,
            reset: Some(Utc.with_ymd_and_hms(2013, 7, 1, 17, 47, 53).unwrap()),
        };
        let b = Rate {
            limit: 5000,
            remaining: 1,
            reset: Some(Utc.with_ymd_and_hms(2013, 7, 1, 17, 48, 20).unwrap()),
        };
        let rate = client.rate();
        assert!(rate == a || rate == b, "torn snapshot: {rate:?}");
    }

    #[tokio::test]
    async fn token_is_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = ServiceClient::builder()
            .with_base_url(server.uri())
            .with_token("secret-token")
            .build()
            .unwrap();
        let request = client.new_request::<()>(Method::GET, "/", None).unwrap();
        let response = client.execute_discard(request).await.unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);
    }
}

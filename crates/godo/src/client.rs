//! API client and its builder.

use crate::actions::ActionsService;
use crate::droplet_actions::{DropletActionRequest, DropletActionsService};
use crate::droplets::{DropletCreateRequest, DropletsService};
use crate::image_actions::{ImageActionRequest, ImageActionsService};
use crate::images::ImagesService;
use crate::keys::{KeyCreateRequest, KeyUpdateRequest, KeysService};
use crate::regions::RegionsService;
use crate::sizes::SizesService;
use crate::Result;
use godo_core::client::{ServiceClient, ServiceClientBuilder};
use godo_core::config::ClientConfig;
use godo_core::{Error, Rate, Response};
use reqwest::{Method, Request};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Every payload the API accepts as a request body.
///
/// Variants borrow the caller's payload, so the value handed to a service is
/// exactly the value that gets serialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestBody<'a> {
    /// Create a droplet
    DropletCreate(&'a DropletCreateRequest),
    /// Run an action on a droplet
    DropletAction(&'a DropletActionRequest),
    /// Run an action on an image
    ImageAction(&'a ImageActionRequest),
    /// Register an SSH key
    KeyCreate(&'a KeyCreateRequest),
    /// Rename an SSH key
    KeyUpdate(&'a KeyUpdateRequest),
}

impl<'a> From<&'a DropletCreateRequest> for RequestBody<'a> {
    fn from(request: &'a DropletCreateRequest) -> Self {
        Self::DropletCreate(request)
    }
}

impl<'a> From<&'a DropletActionRequest> for RequestBody<'a> {
    fn from(request: &'a DropletActionRequest) -> Self {
        Self::DropletAction(request)
    }
}

impl<'a> From<&'a ImageActionRequest> for RequestBody<'a> {
    fn from(request: &'a ImageActionRequest) -> Self {
        Self::ImageAction(request)
    }
}

impl<'a> From<&'a KeyCreateRequest> for RequestBody<'a> {
    fn from(request: &'a KeyCreateRequest) -> Self {
        Self::KeyCreate(request)
    }
}

impl<'a> From<&'a KeyUpdateRequest> for RequestBody<'a> {
    fn from(request: &'a KeyUpdateRequest) -> Self {
        Self::KeyUpdate(request)
    }
}

/// Builder for [`Client`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    inner: ServiceClientBuilder,
}

impl ClientBuilder {
    /// Create a builder targeting the default endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: ServiceClientBuilder::new(),
        }
    }

    /// Create a builder from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            inner: ServiceClientBuilder::from_config(config)?,
        })
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.inner = self.inner.with_base_url(base_url);
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.inner = self.inner.with_user_agent(user_agent);
        self
    }

    /// Authenticate with a personal access token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.inner = self.inner.with_token(token);
        self
    }

    /// Override the transport timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.with_timeout(timeout);
        self
    }

    /// Use an existing, already-authenticating transport.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.inner = self.inner.with_http_client(http);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid base URL or user agent, or if the
    /// transport cannot be built.
    pub fn build(self) -> Result<Client> {
        Ok(Client {
            inner: self.inner.build()?,
        })
    }
}

/// DigitalOcean API client.
///
/// Resource services are borrowed from the client: `client.droplets()`,
/// `client.keys()` and so on. Clones share the transport and the rate
/// snapshot.
#[derive(Debug, Clone)]
pub struct Client {
    inner: ServiceClient,
}

impl Client {
    /// Construct a client for the default endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be built.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Construct a client authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value.
    pub fn with_token(token: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().with_token(token).build()
    }

    /// Start a builder.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Point the client at another base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` cannot be parsed.
    pub fn set_base_url(&mut self, base_url: &str) -> Result<()> {
        self.inner.set_base_url(base_url)
    }

    /// Return the configured `User-Agent` value.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        self.inner.user_agent()
    }

    /// Return the last-observed rate snapshot.
    #[must_use]
    pub fn rate(&self) -> Rate {
        self.inner.rate()
    }

    /// Build a request for `path`, resolved against the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be resolved or the body cannot be
    /// encoded.
    pub fn new_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&RequestBody<'_>>,
    ) -> Result<Request> {
        self.inner.new_request(method, path, body)
    }

    /// Send `request` and decode the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns transport, API and decoding errors as described on
    /// [`ServiceClient::execute`].
    pub async fn execute<T>(&self, request: Request) -> Result<(T, Response)>
    where
        T: DeserializeOwned,
    {
        self.inner.execute(request).await
    }

    /// Send `request` and discard the body.
    ///
    /// # Errors
    ///
    /// Returns transport and API errors.
    pub async fn execute_discard(&self, request: Request) -> Result<Response> {
        self.inner.execute_discard(request).await
    }

    /// Droplet operations.
    #[must_use]
    pub const fn droplets(&self) -> DropletsService<'_> {
        DropletsService::new(self)
    }

    /// Droplet action operations.
    #[must_use]
    pub const fn droplet_actions(&self) -> DropletActionsService<'_> {
        DropletActionsService::new(self)
    }

    /// Image operations.
    #[must_use]
    pub const fn images(&self) -> ImagesService<'_> {
        ImagesService::new(self)
    }

    /// Image action operations.
    #[must_use]
    pub const fn image_actions(&self) -> ImageActionsService<'_> {
        ImageActionsService::new(self)
    }

    /// Account-wide action history.
    #[must_use]
    pub const fn actions(&self) -> ActionsService<'_> {
        ActionsService::new(self)
    }

    /// SSH key operations.
    #[must_use]
    pub const fn keys(&self) -> KeysService<'_> {
        KeysService::new(self)
    }

    /// Region listing.
    #[must_use]
    pub const fn regions(&self) -> RegionsService<'_> {
        RegionsService::new(self)
    }

    /// Size listing.
    #[must_use]
    pub const fn sizes(&self) -> SizesService<'_> {
        SizesService::new(self)
    }

    pub(crate) async fn send_json<R>(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody<'_>>,
    ) -> Result<(R, Response)>
    where
        R: DeserializeOwned,
    {
        debug!(%method, path, has_body = body.is_some(), "calling API");
        let request = self.new_request(method, path, body.as_ref())?;
        self.execute(request).await
    }

    pub(crate) async fn get_json<R>(&self, path: &str) -> Result<(R, Response)>
    where
        R: DeserializeOwned,
    {
        self.send_json(Method::GET, path, None).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<Response> {
        let request = self.new_request(Method::DELETE, path, None)?;
        self.execute_discard(request).await
    }
}

/// Join `base` and a caller-supplied identifier (slug, fingerprint) into a
/// resource path.
///
/// An empty identifier would address the collection instead, and `/`, `?` or
/// `#` would address some other resource, so those are rejected.
pub(crate) fn resource_path(base: &str, id: &str) -> Result<String> {
    if id.trim().is_empty() {
        return Err(Error::InvalidRequest(format!("empty identifier for {base}")));
    }
    if id.contains(['/', '?', '#']) {
        return Err(Error::InvalidRequest(format!(
            "identifier {id:?} is not a single path segment"
        )));
    }
    Ok(format!("{base}/{id}"))
}

impl From<ServiceClient> for Client {
    fn from(inner: ServiceClient) -> Self {
        Self { inner }
    }
}

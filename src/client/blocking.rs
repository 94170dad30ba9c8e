//! A blocking client.
//!
//! Same operations as the async [`Client`](super::Client), run to completion on the calling
//! thread. Waiting for the rate limiter blocks that thread only.

use super::{response, Config, ClientBuilder, Credentials, Linked, Operation, RateLimit, Request};

use crate::error::Result;

/// Blocking client.
///
/// ```no_run
/// # use e6api::client::blocking::Client;
/// # fn main() -> e6api::error::Result<()> {
/// let client = Client::new("MyProject", "1.0", "username")?;
/// let post = client.get_post(8595)?;
///
/// assert_eq!(post.id, 8595);
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::blocking::Client,
    config: Config,
    rate_limit: RateLimit,
}

impl Client {
    /// Create a new anonymous client for [`E621_URL`](super::E621_URL).
    ///
    /// Must not be called from within an async runtime.
    pub fn new(
        project: impl Into<String>,
        version: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<Self> {
        ClientBuilder::new(project, version, username).build_blocking()
    }

    /// See [`ClientBuilder`].
    pub fn builder(
        project: impl Into<String>,
        version: impl Into<String>,
        username: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder::new(project, version, username)
    }

    pub(super) fn from_parts(
        client: reqwest::blocking::Client,
        config: Config,
        rate_limit: RateLimit,
    ) -> Self {
        Client {
            client,
            config,
            rate_limit,
        }
    }

    /// Supply login credentials. The User-Agent keeps the username given at creation.
    pub fn login(&mut self, username: impl Into<String>, api_key: impl Into<String>) {
        self.config.credentials = Credentials {
            username: username.into(),
            api_key: Some(api_key.into()),
        };
    }

    /// Whether requests are sent with a username and an API key.
    pub fn is_authenticated(&self) -> bool {
        self.config.is_authenticated()
    }

    pub fn rate_limit(&self) -> &RateLimit {
        &self.rate_limit
    }

    pub(crate) fn link<T>(&self, value: T) -> Linked<'_, Self, T> {
        Linked::new(self, value)
    }

    pub(crate) fn execute<O: Operation>(&self, op: O) -> Result<O::Output> {
        let request = op.request(&self.config)?;
        let (status, body) = self.send(request)?;
        op.map(response::decode(status, &body)?)
    }

    fn send(&self, request: Request) -> Result<(u16, Vec<u8>)> {
        self.rate_limit.acquire_blocking();

        tracing::debug!(method = ?request.method, path = request.url.path(), "sending request");

        let res = self
            .client
            .request(request.method.into(), request.url)
            .headers(request.headers)
            .send()?;

        let status = res.status().as_u16();
        let body = res.bytes()?;

        Ok((status, body.to_vec()))
    }
}

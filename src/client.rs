use super::error::{Error, Result};

use derivative::Derivative;

use serde::{Serialize, Serializer};

use serde_json::Value as JsonValue;

use std::{fmt, ops::Deref};

pub mod blocking;
mod rate_limit;
pub(crate) mod request;
mod response;

pub use rate_limit::{RateLimit, REQ_COOLDOWN_DURATION};
pub use request::Credentials;

pub(crate) use request::{Auth, Config, Method, Request, NO_QUERY};

/// Default API root.
pub const E621_URL: &str = "https://e621.net";

/// Maximum number of items the API returns per page.
pub const MAX_PER_PAGE: u16 = 320;

/// Position to start retrieving results from.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Cursor {
    /// A page number, starting at 1.
    Page(u64),
    /// Results with an ID smaller than the given one.
    Before(u64),
    /// Results with an ID greater than the given one.
    After(u64),
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cursor::Page(p) => write!(f, "{}", p),
            Cursor::Before(id) => write!(f, "b{}", id),
            Cursor::After(id) => write!(f, "a{}", id),
        }
    }
}

impl Serialize for Cursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Fails with [`Error::AboveLimit`] if `per_page` is more than the API accepts.
pub(crate) fn check_per_page(per_page: Option<u16>) -> Result<()> {
    match per_page {
        Some(n) if n > MAX_PER_PAGE => Err(Error::AboveLimit(
            String::from("limit"),
            n.into(),
            MAX_PER_PAGE.into(),
        )),
        _ => Ok(()),
    }
}

/// One API call: how to build its request and how to map its payload.
///
/// Both [`Client`] and [`blocking::Client`] run operations through the same steps; they only
/// differ in how they wait for the rate limiter and the transport.
pub(crate) trait Operation {
    type Output;

    fn request(&self, config: &Config) -> Result<Request>;

    /// `payload` is `None` when the server answered `204 No Content`.
    fn map(self, payload: Option<JsonValue>) -> Result<Self::Output>;
}

/// A value returned by a client, along with a reference to that client.
///
/// Derefs to the value. The client reference is used by follow-up actions such as favoriting a
/// post, so they don't need credentials passed again. It is a plain borrow: a `Linked` never
/// keeps its client alive.
#[derive(Derivative)]
#[derivative(Debug(bound = "T: fmt::Debug"))]
pub struct Linked<'c, C, T> {
    #[derivative(Debug = "ignore")]
    client: &'c C,
    inner: T,
}

impl<'c, C, T> Linked<'c, C, T> {
    pub(crate) fn new(client: &'c C, inner: T) -> Self {
        Linked { client, inner }
    }

    /// The client this value was fetched with.
    pub fn client(&self) -> &'c C {
        self.client
    }

    /// Drops the client reference.
    pub fn into_inner(self) -> T {
        self.inner
    }

    pub(crate) fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<C, T> Deref for Linked<'_, C, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<C, T: Clone> Clone for Linked<'_, C, T> {
    fn clone(&self) -> Self {
        Linked {
            client: self.client,
            inner: self.inner.clone(),
        }
    }
}

impl<C, T: PartialEq> PartialEq<T> for Linked<'_, C, T> {
    fn eq(&self, other: &T) -> bool {
        self.inner == *other
    }
}

/// Builder for [`Client`] and [`blocking::Client`].
///
/// ```no_run
/// # use e6api::client::{Client, RateLimit};
/// # fn main() -> e6api::error::Result<()> {
/// let client = Client::builder("MyProject", "1.0", "username")
///     .api_key("0123456789abcdef")
///     .base_url("https://e926.net")
///     .build()?;
/// # Ok(()) }
/// ```
#[derive(Derivative)]
#[derivative(Debug)]
pub struct ClientBuilder {
    project: String,
    version: String,
    username: String,
    #[derivative(Debug = "ignore")]
    api_key: Option<String>,
    base_url: String,
    rate_limit: Option<RateLimit>,
}

impl ClientBuilder {
    /// The User-Agent sent with every request will be `"{project}/{version} (by {username} on
    /// e621)"`, as the API asks.
    pub fn new(
        project: impl Into<String>,
        version: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        ClientBuilder {
            project: project.into(),
            version: version.into(),
            username: username.into(),
            api_key: None,
            base_url: String::from(E621_URL),
            rate_limit: None,
        }
    }

    /// API key of `username`. Required for favorites and votes.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// API root, e.g. `https://e926.net`. Defaults to [`E621_URL`].
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Limiter to pace requests with. Defaults to [`RateLimit::global`].
    pub fn rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    fn into_parts(self) -> Result<(Config, RateLimit)> {
        let config = Config::new(
            &self.base_url,
            &self.project,
            &self.version,
            Credentials {
                username: self.username,
                api_key: self.api_key,
            },
        )?;

        Ok((config, self.rate_limit.unwrap_or_else(RateLimit::global)))
    }

    /// Builds an async client with its own HTTP session.
    pub fn build(self) -> Result<Client> {
        let session = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::CannotCreateClient(e.to_string()))?;

        self.build_with(session)
    }

    /// Builds an async client on top of an existing HTTP session.
    pub fn build_with(self, session: reqwest::Client) -> Result<Client> {
        let (config, rate_limit) = self.into_parts()?;

        Ok(Client {
            client: session,
            config,
            rate_limit,
        })
    }

    /// Builds a blocking client with its own HTTP session.
    ///
    /// Must not be called from within an async runtime.
    pub fn build_blocking(self) -> Result<blocking::Client> {
        let session = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| Error::CannotCreateClient(e.to_string()))?;

        self.build_blocking_with(session)
    }

    /// Builds a blocking client on top of an existing HTTP session.
    pub fn build_blocking_with(self, session: reqwest::blocking::Client) -> Result<blocking::Client> {
        let (config, rate_limit) = self.into_parts()?;

        Ok(blocking::Client::from_parts(session, config, rate_limit))
    }
}

/// Async client.
#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    config: Config,
    rate_limit: RateLimit,
}

impl Client {
    /// Create a new anonymous client for [`E621_URL`].
    pub fn new(
        project: impl Into<String>,
        version: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<Self> {
        ClientBuilder::new(project, version, username).build()
    }

    /// See [`ClientBuilder`].
    pub fn builder(
        project: impl Into<String>,
        version: impl Into<String>,
        username: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder::new(project, version, username)
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

    pub(crate) async fn execute<O: Operation>(&self, op: O) -> Result<O::Output> {
        let request = op.request(&self.config)?;
        let (status, body) = self.send(request).await?;
        op.map(response::decode(status, &body)?)
    }

    async fn send(&self, request: Request) -> Result<(u16, Vec<u8>)> {
        self.rate_limit.acquire().await;

        tracing::debug!(method = ?request.method, path = request.url.path(), "sending request");

        let res = self
            .client
            .request(request.method.into(), request.url)
            .headers(request.headers)
            .send()
            .await?;

        let status = res.status().as_u16();
        let body = res.bytes().await?;

        Ok((status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_new() {
        Client::new("e6api", "unit_test", "someone").unwrap();
    }

    #[test]
    #[should_panic]
    fn client_new_requires_non_empty_user_agent() {
        Client::new("", "", "").unwrap();
    }

    #[test]
    fn client_new_rejects_invalid_base_url() {
        let res = Client::builder("e6api", "unit_test", "someone")
            .base_url("not a url")
            .build();

        assert!(matches!(res, Err(Error::Url(_))));
    }

    #[test]
    fn login_authenticates() {
        let mut client = Client::new("e6api", "unit_test", "someone").unwrap();
        assert!(!client.is_authenticated());

        client.login("someone", "secret");
        assert!(client.is_authenticated());
    }

    #[test]
    fn builder_debug_hides_key() {
        let builder = ClientBuilder::new("e6api", "unit_test", "someone").api_key("secret");
        assert!(!format!("{:?}", builder).contains("secret"));
    }

    #[test]
    fn cursor_format() {
        assert_eq!(Cursor::Page(3).to_string(), "3");
        assert_eq!(Cursor::Before(1869409).to_string(), "b1869409");
        assert_eq!(Cursor::After(12).to_string(), "a12");
    }

    #[test]
    fn per_page_is_bounded() {
        assert!(check_per_page(None).is_ok());
        assert!(check_per_page(Some(MAX_PER_PAGE)).is_ok());
        assert!(matches!(
            check_per_page(Some(321)),
            Err(Error::AboveLimit(_, 321, 320))
        ));
    }

    #[test]
    fn builder_uses_global_limiter_by_default() {
        let client = Client::new("e6api", "unit_test", "someone").unwrap();
        assert_eq!(client.rate_limit().cooldown(), REQ_COOLDOWN_DURATION);
    }
}

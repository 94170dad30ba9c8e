use crate::error::{Error, Result};

use reqwest::header::{self, HeaderMap, HeaderValue};

use serde::Serialize;

use url::Url;

/// An empty query string.
pub(crate) const NO_QUERY: [(&str, &str); 0] = [];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Method {
    Get,
    Post,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Whether an endpoint can be called anonymously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    Optional,
    Required,
}

/// Username and API key used to log in.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// The `(login, api_key)` pair, if both are usable.
    fn login(&self) -> Option<(&str, &str)> {
        match &self.api_key {
            Some(key) if !self.username.is_empty() && !key.is_empty() => {
                Some((&self.username, key))
            }
            _ => None,
        }
    }
}

/// Everything a client needs to turn an endpoint call into a [`Request`].
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub base_url: Url,
    pub user_agent: HeaderValue,
    pub credentials: Credentials,
}

/// A fully-formed request, ready to be handed to a transport.
#[derive(Debug, Clone)]
pub(crate) struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl Config {
    pub fn new(
        base_url: &str,
        project: &str,
        version: &str,
        credentials: Credentials,
    ) -> Result<Self> {
        if project.is_empty() || version.is_empty() || credentials.username.is_empty() {
            return Err(Error::CannotCreateClient(String::from(
                "project name, version and username mustn't be empty",
            )));
        }

        let user_agent = HeaderValue::from_str(&format!(
            "{}/{} (by {} on e621)",
            project, version, credentials.username
        ))?;

        Ok(Config {
            base_url: Url::parse(base_url)?,
            user_agent,
            credentials,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.login().is_some()
    }

    pub fn get<Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> Result<Request> {
        self.request(Method::Get, path, query, Auth::Optional)
    }

    pub fn request<Q: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &Q,
        auth: Auth,
    ) -> Result<Request> {
        let login = self.credentials.login();

        if auth == Auth::Required && login.is_none() {
            return Err(Error::Unauthenticated);
        }

        let mut url = self.base_url.join(path)?;

        let query = serde_urlencoded::to_string(query)?;
        url.set_query((!query.is_empty()).then_some(query.as_str()));

        if let Some((login, api_key)) = login {
            url.query_pairs_mut()
                .append_pair("login", login)
                .append_pair("api_key", api_key);
        }

        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, self.user_agent.clone());

        Ok(Request {
            method,
            url,
            headers,
        })
    }
}

use {
    super::{
        client::{self, check_per_page, Config, Cursor, Linked, Operation, Request},
        error::Result as E6Result,
        post::{GetPost, Post},
        utils::{list_from_payload, nullable},
    },
    chrono::{offset::Utc, DateTime},
    serde::{Deserialize, Serialize},
    serde_json::Value as JsonValue,
};

/// A report asking moderators to review a post.
#[derive(Debug, PartialEq, Eq, Deserialize, Clone)]
pub struct Flag {
    pub id: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub post_id: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub reason: String,
    #[serde(default)]
    pub creator_id: Option<u64>,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default)]
    pub is_deletion: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub category: String,
}

/// A search query returning [`Flag`] instances.
#[derive(Default, Debug, PartialEq, Eq, Serialize, Clone)]
pub struct Query {
    #[serde(rename = "search[post_id]", skip_serializing_if = "Option::is_none")]
    post_id: Option<u64>,

    #[serde(rename = "search[creator_id]", skip_serializing_if = "Option::is_none")]
    creator_id: Option<u64>,

    #[serde(
        rename = "search[creator_name]",
        skip_serializing_if = "Option::is_none"
    )]
    creator_name: Option<String>,

    #[serde(rename = "limit", skip_serializing_if = "Option::is_none")]
    per_page: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<Cursor>,
}

impl Query {
    /// Create a new instance of `Query` with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only return flags of this post.
    pub fn post_id<T: Into<Option<u64>>>(mut self, id: T) -> Self {
        self.post_id = id.into();
        self
    }

    pub fn creator_id<T: Into<Option<u64>>>(mut self, id: T) -> Self {
        self.creator_id = id.into();
        self
    }

    pub fn creator_name<T: Into<String>>(mut self, name: T) -> Self {
        self.creator_name = Some(name.into());
        self
    }

    /// Set the number of flags to retrieve. Equivalent to the `limit` query parameter.
    pub fn per_page<T: Into<Option<u16>>>(mut self, per_page: T) -> Self {
        self.per_page = per_page.into();
        self
    }

    pub fn page<T: Into<Option<Cursor>>>(mut self, page: T) -> Self {
        self.page = page.into();
        self
    }
}

struct SearchFlags(Query);

impl Operation for SearchFlags {
    type Output = Vec<Flag>;

    fn request(&self, config: &Config) -> E6Result<Request> {
        check_per_page(self.0.per_page)?;
        config.get("/post_flags.json", &self.0)
    }

    fn map(self, payload: Option<JsonValue>) -> E6Result<Vec<Flag>> {
        list_from_payload(payload)
    }
}

impl client::Client {
    /// Returns the post flags matching the query.
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub async fn search_flags(&self, query: Query) -> E6Result<Vec<Linked<'_, Self, Flag>>> {
        let flags = self.execute(SearchFlags(query)).await?;
        Ok(flags.into_iter().map(|f| self.link(f)).collect())
    }
}

impl<'c> Linked<'c, client::Client, Flag> {
    /// Fetches the flagged post.
    pub async fn post(&self) -> E6Result<Linked<'c, client::Client, Post>> {
        let client = self.client();
        Ok(client.link(client.execute(GetPost(self.post_id)).await?))
    }
}

impl client::blocking::Client {
    /// Returns the post flags matching the query.
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub fn search_flags(&self, query: Query) -> E6Result<Vec<Linked<'_, Self, Flag>>> {
        let flags = self.execute(SearchFlags(query))?;
        Ok(flags.into_iter().map(|f| self.link(f)).collect())
    }
}

impl<'c> Linked<'c, client::blocking::Client, Flag> {
    /// Fetches the flagged post.
    pub fn post(&self) -> E6Result<Linked<'c, client::blocking::Client, Post>> {
        let client = self.client();
        Ok(client.link(client.execute(GetPost(self.post_id))?))
    }
}

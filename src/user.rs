use {
    super::{
        client::{self, check_per_page, Config, Cursor, Linked, Operation, Request},
        error::Result as E6Result,
        post::{self, Post, SearchPosts},
        utils::{from_payload, list_from_payload, nullable, require},
    },
    chrono::{offset::Utc, DateTime},
    serde::{Deserialize, Serialize},
    serde_json::Value as JsonValue,
};

/// How to sort results of a user [`Query`].
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    Name,
    /// Most recent first.
    Date,
    PostUploadCount,
    PostUpdateCount,
    NoteCount,
}

/// A user's public profile.
#[derive(Debug, PartialEq, Eq, Deserialize, Clone)]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub level: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub level_string: String,
    #[serde(default)]
    pub is_banned: bool,
    #[serde(default)]
    pub base_upload_limit: u64,
    #[serde(default)]
    pub post_upload_count: u64,
    #[serde(default)]
    pub post_update_count: u64,
    #[serde(default)]
    pub note_update_count: u64,
    /// ID of the post used as avatar.
    #[serde(default)]
    pub avatar_id: Option<u64>,
    #[serde(default)]
    pub can_approve_posts: bool,
    #[serde(default)]
    pub can_upload_free: bool,
}

/// A search query returning [`User`] instances.
#[derive(Default, Debug, PartialEq, Eq, Serialize, Clone)]
pub struct Query {
    #[serde(
        rename = "search[name_matches]",
        skip_serializing_if = "Option::is_none"
    )]
    name_matches: Option<String>,

    #[serde(rename = "search[order]", skip_serializing_if = "Option::is_none")]
    order: Option<Order>,

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

    /// Search user names. `*` matches anything.
    pub fn name_matches<T: Into<String>>(mut self, name: T) -> Self {
        self.name_matches = Some(name.into());
        self
    }

    pub fn order<T: Into<Option<Order>>>(mut self, order: T) -> Self {
        self.order = order.into();
        self
    }

    /// Set the number of users to retrieve. Equivalent to the `limit` query parameter.
    pub fn per_page<T: Into<Option<u16>>>(mut self, per_page: T) -> Self {
        self.per_page = per_page.into();
        self
    }

    pub fn page<T: Into<Option<Cursor>>>(mut self, page: T) -> Self {
        self.page = page.into();
        self
    }
}

struct GetUser(u64);

impl Operation for GetUser {
    type Output = User;

    fn request(&self, config: &Config) -> E6Result<Request> {
        config.get(&format!("/users/{}.json", self.0), &client::NO_QUERY)
    }

    fn map(self, payload: Option<JsonValue>) -> E6Result<User> {
        from_payload(require(payload)?)
    }
}

struct SearchUsers(Query);

impl Operation for SearchUsers {
    type Output = Vec<User>;

    fn request(&self, config: &Config) -> E6Result<Request> {
        check_per_page(self.0.per_page)?;
        config.get("/users.json", &self.0)
    }

    fn map(self, payload: Option<JsonValue>) -> E6Result<Vec<User>> {
        list_from_payload(payload)
    }
}

fn favorites_of(name: &str) -> SearchPosts {
    SearchPosts(post::Query::new(format!("fav:{}", name)))
}

impl client::Client {
    /// Returns the user with the given ID.
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub async fn get_user(&self, id: u64) -> E6Result<Linked<'_, Self, User>> {
        Ok(self.link(self.execute(GetUser(id)).await?))
    }

    /// Returns the users matching the query.
    ///
    /// ```no_run
    /// # use e6api::client::Client;
    /// # use e6api::user::{Order, Query};
    /// # #[tokio::main]
    /// # async fn main() -> e6api::error::Result<()> {
    /// let client = Client::new("MyProject", "1.0", "username")?;
    /// let users = client
    ///     .search_users(Query::new().name_matches("fuf*").order(Order::PostUploadCount))
    ///     .await?;
    ///
    /// for user in users {
    ///     println!("{} uploaded {} posts", user.name, user.post_upload_count);
    /// }
    /// # Ok(()) }
    /// ```
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub async fn search_users(&self, query: Query) -> E6Result<Vec<Linked<'_, Self, User>>> {
        let users = self.execute(SearchUsers(query)).await?;
        Ok(users.into_iter().map(|u| self.link(u)).collect())
    }
}

impl<'c> Linked<'c, client::Client, User> {
    /// Fetches the first page of the user's favorite posts.
    pub async fn favorites(&self) -> E6Result<Vec<Linked<'c, client::Client, Post>>> {
        let client = self.client();
        let posts = client.execute(favorites_of(&self.name)).await?;
        Ok(posts.into_iter().map(|p| client.link(p)).collect())
    }
}

impl client::blocking::Client {
    /// Returns the user with the given ID.
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub fn get_user(&self, id: u64) -> E6Result<Linked<'_, Self, User>> {
        Ok(self.link(self.execute(GetUser(id))?))
    }

    /// Returns the users matching the query.
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub fn search_users(&self, query: Query) -> E6Result<Vec<Linked<'_, Self, User>>> {
        let users = self.execute(SearchUsers(query))?;
        Ok(users.into_iter().map(|u| self.link(u)).collect())
    }
}

impl<'c> Linked<'c, client::blocking::Client, User> {
    /// Fetches the first page of the user's favorite posts.
    pub fn favorites(&self) -> E6Result<Vec<Linked<'c, client::blocking::Client, Post>>> {
        let client = self.client();
        let posts = client.execute(favorites_of(&self.name))?;
        Ok(posts.into_iter().map(|p| client.link(p)).collect())
    }
}

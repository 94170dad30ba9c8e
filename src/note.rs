use {
    super::{
        client::{self, check_per_page, Config, Cursor, Linked, Operation, Request},
        error::Result as E6Result,
        post::{GetPost, Post},
        tag::Tags,
        utils::{list_from_payload, nullable},
    },
    chrono::{offset::Utc, DateTime},
    serde::{Deserialize, Serialize},
    serde_json::Value as JsonValue,
};

/// A translation or comment box placed over an area of a post.
#[derive(Debug, PartialEq, Eq, Deserialize, Clone)]
pub struct Note {
    pub id: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub creator_id: Option<u64>,
    #[serde(default, deserialize_with = "nullable")]
    pub creator_name: String,
    pub x: i64,
    pub y: i64,
    pub width: u64,
    pub height: u64,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub is_active: bool,
    pub post_id: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
}

/// A search query returning [`Note`] instances.
///
/// ```
/// # use e6api::note::Query;
/// let query = Query::new()
///     .body_matches("*hello*")
///     .post_tags_match("comic rating:s")
///     .is_active(true)
///     .per_page(50);
/// ```
#[derive(Default, Debug, PartialEq, Eq, Serialize, Clone)]
pub struct Query {
    #[serde(
        rename = "search[body_matches]",
        skip_serializing_if = "Option::is_none"
    )]
    body_matches: Option<String>,

    #[serde(rename = "search[post_id]", skip_serializing_if = "Option::is_none")]
    post_id: Option<u64>,

    #[serde(
        rename = "search[post_tags_match]",
        skip_serializing_if = "Tags::is_empty"
    )]
    post_tags_match: Tags,

    #[serde(
        rename = "search[creator_name]",
        skip_serializing_if = "Option::is_none"
    )]
    creator_name: Option<String>,

    #[serde(rename = "search[creator_id]", skip_serializing_if = "Option::is_none")]
    creator_id: Option<u64>,

    #[serde(rename = "search[is_active]", skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,

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

    /// Search note bodies. `*` matches anything.
    pub fn body_matches<T: Into<String>>(mut self, body: T) -> Self {
        self.body_matches = Some(body.into());
        self
    }

    /// Only return notes of this post.
    pub fn post_id<T: Into<Option<u64>>>(mut self, id: T) -> Self {
        self.post_id = id.into();
        self
    }

    /// Only return notes of posts with these tags. Meta-tags are not supported.
    pub fn post_tags_match<T: Into<Tags>>(mut self, tags: T) -> Self {
        self.post_tags_match = tags.into();
        self
    }

    /// Exact name of the note's author.
    pub fn creator_name<T: Into<String>>(mut self, name: T) -> Self {
        self.creator_name = Some(name.into());
        self
    }

    pub fn creator_id<T: Into<Option<u64>>>(mut self, id: T) -> Self {
        self.creator_id = id.into();
        self
    }

    pub fn is_active<T: Into<Option<bool>>>(mut self, active: T) -> Self {
        self.is_active = active.into();
        self
    }

    /// Set the number of notes to retrieve. Equivalent to the `limit` query parameter.
    pub fn per_page<T: Into<Option<u16>>>(mut self, per_page: T) -> Self {
        self.per_page = per_page.into();
        self
    }

    pub fn page<T: Into<Option<Cursor>>>(mut self, page: T) -> Self {
        self.page = page.into();
        self
    }
}

struct SearchNotes(Query);

impl Operation for SearchNotes {
    type Output = Vec<Note>;

    fn request(&self, config: &Config) -> E6Result<Request> {
        check_per_page(self.0.per_page)?;
        config.get("/notes.json", &self.0)
    }

    fn map(self, payload: Option<JsonValue>) -> E6Result<Vec<Note>> {
        list_from_payload(payload)
    }
}

impl client::Client {
    /// Returns the notes matching the query.
    ///
    /// ```no_run
    /// # use e6api::client::Client;
    /// # use e6api::note::Query;
    /// # #[tokio::main]
    /// # async fn main() -> e6api::error::Result<()> {
    /// let client = Client::new("MyProject", "1.0", "username")?;
    ///
    /// for note in client.search_notes(Query::new().post_id(1383235)).await? {
    ///     println!("{}: {}", note.creator_name, note.body);
    /// }
    /// # Ok(()) }
    /// ```
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub async fn search_notes(&self, query: Query) -> E6Result<Vec<Linked<'_, Self, Note>>> {
        let notes = self.execute(SearchNotes(query)).await?;
        Ok(notes.into_iter().map(|n| self.link(n)).collect())
    }
}

impl<'c> Linked<'c, client::Client, Note> {
    /// Fetches the post the note is on.
    pub async fn post(&self) -> E6Result<Linked<'c, client::Client, Post>> {
        let client = self.client();
        Ok(client.link(client.execute(GetPost(self.post_id)).await?))
    }
}

impl client::blocking::Client {
    /// Returns the notes matching the query.
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub fn search_notes(&self, query: Query) -> E6Result<Vec<Linked<'_, Self, Note>>> {
        let notes = self.execute(SearchNotes(query))?;
        Ok(notes.into_iter().map(|n| self.link(n)).collect())
    }
}

impl<'c> Linked<'c, client::blocking::Client, Note> {
    /// Fetches the post the note is on.
    pub fn post(&self) -> E6Result<Linked<'c, client::blocking::Client, Post>> {
        let client = self.client();
        Ok(client.link(client.execute(GetPost(self.post_id))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Client, RateLimit};
    use mockito::{Matcher, Server};
    use std::time::Duration;

    fn client(server: &Server) -> Client {
        Client::builder("e6api", "unit_test", "someone")
            .base_url(server.url())
            .rate_limit(RateLimit::new(Duration::ZERO))
            .build()
            .unwrap()
    }

    const NOTES: &str = r#"[
        {
            "id": 272515,
            "created_at": "2020-04-12T08:30:21.054-04:00",
            "updated_at": "2020-04-12T08:30:21.054-04:00",
            "creator_id": 17633,
            "x": 113,
            "y": 90,
            "width": 54,
            "height": 38,
            "version": 2,
            "is_active": true,
            "post_id": 1383235,
            "body": "Hello!",
            "creator_name": "someone_else"
        }
    ]"#;

    #[test]
    fn query_serialization() {
        let query = Query::new()
            .post_tags_match(["comic", "rating:s"])
            .is_active(false);

        assert_eq!(
            serde_urlencoded::to_string(&query).unwrap(),
            "search%5Bpost_tags_match%5D=comic+rating%3As&search%5Bis_active%5D=false"
        );
    }

    #[tokio::test]
    async fn search_notes_and_fetch_post() {
        let mut server = Server::new_async().await;
        let client = client(&server);

        let notes = server
            .mock("GET", "/notes.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("search[body_matches]".into(), "Hello*".into()),
                Matcher::UrlEncoded("limit".into(), "1".into()),
            ]))
            .with_body(NOTES)
            .create_async()
            .await;
        let post = server
            .mock("GET", "/posts/1383235.json")
            .with_body(include_str!("mocked/post_1383235.json"))
            .create_async()
            .await;

        let found = client
            .search_notes(Query::new().body_matches("Hello*").per_page(1))
            .await
            .unwrap();

        notes.assert_async().await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].body, "Hello!");
        assert_eq!((found[0].x, found[0].y), (113, 90));

        let annotated = found[0].post().await.unwrap();

        post.assert_async().await;
        assert_eq!(annotated.id, 1383235);
    }

    #[tokio::test]
    async fn no_notes_found() {
        let mut server = Server::new_async().await;
        let client = client(&server);

        let _m = server
            .mock("GET", "/notes.json")
            .match_query(Matcher::Any)
            .with_body(r#"{"notes":[]}"#)
            .create_async()
            .await;

        let found = client
            .search_notes(Query::new().post_id(1))
            .await
            .unwrap();

        assert!(found.is_empty());
    }
}

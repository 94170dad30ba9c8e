use {
    super::{
        client::{self, check_per_page, Auth, Config, Cursor, Linked, Method, Operation, Request},
        error::Result as E6Result,
        tag::{Category, Tags},
        utils::{from_payload, list_from_payload, nullable, nullable_bool, require, take_key},
    },
    chrono::{offset::Utc, DateTime},
    itertools::Itertools,
    serde::{Deserialize, Deserializer, Serialize},
    serde_json::Value as JsonValue,
    std::fmt,
};

#[derive(Debug, PartialEq, Eq, Deserialize, Clone, Copy)]
pub enum PostFileExtension {
    #[serde(rename = "jpg")]
    Jpeg,
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "gif")]
    Gif,
    #[serde(rename = "swf")]
    Swf,
    #[serde(rename = "webm")]
    WebM,
    #[serde(rename = "mp4")]
    Mp4,
    #[serde(rename = "webp")]
    WebP,
}

#[derive(Debug, PartialEq, Eq, Deserialize, Clone)]
pub struct PostFile {
    pub width: u64,
    pub height: u64,
    pub ext: PostFileExtension,
    pub size: u64,
    pub md5: String,
    /// `None` when the file is hidden from the current user.
    pub url: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Deserialize, Clone)]
pub struct PostPreview {
    pub width: u64,
    pub height: u64,
    pub url: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PostSample {
    pub width: u64,
    pub height: u64,
    pub url: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize, Clone, Copy)]
pub struct PostScore {
    pub up: i64,
    pub down: i64,
    pub total: i64,
}

/// Tags of a post, by category. Every category is present, empty ones included.
#[derive(Debug, Default, PartialEq, Eq, Deserialize, Clone)]
#[serde(default)]
pub struct PostTags {
    pub general: Vec<String>,
    pub species: Vec<String>,
    pub character: Vec<String>,
    pub copyright: Vec<String>,
    pub artist: Vec<String>,
    pub invalid: Vec<String>,
    pub lore: Vec<String>,
    pub meta: Vec<String>,
}

impl PostTags {
    /// The tags of the given category.
    pub fn get(&self, category: Category) -> &[String] {
        match category {
            Category::General => &self.general,
            Category::Species => &self.species,
            Category::Character => &self.character,
            Category::Copyright => &self.copyright,
            Category::Artist => &self.artist,
            Category::Invalid => &self.invalid,
            Category::Lore => &self.lore,
            Category::Meta => &self.meta,
        }
    }

    /// Every category with its tags, in [`Category::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Every tag, regardless of category.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.iter().flat_map(|(_, tags)| tags.iter().map(String::as_str))
    }

    /// What changed from `self` to `edited`. A tag moved to another category is not a change.
    ///
    /// ```
    /// # use e6api::post::PostTags;
    /// let original = PostTags {
    ///     general: vec!["furry".into(), "m/m".into()],
    ///     ..Default::default()
    /// };
    /// let edited = PostTags {
    ///     general: vec!["m/m".into(), "girly".into()],
    ///     ..Default::default()
    /// };
    ///
    /// assert_eq!(original.difference(&edited).to_string(), "girly -furry");
    /// ```
    pub fn difference(&self, edited: &PostTags) -> TagDiff {
        let added = edited
            .all()
            .filter(|t| !self.all().any(|o| o == *t))
            .unique()
            .map(String::from)
            .collect();
        let removed = self
            .all()
            .filter(|t| !edited.all().any(|o| o == *t))
            .unique()
            .map(String::from)
            .collect();

        TagDiff { added, removed }
    }
}

/// A tag edit, displayed the way the API expects it: added tags, then removed tags prefixed with
/// `-`.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct TagDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl fmt::Display for TagDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let removed = self.removed.iter().map(|t| format!("-{}", t));
        let all = self.added.iter().cloned().chain(removed).join(" ");

        f.write_str(&all)
    }
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize, Clone, Copy)]
pub struct PostFlags {
    #[serde(default, deserialize_with = "nullable_bool")]
    pub pending: bool,
    #[serde(default, deserialize_with = "nullable_bool")]
    pub flagged: bool,
    #[serde(default, deserialize_with = "nullable_bool")]
    pub note_locked: bool,
    #[serde(default, deserialize_with = "nullable_bool")]
    pub status_locked: bool,
    #[serde(default, deserialize_with = "nullable_bool")]
    pub rating_locked: bool,
    #[serde(default, deserialize_with = "nullable_bool")]
    pub deleted: bool,
}

/// How explicit a post is. The API encodes it as `s`, `q` or `e`.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone, Copy)]
pub enum Rating {
    #[serde(rename = "s")]
    Safe,
    #[serde(rename = "q")]
    Questionable,
    #[serde(rename = "e")]
    Explicit,
}

impl Rating {
    /// The one-letter code used by the API and in `rating:` searches.
    pub fn code(self) -> &'static str {
        match self {
            Rating::Safe => "s",
            Rating::Questionable => "q",
            Rating::Explicit => "e",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rating::Safe => "safe",
            Rating::Questionable => "questionable",
            Rating::Explicit => "explicit",
        })
    }
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize, Clone)]
#[serde(default)]
pub struct PostRelationships {
    pub parent_id: Option<u64>,
    pub has_children: bool,
    pub has_active_children: bool,
    pub children: Vec<u64>,
}

/// Structure representing a post.
///
/// Only `id` and `rating` are required; anything else the API leaves out gets its default value.
#[derive(Debug, PartialEq, Eq, Deserialize, Clone)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub file: Option<PostFile>,
    #[serde(default)]
    pub preview: Option<PostPreview>,
    #[serde(default, deserialize_with = "sample_from_json")]
    pub sample: Option<PostSample>,
    #[serde(default, deserialize_with = "nullable")]
    pub score: PostScore,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: PostTags,
    #[serde(default, deserialize_with = "nullable")]
    pub locked_tags: Vec<String>,
    #[serde(default)]
    pub change_seq: Option<u64>,
    #[serde(default, deserialize_with = "nullable")]
    pub flags: PostFlags,
    pub rating: Rating,
    #[serde(default)]
    pub fav_count: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub sources: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub pools: Vec<u64>,
    #[serde(default, deserialize_with = "nullable")]
    pub relationships: PostRelationships,
    #[serde(default)]
    pub approver_id: Option<u64>,
    #[serde(default)]
    pub uploader_id: Option<u64>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default, deserialize_with = "nullable_bool")]
    pub is_favorited: bool,
}

impl Post {
    fn mark_unfavorited(&mut self) {
        if self.is_favorited {
            self.is_favorited = false;
            self.fav_count = self.fav_count.saturating_sub(1);
        }
    }
}

fn sample_from_json<'de, D>(de: D) -> Result<Option<PostSample>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct RawSample {
        #[serde(default, deserialize_with = "nullable_bool")]
        has: bool,
        #[serde(default)]
        width: u64,
        #[serde(default)]
        height: u64,
        #[serde(default)]
        url: Option<String>,
    }

    // `has` is false when the original file is small enough to be its own sample.
    Ok(Option::<RawSample>::deserialize(de)?
        .filter(|s| s.has)
        .map(|s| PostSample {
            width: s.width,
            height: s.height,
            url: s.url,
        }))
}

/// Direction of a vote.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    fn score(self) -> i8 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

/// Score of a post after a vote.
#[derive(Debug, PartialEq, Eq, Deserialize, Clone, Copy)]
pub struct Vote {
    pub up: i64,
    pub down: i64,
    pub score: i64,
    /// The current user's vote: `1`, `-1`, or `0` if voting again removed it.
    pub our_score: i64,
}

impl From<Vote> for PostScore {
    fn from(v: Vote) -> Self {
        PostScore {
            up: v.up,
            down: v.down,
            total: v.score,
        }
    }
}

/// A post search query.
///
/// ```
/// # use e6api::post::Query;
/// # use e6api::client::Cursor;
/// let query = Query::new(&["fluffy", "rating:s"][..])
///     .per_page(20)
///     .page(Cursor::Page(2));
/// ```
#[derive(Default, Debug, PartialEq, Eq, Serialize, Clone)]
pub struct Query {
    #[serde(skip_serializing_if = "Tags::is_empty")]
    tags: Tags,

    #[serde(rename = "limit", skip_serializing_if = "Option::is_none")]
    per_page: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<Cursor>,
}

impl Query {
    pub fn new(tags: impl Into<Tags>) -> Self {
        Query {
            tags: tags.into(),
            ..Default::default()
        }
    }

    /// Set the number of posts to retrieve, at most [`MAX_PER_PAGE`][client::MAX_PER_PAGE].
    /// Equivalent to the `limit` query parameter.
    pub fn per_page<T: Into<Option<u16>>>(mut self, per_page: T) -> Self {
        self.per_page = per_page.into();
        self
    }

    /// Set the page/offset to start retrieving posts from.
    pub fn page<T: Into<Option<Cursor>>>(mut self, page: T) -> Self {
        self.page = page.into();
        self
    }
}

macro_rules! query_from_tags {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Query {
                fn from(tags: $t) -> Self {
                    Query::new(tags)
                }
            }
        )*
    };
}

query_from_tags!(&str, String, &String, &[&str], Vec<&str>, Vec<String>, Tags);

impl<const N: usize> From<[&str; N]> for Query {
    fn from(tags: [&str; N]) -> Self {
        Query::new(tags)
    }
}

pub(crate) struct GetPost(pub(crate) u64);

impl Operation for GetPost {
    type Output = Post;

    fn request(&self, config: &Config) -> E6Result<Request> {
        config.get(&format!("/posts/{}.json", self.0), &client::NO_QUERY)
    }

    fn map(self, payload: Option<JsonValue>) -> E6Result<Post> {
        from_payload(require(take_key(payload, "post"))?)
    }
}

pub(crate) struct SearchPosts(pub(crate) Query);

impl Operation for SearchPosts {
    type Output = Vec<Post>;

    fn request(&self, config: &Config) -> E6Result<Request> {
        check_per_page(self.0.per_page)?;
        config.get("/posts.json", &self.0)
    }

    fn map(self, payload: Option<JsonValue>) -> E6Result<Vec<Post>> {
        list_from_payload(take_key(payload, "posts"))
    }
}

struct Favorite(u64);

impl Operation for Favorite {
    type Output = Post;

    fn request(&self, config: &Config) -> E6Result<Request> {
        config.request(
            Method::Post,
            "/favorites.json",
            &[("post_id", self.0)],
            Auth::Required,
        )
    }

    fn map(self, payload: Option<JsonValue>) -> E6Result<Post> {
        let mut value = require(payload)?;

        // Either the post itself or `{"post": {...}}`.
        match value.get_mut("post") {
            Some(post) => from_payload(post.take()),
            None => from_payload(value),
        }
    }
}

struct Unfavorite(u64);

impl Operation for Unfavorite {
    type Output = ();

    fn request(&self, config: &Config) -> E6Result<Request> {
        config.request(
            Method::Delete,
            &format!("/favorites/{}.json", self.0),
            &client::NO_QUERY,
            Auth::Required,
        )
    }

    fn map(self, _: Option<JsonValue>) -> E6Result<()> {
        Ok(())
    }
}

struct CastVote {
    id: u64,
    direction: VoteDirection,
    no_unvote: bool,
}

#[derive(Serialize)]
struct VoteParams {
    score: i8,
    no_unvote: bool,
}

impl Operation for CastVote {
    type Output = Vote;

    fn request(&self, config: &Config) -> E6Result<Request> {
        config.request(
            Method::Post,
            &format!("/posts/{}/votes.json", self.id),
            &VoteParams {
                score: self.direction.score(),
                no_unvote: self.no_unvote,
            },
            Auth::Required,
        )
    }

    fn map(self, payload: Option<JsonValue>) -> E6Result<Vote> {
        from_payload(require(payload)?)
    }
}

impl client::Client {
    /// Returns the post with the given ID.
    ///
    /// ```no_run
    /// # use e6api::client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> e6api::error::Result<()> {
    /// let client = Client::new("MyProject", "1.0", "username")?;
    /// let post = client.get_post(8595).await?;
    ///
    /// assert_eq!(post.id, 8595);
    /// # Ok(()) }
    /// ```
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub async fn get_post(&self, id: u64) -> E6Result<Linked<'_, Self, Post>> {
        Ok(self.link(self.execute(GetPost(id)).await?))
    }

    /// Returns the posts matching the given tags, or the given [`Query`].
    ///
    /// ```no_run
    /// # use e6api::client::Client;
    /// # use e6api::post::{Query, Rating};
    /// # #[tokio::main]
    /// # async fn main() -> e6api::error::Result<()> {
    /// let client = Client::new("MyProject", "1.0", "username")?;
    ///
    /// for post in client.search_posts(&["fluffy", "rating:s"][..]).await? {
    ///     assert_eq!(post.rating, Rating::Safe);
    /// }
    ///
    /// let top = client
    ///     .search_posts(Query::new("fluffy order:score").per_page(3))
    ///     .await?;
    /// # Ok(()) }
    /// ```
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub async fn search_posts<Q: Into<Query>>(
        &self,
        query: Q,
    ) -> E6Result<Vec<Linked<'_, Self, Post>>> {
        let posts = self.execute(SearchPosts(query.into())).await?;
        Ok(posts.into_iter().map(|p| self.link(p)).collect())
    }
}

impl<'c> Linked<'c, client::Client, Post> {
    /// Adds the post to the user's favorites, then refreshes it with the server's copy.
    ///
    /// Fails with [`Unauthenticated`][crate::error::Error::Unauthenticated] on an anonymous client.
    pub async fn favorite(&mut self) -> E6Result<()> {
        let post = self.client().execute(Favorite(self.id)).await?;
        *self.inner_mut() = post;
        Ok(())
    }

    /// Removes the post from the user's favorites.
    ///
    /// Fails with [`Unauthenticated`][crate::error::Error::Unauthenticated] on an anonymous client.
    pub async fn unfavorite(&mut self) -> E6Result<()> {
        self.client().execute(Unfavorite(self.id)).await?;
        self.inner_mut().mark_unfavorited();
        Ok(())
    }

    /// Votes on the post and updates its score.
    ///
    /// Voting the same way twice removes the vote, unless `no_unvote` is set.
    ///
    /// Fails with [`Unauthenticated`][crate::error::Error::Unauthenticated] on an anonymous client.
    pub async fn vote(&mut self, direction: VoteDirection, no_unvote: bool) -> E6Result<Vote> {
        let vote = self
            .client()
            .execute(CastVote {
                id: self.id,
                direction,
                no_unvote,
            })
            .await?;
        self.inner_mut().score = vote.into();
        Ok(vote)
    }
}

impl client::blocking::Client {
    /// Returns the post with the given ID.
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub fn get_post(&self, id: u64) -> E6Result<Linked<'_, Self, Post>> {
        Ok(self.link(self.execute(GetPost(id))?))
    }

    /// Returns the posts matching the given tags, or the given [`Query`].
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub fn search_posts<Q: Into<Query>>(&self, query: Q) -> E6Result<Vec<Linked<'_, Self, Post>>> {
        let posts = self.execute(SearchPosts(query.into()))?;
        Ok(posts.into_iter().map(|p| self.link(p)).collect())
    }
}

impl<'c> Linked<'c, client::blocking::Client, Post> {
    /// Adds the post to the user's favorites, then refreshes it with the server's copy.
    pub fn favorite(&mut self) -> E6Result<()> {
        let post = self.client().execute(Favorite(self.id))?;
        *self.inner_mut() = post;
        Ok(())
    }

    /// Removes the post from the user's favorites.
    pub fn unfavorite(&mut self) -> E6Result<()> {
        self.client().execute(Unfavorite(self.id))?;
        self.inner_mut().mark_unfavorited();
        Ok(())
    }

    /// Votes on the post and updates its score.
    pub fn vote(&mut self, direction: VoteDirection, no_unvote: bool) -> E6Result<Vote> {
        let vote = self.client().execute(CastVote {
            id: self.id,
            direction,
            no_unvote,
        })?;
        self.inner_mut().score = vote.into();
        Ok(vote)
    }
}

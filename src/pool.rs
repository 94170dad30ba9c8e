use {
    super::{
        client::{self, check_per_page, Config, Cursor, Linked, Operation, Request, MAX_PER_PAGE},
        error::Result as E6Result,
        post::{self, Post, SearchPosts},
        utils::{from_payload, list_from_payload, nullable, require},
    },
    chrono::{offset::Utc, DateTime},
    serde::{Deserialize, Serialize},
    serde_json::Value as JsonValue,
    serde_with::{formats::CommaSeparator, serde_as},
};

/// Kind of pool.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Posts meant to be read in order, such as a comic.
    Series,
    Collection,
}

/// How to sort results of a pool [`Query`]. The API sorts by `updated_at` when unset.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    Name,
    CreatedAt,
    UpdatedAt,
    PostCount,
}

/// An ordered group of posts.
#[derive(Debug, PartialEq, Eq, Deserialize, Clone)]
pub struct Pool {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub creator_id: Option<u64>,
    #[serde(default, deserialize_with = "nullable")]
    pub creator_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_deleted: bool,
    pub category: Category,
    /// IDs of the posts in the pool, in pool order.
    #[serde(default, deserialize_with = "nullable")]
    pub post_ids: Vec<u64>,
    #[serde(default)]
    pub post_count: u64,
}

type CommaSeparated<T> = serde_with::StringWithSeparator<CommaSeparator, T>;

/// A search query returning [`Pool`] instances.
///
/// ```
/// # use e6api::pool::{Query, Order, Category};
/// # use e6api::client::Cursor;
/// let query = Query::new()
///     .name_matches("paw*")
///     .ids([12, 13])
///     .creator_name("someone")
///     .is_active(true)
///     .category(Category::Series)
///     .order(Order::PostCount)
///     .per_page(10)
///     .page(Cursor::Page(2));
/// ```
#[serde_as]
#[derive(Default, Debug, PartialEq, Eq, Serialize, Clone)]
pub struct Query {
    #[serde(
        rename = "search[name_matches]",
        skip_serializing_if = "Option::is_none"
    )]
    name_matches: Option<String>,

    #[serde_as(as = "CommaSeparated<u64>")]
    #[serde(rename = "search[id]", skip_serializing_if = "Vec::is_empty")]
    ids: Vec<u64>,

    #[serde(
        rename = "search[description_matches]",
        skip_serializing_if = "Option::is_none"
    )]
    description_matches: Option<String>,

    #[serde(
        rename = "search[creator_name]",
        skip_serializing_if = "Option::is_none"
    )]
    creator_name: Option<String>,

    #[serde(rename = "search[creator_id]", skip_serializing_if = "Option::is_none")]
    creator_id: Option<u64>,

    #[serde(rename = "search[is_active]", skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,

    #[serde(rename = "search[is_deleted]", skip_serializing_if = "Option::is_none")]
    is_deleted: Option<bool>,

    #[serde(rename = "search[category]", skip_serializing_if = "Option::is_none")]
    category: Option<Category>,

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

    /// Search pool names. `*` matches anything.
    pub fn name_matches<T: Into<String>>(mut self, name: T) -> Self {
        self.name_matches = Some(name.into());
        self
    }

    /// Only return the pools with these IDs.
    pub fn ids<I: IntoIterator<Item = u64>>(mut self, ids: I) -> Self {
        self.ids = ids.into_iter().collect();
        self
    }

    pub fn description_matches<T: Into<String>>(mut self, description: T) -> Self {
        self.description_matches = Some(description.into());
        self
    }

    pub fn creator_name<T: Into<String>>(mut self, name: T) -> Self {
        self.creator_name = Some(name.into());
        self
    }

    pub fn creator_id<T: Into<Option<u64>>>(mut self, id: T) -> Self {
        self.creator_id = id.into();
        self
    }

    /// Whether the pool is active or hidden.
    pub fn is_active<T: Into<Option<bool>>>(mut self, active: T) -> Self {
        self.is_active = active.into();
        self
    }

    pub fn is_deleted<T: Into<Option<bool>>>(mut self, deleted: T) -> Self {
        self.is_deleted = deleted.into();
        self
    }

    pub fn category<T: Into<Option<Category>>>(mut self, category: T) -> Self {
        self.category = category.into();
        self
    }

    pub fn order<T: Into<Option<Order>>>(mut self, order: T) -> Self {
        self.order = order.into();
        self
    }

    /// Set the number of pools to retrieve. Equivalent to the `limit` query parameter.
    pub fn per_page<T: Into<Option<u16>>>(mut self, per_page: T) -> Self {
        self.per_page = per_page.into();
        self
    }

    pub fn page<T: Into<Option<Cursor>>>(mut self, page: T) -> Self {
        self.page = page.into();
        self
    }
}

struct GetPool(u64);

impl Operation for GetPool {
    type Output = Pool;

    fn request(&self, config: &Config) -> E6Result<Request> {
        config.get(&format!("/pools/{}.json", self.0), &client::NO_QUERY)
    }

    fn map(self, payload: Option<JsonValue>) -> E6Result<Pool> {
        from_payload(require(payload)?)
    }
}

struct SearchPools(Query);

impl Operation for SearchPools {
    type Output = Vec<Pool>;

    fn request(&self, config: &Config) -> E6Result<Request> {
        check_per_page(self.0.per_page)?;
        config.get("/pools.json", &self.0)
    }

    fn map(self, payload: Option<JsonValue>) -> E6Result<Vec<Pool>> {
        list_from_payload(payload)
    }
}

fn pool_page(id: u64, page: u64) -> SearchPosts {
    SearchPosts(
        post::Query::new(format!("pool:{}", id))
            .per_page(MAX_PER_PAGE)
            .page(Cursor::Page(page)),
    )
}

fn is_last_page(chunk: &[Post]) -> bool {
    chunk.len() < usize::from(MAX_PER_PAGE)
}

/// Puts `posts` in pool order. Posts missing from `post_ids` go last.
fn sort_by_pool(posts: &mut [Post], post_ids: &[u64]) {
    posts.sort_by_key(|p| {
        post_ids
            .iter()
            .position(|id| *id == p.id)
            .unwrap_or(usize::MAX)
    });
}

impl client::Client {
    /// Returns the pool with the given ID.
    ///
    /// ```no_run
    /// # use e6api::client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> e6api::error::Result<()> {
    /// let client = Client::new("MyProject", "1.0", "username")?;
    /// let pool = client.get_pool(18274).await?;
    ///
    /// for post in pool.posts().await? {
    ///     println!("#{}", post.id);
    /// }
    /// # Ok(()) }
    /// ```
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub async fn get_pool(&self, id: u64) -> E6Result<Linked<'_, Self, Pool>> {
        Ok(self.link(self.execute(GetPool(id)).await?))
    }

    /// Returns the pools matching the query.
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub async fn search_pools(&self, query: Query) -> E6Result<Vec<Linked<'_, Self, Pool>>> {
        let pools = self.execute(SearchPools(query)).await?;
        Ok(pools.into_iter().map(|p| self.link(p)).collect())
    }
}

impl<'c> Linked<'c, client::Client, Pool> {
    /// Fetches the posts of the pool, in pool order.
    ///
    /// _Note: This function performs one request per [`MAX_PER_PAGE`] posts._
    pub async fn posts(&self) -> E6Result<Vec<Linked<'c, client::Client, Post>>> {
        let client = self.client();
        let mut posts = Vec::new();

        for page in 1.. {
            let chunk = client.execute(pool_page(self.id, page)).await?;
            let last = is_last_page(&chunk);
            posts.extend(chunk);

            if last {
                break;
            }
        }

        sort_by_pool(&mut posts, &self.post_ids);
        Ok(posts.into_iter().map(|p| client.link(p)).collect())
    }
}

impl client::blocking::Client {
    /// Returns the pool with the given ID.
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub fn get_pool(&self, id: u64) -> E6Result<Linked<'_, Self, Pool>> {
        Ok(self.link(self.execute(GetPool(id))?))
    }

    /// Returns the pools matching the query.
    ///
    /// _Note: This function performs a request; it will wait for the rate limiter first._
    pub fn search_pools(&self, query: Query) -> E6Result<Vec<Linked<'_, Self, Pool>>> {
        let pools = self.execute(SearchPools(query))?;
        Ok(pools.into_iter().map(|p| self.link(p)).collect())
    }
}

impl<'c> Linked<'c, client::blocking::Client, Pool> {
    /// Fetches the posts of the pool, in pool order.
    pub fn posts(&self) -> E6Result<Vec<Linked<'c, client::blocking::Client, Post>>> {
        let client = self.client();
        let mut posts = Vec::new();

        for page in 1.. {
            let chunk = client.execute(pool_page(self.id, page))?;
            let last = is_last_page(&chunk);
            posts.extend(chunk);

            if last {
                break;
            }
        }

        sort_by_pool(&mut posts, &self.post_ids);
        Ok(posts.into_iter().map(|p| client.link(p)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Client, RateLimit};
    use crate::error::Error;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    fn client(server: &Server) -> Client {
        Client::builder("e6api", "unit_test", "someone")
            .base_url(server.url())
            .rate_limit(RateLimit::new(Duration::ZERO))
            .build()
            .unwrap()
    }

    const POOL_18274: &str = r#"{
        "id": 18274,
        "name": "Paws_and_Claws",
        "created_at": "2019-10-11T21:58:06.505-04:00",
        "updated_at": "2020-03-01T10:01:43.286-05:00",
        "creator_id": 17633,
        "description": "A short comic.",
        "is_active": true,
        "category": "series",
        "is_deleted": false,
        "post_ids": [3, 1, 2],
        "creator_name": "someone_else",
        "post_count": 3
    }"#;

    #[test]
    fn query_serialization() {
        let query = Query::new()
            .name_matches("paw*")
            .ids([12, 13])
            .is_active(true)
            .category(Category::Series)
            .order(Order::PostCount)
            .per_page(10);

        assert_eq!(
            serde_urlencoded::to_string(&query).unwrap(),
            "search%5Bname_matches%5D=paw*\
             &search%5Bid%5D=12%2C13\
             &search%5Bis_active%5D=true\
             &search%5Bcategory%5D=series\
             &search%5Border%5D=post_count\
             &limit=10"
        );
    }

    #[test]
    fn pool_from_json() {
        let pool: Pool = serde_json::from_str(POOL_18274).unwrap();

        assert_eq!(pool.id, 18274);
        assert_eq!(pool.category, Category::Series);
        assert_eq!(pool.post_ids, vec![3, 1, 2]);
        assert!(pool.is_active);
        assert_eq!(pool.creator_name, "someone_else");
    }

    #[tokio::test]
    async fn get_pool_and_posts_in_order() {
        let mut server = Server::new_async().await;
        let client = client(&server);

        let _pool = server
            .mock("GET", "/pools/18274.json")
            .with_body(POOL_18274)
            .create_async()
            .await;
        let posts = server
            .mock("GET", "/posts.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("tags".into(), "pool:18274".into()),
                Matcher::UrlEncoded("limit".into(), "320".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_body(
                r#"{"posts":[
                    {"id":1,"rating":"s"},
                    {"id":2,"rating":"q"},
                    {"id":3,"rating":"s"}
                ]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let pool = client.get_pool(18274).await.unwrap();
        let ids: Vec<u64> = pool.posts().await.unwrap().iter().map(|p| p.id).collect();

        posts.assert_async().await;
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn search_pools_sends_criteria() {
        let mut server = Server::new_async().await;
        let client = client(&server);

        let m = server
            .mock("GET", "/pools.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("search[creator_id]".into(), "17633".into()),
                Matcher::UrlEncoded("search[category]".into(), "series".into()),
            ]))
            .with_body(format!("[{}]", POOL_18274))
            .create_async()
            .await;

        let pools = client
            .search_pools(
                Query::new()
                    .creator_id(17633)
                    .category(Category::Series),
            )
            .await
            .unwrap();

        m.assert_async().await;
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].name, "Paws_and_Claws");
    }

    #[tokio::test]
    async fn no_pools_found() {
        let mut server = Server::new_async().await;
        let client = client(&server);

        let _m = server
            .mock("GET", "/pools.json")
            .match_query(Matcher::Any)
            .with_body(r#"{"pools":[]}"#)
            .create_async()
            .await;

        let pools = client
            .search_pools(Query::new().name_matches("nothing_here"))
            .await
            .unwrap();

        assert!(pools.is_empty());
    }

    #[tokio::test]
    async fn search_pools_above_limit() {
        let server = Server::new_async().await;
        let client = client(&server);

        let res = client.search_pools(Query::new().per_page(500)).await;

        assert!(matches!(res, Err(Error::AboveLimit(_, 500, 320))));
    }

    #[test]
    fn missing_posts_go_last() {
        let mut posts: Vec<Post> = serde_json::from_str(
            r#"[{"id":9,"rating":"s"},{"id":2,"rating":"s"},{"id":1,"rating":"s"}]"#,
        )
        .unwrap();

        sort_by_pool(&mut posts, &[1, 2]);

        assert_eq!(
            posts.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1, 2, 9]
        );
    }
}

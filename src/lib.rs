//! Rate-limited client for the [e621.net](https://e926.net) API, in async and blocking flavors.
//!
//! ## Usage
//!
//! First, create a [`Client`]. You have to describe your project: the User-Agent sent with every
//! request is built from its name, its version and your e621 username, so that you may be
//! contacted if your project causes problems.
//!
//! ```no_run
//! # use e6api::client::Client;
//! # fn main() -> Result<(), e6api::error::Error> {
//! let client = Client::new("MyProject", "1.0", "username")?;
//! # Ok(()) }
//! ```
//!
//! Now it's ready to go! For example you can get post #8595 like this:
//!
//! ```no_run
//! # use e6api::client::Client;
//! # #[tokio::main]
//! # async fn main() -> Result<(), e6api::error::Error> {
//! # let client = Client::new("MyProject", "1.0", "username")?;
//! let post = client.get_post(8595).await?;
//!
//! assert_eq!(post.id, 8595);
//! # Ok(()) }
//! ```
//!
//! Or you can make a search like on the website, using tags:
//!
//! ```no_run
//! # use e6api::client::Client;
//! # #[tokio::main]
//! # async fn main() -> Result<(), e6api::error::Error> {
//! # let client = Client::new("MyProject", "1.0", "username")?;
//! for post in client.search_posts(&["fluffy", "rating:s"][..]).await? {
//!     println!("#{}", post.id);
//! }
//! # Ok(()) }
//! ```
//!
//! Objects returned by a client remember it, so follow-up actions don't need it passed again.
//! Actions that act on behalf of a user need an API key:
//!
//! ```no_run
//! # use e6api::client::Client;
//! # use e6api::post::VoteDirection;
//! # #[tokio::main]
//! # async fn main() -> Result<(), e6api::error::Error> {
//! let client = Client::builder("MyProject", "1.0", "username")
//!     .api_key("0123456789abcdef")
//!     .build()?;
//!
//! let mut post = client.get_post(8595).await?;
//! post.favorite().await?;
//! post.vote(VoteDirection::Up, true).await?;
//! # Ok(()) }
//! ```
//!
//! Without an async runtime, use [`client::blocking::Client`], which offers the same operations.
//!
//! ## Notes from the official API:
//!
//! ### User Agents
//!
//! > A non-empty User-Agent header is required for all requests. Please pick a descriptive
//! > User-Agent for your project. You are encouraged to include your e621 username so that you may
//! > be contacted if your project causes problems. **DO NOT impersonate a browser user agent, as
//! > this will get you blocked.** An example user-agent would be
//! > ```text
//! > MyProject/1.0 (by username on e621)
//! > ```
//! >
//! > [[...]](https://e926.net/help/show/api#basics)
//!
//! Thus, `e6api` doesn't have a default user agent and you are required to describe your project.
//!
//! ### Rate Limiting
//!
//! > E621/E926 have a hard rate limit of two requests per second. This is a hard upper limit and if
//! > you are hitting it, you are already going way too fast. Hitting the rate limit will result in
//! > a 503 HTTP response code. You should make a best effort not to make more than one request per
//! > second over a sustained period.
//!
//! `e6api` enforces this limit with a [`RateLimit`] shared by every client of the process, async
//! and blocking alike: requests are admitted at least [`REQ_COOLDOWN_DURATION`] apart, whichever
//! thread or task makes them. Clients built with their own [`RateLimit`] only share it with the
//! clients they give a clone to.
//!
//! [`Client`]: client::Client
//! [`RateLimit`]: client::RateLimit
//! [`REQ_COOLDOWN_DURATION`]: client::REQ_COOLDOWN_DURATION

mod utils;

/// Client related structures.
pub mod client;

/// Error management.
pub mod error;

/// Post management.
pub mod post;

/// Pool management.
pub mod pool;

/// Note management.
pub mod note;

/// Post flag management.
pub mod flag;

/// User management.
pub mod user;

/// Tag categories and search criteria.
pub mod tag;

use e6api::client::{blocking, Client, RateLimit};
use e6api::error::Error;
use e6api::post::{Post, Query, Rating, VoteDirection};
use e6api::{note, pool};

use mockito::{Matcher, Server};

use std::time::{Duration, Instant};

const SEARCH_BODY: &str = r#"{"posts":[
    {"id":2,"rating":"e","tags":{"general":["fox","solo"]},"score":{"up":3,"down":-1,"total":2}},
    {"id":1,"rating":"s","tags":{"artist":["fuf"]}}
]}"#;

fn blocking_client(server: &Server, rate_limit: RateLimit) -> blocking::Client {
    Client::builder("e6api", "integration_test", "someone")
        .base_url(server.url())
        .rate_limit(rate_limit)
        .build_blocking()
        .unwrap()
}

#[test]
fn blocking_search() {
    let mut server = Server::new();
    let client = blocking_client(&server, RateLimit::new(Duration::ZERO));

    let m = server
        .mock("GET", "/posts.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("tags".into(), "fox order:score".into()),
            Matcher::UrlEncoded("limit".into(), "2".into()),
        ]))
        .match_header("user-agent", "e6api/integration_test (by someone on e621)")
        .with_body(SEARCH_BODY)
        .create();

    let posts = client
        .search_posts(Query::new(["fox", "order:score"]).per_page(2))
        .unwrap();

    m.assert();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].rating, Rating::Explicit);
    assert_eq!(posts[0].score.total, 2);
    assert_eq!(posts[1].tags.artist, vec![String::from("fuf")]);
}

#[test]
fn blocking_no_content_is_empty() {
    let mut server = Server::new();
    let client = blocking_client(&server, RateLimit::new(Duration::ZERO));

    let _m = server
        .mock("GET", "/notes.json")
        .match_query(Matcher::Any)
        .with_status(204)
        .create();

    let notes = client.search_notes(note::Query::new().post_id(1)).unwrap();

    assert!(notes.is_empty());
}

#[test]
fn blocking_api_error() {
    let mut server = Server::new();
    let client = blocking_client(&server, RateLimit::new(Duration::ZERO));

    let _m = server
        .mock("GET", "/pools.json")
        .match_query(Matcher::Any)
        .with_body(r#"{"success":false,"message":"You cannot go beyond page 750."}"#)
        .create();

    match client.search_pools(pool::Query::new().page(e6api::client::Cursor::Page(751))) {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 200);
            assert_eq!(message, "You cannot go beyond page 750.");
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}

#[test]
fn blocking_vote_requires_api_key() {
    let mut server = Server::new();
    let client = blocking_client(&server, RateLimit::new(Duration::ZERO));

    let _get = server
        .mock("GET", "/posts/1.json")
        .with_body(r#"{"post":{"id":1,"rating":"s"}}"#)
        .create();
    let votes = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create();

    let mut post = client.get_post(1).unwrap();

    assert!(matches!(
        post.vote(VoteDirection::Up, true),
        Err(Error::Unauthenticated)
    ));
    votes.assert();
}

#[test]
fn blocking_vote_after_login() {
    let mut server = Server::new();
    let mut client = blocking_client(&server, RateLimit::new(Duration::ZERO));
    client.login("someone", "secret");

    let _get = server
        .mock("GET", "/posts/1.json")
        .match_query(Matcher::Any)
        .with_body(r#"{"post":{"id":1,"rating":"s"}}"#)
        .create();
    let vote = server
        .mock("POST", "/posts/1/votes.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("score".into(), "1".into()),
            Matcher::UrlEncoded("no_unvote".into(), "true".into()),
            Matcher::UrlEncoded("login".into(), "someone".into()),
            Matcher::UrlEncoded("api_key".into(), "secret".into()),
        ]))
        .with_body(r#"{"up":1,"down":0,"score":1,"our_score":1}"#)
        .create();

    let mut post = client.get_post(1).unwrap();
    let result = post.vote(VoteDirection::Up, true).unwrap();

    vote.assert();
    assert_eq!(result.our_score, 1);
    assert_eq!(post.score.total, 1);
}

#[test]
fn clients_sharing_a_limiter_are_paced_together() {
    let mut server = Server::new();
    let limiter = RateLimit::new(Duration::from_millis(200));
    let first = blocking_client(&server, limiter.clone());
    let second = blocking_client(&server, limiter);

    let m = server
        .mock("GET", "/posts/1.json")
        .with_body(r#"{"post":{"id":1,"rating":"s"}}"#)
        .expect(3)
        .create();

    let start = Instant::now();
    first.get_post(1).unwrap();
    second.get_post(1).unwrap();
    first.get_post(1).unwrap();

    m.assert();
    assert!(start.elapsed() >= Duration::from_millis(400));
}

#[test]
fn both_modes_map_the_same_response_identically() {
    let mut server = Server::new();

    let m = server
        .mock("GET", "/posts.json")
        .match_query(Matcher::UrlEncoded("tags".into(), "fox".into()))
        .with_body(SEARCH_BODY)
        .expect(2)
        .create();

    let blocking_posts: Vec<Post> = blocking_client(&server, RateLimit::new(Duration::ZERO))
        .search_posts("fox")
        .unwrap()
        .into_iter()
        .map(|p| p.into_inner())
        .collect();

    let client = Client::builder("e6api", "integration_test", "someone")
        .base_url(server.url())
        .rate_limit(RateLimit::new(Duration::ZERO))
        .build()
        .unwrap();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let async_posts: Vec<Post> = runtime
        .block_on(client.search_posts("fox"))
        .unwrap()
        .into_iter()
        .map(|p| p.into_inner())
        .collect();

    m.assert();
    assert_eq!(blocking_posts, async_posts);
}

use e6api::{client::Client, post::Query};

#[tokio::main]
async fn main() -> e6api::error::Result<()> {
    let client = Client::new("MyProject", "1.0", "username")?;

    println!("Top ten safe fluffy posts!");

    let posts = client
        .search_posts(Query::new(["fluffy", "rating:s", "order:score"]).per_page(10))
        .await?;

    for post in posts {
        println!("- #{} with a score of {}", post.id, post.score.total);
    }

    Ok(())
}

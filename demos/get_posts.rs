use e6api::client::blocking::Client;

fn main() -> e6api::error::Result<()> {
    let client = Client::new("MyProject", "1.0", "username")?;

    println!("Some very specific posts fetched by ID:");

    for id in [8595, 535, 2105, 1470] {
        match client.get_post(id) {
            Ok(post) => println!("- #{} with a score of {}", post.id, post.score.total),
            Err(e) => println!("- couldn't load post: {}", e),
        }
    }

    Ok(())
}

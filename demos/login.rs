use e6api::{client::Client, post::VoteDirection};

macro_rules! input {
    ($($arg:tt)*) => ({
        use std::io::prelude::*;

        print!($($arg)*);

        let mut buffer = String::new();

        std::io::stdout()
            .flush()
            .and_then(|_| std::io::stdin().read_line(&mut buffer))
            .map(move |_| if buffer.trim().is_empty() {
                None
            } else {
                Some(String::from(buffer.trim()))
            })
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server = "https://e926.net";
    let server = input!("Server ({}): ", server)?.unwrap_or_else(|| server.into());

    let login = input!("Login: ")?.unwrap_or_else(|| "username".into());
    let api_key = input!("API key: ")?;

    let mut client = Client::builder("MyProject", "1.0", &login)
        .base_url(server)
        .build()?;

    if let Some(api_key) = api_key {
        client.login(login, api_key);
    }

    let tags = input!("Search terms: ")?.unwrap_or_default();

    for mut post in client.search_posts(&tags).await?.into_iter().take(10) {
        println!("- #{}: {:?}", post.id, post.file.as_ref().and_then(|f| f.url.as_ref()));

        if client.is_authenticated() {
            match post.vote(VoteDirection::Up, true).await {
                Ok(vote) => println!("  upvoted, score is now {}", vote.score),
                Err(e) => println!("  couldn't vote: {}", e),
            }
        }
    }

    Ok(())
}

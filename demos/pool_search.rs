use e6api::{
    client::blocking::Client,
    pool::{Order, Query},
};

fn main() -> e6api::error::Result<()> {
    let client = Client::new("MyProject", "1.0", "username")?;

    println!("Pools by Lynxgriffin!");

    let pools = client.search_pools(
        Query::new()
            .creator_name("Lynxgriffin")
            .order(Order::PostCount)
            .per_page(5),
    )?;

    for pool in pools {
        println!("- {} ({} posts)", pool.name, pool.post_count);

        for post in pool.posts()?.iter().take(3) {
            println!("  - #{}", post.id);
        }
    }

    Ok(())
}

use e6api::client::Client;

#[test]
fn impl_std_error_trait() -> Result<(), Box<dyn std::error::Error>> {
    Client::builder("MyProject", "1.0", "username")
        .base_url("https://e926.net")
        .build()?;

    Ok(())
}

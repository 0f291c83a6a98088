//! Site Builder Backend - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    site_builder_backend::run().await
}

use anyhow::Result;
use solace::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}

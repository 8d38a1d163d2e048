#[tokio::main]
async fn main() -> anyhow::Result<()> {
    earth_news::run().await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    affiliate_showcase::run().await
}

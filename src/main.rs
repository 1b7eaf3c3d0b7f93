#[tokio::main]
async fn main() -> anyhow::Result<()> {
    quotevault::run().await
}

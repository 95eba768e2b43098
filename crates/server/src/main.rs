#[tokio::main]
async fn main() -> anyhow::Result<()> {
    prodmatch_server::start().await
}

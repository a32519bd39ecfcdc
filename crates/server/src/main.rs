#[tokio::main]
async fn main() -> anyhow::Result<()> {
    metaprompt_server::start().await
}

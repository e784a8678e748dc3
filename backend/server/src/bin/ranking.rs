#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::init_tracing();

    server::start_ranking_server().await
}

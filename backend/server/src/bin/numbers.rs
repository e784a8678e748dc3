#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::init_tracing();

    server::start_numbers_server().await
}

use storefront_server::{Config, Server, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    setup_environment(&config)?;

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "storefront server starting"
    );

    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("server error: {e}");
        return Err(e.into());
    }

    Ok(())
}

//! tmibot - Twitch chat bot.

use tracing::info;
use tracing_subscriber::EnvFilter;

use tmibot::{Client, Config, Connection, DispatchChain};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = Config::load(&config_path)?;

    info!(
        host = %config.connection.host,
        nickname = %config.connection.nickname,
        channel = ?config.connection.channel,
        "starting tmibot"
    );

    let conn = Connection::connect(&config.connection).await?;
    let chain = DispatchChain::from_config(&config)?;
    let mut client = Client::new(conn, chain);

    tokio::select! {
        result = client.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("ctrl-c caught, exiting"),
    }
    Ok(())
}

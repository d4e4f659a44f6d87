use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use axl_cli::{commands, Cli, Commands};
use axl_hub::{HttpHub, HubConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => HubConfig::from_file(path)?,
        None => HubConfig::from_env()?,
    };
    let hub = HttpHub::new(config)?;

    match cli.command {
        Commands::List {
            dev,
            tx_start,
            tx_end,
        } => commands::list(&hub, &dev, tx_start, tx_end).await,

        Commands::Ts {
            dev,
            tx_start,
            tx_end,
            start,
            end,
            file,
            gap,
            freq,
        } => {
            commands::ts(
                &hub,
                &dev,
                tx_start,
                tx_end,
                start,
                end,
                file.as_deref(),
                gap,
                freq,
            )
            .await
        }

        Commands::File { dev, storage_id } => commands::file(&hub, &dev, storage_id).await,

        Commands::Monitor {
            dev,
            sleep,
            window,
            delay,
        } => commands::monitor(hub, &dev, sleep, window, delay).await,
    }
}

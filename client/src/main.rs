//! Busy Fool - true-cost margins for coffee shop menus

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use busy_fool_client::commands::{self, output::ErrorOutput, Cli};
use busy_fool_client::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing on stderr so stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "busy_fool=info,busy_fool_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let json = cli.json;

    let config = Config::load()?;
    tracing::debug!("Environment: {}", config.environment);

    if let Err(err) = commands::run(cli, config).await {
        if json {
            commands::output::print_json(&ErrorOutput::from(&err))?;
        }
        return Err(err.into());
    }
    Ok(())
}

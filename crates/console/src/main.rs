use std::sync::Arc;

use clap::Parser;
use heritage_client::HeritageApi;
use heritage_core::vocabulary::Vocabulary;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use heritage_console::commands::{self, Cli, Session};
use heritage_console::config::ConsoleConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heritage_console=info,heritage_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // --- Configuration ---
    let config = ConsoleConfig::from_env();
    tracing::debug!(
        backend_url = %config.backend_url,
        locale = %config.collation_locale,
        "Loaded console configuration"
    );

    let session = Session {
        backend: Arc::new(HeritageApi::new(config.backend_url)),
        vocabulary: Arc::new(Vocabulary::standard()),
        collation_locale: config.collation_locale,
    };

    let mut stdout = std::io::stdout().lock();
    commands::run(cli.command, &session, &mut stdout).await
}

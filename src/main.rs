use anyhow::Context;
use aurum::{
    api::routes,
    auth::clock::SystemClock,
    cli::{self, output::Output, Cli, Commands},
    utils::toml_config::{AurumConfig, LogFormat},
    AppState, MarketData,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = cli.output();

    match &cli.command {
        Some(Commands::Config { validate }) => {
            cli::show_config(&cli.config, *validate, &output)?;
            Ok(())
        }
        None => serve(&cli, &output).await,
    }
}

async fn serve(cli: &Cli, output: &Output) -> anyhow::Result<()> {
    let config = AurumConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    init_tracing(&config, cli.verbose)?;

    let warnings = match config.validate_with_warnings() {
        Ok(warnings) => warnings,
        Err(e) => {
            output.error(&e.to_string());
            return Err(e).context("invalid configuration");
        }
    };
    for warning in &warnings {
        warn!("{}", warning);
    }

    output.banner();

    let secret = config.jwt_secret()?;

    let store = config
        .database_provider()?
        .create_client()
        .await
        .context("connecting to the user store")?;

    let market = MarketData::load(&config.market.assets_dir, &config.market.instruments)
        .context("loading market data")?;

    let addr = config.bind_address();
    let state = AppState::new(config, &secret, store, Arc::new(SystemClock), market)?;
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    output.success(&format!("Listening on http://{}", addr));
    info!(address = %addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

fn init_tracing(config: &AurumConfig, verbose: bool) -> anyhow::Result<()> {
    let default_filter = if verbose {
        "debug"
    } else {
        config.server.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .context("invalid log filter")?;

    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true))
            .try_init()?,
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}

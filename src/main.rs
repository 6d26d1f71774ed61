use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use fasttea::config::{AppKind, Config};
use fasttea::logging::init_tracing;
use fasttea::server::AppServer;

#[derive(Parser, Debug)]
#[command(name = "fasttea")]
#[command(version, about = "Serve a runtime demo application over HTTP")]
struct Args {
    /// Config file (default: the platform config dir, fasttea/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Bind address, overriding server.bind_addr
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<String>,

    /// Demo application to serve, overriding `app`
    #[arg(short, long, value_enum)]
    app: Option<AppKind>,

    /// Log filter, overriding logging.filter (RUST_LOG still wins)
    #[arg(long, value_name = "FILTER")]
    log_filter: Option<String>,
}

/// Read the config file, apply CLI overrides, then validate the result.
fn load_config(args: &Args) -> Result<Config> {
    let path = args.config.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::read_from(&path)
        .with_context(|| format!("loading config from {}", path.display()))?;

    if let Some(bind) = &args.bind {
        config.server.bind_addr = bind.clone();
    }
    if let Some(app) = args.app {
        config.app = app;
    }
    if let Some(filter) = &args.log_filter {
        config.logging.filter = filter.clone();
    }

    config.validate().context("validating config")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let logging = init_tracing(args.log_filter.as_deref().unwrap_or("info"));
    let config = load_config(&args)?;
    if let Err(err) = logging.set_filter(&config.logging.filter) {
        tracing::warn!("Keeping startup log filter: {}", err);
    }

    let mut server = AppServer::new(&config);
    let addr = server
        .try_bind(&config.server.bind_addr)
        .await
        .context("binding HTTP listener")?;
    tracing::info!(app = config.app.name(), "Listening on http://{}", addr);

    server.run().await.context("running server")?;
    Ok(())
}

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::Config;
use crate::server::{self, handlers::DirectoryState, registry::Registry};
use crate::ui::display;

#[derive(Args)]
pub struct ServeArgs {
    /// Listen port
    #[arg(long)]
    pub port: Option<u16>,

    /// Bind address
    #[arg(long)]
    pub bind: Option<String>,

    /// Registry of people, keys and sessions (TOML)
    #[arg(long)]
    pub registry: Option<String>,

    /// Print server health check and exit
    #[arg(long)]
    pub health: bool,
}

pub async fn run(args: ServeArgs, config: &Config) -> Result<()> {
    let defaults = server::ServerConfig::default();
    let server_config = server::ServerConfig {
        port: args.port.or(config.server.port).unwrap_or(defaults.port),
        bind: args
            .bind
            .clone()
            .or_else(|| config.server.bind.clone())
            .unwrap_or(defaults.bind),
    };

    if args.health {
        return check_health(&server_config).await;
    }

    let registry_path = args
        .registry
        .as_deref()
        .or(config.server.registry.as_deref())
        .context("no registry. Pass --registry or set [server] registry")?;
    let registry = Registry::from_file(std::path::Path::new(registry_path))?;

    let people = registry.persons.len();
    let sessions = registry.sessions.len();
    let state = Arc::new(DirectoryState::new(registry));
    let app = server::build_router(state);

    let addr = server_config.addr();
    display::ok(&format!("sealpost directory listening on {}", addr));
    eprintln!("  registry:  {}", registry_path);
    eprintln!("  people:    {}", people);
    eprintln!("  sessions:  {}", sessions);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn check_health(config: &server::ServerConfig) -> Result<()> {
    let url = format!("http://{}/health", config.addr());
    match reqwest::get(&url).await.and_then(|r| r.error_for_status()) {
        Ok(_) => {
            display::ok(&format!("directory is healthy at {}", config.addr()));
            Ok(())
        }
        Err(e) => {
            display::error(&format!("cannot reach {}: {}", url, e));
            std::process::exit(1);
        }
    }
}

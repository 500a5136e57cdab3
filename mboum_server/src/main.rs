mod response;
mod routes;
mod trace;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mboum_lib::{CacheCoordinator, CachedClient, MemoryCache, RedisCache, Settings};

use crate::routes::AppState;

#[derive(Parser)]
#[command(name = "mboum-server")]
#[command(about = "Caching JSON API over the Mboum finance website")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "MBOUM_BIND")]
    bind: Option<String>,

    /// Redis URL for the response cache; caching is disabled when unset
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// Upstream site base URL
    #[arg(long, env = "MBOUM_BASE_URL")]
    base_url: Option<String>,

    /// Directory holding the lookup tables
    #[arg(long, env = "MBOUM_TABLES_DIR")]
    tables_dir: Option<PathBuf>,

    /// Cache in process memory instead of Redis
    #[arg(long)]
    memory_cache: bool,
}

impl Cli {
    fn apply(self, mut settings: Settings) -> (Settings, bool) {
        if let Some(bind) = self.bind {
            settings.bind = bind;
        }
        if let Some(url) = self.redis_url.filter(|u| !u.trim().is_empty()) {
            settings.redis_url = Some(url);
        }
        if let Some(base_url) = self.base_url {
            settings.base_url = base_url;
        }
        if let Some(dir) = self.tables_dir {
            settings.tables_dir = dir;
        }
        (settings, self.memory_cache)
    }
}

async fn build_coordinator(settings: &Settings, memory_cache: bool) -> CacheCoordinator {
    if memory_cache {
        tracing::info!("Using in-memory cache");
        return CacheCoordinator::new(Arc::new(MemoryCache::new()), &settings.cache_namespace);
    }
    let Some(url) = &settings.redis_url else {
        tracing::info!("REDIS_URL not set, caching disabled");
        return CacheCoordinator::disabled();
    };
    match RedisCache::connect(url).await {
        Ok(store) => {
            tracing::info!("Connected to Redis cache");
            CacheCoordinator::new(Arc::new(store), &settings.cache_namespace)
        }
        Err(e) => {
            tracing::warn!("Redis unavailable, caching disabled: {}", e);
            CacheCoordinator::disabled()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mboum=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let (settings, memory_cache) = cli.apply(Settings::from_env());

    let coordinator = build_coordinator(&settings, memory_cache).await;
    let client = CachedClient::from_settings(&settings, coordinator)
        .context("failed to build upstream client")?;
    let app = routes::app(AppState::new(client));

    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind))?;
    tracing::info!("Listening on {}", settings.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

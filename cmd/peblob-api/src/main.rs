//! Entry point: loads configuration, picks the storage and user-directory
//! adapters, and serves the router.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api_adapters::{router, AppState};
use configs::{AppConfig, StorageBackend};
use domains::{PeblobRepository, UserDirectory};
use services::{CreationPolicy, PeblobService};
use storage_adapters::MemoryPeblobRepository;
use user_adapters::{HttpUserDirectory, NullUserDirectory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("loading configuration")?;

    let repo: Arc<dyn PeblobRepository> = match config.storage.backend {
        StorageBackend::Memory => {
            info!("using the in-memory repository; data is lost on restart");
            Arc::new(MemoryPeblobRepository::new())
        }
        StorageBackend::Postgres => postgres_repo(&config).await?,
    };

    let users: Arc<dyn UserDirectory> = match &config.user_service.base_url {
        Some(base_url) => {
            info!(base_url, "user service configured");
            Arc::new(
                HttpUserDirectory::new(
                    base_url.clone(),
                    Duration::from_secs(config.user_service.timeout_secs),
                )
                .context("building the user service client")?,
            )
        }
        None => {
            info!("no user service configured; lookups degrade to not-found");
            Arc::new(NullUserDirectory)
        }
    };

    let policy = CreationPolicy {
        require_name: config.validation.require_name,
        bound_explicit_size: config.validation.bound_explicit_size,
    };
    let service = Arc::new(PeblobService::new(repo, users, policy));
    let app = router(AppState { service });

    let listener = tokio::net::TcpListener::bind(&config.http.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.http.bind_addr))?;
    info!(addr = %config.http.bind_addr, "peblob-api listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(feature = "db-postgres")]
async fn postgres_repo(config: &AppConfig) -> anyhow::Result<Arc<dyn PeblobRepository>> {
    use secrecy::ExposeSecret;
    use storage_adapters::PostgresPeblobRepository;

    let url = config
        .database
        .url
        .as_ref()
        .context("storage.backend is \"postgres\" but database.url is unset")?;
    let repo =
        PostgresPeblobRepository::connect(url.expose_secret(), config.database.max_connections)
            .await
            .context("connecting to postgres")?;
    info!("using the postgres repository");
    Ok(Arc::new(repo))
}

#[cfg(not(feature = "db-postgres"))]
async fn postgres_repo(_config: &AppConfig) -> anyhow::Result<Arc<dyn PeblobRepository>> {
    anyhow::bail!("storage.backend is \"postgres\" but this binary was built without db-postgres")
}

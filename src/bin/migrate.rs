use anyhow::Result;
use shortgo::{config, db::PgDatabase};

/// Applies pending migrations and exits, for deployments that don't let the server do it
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let settings = config::load(None)?;
    let host = settings.database_url.host_str().unwrap_or("unknown host");

    PgDatabase::connect(settings.database_url.as_str()).await?;
    tracing::info!(%host, "urls schema is up to date");

    Ok(())
}

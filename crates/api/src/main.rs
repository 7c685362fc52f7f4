use anyhow::Context;

use vidstream_infra::ServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vidstream_observability::init();

    let config = ServiceConfig::from_env().context("invalid configuration")?;
    if config.jwt_secret_is_default {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let app = vidstream_api::app::build_app(&config)
        .await
        .context("failed to initialise services")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

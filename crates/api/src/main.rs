use std::sync::Arc;

use anyhow::Context;

use keygate_api::app::{build_app, services::build_services};
use keygate_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    keygate_observability::init(config.log_format);

    let (services, report) = build_services(&config).context("bootstrap failed")?;
    if report.admin.is_none() {
        tracing::info!(username = %config.admin_username, "admin principal already provisioned");
    }

    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

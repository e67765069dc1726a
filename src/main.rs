use anyhow::Result;

use room_makeover::{api, config::Config, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "room_makeover=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env();
    let bind_address = format!("0.0.0.0:{}", config.port);

    if config.google_api_key.is_none() {
        tracing::warn!("GOOGLE_API_KEY is not set; generation requests will fail");
    }
    if config.bypass_api_key.is_some() {
        tracing::warn!("bypass API key is configured; X-Api-Key callers skip token verification");
    }

    let state = AppState::new(config).await;
    tracing::info!(
        images_dir = %state.config.images_dir.display(),
        "starting room-makeover"
    );

    let router = api::router(state);
    let tcp_listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("room-makeover listening on http://{bind_address}");

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

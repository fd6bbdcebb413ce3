use stickerchat::{app, config::Config, profiles::ProfileResolver, store, AppState, Stickers};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stickerchat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store = store::open(&config).await?;
    let resolver = ProfileResolver::new(config.github_api_url.clone(), config.git_token.clone())?;
    if config.git_token.is_none() {
        tracing::warn!("GIT_TOKEN not set, profile lookups are unauthenticated");
    }

    let app_state = AppState {
        store,
        resolver,
        stickers: Stickers(config.stickers.clone().into()),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "stickerchat listening");
    axum::serve(listener, app(app_state, config.session_ttl)).await?;

    Ok(())
}

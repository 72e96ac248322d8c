use pakscore::api::router::create_router;
use pakscore::config::AppConfig;
use pakscore::inference::{self, ScoringService};
use pakscore::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    // The payload is read exactly once; a missing artifact is not fatal.
    let payload = inference::load(&config.model_path);
    let service = ScoringService::new(payload);

    let metrics_handle = pakscore::metrics::init_metrics(service.is_loaded())?;

    if config.requires_api_key() {
        tracing::info!("API key required for /predict");
    } else {
        tracing::warn!("API_KEY not set, /predict is unauthenticated");
    }

    let state = AppState {
        config,
        service,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}

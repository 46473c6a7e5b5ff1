use axum::http::{header, HeaderValue, Method};
use server::config::Config;
use server::state::AppState;
use server::{app, db};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use watch_service_cli::fetch::PageFetcher;
use watch_service_cli::summary::Summarizer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env();

    let pool = db::init_db(&config.database_url).await?;
    tracing::info!(database_url = %config.database_url, "database ready");

    let fetcher = PageFetcher::new()?;
    let summarizer = Summarizer::new(config.openai_api_key.clone(), config.openai_model.clone());
    if !summarizer.is_configured() {
        tracing::warn!("OPENAI_API_KEY not set; summaries will degrade to fallback text");
    }

    let state = AppState::new(pool, fetcher, summarizer);

    let cors = match &config.client_url {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let router = app(state).layer(cors);

    tracing::info!(addr = %config.bind_addr, "listening");
    let listener = TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

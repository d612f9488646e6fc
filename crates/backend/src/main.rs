use std::sync::Arc;

use anyhow::Context;
use backend::{
    auth::AuthConfig,
    calendar::GoogleCalendarClient,
    config::AppConfig,
    db,
    llm::OpenAiClient,
    store::{MemoryStore, PgStore},
    AppState,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::parse();
    let auth_config = AuthConfig::from_env().map_err(anyhow::Error::msg)?;

    let http = reqwest::Client::builder()
        .user_agent(concat!("chatcal/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not set, assistant endpoints will fail");
    }
    let llm = OpenAiClient::new(
        http.clone(),
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
    );
    let calendar = GoogleCalendarClient::new(http.clone(), config.calendar_api_url.clone());

    let state = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::establish_connection_pool(url, config.database_tls)?;
            tracing::info!("Database connection pool initialized");
            let store = Arc::new(PgStore::new(pool));
            build_state(store.clone(), store, llm, calendar, auth_config, http, &config)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, chats are kept in memory and lost on restart");
            let store = Arc::new(MemoryStore::new());
            build_state(store.clone(), store, llm, calendar, auth_config, http, &config)
        }
    };

    let app = backend::build_router(
        state,
        config.cors_allowed_origins.as_deref(),
        config.static_dir.as_deref(),
    );

    tracing::info!("Server listening on {}", config.listen);
    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_state(
    chats: Arc<dyn backend::store::ChatRepository>,
    accounts: Arc<dyn backend::store::AccountRepository>,
    llm: OpenAiClient,
    calendar: GoogleCalendarClient,
    auth_config: AuthConfig,
    http: reqwest::Client,
    config: &AppConfig,
) -> AppState {
    AppState {
        chats,
        accounts,
        llm: Arc::new(llm),
        calendar: Arc::new(calendar),
        auth_config,
        http,
        assistant_timezone: config.assistant_timezone,
        enable_debug_routes: config.enable_debug_routes,
    }
}

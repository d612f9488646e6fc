use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::auth;
use crate::blog;
use crate::handlers::{ai, calendar, chat, chats, debug, health};
use crate::AppState;

/// Routes that need a signed-in user.
fn protected_routes(state: &AppState) -> Router<AppState> {
    let mut router = Router::new();

    // The chat document API is served under both of its historical prefixes.
    for prefix in ["/api/chats", "/api/msghist"] {
        router = router
            .route(prefix, get(chats::list_chats).post(chats::create_chat))
            .route(
                &format!("{}/:id", prefix),
                get(chats::get_chat)
                    .put(chats::update_chat)
                    .delete(chats::delete_chat),
            );
    }

    router
        .route("/api/chats/:id/messages", post(chats::append_message))
        .route(
            "/api/chat",
            get(chat::list_full_chats)
                .post(chat::message_or_create)
                .put(chat::replace_messages)
                .patch(chat::rename_chat)
                .delete(chat::delete_chat),
        )
        .route("/api/ai", post(ai::chat_ai))
        .route("/api/calendar", post(calendar::create_events))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
}

fn public_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/health/db", get(health::db_health))
        .route("/api/blog", get(blog::list_posts))
        .route("/api/blog/:slug", get(blog::get_post))
        .route("/api/auth/login", get(auth::auth_login))
        .route("/api/auth/callback", get(auth::auth_callback))
        .route("/api/auth/me", get(auth::auth_me))
        .route("/api/auth/logout", post(auth::auth_logout));

    if state.enable_debug_routes {
        tracing::warn!("Debug routes enabled: /api/debug/chats lists chats of every user");
        router.route("/api/debug/chats", get(debug::list_all_chats))
    } else {
        router
    }
}

/// Assemble the full application router.
///
/// `static_dir`, when it exists, serves a prebuilt front-end for every
/// path the API does not claim.
pub fn build_router(
    state: AppState,
    cors_allowed_origins: Option<&str>,
    static_dir: Option<&str>,
) -> Router {
    let app = Router::new()
        .merge(public_routes(&state))
        .merge(protected_routes(&state))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_allowed_origins))
        .with_state(state);

    match static_dir {
        Some(dir) if std::path::Path::new(dir).exists() => {
            tracing::info!("Serving frontend from {}", dir);
            let index_path = format!("{}/index.html", dir);
            app.fallback_service(ServeDir::new(dir).not_found_service(ServeFile::new(index_path)))
        }
        Some(dir) => {
            tracing::info!("Frontend directory not found at {}, serving API only", dir);
            app
        }
        None => app,
    }
}

/// Build CORS layer from the configured origin list.
///
/// Without an explicit list CORS is permissive (for development only).
pub fn build_cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let Some(origins) = allowed_origins else {
        tracing::warn!(
            "CORS_ALLOWED_ORIGINS not set, using permissive CORS (not recommended for production)"
        );
        return CorsLayer::permissive();
    };

    let origins: Vec<_> = origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            "CORS_ALLOWED_ORIGINS is set but empty, using permissive CORS (not recommended for production)"
        );
        return CorsLayer::permissive();
    }

    tracing::info!("CORS configured for origins: {:?}", origins);
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

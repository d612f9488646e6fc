use std::net::SocketAddr;

use chrono_tz::Tz;
use clap::Parser;

/// Server configuration, read from flags or the environment (after `.env`).
#[derive(Debug, Clone, Parser)]
#[command(name = "chatcal")]
#[command(about = "Chat-driven calendar scheduling API server")]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Postgres connection string. Without it chats live in memory only.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Connect to Postgres over TLS using the webpki root store.
    #[arg(long, env = "DATABASE_TLS", default_value_t = false)]
    pub database_tls: bool,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    pub openai_model: String,

    /// Time zone the assistant uses to resolve relative dates.
    #[arg(long, env = "ASSISTANT_TIMEZONE", default_value = "America/New_York")]
    pub assistant_timezone: Tz,

    /// Google Calendar REST base URL.
    #[arg(
        long,
        env = "GOOGLE_CALENDAR_API_URL",
        default_value = "https://www.googleapis.com/calendar/v3"
    )]
    pub calendar_api_url: String,

    /// Directory of prebuilt front-end assets to serve for non-API paths.
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<String>,

    /// Expose the unauthenticated `/api/debug/chats` listing.
    #[arg(long, env = "ENABLE_DEBUG_ROUTES", default_value_t = false)]
    pub enable_debug_routes: bool,

    /// Comma-separated CORS origins. Unset means permissive CORS.
    #[arg(long, env = "CORS_ALLOWED_ORIGINS")]
    pub cors_allowed_origins: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_flags() {
        let config = AppConfig::try_parse_from(["chatcal"]).unwrap();
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.assistant_timezone, chrono_tz::America::New_York);
        assert!(!config.enable_debug_routes);
    }

    #[test]
    fn flags_override_defaults() {
        let config = AppConfig::try_parse_from([
            "chatcal",
            "--listen",
            "127.0.0.1:8080",
            "--assistant-timezone",
            "Europe/Berlin",
            "--enable-debug-routes",
        ])
        .unwrap();
        assert_eq!(config.listen.port(), 8080);
        assert_eq!(config.assistant_timezone, chrono_tz::Europe::Berlin);
        assert!(config.enable_debug_routes);
    }

    #[test]
    fn rejects_unknown_time_zone() {
        let result = AppConfig::try_parse_from(["chatcal", "--assistant-timezone", "Nowhere/Land"]);
        assert!(result.is_err());
    }
}

//! Session tokens: HS256 JWTs carrying the Google account email as `sub`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::types::{AuthConfig, Claims};

/// Sessions older than this are re-issued on the next authenticated request.
const REFRESH_AFTER_HOURS: i64 = 24;

fn session_claims(
    email: &str,
    name: Option<String>,
    issued_at: DateTime<Utc>,
    lifetime: Duration,
) -> Claims {
    Claims {
        sub: email.to_string(),
        name,
        iat: issued_at.timestamp(),
        exp: (issued_at + lifetime).timestamp(),
    }
}

/// Sign a session for `email` lasting `token_duration_days`.
pub fn create_token(
    config: &AuthConfig,
    email: &str,
    name: Option<String>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = session_claims(
        email,
        name,
        Utc::now(),
        Duration::days(config.token_duration_days),
    );
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), &claims, &key)
}

/// Check signature and expiry, returning the session claims.
pub fn validate_token(
    config: &AuthConfig,
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256)).map(|data| data.claims)
}

pub fn should_refresh(claims: &Claims) -> bool {
    refresh_due(claims, Utc::now())
}

fn refresh_due(claims: &Claims, now: DateTime<Utc>) -> bool {
    now.timestamp() - claims.iat > Duration::hours(REFRESH_AFTER_HOURS).num_seconds()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_config;

    #[test]
    fn round_trips_email_and_name() {
        let config = test_config();
        let token = create_token(&config, "test@example.com", Some("Test User".to_string()))
            .expect("should create token");

        let claims = validate_token(&config, &token).expect("should validate token");
        assert_eq!(claims.sub, "test@example.com");
        assert_eq!(claims.name, Some("Test User".to_string()));
        assert!(!should_refresh(&claims));
    }

    #[test]
    fn rejects_garbage_and_foreign_signatures() {
        let config = test_config();
        assert!(validate_token(&config, "invalid-token").is_err());

        let token = create_token(&config, "test@example.com", None).expect("should create token");
        let mut other = config;
        other.jwt_secret = "wrong-secret".to_string();
        assert!(validate_token(&other, &token).is_err());
    }

    #[test]
    fn day_old_tokens_are_refreshed() {
        let issued = Utc::now() - Duration::days(2);
        let claims = session_claims("a@example.com", None, issued, Duration::days(7));
        assert_eq!(claims.exp - claims.iat, 7 * 86_400);
        assert!(should_refresh(&claims));
        assert!(!refresh_due(&claims, issued + Duration::hours(23)));
    }

    #[test]
    fn expired_sessions_are_rejected() {
        let config = test_config();
        let issued = Utc::now() - Duration::days(10);
        let claims = session_claims("test@example.com", None, issued, Duration::days(7));
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();
        assert!(validate_token(&config, &token).is_err());
    }
}

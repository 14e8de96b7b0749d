use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use drinkroom_core::config::{AuthConfig, OperatorConfig};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::Serialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("no token provided")]
    Missing,
    #[error("invalid token format")]
    Malformed,
    #[error("token invalid")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("unknown operator")]
    UnknownOperator,
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Identity attached to requests that passed [`require_operator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorClaims {
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// bcrypt cost for operator password hashes.
pub const PASSWORD_COST: u32 = 10;

/// bcrypt hash of `password`, the form stored as `password_hash` in config.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash_password_with_cost(password, PASSWORD_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Check `password` against a stored bcrypt hash. A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash.trim()) {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(error = %e, "stored operator password hash is not valid bcrypt");
            false
        }
    }
}

/// Issues and verifies operator bearer tokens.
///
/// Token layout: `base64(username|expiry_unix).base64(hmac_sha256(payload))`.
pub struct OperatorAuth {
    secret: Vec<u8>,
    ttl: Duration,
    operators: Vec<OperatorConfig>,
}

impl OperatorAuth {
    /// `secret_override` wins over the configured secret. With neither, a
    /// random per-process key is used and tokens do not survive a restart.
    pub fn from_config(cfg: &AuthConfig, secret_override: Option<String>) -> Self {
        let secret = match secret_override.or_else(|| cfg.token_secret.clone()) {
            Some(s) => s.into_bytes(),
            None => {
                tracing::warn!("no token secret configured; using an ephemeral key");
                rand::thread_rng().gen::<[u8; 32]>().to_vec()
            }
        };
        Self {
            secret,
            ttl: Duration::hours(i64::from(cfg.token_ttl_hours.max(1))),
            operators: cfg.operators.clone(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret)
            .expect("infallible: HMAC accepts keys of any length")
    }

    /// Check credentials and issue a token. bcrypt verification is
    /// deliberately slow; async callers should run this on a blocking thread.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let operator = self
            .operators
            .iter()
            .find(|o| o.username == username)
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, &operator.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(self.issue(username, now))
    }

    pub fn issue(&self, username: &str, now: DateTime<Utc>) -> IssuedToken {
        let expires_at = now + self.ttl;
        let payload = format!("{username}|{}", expires_at.timestamp());
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let sig = mac.finalize().into_bytes();
        IssuedToken {
            token: format!(
                "{}.{}",
                URL_SAFE_NO_PAD.encode(payload.as_bytes()),
                URL_SAFE_NO_PAD.encode(sig)
            ),
            expires_at,
        }
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<OperatorClaims, AuthError> {
        let (payload_b64, sig_b64) = token.split_once('.').ok_or(AuthError::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::Malformed)?;
        let sig = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| AuthError::Malformed)?;

        let mut mac = self.mac();
        mac.update(&payload);
        mac.verify_slice(&sig).map_err(|_| AuthError::BadSignature)?;

        let payload = String::from_utf8(payload).map_err(|_| AuthError::Malformed)?;
        let (username, exp) = payload.rsplit_once('|').ok_or(AuthError::Malformed)?;
        let exp: i64 = exp.parse().map_err(|_| AuthError::Malformed)?;
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or(AuthError::Malformed)?;
        if expires_at <= now {
            return Err(AuthError::Expired);
        }
        if !self.operators.iter().any(|o| o.username == username) {
            return Err(AuthError::UnknownOperator);
        }
        Ok(OperatorClaims {
            username: username.to_string(),
            expires_at,
        })
    }
}

/// Axum middleware admitting only requests with a valid operator bearer token.
///
/// On success the [`OperatorClaims`] are inserted as a request extension.
pub async fn require_operator(
    State(auth): State<Arc<OperatorAuth>>,
    mut req: Request,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    let result = match header {
        None => Err(AuthError::Missing),
        Some(value) => match value.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => auth.verify(token.trim(), Utc::now()),
            _ => Err(AuthError::Malformed),
        },
    };

    match result {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(reason = %e, path = %req.uri().path(), "operator auth rejected");
            let body = serde_json::json!({ "error": e.to_string() });
            Response::builder()
                .status(401)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("infallible: all header values are valid ASCII")
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn auth() -> OperatorAuth {
        let cfg = AuthConfig {
            token_secret: Some("test-secret".into()),
            token_ttl_hours: 24,
            operators: vec![OperatorConfig {
                username: "landseed".into(),
                password_hash: hash_password_with_cost("hunter2", 4).unwrap(),
            }],
        };
        OperatorAuth::from_config(&cfg, None)
    }

    async fn ok_handler() -> &'static str {
        "ok"
    }

    fn test_app(auth: OperatorAuth) -> Router {
        Router::new()
            .route("/api/orders", get(ok_handler))
            .layer(middleware::from_fn_with_state(Arc::new(auth), require_operator))
    }

    #[test]
    fn login_with_right_password_issues_verifiable_token() {
        let a = auth();
        let now = Utc::now();
        let issued = a.login("landseed", "hunter2", now).unwrap();
        let claims = a.verify(&issued.token, now).unwrap();
        assert_eq!(claims.username, "landseed");
        assert_eq!(claims.expires_at.timestamp(), issued.expires_at.timestamp());
    }

    #[test]
    fn login_with_wrong_password_fails() {
        let a = auth();
        assert_eq!(
            a.login("landseed", "nope", Utc::now()).unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            a.login("ghost", "hunter2", Utc::now()).unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let a = auth();
        let issued = a.issue("landseed", Utc::now() - Duration::days(2));
        assert_eq!(
            a.verify(&issued.token, Utc::now()).unwrap_err(),
            AuthError::Expired
        );
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issued = auth().issue("landseed", Utc::now());
        let other = OperatorAuth::from_config(
            &AuthConfig {
                token_secret: Some("other".into()),
                ..AuthConfig::default()
            },
            None,
        );
        assert_eq!(
            other.verify(&issued.token, Utc::now()).unwrap_err(),
            AuthError::BadSignature
        );
    }

    #[test]
    fn removed_operator_token_is_rejected() {
        let a = auth();
        let issued = a.issue("former-admin", Utc::now());
        assert_eq!(
            a.verify(&issued.token, Utc::now()).unwrap_err(),
            AuthError::UnknownOperator
        );
    }

    #[test]
    fn garbage_token_is_malformed() {
        assert_eq!(
            auth().verify("not-a-token", Utc::now()).unwrap_err(),
            AuthError::Malformed
        );
    }

    #[test]
    fn secret_override_wins() {
        let issued = OperatorAuth::from_config(
            &AuthConfig {
                token_secret: Some("test-secret".into()),
                ..AuthConfig::default()
            },
            Some("env-secret".into()),
        )
        .issue("landseed", Utc::now());
        assert_eq!(
            auth().verify(&issued.token, Utc::now()).unwrap_err(),
            AuthError::BadSignature
        );
    }

    #[tokio::test]
    async fn missing_header_returns_401_json() {
        let resp = test_app(auth())
            .oneshot(Request::builder().uri("/api/orders").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let ct = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(ct.contains("application/json"));
    }

    #[tokio::test]
    async fn non_bearer_header_returns_401() {
        let resp = test_app(auth())
            .oneshot(
                Request::builder()
                    .uri("/api/orders")
                    .header("authorization", "Basic abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_bearer_token_passes_through() {
        let a = auth();
        let token = a.issue("landseed", Utc::now()).token;
        let resp = test_app(a)
            .oneshot(
                Request::builder()
                    .uri("/api/orders")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn password_hash_is_salted_bcrypt() {
        let a = hash_password_with_cost("hunter2", 4).unwrap();
        let b = hash_password_with_cost("hunter2", 4).unwrap();
        assert!(a.starts_with("$2"));
        assert_ne!(a, b);
        assert!(verify_password("hunter2", &a));
        assert!(verify_password("hunter2", &b));
        assert!(!verify_password("hunter3", &a));
    }

    #[test]
    fn default_hash_uses_cost_ten() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$2b$10$"), "{hash}");
        assert!(verify_password("hunter2", &hash));
    }

    #[test]
    fn malformed_stored_hash_never_matches() {
        assert!(!verify_password("hunter2", ""));
        assert!(!verify_password("hunter2", "not-a-bcrypt-hash"));
    }

    #[test]
    fn login_rejects_operator_with_legacy_digest() {
        let cfg = AuthConfig {
            token_secret: Some("test-secret".into()),
            token_ttl_hours: 24,
            operators: vec![OperatorConfig {
                username: "landseed".into(),
                password_hash: "9S-9MrKzuG_4jvbEkGKChfSCrxXdyylUH5S89Saj9sc".into(),
            }],
        };
        let a = OperatorAuth::from_config(&cfg, None);
        assert_eq!(
            a.login("landseed", "hunter2", Utc::now()).unwrap_err(),
            AuthError::InvalidCredentials
        );
    }
}

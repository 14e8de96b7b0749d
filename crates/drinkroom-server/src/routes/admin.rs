use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::{IssuedToken, OperatorClaims};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

/// POST /api/admin/login: exchange operator credentials for a bearer token.
pub async fn login(
    State(app): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<IssuedToken>, AppError> {
    let auth = app.auth.clone();
    let username = body.username.clone();
    let result = tokio::task::spawn_blocking(move || {
        auth.login(&body.username, &body.password, Utc::now())
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;

    match result {
        Ok(issued) => {
            tracing::info!(%username, "operator logged in");
            Ok(Json(issued))
        }
        Err(e) => {
            tracing::warn!(%username, "operator login rejected");
            Err(AppError::unauthorized(e))
        }
    }
}

/// GET /api/admin/me: the operator behind the presented token.
pub async fn me(Extension(claims): Extension<OperatorClaims>) -> Json<OperatorClaims> {
    Json(claims)
}

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use drinkroom_core::order::{Order, OrderDraft, OrderView};
use drinkroom_core::types::parse_date;

use super::{blocking, DateQuery};
use crate::error::AppError;
use crate::state::AppState;

/// POST /api/orders: submit one requester's order against a session.
///
/// Malformed bodies (unknown sweetness, ice or topping values included) are
/// reported as 400 before anything is stored.
pub async fn submit_order(
    State(app): State<AppState>,
    payload: Result<Json<OrderDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let Json(draft) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    let room = app.room.clone();
    let order = blocking(move || room.submit_order(draft)).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders?date=: orders for a day, oldest first (operator only).
pub async fn list_orders(
    State(app): State<AppState>,
    Query(q): Query<DateQuery>,
) -> Result<Json<Vec<OrderView>>, AppError> {
    let date = match q.date {
        Some(d) => parse_date(&d)?,
        None => app.today(),
    };
    let room = app.room.clone();
    let orders = blocking(move || room.list_orders(date)).await?;
    Ok(Json(orders))
}

/// GET /api/orders/days: calendar days that have orders, newest first
/// (operator only).
pub async fn list_order_days(
    State(app): State<AppState>,
) -> Result<Json<Vec<NaiveDate>>, AppError> {
    let room = app.room.clone();
    let days = blocking(move || room.list_order_dates()).await?;
    Ok(Json(days))
}

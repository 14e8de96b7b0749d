use axum::extract::{Path, Query, State};
use axum::Json;
use drinkroom_core::session::Session;
use drinkroom_core::types::parse_date;
use drinkroom_core::vendor::{Vendor, VendorCatalog};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{blocking, DateQuery};
use crate::error::AppError;
use crate::state::{AppState, SharedRoom};

/// A session with its committed vendor resolved.
#[derive(Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: Session,
    pub vendor: Option<Vendor>,
}

fn view(room: &SharedRoom, session: Session) -> drinkroom_core::Result<SessionView> {
    let vendor = match session.chosen_vendor {
        Some(id) => room.catalog().get(id)?,
        None => None,
    };
    Ok(SessionView { session, vendor })
}

/// GET /api/room/today: today's session, or `null` before the first draw.
pub async fn get_today(State(app): State<AppState>) -> Result<Json<Option<SessionView>>, AppError> {
    let date = app.today();
    let room = app.room.clone();
    let result = blocking(move || {
        room.get_session(date)?
            .map(|s| view(&room, s))
            .transpose()
    })
    .await?;
    Ok(Json(result))
}

/// GET /api/room/{date}: the session for a specific day, or `null`.
pub async fn get_for_date(
    State(app): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Option<SessionView>>, AppError> {
    let date = parse_date(&date)?;
    let room = app.room.clone();
    let result = blocking(move || {
        room.get_session(date)?
            .map(|s| view(&room, s))
            .transpose()
    })
    .await?;
    Ok(Json(result))
}

#[derive(Deserialize, Default)]
pub struct DrawBody {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub force_reroll: bool,
}

#[derive(Serialize)]
pub struct DrawResponse {
    pub session_id: Uuid,
    pub reroll_count: u32,
    pub vendor: Vendor,
    pub session: Session,
}

/// POST /api/room/draw: propose a random vendor for today.
pub async fn draw(
    State(app): State<AppState>,
    Json(body): Json<DrawBody>,
) -> Result<Json<DrawResponse>, AppError> {
    let date = app.today();
    let region = app.region_or_default(body.region);
    let force = body.force_reroll;
    let room = app.room.clone();
    let outcome = blocking(move || room.draw(date, &region, force)).await?;

    Ok(Json(DrawResponse {
        session_id: outcome.session.id,
        reroll_count: outcome.session.reroll_count,
        vendor: outcome.candidate,
        session: outcome.session,
    }))
}

#[derive(Deserialize)]
pub struct LockBody {
    pub session_id: Uuid,
    pub vendor_id: Uuid,
    pub decider_name: String,
}

/// POST /api/room/lock: commit a vendor and decider to a session.
pub async fn lock(
    State(app): State<AppState>,
    Json(body): Json<LockBody>,
) -> Result<Json<SessionView>, AppError> {
    let room = app.room.clone();
    let result = blocking(move || {
        let session = room.lock(body.session_id, body.vendor_id, &body.decider_name)?;
        view(&room, session)
    })
    .await?;
    Ok(Json(result))
}

/// POST /api/room/reset: delete a day's session and orders (operator only).
pub async fn reset_day(
    State(app): State<AppState>,
    Query(q): Query<DateQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let date = match q.date {
        Some(d) => parse_date(&d)?,
        None => app.today(),
    };
    let room = app.room.clone();
    let summary = blocking(move || room.reset_day(date)).await?;

    Ok(Json(serde_json::json!({
        "message": format!("room for {date} reset"),
        "date": date,
        "session_removed": summary.session_removed,
        "orders_removed": summary.orders_removed,
    })))
}

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use drinkroom_core::vendor::{Vendor, VendorDraft, VendorPatch};
use serde::Deserialize;
use uuid::Uuid;

use super::blocking;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RegionQuery {
    pub region: Option<String>,
}

/// GET /api/vendors/random?region=: a random active vendor, no session involved.
pub async fn random_vendor(
    State(app): State<AppState>,
    Query(q): Query<RegionQuery>,
) -> Result<Json<Vendor>, AppError> {
    let region = app.region_or_default(q.region);
    let room = app.room.clone();
    let vendor = blocking(move || room.random_vendor(&region)).await?;
    Ok(Json(vendor))
}

/// GET /api/vendors: the full catalog, newest first.
pub async fn list_vendors(State(app): State<AppState>) -> Result<Json<Vec<Vendor>>, AppError> {
    let room = app.room.clone();
    let vendors = blocking(move || room.db().list_vendors()).await?;
    Ok(Json(vendors))
}

/// POST /api/vendors: add a vendor to the catalog.
pub async fn create_vendor(
    State(app): State<AppState>,
    Json(draft): Json<VendorDraft>,
) -> Result<(StatusCode, Json<Vendor>), AppError> {
    let room = app.room.clone();
    let vendor = blocking(move || room.db().create_vendor(draft)).await?;
    Ok((StatusCode::CREATED, Json(vendor)))
}

/// PUT /api/vendors/{id}: partial update.
pub async fn update_vendor(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<VendorPatch>,
) -> Result<Json<Vendor>, AppError> {
    let room = app.room.clone();
    let vendor = blocking(move || room.db().update_vendor(id, patch)).await?;
    Ok(Json(vendor))
}

/// DELETE /api/vendors/{id}
pub async fn delete_vendor(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let room = app.room.clone();
    blocking(move || room.db().delete_vendor(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Request handlers. Each one is a thin translation between wire shapes and
//! `PeblobService`; the error mapping lives in [`crate::error`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::dto::{
    BrightnessQuery, CreatePeblobRequest, DeletedCountResponse, DominantColorResponse,
    HealthResponse, PeblobResponse, PtiblobDto, RandomQuery, UpdatePeblobRequest,
};
use crate::error::ApiError;
use crate::router::AppState;

type PeblobListResponse = Json<Vec<PeblobResponse>>;

fn to_list(peblobs: Vec<domains::Peblob>) -> PeblobListResponse {
    Json(peblobs.into_iter().map(PeblobResponse::from).collect())
}

pub async fn welcome() -> &'static str {
    "Welcome to the Peblob API"
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreatePeblobRequest>,
) -> Result<(StatusCode, Json<PeblobResponse>), ApiError> {
    let created = state.service.create(body.into_new_peblob()?).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn create_random(
    State(state): State<AppState>,
    Query(query): Query<RandomQuery>,
) -> Result<(StatusCode, Json<PeblobResponse>), ApiError> {
    let created = state.service.create_random(query.name, query.size).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn find_all(State(state): State<AppState>) -> Result<PeblobListResponse, ApiError> {
    Ok(to_list(state.service.find_all().await?))
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PeblobResponse>, ApiError> {
    Ok(Json(state.service.get(id).await?.into()))
}

pub async fn find_by_size(
    State(state): State<AppState>,
    Path(size): Path<usize>,
) -> Result<PeblobListResponse, ApiError> {
    Ok(to_list(state.service.find_by_size(size).await?))
}

pub async fn find_by_brightness(
    State(state): State<AppState>,
    Query(query): Query<BrightnessQuery>,
) -> Result<PeblobListResponse, ApiError> {
    Ok(to_list(
        state
            .service
            .find_by_brightness_range(query.min, query.max)
            .await?,
    ))
}

pub async fn find_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<PeblobListResponse, ApiError> {
    Ok(to_list(state.service.find_by_user(&user_id).await?))
}

pub async fn find_public(State(state): State<AppState>) -> Result<PeblobListResponse, ApiError> {
    Ok(to_list(state.service.find_public().await?))
}

pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<domains::StatusCounts>, ApiError> {
    Ok(Json(state.service.stats().await?))
}

pub async fn user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<services::UserStats>, ApiError> {
    Ok(Json(state.service.user_stats(&user_id).await?))
}

pub async fn dominant_color(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DominantColorResponse>, ApiError> {
    Ok(Json(state.service.dominant_color(id).await?.into()))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePeblobRequest>,
) -> Result<Json<PeblobResponse>, ApiError> {
    let updated = state.service.update(id, body.into_patch()?).await?;
    Ok(Json(updated.into()))
}

pub async fn update_cell(
    State(state): State<AppState>,
    Path((id, row, col)): Path<(Uuid, usize, usize)>,
    Json(cell): Json<PtiblobDto>,
) -> Result<Json<PeblobResponse>, ApiError> {
    let updated = state
        .service
        .update_cell(id, row, col, cell.r, cell.g, cell.b)
        .await?;
    Ok(Json(updated.into()))
}

pub async fn transfer(
    State(state): State<AppState>,
    Path((id, new_user_id)): Path<(Uuid, String)>,
) -> Result<Json<PeblobResponse>, ApiError> {
    let updated = state.service.transfer_owner(id, &new_user_id).await?;
    Ok(Json(updated.into()))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.service.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_all_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DeletedCountResponse>, ApiError> {
    let deleted_count = state.service.remove_all_for_user(&user_id).await?;
    Ok(Json(DeletedCountResponse { deleted_count }))
}

//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for the access rules.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::auth::AuthenticatedUser;
use super::dto::HealthResponse;
use super::error::AppError;
use super::state::AppState;
use crate::models::{Hotel, HotelId, HotelWithRooms};
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

pub const HOTEL_ID_REQUIRED: &str = "HotelId Must Be Sent As Parameter";

/// GET /health
///
/// Reports whether the service is up and the repository reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

/// GET /hotels
pub async fn list_hotels(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> HandlerResult<Vec<Hotel>> {
    let hotels = services::list_hotels(state.repository.as_ref(), user.user_id).await?;
    Ok(Json(hotels))
}

/// GET /hotels/{hotel_id}
///
/// The id must be a non-zero integer; negative ids are accepted and match
/// nothing.
pub async fn get_hotel_with_rooms(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_id): Path<String>,
) -> HandlerResult<HotelWithRooms> {
    let hotel_id = parse_hotel_id(&raw_id)?;
    let hotel =
        services::get_hotel_with_rooms(state.repository.as_ref(), user.user_id, hotel_id).await?;
    Ok(Json(hotel))
}

/// GET /hotels/
pub async fn missing_hotel_id() -> AppError {
    AppError::BadRequest(HOTEL_ID_REQUIRED.to_string())
}

pub(crate) fn parse_hotel_id(raw: &str) -> Result<HotelId, AppError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id != 0 => Ok(HotelId(id)),
        _ => Err(AppError::BadRequest(HOTEL_ID_REQUIRED.to_string())),
    }
}

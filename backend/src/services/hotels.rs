//! Hotel queries gated by the access rules.

use log::debug;

use super::eligibility::check_eligibility;
use super::error::{ServiceError, ServiceResult};
use crate::db::repository::FullRepository;
use crate::models::{Hotel, HotelId, HotelWithRooms, UserId};

/// List every hotel for an eligible user.
///
/// An empty inventory is reported as `NotFound`.
pub async fn list_hotels<R>(repo: &R, user_id: UserId) -> ServiceResult<Vec<Hotel>>
where
    R: FullRepository + ?Sized,
{
    check_eligibility(repo, user_id).await?;

    let hotels = repo.list_hotels().await?;
    if hotels.is_empty() {
        debug!("no hotels registered");
        return Err(ServiceError::NotFound);
    }
    Ok(hotels)
}

/// Fetch one hotel and its rooms for an eligible user.
pub async fn get_hotel_with_rooms<R>(
    repo: &R,
    user_id: UserId,
    hotel_id: HotelId,
) -> ServiceResult<HotelWithRooms>
where
    R: FullRepository + ?Sized,
{
    check_eligibility(repo, user_id).await?;

    repo.find_hotel_with_rooms(hotel_id)
        .await?
        .ok_or(ServiceError::NotFound)
}

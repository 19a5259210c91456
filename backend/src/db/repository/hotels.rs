//! Hotel inventory reads.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Hotel, HotelId, HotelWithRooms};

#[async_trait]
pub trait HotelRepository: Send + Sync {
    /// List every hotel, ordered by id.
    async fn list_hotels(&self) -> RepositoryResult<Vec<Hotel>>;

    /// Fetch one hotel with its rooms (ordered by id).
    ///
    /// # Returns
    /// * `Ok(Some(HotelWithRooms))` - The hotel and its rooms
    /// * `Ok(None)` - No hotel with this id
    /// * `Err(RepositoryError)` - If the operation fails
    async fn find_hotel_with_rooms(
        &self,
        hotel_id: HotelId,
    ) -> RepositoryResult<Option<HotelWithRooms>>;
}

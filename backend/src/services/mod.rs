//! Service layer for business logic and orchestration.
//!
//! Services sit between the HTTP handlers and the repository traits. They
//! enforce the hotel access rules and translate absent records into
//! [`ServiceError`] variants; they never talk HTTP.

pub mod eligibility;
pub mod error;
pub mod hotels;

pub use eligibility::{
    check_eligibility, MISSING_PAYMENT, TICKET_WITHOUT_HOTEL, TICKET_TYPE_REMOTE,
};
pub use error::{ServiceError, ServiceResult};
pub use hotels::{get_hotel_with_rooms, list_hotels};

//! Hotel access rules applied before any hotel data is returned.

use log::debug;

use super::error::{ServiceError, ServiceResult};
use crate::db::repository::AccessRepository;
use crate::models::{TicketWithType, UserId};

pub const MISSING_PAYMENT: &str = "Missing Payment";
pub const TICKET_TYPE_REMOTE: &str = "Ticket type is remote";
pub const TICKET_WITHOUT_HOTEL: &str = "Ticket Does Not Include Hotel";

/// Verify that a user may see hotel data and return their ticket.
///
/// The checks run in a fixed order and stop at the first failure, so a ticket
/// violating several rules always reports the earliest one:
///
/// 1. the user has an enrollment (`NotFound`)
/// 2. the enrollment has a ticket (`NotFound`)
/// 3. the ticket is paid (`PaymentRequired("Missing Payment")`)
/// 4. the ticket type is not remote (`PaymentRequired("Ticket type is remote")`)
/// 5. the ticket type includes hotel (`PaymentRequired("Ticket Does Not Include Hotel")`)
pub async fn check_eligibility<R>(repo: &R, user_id: UserId) -> ServiceResult<TicketWithType>
where
    R: AccessRepository + ?Sized,
{
    let enrollment = repo
        .find_enrollment_by_user(user_id)
        .await?
        .ok_or_else(|| {
            debug!("user {} has no enrollment", user_id);
            ServiceError::NotFound
        })?;

    let ticket = repo
        .find_ticket_by_enrollment(enrollment.id)
        .await?
        .ok_or_else(|| {
            debug!("enrollment {} has no ticket", enrollment.id);
            ServiceError::NotFound
        })?;

    let rejection = if !ticket.is_paid() {
        Some(MISSING_PAYMENT)
    } else if ticket.ticket_type.is_remote {
        Some(TICKET_TYPE_REMOTE)
    } else if !ticket.ticket_type.includes_hotel {
        Some(TICKET_WITHOUT_HOTEL)
    } else {
        None
    };

    match rejection {
        Some(reason) => {
            debug!("user {} denied hotel access: {}", user_id, reason);
            Err(ServiceError::payment_required(reason))
        }
        None => Ok(ticket),
    }
}

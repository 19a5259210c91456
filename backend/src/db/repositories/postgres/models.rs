use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{enrollments, hotels, rooms, sessions, ticket_types, tickets};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{
    Enrollment, EnrollmentId, Hotel, HotelId, Room, RoomId, Session, SessionId, Ticket, TicketId,
    TicketStatus, TicketType, TicketTypeId, UserId,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SessionRow {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: SessionId(row.id),
            user_id: UserId(row.user_id),
            token: row.token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = enrollments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EnrollmentRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub cpf: String,
    pub birthday: NaiveDate,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Enrollment {
            id: EnrollmentId(row.id),
            user_id: UserId(row.user_id),
            name: row.name,
            cpf: row.cpf,
            birthday: row.birthday,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ticket_types)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TicketTypeRow {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub is_remote: bool,
    pub includes_hotel: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TicketTypeRow> for TicketType {
    fn from(row: TicketTypeRow) -> Self {
        TicketType {
            id: TicketTypeId(row.id),
            name: row.name,
            price: row.price,
            is_remote: row.is_remote,
            includes_hotel: row.includes_hotel,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TicketRow {
    pub id: i64,
    pub ticket_type_id: i64,
    pub enrollment_id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = RepositoryError;

    fn try_from(row: TicketRow) -> RepositoryResult<Self> {
        let status: TicketStatus = row.status.parse().map_err(|e: String| {
            RepositoryError::internal_with_context(
                e,
                ErrorContext::new("decode_ticket")
                    .with_entity("ticket")
                    .with_entity_id(row.id),
            )
        })?;

        Ok(Ticket {
            id: TicketId(row.id),
            ticket_type_id: TicketTypeId(row.ticket_type_id),
            enrollment_id: EnrollmentId(row.enrollment_id),
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = hotels)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HotelRow {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HotelRow> for Hotel {
    fn from(row: HotelRow) -> Self {
        Hotel {
            id: HotelId(row.id),
            name: row.name,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RoomRow {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub hotel_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: RoomId(row.id),
            name: row.name,
            capacity: row.capacity,
            hotel_id: HotelId(row.hotel_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sessions)]
pub struct NewSessionRow {
    pub user_id: i64,
    pub token: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = enrollments)]
pub struct NewEnrollmentRow {
    pub user_id: i64,
    pub name: String,
    pub cpf: String,
    pub birthday: NaiveDate,
    pub phone: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = ticket_types)]
pub struct NewTicketTypeRow {
    pub name: String,
    pub price: i64,
    pub is_remote: bool,
    pub includes_hotel: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tickets)]
pub struct NewTicketRow {
    pub ticket_type_id: i64,
    pub enrollment_id: i64,
    pub status: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = hotels)]
pub struct NewHotelRow {
    pub name: String,
    pub image: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = rooms)]
pub struct NewRoomRow {
    pub name: String,
    pub capacity: i32,
    pub hotel_id: i64,
}

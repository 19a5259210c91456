//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data lives in ordered
//! maps behind a single lock, giving fast, deterministic and isolated
//! execution.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::db::fixture::{
    Fixture, NewEnrollment, NewHotel, NewRoom, NewSession, NewTicket, NewTicketType,
};
use crate::db::repository::*;
use crate::models::*;

/// In-memory local repository.
///
/// Cloning shares the underlying data, so a test can keep a handle for
/// seeding while the router owns another.
///
/// # Example
/// ```
/// use hotel_access::db::fixture::NewEnrollment;
/// use hotel_access::db::repositories::LocalRepository;
/// use hotel_access::db::repository::AccessRepository;
/// use hotel_access::models::UserId;
///
/// # tokio_test_block(async {
/// let repo = LocalRepository::new();
/// repo.insert_enrollment(NewEnrollment::for_user(UserId(1))).unwrap();
///
/// let enrollment = repo.find_enrollment_by_user(UserId(1)).await.unwrap();
/// assert!(enrollment.is_some());
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    sessions: BTreeMap<SessionId, Session>,
    enrollments: BTreeMap<EnrollmentId, Enrollment>,
    ticket_types: BTreeMap<TicketTypeId, TicketType>,
    tickets: BTreeMap<TicketId, Ticket>,
    hotels: BTreeMap<HotelId, Hotel>,
    rooms: BTreeMap<RoomId, Room>,

    // Per-table ID sequences
    next_ids: IdSequences,

    // Connection health
    is_healthy: bool,
}

#[derive(Default)]
struct IdSequences {
    session: i64,
    enrollment: i64,
    ticket_type: i64,
    ticket: i64,
    hotel: i64,
    room: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            sessions: BTreeMap::new(),
            enrollments: BTreeMap::new(),
            ticket_types: BTreeMap::new(),
            tickets: BTreeMap::new(),
            hotels: BTreeMap::new(),
            rooms: BTreeMap::new(),
            next_ids: IdSequences::default(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated from a fixture file.
    pub fn from_fixture_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let repo = Self::new();
        repo.load_fixture(&Fixture::from_file(path)?)?;
        Ok(repo)
    }

    /// Insert every record of a fixture, in dependency order.
    pub fn load_fixture(&self, fixture: &Fixture) -> RepositoryResult<()> {
        for session in &fixture.sessions {
            self.create_session_with(session.clone())?;
        }
        for enrollment in &fixture.enrollments {
            self.insert_enrollment(enrollment.clone())?;
        }
        for ticket_type in &fixture.ticket_types {
            self.insert_ticket_type(ticket_type.clone());
        }
        for ticket in &fixture.tickets {
            self.insert_ticket(ticket.clone())?;
        }
        for hotel in &fixture.hotels {
            self.insert_hotel(hotel.clone());
        }
        for room in &fixture.rooms {
            self.insert_room(room.clone())?;
        }

        log::info!(
            "Loaded fixture: {} sessions, {} enrollments, {} tickets, {} hotels, {} rooms",
            fixture.sessions.len(),
            fixture.enrollments.len(),
            fixture.tickets.len(),
            fixture.hotels.len(),
            fixture.rooms.len()
        );
        Ok(())
    }

    /// Open a session for a user with a freshly generated token.
    pub fn create_session(&self, user_id: UserId) -> Session {
        let mut data = self.data.write();
        insert_session(&mut data, user_id, uuid::Uuid::new_v4().to_string())
    }

    /// Open a session, keeping the token given in the record if any.
    pub fn create_session_with(&self, new: NewSession) -> RepositoryResult<Session> {
        let mut data = self.data.write();
        let token = new
            .token
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        if data.sessions.values().any(|s| s.token == token) {
            return Err(RepositoryError::validation_with_context(
                "Session token already in use",
                ErrorContext::new("create_session").with_entity("session"),
            ));
        }
        Ok(insert_session(&mut data, new.user_id, token))
    }

    /// Add an enrollment. A user may own at most one.
    pub fn insert_enrollment(&self, new: NewEnrollment) -> RepositoryResult<Enrollment> {
        let mut data = self.data.write();
        if data.enrollments.values().any(|e| e.user_id == new.user_id) {
            return Err(RepositoryError::validation_with_context(
                "User already has an enrollment",
                ErrorContext::new("insert_enrollment")
                    .with_entity("enrollment")
                    .with_details(format!("user_id={}", new.user_id)),
            ));
        }

        let now = Utc::now();
        let enrollment = Enrollment {
            id: EnrollmentId(next(&mut data.next_ids.enrollment)),
            user_id: new.user_id,
            name: new.name,
            cpf: new.cpf,
            birthday: new.birthday,
            phone: new.phone,
            created_at: now,
            updated_at: now,
        };
        data.enrollments.insert(enrollment.id, enrollment.clone());
        Ok(enrollment)
    }

    pub fn insert_ticket_type(&self, new: NewTicketType) -> TicketType {
        let mut data = self.data.write();
        let now = Utc::now();
        let ticket_type = TicketType {
            id: TicketTypeId(next(&mut data.next_ids.ticket_type)),
            name: new.name,
            price: new.price,
            is_remote: new.is_remote,
            includes_hotel: new.includes_hotel,
            created_at: now,
            updated_at: now,
        };
        data.ticket_types.insert(ticket_type.id, ticket_type.clone());
        ticket_type
    }

    /// Add a ticket. Both the enrollment and the ticket type must exist, and
    /// an enrollment holds at most one ticket.
    pub fn insert_ticket(&self, new: NewTicket) -> RepositoryResult<Ticket> {
        let mut data = self.data.write();
        if !data.enrollments.contains_key(&new.enrollment_id) {
            return Err(RepositoryError::not_found_with_context(
                "Enrollment does not exist",
                ErrorContext::new("insert_ticket")
                    .with_entity("enrollment")
                    .with_entity_id(new.enrollment_id),
            ));
        }
        if !data.ticket_types.contains_key(&new.ticket_type_id) {
            return Err(RepositoryError::not_found_with_context(
                "Ticket type does not exist",
                ErrorContext::new("insert_ticket")
                    .with_entity("ticket_type")
                    .with_entity_id(new.ticket_type_id),
            ));
        }
        if data
            .tickets
            .values()
            .any(|t| t.enrollment_id == new.enrollment_id)
        {
            return Err(RepositoryError::validation_with_context(
                "Enrollment already has a ticket",
                ErrorContext::new("insert_ticket")
                    .with_entity("ticket")
                    .with_details(format!("enrollment_id={}", new.enrollment_id)),
            ));
        }

        let now = Utc::now();
        let ticket = Ticket {
            id: TicketId(next(&mut data.next_ids.ticket)),
            ticket_type_id: new.ticket_type_id,
            enrollment_id: new.enrollment_id,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        data.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    pub fn insert_hotel(&self, new: NewHotel) -> Hotel {
        let mut data = self.data.write();
        let now = Utc::now();
        let hotel = Hotel {
            id: HotelId(next(&mut data.next_ids.hotel)),
            name: new.name,
            image: new.image,
            created_at: now,
            updated_at: now,
        };
        data.hotels.insert(hotel.id, hotel.clone());
        hotel
    }

    pub fn insert_room(&self, new: NewRoom) -> RepositoryResult<Room> {
        let mut data = self.data.write();
        if !data.hotels.contains_key(&new.hotel_id) {
            return Err(RepositoryError::not_found_with_context(
                "Hotel does not exist",
                ErrorContext::new("insert_room")
                    .with_entity("hotel")
                    .with_entity_id(new.hotel_id),
            ));
        }

        let now = Utc::now();
        let room = Room {
            id: RoomId(next(&mut data.next_ids.room)),
            name: new.name,
            capacity: new.capacity,
            hotel_id: new.hotel_id,
            created_at: now,
            updated_at: now,
        };
        data.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    /// Set the health status for testing connection failures.
    ///
    /// While unhealthy, every read fails with a connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Get the number of hotels stored.
    pub fn hotel_count(&self) -> usize {
        self.data.read().hotels.len()
    }

    fn ensure_available(data: &LocalData, operation: &str) -> RepositoryResult<()> {
        if data.is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection_with_context(
                "Local repository is unavailable",
                ErrorContext::new(operation),
            ))
        }
    }
}

fn insert_session(data: &mut LocalData, user_id: UserId, token: String) -> Session {
    let now = Utc::now();
    let session = Session {
        id: SessionId(next(&mut data.next_ids.session)),
        user_id,
        token,
        created_at: now,
        updated_at: now,
    };
    data.sessions.insert(session.id, session.clone());
    session
}

#[async_trait]
impl AccessRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn find_session_by_token(&self, token: &str) -> RepositoryResult<Option<Session>> {
        let data = self.data.read();
        Self::ensure_available(&data, "find_session_by_token")?;
        Ok(data.sessions.values().find(|s| s.token == token).cloned())
    }

    async fn find_enrollment_by_user(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<Enrollment>> {
        let data = self.data.read();
        Self::ensure_available(&data, "find_enrollment_by_user")?;
        Ok(data
            .enrollments
            .values()
            .find(|e| e.user_id == user_id)
            .cloned())
    }

    async fn find_ticket_by_enrollment(
        &self,
        enrollment_id: EnrollmentId,
    ) -> RepositoryResult<Option<TicketWithType>> {
        let data = self.data.read();
        Self::ensure_available(&data, "find_ticket_by_enrollment")?;

        let Some(ticket) = data
            .tickets
            .values()
            .find(|t| t.enrollment_id == enrollment_id)
        else {
            return Ok(None);
        };

        let ticket_type = data.ticket_types.get(&ticket.ticket_type_id).ok_or_else(|| {
            RepositoryError::internal_with_context(
                "Ticket references a missing ticket type",
                ErrorContext::new("find_ticket_by_enrollment")
                    .with_entity("ticket")
                    .with_entity_id(ticket.id),
            )
        })?;

        Ok(Some(TicketWithType {
            ticket: ticket.clone(),
            ticket_type: ticket_type.clone(),
        }))
    }
}

#[async_trait]
impl HotelRepository for LocalRepository {
    async fn list_hotels(&self) -> RepositoryResult<Vec<Hotel>> {
        let data = self.data.read();
        Self::ensure_available(&data, "list_hotels")?;
        Ok(data.hotels.values().cloned().collect())
    }

    async fn find_hotel_with_rooms(
        &self,
        hotel_id: HotelId,
    ) -> RepositoryResult<Option<HotelWithRooms>> {
        let data = self.data.read();
        Self::ensure_available(&data, "find_hotel_with_rooms")?;

        Ok(data.hotels.get(&hotel_id).map(|hotel| HotelWithRooms {
            hotel: hotel.clone(),
            rooms: data
                .rooms
                .values()
                .filter(|r| r.hotel_id == hotel_id)
                .cloned()
                .collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paid_ticket_for(repo: &LocalRepository, user_id: UserId) -> Ticket {
        let enrollment = repo
            .insert_enrollment(NewEnrollment::for_user(user_id))
            .unwrap();
        let ticket_type = repo.insert_ticket_type(NewTicketType::in_person_with_hotel());
        repo.insert_ticket(NewTicket {
            enrollment_id: enrollment.id,
            ticket_type_id: ticket_type.id,
            status: TicketStatus::Paid,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().await.unwrap());

        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_unhealthy_repository_fails_reads() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);

        let err = repo.list_hotels().await.unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
        assert_eq!(err.context().operation.as_deref(), Some("list_hotels"));
    }

    #[tokio::test]
    async fn test_session_lookup_by_token() {
        let repo = LocalRepository::new();
        let session = repo.create_session(UserId(9));

        let found = repo.find_session_by_token(&session.token).await.unwrap();
        assert_eq!(found.map(|s| s.user_id), Some(UserId(9)));
        assert!(repo.find_session_by_token("nope").await.unwrap().is_none());
    }

    #[test]
    fn test_duplicate_session_token_rejected() {
        let repo = LocalRepository::new();
        let new = NewSession {
            user_id: UserId(1),
            token: Some("fixed".to_string()),
        };
        repo.create_session_with(new.clone()).unwrap();
        assert!(matches!(
            repo.create_session_with(new),
            Err(RepositoryError::ValidationError { .. })
        ));
    }

    #[tokio::test]
    async fn test_ticket_is_joined_with_its_type() {
        let repo = LocalRepository::new();
        let ticket = paid_ticket_for(&repo, UserId(1));

        let found = repo
            .find_ticket_by_enrollment(ticket.enrollment_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.ticket.id, ticket.id);
        assert!(found.ticket_type.includes_hotel);
        assert!(found.is_paid());
    }

    #[test]
    fn test_ticket_requires_existing_references() {
        let repo = LocalRepository::new();
        let result = repo.insert_ticket(NewTicket {
            enrollment_id: EnrollmentId(1),
            ticket_type_id: TicketTypeId(1),
            status: TicketStatus::Paid,
        });
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[test]
    fn test_one_enrollment_and_one_ticket_per_user() {
        let repo = LocalRepository::new();
        let ticket = paid_ticket_for(&repo, UserId(1));

        assert!(repo
            .insert_enrollment(NewEnrollment::for_user(UserId(1)))
            .is_err());
        assert!(repo
            .insert_ticket(NewTicket {
                enrollment_id: ticket.enrollment_id,
                ticket_type_id: ticket.ticket_type_id,
                status: TicketStatus::Reserved,
            })
            .is_err());
    }

    #[tokio::test]
    async fn test_hotel_with_rooms_only_includes_its_rooms() {
        let repo = LocalRepository::new();
        let first = repo.insert_hotel(NewHotel {
            name: "First".to_string(),
            image: "https://example.com/1.png".to_string(),
        });
        let second = repo.insert_hotel(NewHotel {
            name: "Second".to_string(),
            image: "https://example.com/2.png".to_string(),
        });
        for (hotel_id, name) in [(first.id, "A"), (second.id, "B"), (first.id, "C")] {
            repo.insert_room(NewRoom {
                hotel_id,
                name: name.to_string(),
                capacity: 2,
            })
            .unwrap();
        }

        let found = repo.find_hotel_with_rooms(first.id).await.unwrap().unwrap();
        let names: Vec<_> = found.rooms.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);

        assert!(repo
            .find_hotel_with_rooms(HotelId(-1))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_clear_resets_ids_and_keeps_health() {
        let repo = LocalRepository::new();
        repo.insert_hotel(NewHotel {
            name: "Old".to_string(),
            image: String::new(),
        });
        repo.set_healthy(false);
        repo.clear();

        assert_eq!(repo.hotel_count(), 0);
        assert!(!repo.health_check().await.unwrap());

        repo.set_healthy(true);
        let hotel = repo.insert_hotel(NewHotel {
            name: "New".to_string(),
            image: String::new(),
        });
        assert_eq!(hotel.id, HotelId(1));
    }

    #[tokio::test]
    async fn test_load_fixture_links_records_by_position() {
        let fixture: Fixture = serde_json::from_str(
            r#"{
                "sessions": [{ "userId": 1, "token": "demo" }],
                "enrollments": [{ "userId": 1 }],
                "ticketTypes": [{ "name": "Hotel", "isRemote": false, "includesHotel": true }],
                "tickets": [{ "enrollmentId": 1, "ticketTypeId": 1, "status": "PAID" }],
                "hotels": [{ "name": "Fixture Inn", "image": "https://example.com/inn.png" }],
                "rooms": [{ "hotelId": 1, "name": "101", "capacity": 3 }]
            }"#,
        )
        .unwrap();

        let repo = LocalRepository::new();
        repo.load_fixture(&fixture).unwrap();

        let session = repo.find_session_by_token("demo").await.unwrap().unwrap();
        let enrollment = repo
            .find_enrollment_by_user(session.user_id)
            .await
            .unwrap()
            .unwrap();
        let ticket = repo
            .find_ticket_by_enrollment(enrollment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ticket.ticket.status, TicketStatus::Paid);

        let hotel = repo.find_hotel_with_rooms(HotelId(1)).await.unwrap().unwrap();
        assert_eq!(hotel.rooms.len(), 1);
    }
}

//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic migration execution
//! - Insert builders mirroring the local repository, for provisioning and tests
//!
//! Reads are never retried: a failed query surfaces immediately as a
//! [`RepositoryError`] and becomes a 500 at the HTTP boundary.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::db::repository::{
    AccessRepository, ErrorContext, HotelRepository, RepositoryError, RepositoryResult,
};
use crate::db::fixture::{
    NewEnrollment, NewHotel, NewRoom, NewSession, NewTicket, NewTicketType,
};
use crate::models::{
    Enrollment, EnrollmentId, Hotel, HotelId, HotelWithRooms, Room, Session, Ticket,
    TicketType, TicketWithType, UserId,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Diesel-backed repository for Postgres.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
                RepositoryError::internal_with_context(
                    format!("Migration failed: {}", e),
                    ErrorContext::new("run_migrations"),
                )
            })?;
        }

        log::info!(
            "Postgres repository ready (pool max={}, min={})",
            config.max_pool_size,
            config.min_pool_size
        );

        Ok(Self { pool })
    }

    /// Run a blocking Diesel operation on a pooled connection.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new(operation),
                )
            })?;
            f(&mut conn).map_err(|e| e.with_operation(operation))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Open a session, generating a token when the record has none.
    pub async fn create_session_with(&self, new: NewSession) -> RepositoryResult<Session> {
        let row = NewSessionRow {
            user_id: new.user_id.value(),
            token: new
                .token
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        };
        self.with_conn("create_session", move |conn| {
            let row = diesel::insert_into(sessions::table)
                .values(&row)
                .returning(SessionRow::as_returning())
                .get_result::<SessionRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(row.into())
        })
        .await
    }

    /// Add an enrollment. The unique `user_id` column rejects a second one.
    pub async fn insert_enrollment(&self, new: NewEnrollment) -> RepositoryResult<Enrollment> {
        let row = NewEnrollmentRow {
            user_id: new.user_id.value(),
            name: new.name,
            cpf: new.cpf,
            birthday: new.birthday,
            phone: new.phone,
        };
        self.with_conn("insert_enrollment", move |conn| {
            let row = diesel::insert_into(enrollments::table)
                .values(&row)
                .returning(EnrollmentRow::as_returning())
                .get_result::<EnrollmentRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(row.into())
        })
        .await
    }

    pub async fn insert_ticket_type(&self, new: NewTicketType) -> RepositoryResult<TicketType> {
        let row = NewTicketTypeRow {
            name: new.name,
            price: new.price,
            is_remote: new.is_remote,
            includes_hotel: new.includes_hotel,
        };
        self.with_conn("insert_ticket_type", move |conn| {
            let row = diesel::insert_into(ticket_types::table)
                .values(&row)
                .returning(TicketTypeRow::as_returning())
                .get_result::<TicketTypeRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(row.into())
        })
        .await
    }

    /// Add a ticket. Foreign keys reject unknown enrollments or ticket types.
    pub async fn insert_ticket(&self, new: NewTicket) -> RepositoryResult<Ticket> {
        let row = NewTicketRow {
            ticket_type_id: new.ticket_type_id.value(),
            enrollment_id: new.enrollment_id.value(),
            status: new.status.as_str().to_string(),
        };
        self.with_conn("insert_ticket", move |conn| {
            let row = diesel::insert_into(tickets::table)
                .values(&row)
                .returning(TicketRow::as_returning())
                .get_result::<TicketRow>(conn)
                .map_err(map_diesel_error)?;
            Ticket::try_from(row)
        })
        .await
    }

    pub async fn insert_hotel(&self, new: NewHotel) -> RepositoryResult<Hotel> {
        let row = NewHotelRow {
            name: new.name,
            image: new.image,
        };
        self.with_conn("insert_hotel", move |conn| {
            let row = diesel::insert_into(hotels::table)
                .values(&row)
                .returning(HotelRow::as_returning())
                .get_result::<HotelRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(row.into())
        })
        .await
    }

    pub async fn insert_room(&self, new: NewRoom) -> RepositoryResult<Room> {
        let row = NewRoomRow {
            name: new.name,
            capacity: new.capacity,
            hotel_id: new.hotel_id.value(),
        };
        self.with_conn("insert_room", move |conn| {
            let row = diesel::insert_into(rooms::table)
                .values(&row)
                .returning(RoomRow::as_returning())
                .get_result::<RoomRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(row.into())
        })
        .await
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

#[async_trait]
impl AccessRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find_session_by_token(&self, token: &str) -> RepositoryResult<Option<Session>> {
        let token = token.to_string();
        self.with_conn("find_session_by_token", move |conn| {
            let row = sessions::table
                .filter(sessions::token.eq(&token))
                .select(SessionRow::as_select())
                .first::<SessionRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;
            Ok(row.map(Session::from))
        })
        .await
    }

    async fn find_enrollment_by_user(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<Enrollment>> {
        self.with_conn("find_enrollment_by_user", move |conn| {
            let row = enrollments::table
                .filter(enrollments::user_id.eq(user_id.value()))
                .select(EnrollmentRow::as_select())
                .first::<EnrollmentRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;
            Ok(row.map(Enrollment::from))
        })
        .await
    }

    async fn find_ticket_by_enrollment(
        &self,
        enrollment_id: EnrollmentId,
    ) -> RepositoryResult<Option<TicketWithType>> {
        self.with_conn("find_ticket_by_enrollment", move |conn| {
            let row = tickets::table
                .inner_join(ticket_types::table)
                .filter(tickets::enrollment_id.eq(enrollment_id.value()))
                .select((TicketRow::as_select(), TicketTypeRow::as_select()))
                .first::<(TicketRow, TicketTypeRow)>(conn)
                .optional()
                .map_err(map_diesel_error)?;

            row.map(|(ticket, ticket_type)| {
                Ok(TicketWithType {
                    ticket: Ticket::try_from(ticket)?,
                    ticket_type: ticket_type.into(),
                })
            })
            .transpose()
        })
        .await
    }
}

#[async_trait]
impl HotelRepository for PostgresRepository {
    async fn list_hotels(&self) -> RepositoryResult<Vec<Hotel>> {
        self.with_conn("list_hotels", |conn| {
            let rows = hotels::table
                .order(hotels::id.asc())
                .select(HotelRow::as_select())
                .load::<HotelRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(Hotel::from).collect())
        })
        .await
    }

    async fn find_hotel_with_rooms(
        &self,
        hotel_id: HotelId,
    ) -> RepositoryResult<Option<HotelWithRooms>> {
        self.with_conn("find_hotel_with_rooms", move |conn| {
            let Some(hotel) = hotels::table
                .find(hotel_id.value())
                .select(HotelRow::as_select())
                .first::<HotelRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
            else {
                return Ok(None);
            };

            let rooms = rooms::table
                .filter(rooms::hotel_id.eq(hotel.id))
                .order(rooms::id.asc())
                .select(RoomRow::as_select())
                .load::<RoomRow>(conn)
                .map_err(map_diesel_error)?;

            Ok(Some(HotelWithRooms {
                hotel: hotel.into(),
                rooms: rooms.into_iter().map(Room::from).collect(),
            }))
        })
        .await
    }
}

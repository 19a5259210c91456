//! Tests for db::factory - repository selection, seeding and config files.

mod support;

use std::io::Write;
use std::str::FromStr;

use hotel_access::db::factory::{RepositoryFactory, RepositoryType};
use hotel_access::db::repository::RepositoryError;
use hotel_access::models::{HotelId, TicketStatus, UserId};
use tempfile::NamedTempFile;

const FIXTURE: &str = r#"{
    "sessions": [{ "userId": 7, "token": "seeded-token" }],
    "enrollments": [{ "userId": 7, "name": "Seeded" }],
    "ticketTypes": [{ "name": "In person + hotel", "isRemote": false, "includesHotel": true }],
    "tickets": [{ "enrollmentId": 1, "ticketTypeId": 1, "status": "PAID" }],
    "hotels": [{ "name": "Seaside", "image": "https://images.example.com/seaside.png" }],
    "rooms": [{ "hotelId": 1, "name": "201", "capacity": 2 }]
}"#;

fn temp_file(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Runtime::new().unwrap().block_on(f)
}

#[test]
fn test_repository_type_from_str() {
    assert_eq!(RepositoryType::from_str("POSTGRES").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("pg").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("Local").unwrap(), RepositoryType::Local);

    let err = RepositoryType::from_str("sqlite").unwrap_err();
    assert!(err.contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_repository_type_from_env_with_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", Some("postgres://localhost/hotels")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres),
    );
}

#[test]
fn test_repository_type_explicit_wins_over_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATABASE_URL", Some("postgres://localhost/hotels")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_repository_type_invalid_defaults_to_local() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", Some("invalid"))], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local)
    });
}

#[tokio::test]
async fn test_local_from_fixture_is_queryable() {
    let file = temp_file(FIXTURE, ".json");
    let repo = RepositoryFactory::create_local_from_fixture(file.path()).unwrap();

    let session = repo.find_session_by_token("seeded-token").await.unwrap().unwrap();
    assert_eq!(session.user_id, UserId(7));

    let enrollment = repo.find_enrollment_by_user(UserId(7)).await.unwrap().unwrap();
    let ticket = repo
        .find_ticket_by_enrollment(enrollment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ticket.ticket.status, TicketStatus::Paid);
    assert!(ticket.ticket_type.includes_hotel);

    let hotel = repo.find_hotel_with_rooms(HotelId(1)).await.unwrap().unwrap();
    assert_eq!(hotel.hotel.name, "Seaside");
    assert_eq!(hotel.rooms.len(), 1);
}

#[test]
fn test_fixture_with_dangling_reference_fails() {
    let file = temp_file(
        r#"{ "rooms": [{ "hotelId": 3, "name": "1", "capacity": 1 }] }"#,
        ".json",
    );
    let result = RepositoryFactory::create_local_from_fixture(file.path());
    assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
}

#[test]
fn test_unreadable_fixture_is_configuration_error() {
    let file = temp_file("not json", ".json");
    let result = RepositoryFactory::create_local_from_fixture(file.path());
    assert!(matches!(
        result,
        Err(RepositoryError::ConfigurationError { .. })
    ));
}

#[test]
fn test_resolve_seeds_local_repository() {
    let file = temp_file(FIXTURE, ".json");
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || {
            block_on(async {
                let repo = RepositoryFactory::resolve(Some(file.path())).await.unwrap();
                assert_eq!(repo.list_hotels().await.unwrap().len(), 1);

                let empty = RepositoryFactory::resolve(None).await.unwrap();
                assert!(empty.list_hotels().await.unwrap().is_empty());
            })
        },
    );
}

#[test]
fn test_resolve_does_not_seed_postgres() {
    let file = temp_file(FIXTURE, ".json");
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("postgres")),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || {
            // No usable Postgres here, and the fixture must not turn this into
            // a seeded local repository
            let result = block_on(RepositoryFactory::resolve(Some(file.path())));
            assert!(matches!(
                result,
                Err(RepositoryError::ConfigurationError { .. })
            ));
        },
    );
}

#[tokio::test]
async fn test_from_config_file_local() {
    let file = temp_file("[repository]\ntype = \"local\"\n", ".toml");
    let repo = RepositoryFactory::from_config_file(file.path()).await.unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[tokio::test]
async fn test_from_config_file_unknown_type() {
    let file = temp_file("[repository]\ntype = \"sqlite\"\n", ".toml");
    let result = RepositoryFactory::from_config_file(file.path()).await;
    assert!(result.is_err());
}

#[cfg(not(feature = "postgres-repo"))]
#[tokio::test]
async fn test_create_postgres_without_feature_fails() {
    let err = RepositoryFactory::create(RepositoryType::Postgres, None)
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("feature not enabled"));
}

#[cfg(feature = "postgres-repo")]
#[tokio::test]
async fn test_create_postgres_without_config_fails() {
    let err = RepositoryFactory::create(RepositoryType::Postgres, None)
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("requires PostgresConfig"));
}

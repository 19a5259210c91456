//! ServerConfig read from the real process environment.

mod support;

use std::path::PathBuf;

use hotel_access::config::ServerConfig;

#[test]
fn test_server_config_from_env() {
    support::with_scoped_env(
        &[
            ("HOST", Some("127.0.0.1")),
            ("PORT", Some("4000")),
            ("SEED_FILE", Some("fixtures/demo.json")),
        ],
        || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.port, 4000);
            assert_eq!(config.seed_file, Some(PathBuf::from("fixtures/demo.json")));
            assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:4000");
        },
    );
}

#[test]
fn test_server_config_defaults_when_unset() {
    support::with_scoped_env(
        &[("HOST", None), ("PORT", None), ("SEED_FILE", None)],
        || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config, ServerConfig::default());
        },
    );
}

#[test]
fn test_server_config_rejects_bad_port() {
    support::with_scoped_env(&[("PORT", Some("http"))], || {
        let err = ServerConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("PORT"));
    });
}

#[test]
fn test_demo_fixture_parses() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/demo.json");
    let fixture = hotel_access::db::Fixture::from_file(path).unwrap();
    assert_eq!(fixture.hotels.len(), 2);
    assert_eq!(fixture.sessions.len(), 4);
}

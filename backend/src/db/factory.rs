//! Repository factory for dependency injection.
//!
//! This module provides utilities for creating and configuring repository instances
//! based on runtime configuration.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::PostgresRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use super::PostgresConfig;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Postgres + Diesel implementation
    Postgres,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string ("postgres", "pg", "local"), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variable.
    ///
    /// Reads `REPOSITORY_TYPE` environment variable. Defaults to Postgres if a
    /// database URL is present, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or_else(|e| {
                log::warn!("{}, falling back to the local repository", e);
                Self::Local
            });
        }

        if std::env::var("DATABASE_URL").is_ok() || std::env::var("PG_DATABASE_URL").is_ok() {
            Self::Postgres
        } else {
            Self::Local
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use hotel_access::db::{RepositoryFactory, RepositoryType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let local_repo = RepositoryFactory::create(RepositoryType::Local, None).await?;
///     let from_env = RepositoryFactory::from_env().await?;
///     Ok(())
/// }
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// `postgres_config` is required for [`RepositoryType::Postgres`] and
    /// ignored otherwise.
    pub async fn create(
        repo_type: RepositoryType,
        postgres_config: Option<&PostgresConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                {
                    let config = postgres_config.ok_or_else(|| {
                        RepositoryError::configuration(
                            "Postgres repository requires PostgresConfig",
                        )
                    })?;
                    let pg = Self::create_postgres(config).await?;
                    Ok(pg as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "postgres-repo"))]
                {
                    let _ = postgres_config;
                    Err(RepositoryError::configuration(
                        "Postgres repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => Self::local_backend(None),
        }
    }

    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> RepositoryResult<Arc<PostgresRepository>> {
        let config = config.clone();
        let repo = tokio::task::spawn_blocking(move || PostgresRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;
        Ok(Arc::new(repo))
    }

    /// Create an empty in-memory local repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create an in-memory repository seeded from a JSON fixture.
    pub fn create_local_from_fixture<P: AsRef<Path>>(
        path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        Ok(Arc::new(LocalRepository::from_fixture_file(path)?))
    }

    /// Create repository from environment configuration.
    ///
    /// Reads `REPOSITORY_TYPE` (see [`RepositoryType::from_env`]) and, for
    /// Postgres, the connection settings of `PostgresConfig::from_env`.
    pub async fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        match RepositoryType::from_env() {
            RepositoryType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                {
                    let config =
                        PostgresConfig::from_env().map_err(RepositoryError::configuration)?;
                    let pg = Self::create_postgres(&config).await?;
                    Ok(pg as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "postgres-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "Postgres repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => Self::local_backend(None),
        }
    }

    /// Create repository from a TOML configuration file.
    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config).await
    }

    /// Create the repository the server should use.
    ///
    /// A `repository.toml` found in a standard location wins over the
    /// environment. A local repository is seeded from `seed_file` when given;
    /// Postgres is never seeded.
    pub async fn resolve(seed_file: Option<&Path>) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = match RepositoryConfig::default_path() {
            Some(path) => {
                log::info!("Using repository configuration from {}", path.display());
                Some(RepositoryConfig::from_file(&path)?)
            }
            None => None,
        };
        let repo_type = match &config {
            Some(config) => config.repository_type()?,
            None => RepositoryType::from_env(),
        };

        match repo_type {
            RepositoryType::Local => Self::local_backend(seed_file),
            RepositoryType::Postgres => {
                if let Some(path) = seed_file {
                    log::warn!(
                        "Ignoring seed file {}: only the local repository is seeded",
                        path.display()
                    );
                }
                match &config {
                    Some(config) => Self::from_repository_config(config).await,
                    None => Self::from_env().await,
                }
            }
        }
    }

    async fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match config.repository_type()? {
            RepositoryType::Postgres => {
                let pg_config = config.to_postgres_config()?;
                Self::create(RepositoryType::Postgres, pg_config.as_ref()).await
            }
            RepositoryType::Local => Self::local_backend(None),
        }
    }

    /// Local backend selection, available only with the `local-repo` feature.
    ///
    /// `LocalRepository` itself is always compiled because tests build on it.
    fn local_backend(seed_file: Option<&Path>) -> RepositoryResult<Arc<dyn FullRepository>> {
        #[cfg(feature = "local-repo")]
        {
            match seed_file {
                Some(path) => {
                    log::info!("Seeding local repository from {}", path.display());
                    Self::create_local_from_fixture(path)
                }
                None => Ok(Self::create_local()),
            }
        }
        #[cfg(not(feature = "local-repo"))]
        {
            let _ = seed_file;
            Err(RepositoryError::configuration(
                "Local repository feature not enabled",
            ))
        }
    }
}

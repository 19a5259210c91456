//! Response bodies that are not domain models.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Crate version
    pub version: String,
    /// Repository status: `connected`, `disconnected` or `error: ...`
    pub database: String,
}

//! # Hotel Access Backend
//!
//! Read API for hotel and room inventory, available only to users whose
//! ticket is paid, in person and includes lodging.
//!
//! ## Architecture
//!
//! - [`models`]: Domain records (enrollments, tickets, hotels, rooms, sessions)
//! - [`db`]: Repository traits and the local / Postgres backends
//! - [`services`]: Eligibility rules and hotel queries
//! - [`config`]: Server settings from the environment
//! - [`http`]: Axum router, authentication and handlers
//!
//! ## Request flow
//!
//! A bearer token is resolved to a user through the sessions table. The
//! eligibility checks then load the user's enrollment and ticket and stop at
//! the first failing rule; only then are hotels read.

// RepositoryError carries structured context
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

//! Repository trait definitions for database operations.
//!
//! Responsibilities are split across two focused traits:
//!
//! - [`access`]: sessions, enrollments and tickets (everything the
//!   authentication middleware and eligibility checks read)
//! - [`hotels`]: hotel and room inventory
//!
//! Use the [`FullRepository`] bound when a component needs both.

pub mod access;
pub mod error;
pub mod hotels;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use access::AccessRepository;
pub use hotels::HotelRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements both repository
/// traits, so it can be used as `Arc<dyn FullRepository>` in shared state.
pub trait FullRepository: AccessRepository + HotelRepository {}

impl<T> FullRepository for T where T: AccessRepository + HotelRepository {}

//! Domain records read by the service.
//!
//! Every entity is persisted by an external system; this crate only reads
//! them. Field names serialize in camelCase to match the public JSON API.

pub mod access;
pub mod hotel;
pub mod macros;

pub use access::*;
pub use hotel::*;

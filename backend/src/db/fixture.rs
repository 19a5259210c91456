//! Seed records for the in-memory repository.
//!
//! A fixture is a JSON document listing the records to insert. Every list is
//! optional; ids are assigned in insertion order starting at 1, so references
//! between records (e.g. `enrollmentId` on a ticket) use those positions.
//!
//! ```json
//! {
//!   "sessions": [{ "userId": 1, "token": "demo-token" }],
//!   "enrollments": [{ "userId": 1, "name": "Ada" }],
//!   "ticketTypes": [{ "name": "In person + hotel", "isRemote": false, "includesHotel": true }],
//!   "tickets": [{ "enrollmentId": 1, "ticketTypeId": 1, "status": "PAID" }],
//!   "hotels": [{ "name": "Copacabana Palace", "image": "https://..." }],
//!   "rooms": [{ "hotelId": 1, "name": "101", "capacity": 2 }]
//! }
//! ```

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::repository::{RepositoryError, RepositoryResult};
use crate::models::{EnrollmentId, HotelId, TicketStatus, TicketTypeId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub user_id: UserId,
    /// Generated when absent.
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEnrollment {
    pub user_id: UserId,
    #[serde(default = "default_enrollment_name")]
    pub name: String,
    #[serde(default)]
    pub cpf: String,
    #[serde(default = "default_birthday")]
    pub birthday: NaiveDate,
    #[serde(default)]
    pub phone: String,
}

impl NewEnrollment {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            name: default_enrollment_name(),
            cpf: String::new(),
            birthday: default_birthday(),
            phone: String::new(),
        }
    }
}

fn default_enrollment_name() -> String {
    "Participant".to_string()
}

fn default_birthday() -> NaiveDate {
    NaiveDate::default()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicketType {
    pub name: String,
    #[serde(default)]
    pub price: i64,
    pub is_remote: bool,
    pub includes_hotel: bool,
}

impl NewTicketType {
    pub fn in_person_with_hotel() -> Self {
        Self {
            name: "In person + hotel".to_string(),
            price: 60000,
            is_remote: false,
            includes_hotel: true,
        }
    }

    pub fn in_person_without_hotel() -> Self {
        Self {
            name: "In person".to_string(),
            price: 25000,
            is_remote: false,
            includes_hotel: false,
        }
    }

    pub fn remote() -> Self {
        Self {
            name: "Online".to_string(),
            price: 10000,
            is_remote: true,
            includes_hotel: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    pub enrollment_id: EnrollmentId,
    pub ticket_type_id: TicketTypeId,
    pub status: TicketStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHotel {
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub hotel_id: HotelId,
    pub name: String,
    pub capacity: i32,
}

/// Full set of records loaded into a repository at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fixture {
    pub sessions: Vec<NewSession>,
    pub enrollments: Vec<NewEnrollment>,
    pub ticket_types: Vec<NewTicketType>,
    pub tickets: Vec<NewTicket>,
    pub hotels: Vec<NewHotel>,
    pub rooms: Vec<NewRoom>,
}

impl Fixture {
    /// Read and parse a fixture file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!(
                "Failed to read fixture {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| RepositoryError::configuration(format!("Failed to parse fixture: {}", e)))
    }
}

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use hotel_access::db::fixture::{NewEnrollment, NewHotel, NewRoom, NewTicket, NewTicketType};
use hotel_access::db::repositories::LocalRepository;
use hotel_access::db::repository::FullRepository;
use hotel_access::http::{create_router, AppState};
use hotel_access::models::{Hotel, Room, TicketStatus, UserId};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on unwind and serializes access to the
/// process-global environment across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Router plus a handle on the repository behind it.
pub struct TestApp {
    pub repo: LocalRepository,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let repo = LocalRepository::new();
        let shared = Arc::new(repo.clone()) as Arc<dyn FullRepository>;
        let router = create_router(AppState::new(shared));
        Self { repo, router }
    }

    /// Create a user with a session and return its bearer token.
    pub fn signed_in_user(&self, user_id: i64) -> String {
        self.repo.create_session(UserId(user_id)).token
    }

    /// Enroll `user_id` and give them a ticket of the given shape.
    pub fn give_ticket(&self, user_id: i64, ticket_type: NewTicketType, status: TicketStatus) {
        let enrollment = self
            .repo
            .insert_enrollment(NewEnrollment::for_user(UserId(user_id)))
            .unwrap();
        let ticket_type = self.repo.insert_ticket_type(ticket_type);
        self.repo
            .insert_ticket(NewTicket {
                enrollment_id: enrollment.id,
                ticket_type_id: ticket_type.id,
                status,
            })
            .unwrap();
    }

    /// Shortcut for a user who passes every rule.
    pub fn eligible_user(&self, user_id: i64) -> String {
        let token = self.signed_in_user(user_id);
        self.give_ticket(
            user_id,
            NewTicketType::in_person_with_hotel(),
            TicketStatus::Paid,
        );
        token
    }

    pub fn add_hotel(&self, name: &str) -> Hotel {
        self.repo.insert_hotel(NewHotel {
            name: name.to_string(),
            image: format!("https://images.example.com/{}.png", name),
        })
    }

    pub fn add_room(&self, hotel: &Hotel, name: &str, capacity: i32) -> Room {
        self.repo
            .insert_room(NewRoom {
                hotel_id: hotel.id,
                name: name.to_string(),
                capacity,
            })
            .unwrap()
    }

    /// Send a GET request, optionally with a raw `Authorization` header.
    pub async fn get(&self, uri: &str, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let request = builder.body(Body::empty()).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get_as(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.get(uri, Some(&format!("Bearer {}", token))).await
    }
}

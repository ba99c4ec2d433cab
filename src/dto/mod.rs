//! Request and response payloads exposed over the HTTP API.

use std::time::SystemTime;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod achievement;
pub mod game;
pub mod health;
pub mod user;
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

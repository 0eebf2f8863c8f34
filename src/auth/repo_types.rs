use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Account role. Closed set: every authorization point matches on this enum
/// rather than comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
pub enum Role {
    Candidate,
    Recruiter,
}

impl Role {
    /// Parses the wire form. Only the exact uppercase names are accepted.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "CANDIDATE" => Some(Role::Candidate),
            "RECRUITER" => Some(Role::Recruiter),
            _ => None,
        }
    }
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub role: Role,
    pub application_count: i64, // advisory counter, bumped on application
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

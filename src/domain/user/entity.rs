use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::media::MediaSource;

/// A directory entry for an application user.
///
/// The credential is NOT part of this entity: it is a repository-internal
/// field and never appears in query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Internal immutable identifier
    pub id: Uuid,

    /// Unique, case-sensitive email address
    pub email: String,

    /// Display name
    pub name: String,

    /// Role within the catalog
    pub role: UserRole,

    /// Profile photo reference (placeholder until the user uploads one)
    pub photo: Option<MediaSource>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Teacher,
    Student,
}

impl User {
    /// Create a new user record. Registration always starts as Student;
    /// admin tooling constructs other roles explicitly.
    pub fn new(name: String, email: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            role,
            photo: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge provided fields into the record, touching the update timestamp.
    pub fn apply_update(
        &mut self,
        name: Option<String>,
        email: Option<String>,
        role: Option<UserRole>,
    ) {
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(role) = role {
            self.role = role;
        }
        self.updated_at = Utc::now();
    }

    pub fn set_photo(&mut self, photo: Option<MediaSource>) {
        self.photo = photo;
        self.updated_at = Utc::now();
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Teacher => write!(f, "teacher"),
            UserRole::Student => write!(f, "student"),
        }
    }
}

// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic beyond the documented storage invariants
//   (uniqueness, lesson order, cascade)
// - NO event emission (the hosted transport notifies, repositories don't)
// - NO cross-repository calls
// - Explicit SQL / explicit documents only
//
// Every trait has two implementations sharing one contract: Sqlite*
// (embedded) here and Remote* (hosted) under remote/. Calling code never
// branches on which one it holds.

pub mod course_repository;
pub mod enrollment_repository;
pub mod remote;
pub mod review_repository;
pub mod seed_repository;
pub mod user_repository;

pub use course_repository::{CourseRepository, SqliteCourseRepository};
pub use enrollment_repository::{EnrollmentRepository, SqliteEnrollmentRepository};
pub use remote::{
    RemoteCourseRepository, RemoteEnrollmentRepository, RemoteReviewRepository,
    RemoteSeedRepository, RemoteUserRepository,
};
pub use review_repository::{ReviewRepository, SqliteReviewRepository};
pub use seed_repository::{SeedBatch, SeedRepository, SeedUser, SqliteSeedRepository};
pub use user_repository::{SqliteUserRepository, UserRepository};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::MediaSource;

// ---------------------------------------------------------------------
// Row-mapping helpers shared by the Sqlite implementations. Failures are
// explicit rusqlite errors (query_map compatibility), never silent
// defaults.
// ---------------------------------------------------------------------

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, rusqlite::Error> {
    Uuid::parse_str(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub(crate) fn parse_media(value: Option<String>) -> Result<Option<MediaSource>, rusqlite::Error> {
    value
        .map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        })
        .transpose()
}

pub(crate) fn media_to_json(
    source: &Option<MediaSource>,
) -> Result<Option<String>, serde_json::Error> {
    source.as_ref().map(serde_json::to_string).transpose()
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rating/comment a student left on a course.
///
/// Reviews are append-only: there is no update or delete path, so the
/// entity carries no update timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,

    pub student_id: Uuid,

    pub course_id: Uuid,

    /// 1 to 5 inclusive
    pub rating: u8,

    pub comment: String,

    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(student_id: Uuid, course_id: Uuid, rating: u8, comment: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            course_id,
            rating,
            comment,
            created_at: Utc::now(),
        }
    }
}

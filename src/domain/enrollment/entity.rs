use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One student's membership request for one course.
///
/// At most one enrollment exists per (student, course) pair, whatever its
/// status; a rejected enrollment blocks resubmission through the exposed
/// contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Uuid,

    pub student_id: Uuid,

    pub course_id: Uuid,

    pub status: EnrollmentStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl Enrollment {
    /// Pending is the only initial state.
    pub fn new(student_id: Uuid, course_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            student_id,
            course_id,
            status: EnrollmentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Unconditional transition; the repository enforces no further state
    /// machine beyond the Pending initial state.
    pub fn set_status(&mut self, status: EnrollmentStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrollmentStatus::Pending => write!(f, "pending"),
            EnrollmentStatus::Approved => write!(f, "approved"),
            EnrollmentStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_enrollment_starts_pending() {
        let enrollment = Enrollment::new(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(enrollment.status, EnrollmentStatus::Pending);
    }
}

// src/services/enrollment_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::enrollment::{Enrollment, EnrollmentStatus};
use crate::error::AppResult;
use crate::events::{EnrollmentRequested, EnrollmentStatusChanged, EventBus};
use crate::repositories::EnrollmentRepository;

pub struct EnrollmentService {
    enrollment_repo: Arc<dyn EnrollmentRepository>,
    event_bus: Arc<EventBus>,
}

impl EnrollmentService {
    pub fn new(enrollment_repo: Arc<dyn EnrollmentRepository>, event_bus: Arc<EventBus>) -> Self {
        Self {
            enrollment_repo,
            event_bus,
        }
    }

    /// Student action: request membership in a course. Fails with
    /// AlreadyEnrolled when any enrollment for the pair exists, whatever
    /// its status.
    pub async fn enroll(&self, student_id: Uuid, course_id: Uuid) -> AppResult<Enrollment> {
        let enrollment = Enrollment::new(student_id, course_id);
        self.enrollment_repo.insert(&enrollment).await?;

        self.event_bus.emit(EnrollmentRequested::new(
            enrollment.id,
            student_id,
            course_id,
        ));

        Ok(enrollment)
    }

    /// Admin action: approve or reject. The repository applies the
    /// transition unconditionally; the UI is the only gate.
    pub async fn set_status(&self, enrollment_id: Uuid, status: EnrollmentStatus) -> AppResult<()> {
        self.enrollment_repo.set_status(enrollment_id, status).await?;

        self.event_bus
            .emit(EnrollmentStatusChanged::new(enrollment_id, status.to_string()));

        Ok(())
    }

    pub async fn get_for_student_and_course(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        self.enrollment_repo
            .get_for_student_and_course(student_id, course_id)
            .await
    }

    pub async fn list_all(&self) -> AppResult<Vec<Enrollment>> {
        self.enrollment_repo.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::repositories::enrollment_repository::MockEnrollmentRepository;

    #[tokio::test]
    async fn test_enroll_starts_pending_and_emits() {
        let mut repo = MockEnrollmentRepository::new();
        repo.expect_insert()
            .withf(|enrollment| enrollment.status == EnrollmentStatus::Pending)
            .times(1)
            .returning(|_| Ok(()));

        let bus = Arc::new(EventBus::new());
        let service = EnrollmentService::new(Arc::new(repo), bus.clone());

        service.enroll(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();

        let log = bus.get_event_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].event_type, "EnrollmentRequested");
    }

    #[tokio::test]
    async fn test_duplicate_enrollment_error_passes_through() {
        let mut repo = MockEnrollmentRepository::new();
        repo.expect_insert()
            .returning(|_| Err(AppError::AlreadyEnrolled));

        let service = EnrollmentService::new(Arc::new(repo), Arc::new(EventBus::new()));

        let result = service.enroll(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::AlreadyEnrolled)));
    }
}

// src/repositories/remote/remote_enrollment_repository.rs
//
// Enrollment Ledger on the hosted backend.
//
// The composite uniqueness constraint is the document id itself:
// "{student_id}_{course_id}", written create-only. A conflict on that id
// IS the AlreadyEnrolled violation, and the pair lookup becomes a point
// read.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::ENROLLMENTS;
use crate::domain::enrollment::{Enrollment, EnrollmentStatus};
use crate::error::{AppError, AppResult};
use crate::remote::{Filter, RemoteStore};
use crate::repositories::EnrollmentRepository;

pub(crate) fn pair_key(student_id: Uuid, course_id: Uuid) -> String {
    format!("{}_{}", student_id, course_id)
}

pub struct RemoteEnrollmentRepository {
    store: Arc<RemoteStore>,
}

impl RemoteEnrollmentRepository {
    pub fn new(store: Arc<RemoteStore>) -> Self {
        Self { store }
    }

    async fn find_by_entity_id(&self, id: Uuid) -> AppResult<Option<Enrollment>> {
        let mut matches: Vec<Enrollment> = self
            .store
            .query_docs(ENROLLMENTS, &[Filter::eq("id", id.to_string())])
            .await?;
        Ok(matches.pop())
    }
}

#[async_trait]
impl EnrollmentRepository for RemoteEnrollmentRepository {
    async fn insert(&self, enrollment: &Enrollment) -> AppResult<()> {
        let key = pair_key(enrollment.student_id, enrollment.course_id);
        if !self.store.create_doc(ENROLLMENTS, &key, enrollment).await? {
            return Err(AppError::AlreadyEnrolled);
        }
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Enrollment>> {
        self.find_by_entity_id(id).await
    }

    async fn set_status(&self, id: Uuid, status: EnrollmentStatus) -> AppResult<()> {
        let mut enrollment = self.find_by_entity_id(id).await?.ok_or(AppError::NotFound)?;
        enrollment.set_status(status);

        let key = pair_key(enrollment.student_id, enrollment.course_id);
        self.store.set_doc(ENROLLMENTS, &key, &enrollment).await
    }

    async fn get_for_student_and_course(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        self.store
            .get_doc(ENROLLMENTS, &pair_key(student_id, course_id))
            .await
    }

    async fn list_all(&self) -> AppResult<Vec<Enrollment>> {
        self.store.list_docs(ENROLLMENTS).await
    }

    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<Enrollment>> {
        self.store
            .query_docs(ENROLLMENTS, &[Filter::eq("student_id", student_id.to_string())])
            .await
    }
}

// src/repositories/enrollment_repository.rs
//
// Enrollment Ledger persistence
//
// The (student_id, course_id) pair is unique whatever the status: a
// rejected enrollment still blocks a second insert for the same pair.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
#[cfg(test)]
use mockall::automock;
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::db::ConnectionPool;
use crate::domain::enrollment::{Enrollment, EnrollmentStatus};
use crate::error::{AppError, AppResult};
use crate::repositories::{parse_timestamp, parse_uuid};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Insert a new ledger entry. The composite uniqueness check is
    /// atomic with the insert; a second entry for the same pair fails
    /// with AlreadyEnrolled.
    async fn insert(&self, enrollment: &Enrollment) -> AppResult<()>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Enrollment>>;

    /// Unconditional status transition. NotFound for a missing id.
    async fn set_status(&self, id: Uuid, status: EnrollmentStatus) -> AppResult<()>;

    /// Point lookup through the composite index.
    async fn get_for_student_and_course(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Enrollment>>;

    async fn list_all(&self) -> AppResult<Vec<Enrollment>>;

    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<Enrollment>>;
}

pub struct SqliteEnrollmentRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteEnrollmentRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_enrollment(row: &Row) -> Result<Enrollment, rusqlite::Error> {
        let id_str: String = row.get("id")?;
        let student_id_str: String = row.get("student_id")?;
        let course_id_str: String = row.get("course_id")?;

        let status_str: String = row.get("status")?;
        let status = match status_str.as_str() {
            "pending" => EnrollmentStatus::Pending,
            "approved" => EnrollmentStatus::Approved,
            "rejected" => EnrollmentStatus::Rejected,
            _ => return Err(rusqlite::Error::InvalidQuery),
        };

        let created_at_str: String = row.get("created_at")?;
        let updated_at_str: String = row.get("updated_at")?;

        Ok(Enrollment {
            id: parse_uuid(&id_str)?,
            student_id: parse_uuid(&student_id_str)?,
            course_id: parse_uuid(&course_id_str)?,
            status,
            created_at: parse_timestamp(&created_at_str)?,
            updated_at: parse_timestamp(&updated_at_str)?,
        })
    }

    fn map_pair_constraint(e: rusqlite::Error) -> AppError {
        if let rusqlite::Error::SqliteFailure(ref err, Some(ref msg)) = e {
            if err.code == rusqlite::ErrorCode::ConstraintViolation
                && msg.contains("enrollments.student_id")
            {
                return AppError::AlreadyEnrolled;
            }
        }
        AppError::Database(e)
    }
}

#[async_trait]
impl EnrollmentRepository for SqliteEnrollmentRepository {
    async fn insert(&self, enrollment: &Enrollment) -> AppResult<()> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO enrollments (id, student_id, course_id, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                enrollment.id.to_string(),
                enrollment.student_id.to_string(),
                enrollment.course_id.to_string(),
                enrollment.status.to_string(),
                enrollment.created_at.to_rfc3339(),
                enrollment.updated_at.to_rfc3339(),
            ],
        )
        .map_err(Self::map_pair_constraint)?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Enrollment>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, student_id, course_id, status, created_at, updated_at
             FROM enrollments WHERE id = ?1",
        )?;

        match stmt.query_row(params![id.to_string()], Self::row_to_enrollment) {
            Ok(enrollment) => Ok(Some(enrollment)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    async fn set_status(&self, id: Uuid, status: EnrollmentStatus) -> AppResult<()> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute(
            "UPDATE enrollments SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                status.to_string(),
                Utc::now().to_rfc3339(),
                id.to_string()
            ],
        )?;

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn get_for_student_and_course(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, student_id, course_id, status, created_at, updated_at
             FROM enrollments WHERE student_id = ?1 AND course_id = ?2",
        )?;

        match stmt.query_row(
            params![student_id.to_string(), course_id.to_string()],
            Self::row_to_enrollment,
        ) {
            Ok(enrollment) => Ok(Some(enrollment)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    async fn list_all(&self) -> AppResult<Vec<Enrollment>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, student_id, course_id, status, created_at, updated_at
             FROM enrollments
             ORDER BY created_at",
        )?;

        let enrollments = stmt
            .query_map([], Self::row_to_enrollment)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(enrollments)
    }

    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<Enrollment>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, student_id, course_id, status, created_at, updated_at
             FROM enrollments
             WHERE student_id = ?1
             ORDER BY created_at",
        )?;

        let enrollments = stmt
            .query_map(params![student_id.to_string()], Self::row_to_enrollment)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(enrollments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_support::{create_test_pool, TestDb};

    fn repo() -> (SqliteEnrollmentRepository, TestDb) {
        let db = create_test_pool();
        (SqliteEnrollmentRepository::new(db.pool.clone()), db)
    }

    #[tokio::test]
    async fn test_second_insert_for_pair_fails() {
        let (repo, _db) = repo();
        let student = Uuid::new_v4();
        let course = Uuid::new_v4();

        repo.insert(&Enrollment::new(student, course)).await.unwrap();
        let result = repo.insert(&Enrollment::new(student, course)).await;
        assert!(matches!(result, Err(AppError::AlreadyEnrolled)));

        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_enrollment_still_blocks_the_pair() {
        let (repo, _db) = repo();
        let enrollment = Enrollment::new(Uuid::new_v4(), Uuid::new_v4());
        repo.insert(&enrollment).await.unwrap();

        repo.set_status(enrollment.id, EnrollmentStatus::Rejected)
            .await
            .unwrap();

        let retry = Enrollment::new(enrollment.student_id, enrollment.course_id);
        assert!(matches!(
            repo.insert(&retry).await,
            Err(AppError::AlreadyEnrolled)
        ));
    }

    #[tokio::test]
    async fn test_point_lookup_through_composite_index() {
        let (repo, _db) = repo();
        let enrollment = Enrollment::new(Uuid::new_v4(), Uuid::new_v4());
        repo.insert(&enrollment).await.unwrap();

        let found = repo
            .get_for_student_and_course(enrollment.student_id, enrollment.course_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, enrollment.id);

        let missing = repo
            .get_for_student_and_course(enrollment.student_id, Uuid::new_v4())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_status_transition_and_missing_id() {
        let (repo, _db) = repo();
        let enrollment = Enrollment::new(Uuid::new_v4(), Uuid::new_v4());
        repo.insert(&enrollment).await.unwrap();

        repo.set_status(enrollment.id, EnrollmentStatus::Approved)
            .await
            .unwrap();
        let found = repo.get_by_id(enrollment.id).await.unwrap().unwrap();
        assert_eq!(found.status, EnrollmentStatus::Approved);

        assert!(matches!(
            repo.set_status(Uuid::new_v4(), EnrollmentStatus::Approved).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_by_student() {
        let (repo, _db) = repo();
        let student = Uuid::new_v4();
        repo.insert(&Enrollment::new(student, Uuid::new_v4())).await.unwrap();
        repo.insert(&Enrollment::new(student, Uuid::new_v4())).await.unwrap();
        repo.insert(&Enrollment::new(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(repo.list_by_student(student).await.unwrap().len(), 2);
    }
}

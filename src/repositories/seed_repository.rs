// src/repositories/seed_repository.rs
//
// First-run seeding sink.
//
// The bootstrapper assembles a complete SeedBatch (every asset fetch
// already resolved) and commits it in one shot: all records land
// together or none do.

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use rusqlite::params;

use crate::db::ConnectionPool;
use crate::domain::course::Course;
use crate::domain::enrollment::Enrollment;
use crate::domain::review::Review;
use crate::domain::user::User;
use crate::error::AppResult;
use crate::repositories::course_repository::SqliteCourseRepository;

/// A seed user together with its credential digest.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub user: User,
    pub credential: String,
}

/// Everything the first run writes, as one atomic unit.
#[derive(Debug, Clone, Default)]
pub struct SeedBatch {
    pub users: Vec<SeedUser>,
    pub courses: Vec<Course>,
    pub enrollments: Vec<Enrollment>,
    pub reviews: Vec<Review>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SeedRepository: Send + Sync {
    /// The seeding gate: true while the User collection has no records.
    async fn is_empty(&self) -> AppResult<bool>;

    /// Commit the whole batch atomically.
    async fn commit(&self, batch: &SeedBatch) -> AppResult<()>;
}

pub struct SqliteSeedRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteSeedRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeedRepository for SqliteSeedRepository {
    async fn is_empty(&self) -> AppResult<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count == 0)
    }

    async fn commit(&self, batch: &SeedBatch) -> AppResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        for seed_user in &batch.users {
            let user = &seed_user.user;
            tx.execute(
                "INSERT INTO users (id, email, name, role, credential, photo, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    user.id.to_string(),
                    user.email,
                    user.name,
                    user.role.to_string(),
                    seed_user.credential,
                    crate::repositories::media_to_json(&user.photo)?,
                    user.created_at.to_rfc3339(),
                    user.updated_at.to_rfc3339(),
                ],
            )?;
        }

        for course in &batch.courses {
            SqliteCourseRepository::insert_course_row(&tx, course)?;
            for lesson in &course.lessons {
                SqliteCourseRepository::insert_lesson_row(&tx, lesson, lesson.position)?;
            }
        }

        for enrollment in &batch.enrollments {
            tx.execute(
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
            )?;
        }

        for review in &batch.reviews {
            tx.execute(
                "INSERT INTO reviews (id, student_id, course_id, rating, comment, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    review.id.to_string(),
                    review.student_id.to_string(),
                    review.course_id.to_string(),
                    review.rating as i64,
                    review.comment,
                    review.created_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;

        log::info!(
            "seeded {} users, {} courses, {} enrollments, {} reviews",
            batch.users.len(),
            batch.courses.len(),
            batch.enrollments.len(),
            batch.reviews.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_support::{create_test_pool, TestDb};
    use crate::domain::course::Lesson;
    use crate::domain::user::UserRole;
    use uuid::Uuid;

    fn repo() -> (SqliteSeedRepository, TestDb) {
        let db = create_test_pool();
        (SqliteSeedRepository::new(db.pool.clone()), db)
    }

    fn small_batch() -> SeedBatch {
        let teacher = User::new(
            "Teacher".to_string(),
            "teacher@example.com".to_string(),
            UserRole::Teacher,
        );
        let mut course = Course::new("Seeded".to_string(), "".to_string(), teacher.id);
        let mut lesson = Lesson::new(course.id, "L1".to_string(), "x".to_string());
        lesson.position = 0;
        course.lessons.push(lesson);

        SeedBatch {
            users: vec![SeedUser {
                user: teacher,
                credential: "digest".to_string(),
            }],
            courses: vec![course],
            enrollments: vec![Enrollment::new(Uuid::new_v4(), Uuid::new_v4())],
            reviews: vec![Review::new(Uuid::new_v4(), Uuid::new_v4(), 5, "ok".to_string())],
        }
    }

    #[tokio::test]
    async fn test_is_empty_flips_after_commit() {
        let (repo, _db) = repo();
        assert!(repo.is_empty().await.unwrap());

        repo.commit(&small_batch()).await.unwrap();
        assert!(!repo.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_commit_is_all_or_nothing() {
        let (repo, _db) = repo();

        // Two users sharing an email trip the unique index mid-batch;
        // nothing at all may land.
        let mut batch = small_batch();
        let dup = User::new(
            "Impostor".to_string(),
            "teacher@example.com".to_string(),
            UserRole::Student,
        );
        batch.users.push(SeedUser {
            user: dup,
            credential: "digest".to_string(),
        });

        assert!(repo.commit(&batch).await.is_err());
        assert!(repo.is_empty().await.unwrap());
    }
}

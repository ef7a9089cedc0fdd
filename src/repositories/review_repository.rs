// src/repositories/review_repository.rs
//
// Review Store persistence - append-only, no update or delete path.

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::db::ConnectionPool;
use crate::domain::review::Review;
use crate::error::AppResult;
use crate::repositories::{parse_timestamp, parse_uuid};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Always inserts. No uniqueness constraint on (student, course): a
    /// student may submit several reviews for the same course.
    async fn insert(&self, review: &Review) -> AppResult<()>;

    async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<Review>>;
}

pub struct SqliteReviewRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteReviewRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_review(row: &Row) -> Result<Review, rusqlite::Error> {
        let id_str: String = row.get("id")?;
        let student_id_str: String = row.get("student_id")?;
        let course_id_str: String = row.get("course_id")?;
        let created_at_str: String = row.get("created_at")?;

        Ok(Review {
            id: parse_uuid(&id_str)?,
            student_id: parse_uuid(&student_id_str)?,
            course_id: parse_uuid(&course_id_str)?,
            rating: row.get::<_, i64>("rating")? as u8,
            comment: row.get("comment")?,
            created_at: parse_timestamp(&created_at_str)?,
        })
    }
}

#[async_trait]
impl ReviewRepository for SqliteReviewRepository {
    async fn insert(&self, review: &Review) -> AppResult<()> {
        let conn = self.pool.get()?;

        conn.execute(
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

        Ok(())
    }

    async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<Review>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, student_id, course_id, rating, comment, created_at
             FROM reviews
             WHERE course_id = ?1
             ORDER BY created_at",
        )?;

        let reviews = stmt
            .query_map(params![course_id.to_string()], Self::row_to_review)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_support::{create_test_pool, TestDb};

    fn repo() -> (SqliteReviewRepository, TestDb) {
        let db = create_test_pool();
        (SqliteReviewRepository::new(db.pool.clone()), db)
    }

    #[tokio::test]
    async fn test_insert_and_list_scoped_to_course() {
        let (repo, _db) = repo();
        let course = Uuid::new_v4();

        repo.insert(&Review::new(Uuid::new_v4(), course, 5, "great".to_string()))
            .await
            .unwrap();
        repo.insert(&Review::new(Uuid::new_v4(), course, 3, "fine".to_string()))
            .await
            .unwrap();
        repo.insert(&Review::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            1,
            "other course".to_string(),
        ))
        .await
        .unwrap();

        let reviews = repo.list_for_course(course).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert!(reviews.iter().all(|r| r.course_id == course));
    }

    #[tokio::test]
    async fn test_same_student_may_review_twice() {
        let (repo, _db) = repo();
        let student = Uuid::new_v4();
        let course = Uuid::new_v4();

        repo.insert(&Review::new(student, course, 4, "first".to_string()))
            .await
            .unwrap();
        repo.insert(&Review::new(student, course, 2, "changed my mind".to_string()))
            .await
            .unwrap();

        assert_eq!(repo.list_for_course(course).await.unwrap().len(), 2);
    }
}

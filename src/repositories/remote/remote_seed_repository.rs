// src/repositories/remote/remote_seed_repository.rs
//
// First-run seeding on the hosted backend: the entire dataset goes out
// as one atomic batch commit, including the email reservations and the
// composite-keyed enrollments, so a half-seeded store is impossible.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::remote_course_repository::CourseDoc;
use super::remote_enrollment_repository::pair_key;
use super::remote_user_repository::{email_key, UserDoc};
use super::{COURSES, ENROLLMENTS, LESSONS, REVIEWS, USERS, USER_EMAILS};
use crate::error::AppResult;
use crate::remote::{RemoteStore, WriteBatch};
use crate::repositories::{SeedBatch, SeedRepository};

pub struct RemoteSeedRepository {
    store: Arc<RemoteStore>,
}

impl RemoteSeedRepository {
    pub fn new(store: Arc<RemoteStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SeedRepository for RemoteSeedRepository {
    async fn is_empty(&self) -> AppResult<bool> {
        let users: Vec<serde_json::Value> = self.store.list_docs(USERS).await?;
        Ok(users.is_empty())
    }

    async fn commit(&self, batch: &SeedBatch) -> AppResult<()> {
        let mut writes = WriteBatch::new();

        for seed_user in &batch.users {
            let doc = UserDoc {
                user: seed_user.user.clone(),
                credential: seed_user.credential.clone(),
            };
            writes.create(USERS, seed_user.user.id.to_string(), &doc)?;
            writes.create(
                USER_EMAILS,
                email_key(&seed_user.user.email),
                &json!({ "user_id": seed_user.user.id }),
            )?;
        }

        for course in &batch.courses {
            writes.create(COURSES, course.id.to_string(), &CourseDoc::from_course(course))?;
            for lesson in &course.lessons {
                writes.create(LESSONS, lesson.id.to_string(), lesson)?;
            }
        }

        for enrollment in &batch.enrollments {
            writes.create(
                ENROLLMENTS,
                pair_key(enrollment.student_id, enrollment.course_id),
                enrollment,
            )?;
        }

        for review in &batch.reviews {
            writes.create(REVIEWS, review.id.to_string(), review)?;
        }

        log::info!(
            "committing seed batch of {} writes to the hosted backend",
            writes.len()
        );
        self.store.commit(writes).await
    }
}

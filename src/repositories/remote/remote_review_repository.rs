// src/repositories/remote/remote_review_repository.rs
//
// Review Store on the hosted backend - append-only documents keyed by
// the review's own id, queried by course.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::REVIEWS;
use crate::domain::review::Review;
use crate::error::AppResult;
use crate::remote::{Filter, RemoteStore};
use crate::repositories::ReviewRepository;

pub struct RemoteReviewRepository {
    store: Arc<RemoteStore>,
}

impl RemoteReviewRepository {
    pub fn new(store: Arc<RemoteStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReviewRepository for RemoteReviewRepository {
    async fn insert(&self, review: &Review) -> AppResult<()> {
        self.store
            .set_doc(REVIEWS, &review.id.to_string(), review)
            .await
    }

    async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<Review>> {
        let mut reviews: Vec<Review> = self
            .store
            .query_docs(REVIEWS, &[Filter::eq("course_id", course_id.to_string())])
            .await?;
        reviews.sort_by_key(|review| review.created_at);
        Ok(reviews)
    }
}

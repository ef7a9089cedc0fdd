// src/services/review_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::review::{validate_review, Review};
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, ReviewSubmitted};
use crate::repositories::ReviewRepository;

pub struct ReviewService {
    review_repo: Arc<dyn ReviewRepository>,
    event_bus: Arc<EventBus>,
}

impl ReviewService {
    pub fn new(review_repo: Arc<dyn ReviewRepository>, event_bus: Arc<EventBus>) -> Self {
        Self {
            review_repo,
            event_bus,
        }
    }

    /// Append a review. Immutable once stored; a student may submit more
    /// than one review for the same course.
    pub async fn submit(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        rating: u8,
        comment: String,
    ) -> AppResult<Review> {
        let review = Review::new(student_id, course_id, rating, comment);
        validate_review(&review).map_err(AppError::Domain)?;

        self.review_repo.insert(&review).await?;

        self.event_bus
            .emit(ReviewSubmitted::new(review.id, course_id, rating));

        Ok(review)
    }

    pub async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<Review>> {
        self.review_repo.list_for_course(course_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::review_repository::MockReviewRepository;

    #[tokio::test]
    async fn test_out_of_range_rating_never_reaches_the_store() {
        let mut repo = MockReviewRepository::new();
        repo.expect_insert().times(0);

        let service = ReviewService::new(Arc::new(repo), Arc::new(EventBus::new()));

        let result = service
            .submit(Uuid::new_v4(), Uuid::new_v4(), 6, "too good".to_string())
            .await;
        assert!(matches!(result, Err(AppError::Domain(_))));
    }

    #[tokio::test]
    async fn test_submit_inserts_and_emits() {
        let mut repo = MockReviewRepository::new();
        repo.expect_insert()
            .withf(|review| review.rating == 4)
            .times(1)
            .returning(|_| Ok(()));

        let bus = Arc::new(EventBus::new());
        let service = ReviewService::new(Arc::new(repo), bus.clone());

        service
            .submit(Uuid::new_v4(), Uuid::new_v4(), 4, "solid".to_string())
            .await
            .unwrap();

        assert_eq!(bus.get_event_log()[0].event_type, "ReviewSubmitted");
    }
}

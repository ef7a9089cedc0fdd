use super::entity::Review;
use crate::domain::{DomainError, DomainResult};

/// Validates all Review invariants
///
/// Rating range is enforced here; one-review-per-student-per-course is
/// deliberately NOT an invariant (the store is permissive and append-only).
pub fn validate_review(review: &Review) -> DomainResult<()> {
    if !(1..=5).contains(&review.rating) {
        return Err(DomainError::InvariantViolation(format!(
            "Review rating must be between 1 and 5, got {}",
            review.rating
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_rating_bounds() {
        for rating in 1..=5u8 {
            let review = Review::new(Uuid::new_v4(), Uuid::new_v4(), rating, "ok".to_string());
            assert!(validate_review(&review).is_ok());
        }
        for rating in [0u8, 6, 100] {
            let review = Review::new(Uuid::new_v4(), Uuid::new_v4(), rating, "ok".to_string());
            assert!(validate_review(&review).is_err());
        }
    }
}

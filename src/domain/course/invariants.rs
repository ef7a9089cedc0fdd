use std::collections::HashSet;

use uuid::Uuid;

use super::entity::{Course, Lesson};
use crate::domain::{DomainError, DomainResult};

/// Validates all Course invariants
pub fn validate_course(course: &Course) -> DomainResult<()> {
    if course.title.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Course title cannot be empty".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_lesson(lesson: &Lesson) -> DomainResult<()> {
    if lesson.title.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Lesson title cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// A reorder payload is valid only if it is exactly a permutation of the
/// current lesson id set: same length, no unknown ids, no omissions, no
/// repeats.
pub fn is_lesson_permutation(current: &[Uuid], proposed: &[Uuid]) -> bool {
    if current.len() != proposed.len() {
        return false;
    }
    let current_set: HashSet<Uuid> = current.iter().copied().collect();
    let proposed_set: HashSet<Uuid> = proposed.iter().copied().collect();
    proposed_set.len() == proposed.len() && current_set == proposed_set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_valid_course() {
        let course = Course::new(
            "Rust 101".to_string(),
            "Intro".to_string(),
            Uuid::new_v4(),
        );
        assert!(validate_course(&course).is_ok());
    }

    #[test]
    fn test_empty_title_fails() {
        let course = Course::new("  ".to_string(), "Intro".to_string(), Uuid::new_v4());
        assert!(validate_course(&course).is_err());
    }

    #[test]
    fn test_permutation_accepts_any_reordering() {
        let current = ids(3);
        let mut proposed = current.clone();
        proposed.swap(0, 2);
        assert!(is_lesson_permutation(&current, &proposed));
    }

    #[test]
    fn test_permutation_rejects_unknown_id() {
        let current = ids(3);
        let mut proposed = current.clone();
        proposed[1] = Uuid::new_v4();
        assert!(!is_lesson_permutation(&current, &proposed));
    }

    #[test]
    fn test_permutation_rejects_omission_and_repeat() {
        let current = ids(3);

        let shorter = &current[..2];
        assert!(!is_lesson_permutation(&current, shorter));

        let mut repeated = current.clone();
        repeated[2] = repeated[0];
        assert!(!is_lesson_permutation(&current, &repeated));
    }

    #[test]
    fn test_permutation_of_empty_set() {
        assert!(is_lesson_permutation(&[], &[]));
    }
}

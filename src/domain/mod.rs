// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// This file MUST declare all domain modules and re-export their public API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod course;
pub mod enrollment;
pub mod media;
pub mod review;
pub mod user;
pub mod views;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// User Domain
pub use user::{validate_email, validate_user, User, UserRole};

// Course Domain
pub use course::{
    is_lesson_permutation, validate_course, validate_lesson, Course, CourseStatus, Lesson,
};

// Enrollment Domain
pub use enrollment::{Enrollment, EnrollmentStatus};

// Review Domain
pub use review::{validate_review, Review};

// Media references
pub use media::{MediaPatch, MediaSource, MediaUpload};

// Join Views (Derived Data)
pub use views::{
    join_courses_with_teachers, join_enrollment_details, CourseWithTeacher, EnrollmentDetails,
    UNKNOWN_COURSE, UNKNOWN_STUDENT, UNKNOWN_TEACHER,
};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Entity not found: {0}")]
    NotFound(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;

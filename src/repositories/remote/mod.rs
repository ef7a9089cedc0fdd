// src/repositories/remote/mod.rs
//
// Hosted-backend implementations of the repository contract.
//
// Same traits, same invariants, different substrate: documents in named
// collections plus create-only writes standing in for unique indexes.
// Joins and ordering are computed client-side; the server only offers
// point reads, equality queries and atomic batches.

pub mod remote_course_repository;
pub mod remote_enrollment_repository;
pub mod remote_review_repository;
pub mod remote_seed_repository;
pub mod remote_user_repository;

pub use remote_course_repository::RemoteCourseRepository;
pub use remote_enrollment_repository::RemoteEnrollmentRepository;
pub use remote_review_repository::RemoteReviewRepository;
pub use remote_seed_repository::RemoteSeedRepository;
pub use remote_user_repository::RemoteUserRepository;

// Collection names shared across the hosted implementations
pub(crate) const USERS: &str = "users";
pub(crate) const USER_EMAILS: &str = "user_emails";
pub(crate) const COURSES: &str = "courses";
pub(crate) const LESSONS: &str = "lessons";
pub(crate) const ENROLLMENTS: &str = "enrollments";
pub(crate) const REVIEWS: &str = "reviews";

pub mod entity;

pub use entity::{Enrollment, EnrollmentStatus};

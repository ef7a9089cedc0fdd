pub mod entity;
pub mod invariants;

pub use entity::{Course, CourseStatus, Lesson};
pub use invariants::{is_lesson_permutation, validate_course, validate_lesson};

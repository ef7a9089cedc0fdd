pub mod entity;
pub mod invariants;

pub use entity::{User, UserRole};
pub use invariants::{validate_email, validate_user};

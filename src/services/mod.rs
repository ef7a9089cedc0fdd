// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod catalog_service;
pub mod course_service;
pub mod enrollment_service;
pub mod identity_service;
pub mod review_service;
pub mod seed_service;

#[cfg(test)]
mod contract_tests;

// Re-export all services and their request types
pub use identity_service::{
    IdentityService,
    RegisterUserRequest,
    UpdateUserRequest,
};

pub use course_service::{
    AddLessonRequest,
    CourseService,
    CreateCourseRequest,
    UpdateCourseRequest,
    UpdateLessonRequest,
};

pub use enrollment_service::EnrollmentService;

pub use review_service::ReviewService;

pub use catalog_service::CatalogService;

pub use seed_service::{SeedService, SeedAsset};

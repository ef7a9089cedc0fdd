// src/lib.rs
// LearnHub - client-side course catalog and enrollment data layer
//
// Architecture:
// - Domain-centric: entities and invariants live in domain/
// - One repository contract, two backends: embedded SQLite and a hosted
//   document store + object storage, selected once at startup
// - Services orchestrate repositories and the blob store; joins are
//   recomputed from snapshots on every query
// - Event-driven at the edges: services emit domain events, the hosted
//   transport emits CollectionChanged for live queries

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod remote;
pub mod repositories;
pub mod services;
pub mod storage;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod app;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{
    is_lesson_permutation,
    join_courses_with_teachers,
    join_enrollment_details,
    validate_course,
    validate_email,
    validate_lesson,
    validate_review,
    validate_user,
    // Course
    Course,
    CourseStatus,
    // Join Views
    CourseWithTeacher,
    // Enrollment
    Enrollment,
    EnrollmentDetails,
    EnrollmentStatus,
    Lesson,
    // Media references
    MediaPatch,
    MediaSource,
    MediaUpload,
    // Review
    Review,
    // User
    User,
    UserRole,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus,
    CollectionChanged,
    CourseCreated,
    CourseDeleted,
    CourseUpdated,
    DomainEvent,
    EnrollmentRequested,
    EnrollmentStatusChanged,
    EventBus,
    EventLogEntry,
    ReviewSubmitted,
    SeedCompleted,
    UserRegistered,
    UserRemoved,
};

// ============================================================================
// PUBLIC API - Persistence
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};

pub use remote::{RemoteConfig, RemoteStore};

pub use repositories::{
    CourseRepository,
    EnrollmentRepository,
    RemoteCourseRepository,
    RemoteEnrollmentRepository,
    RemoteReviewRepository,
    RemoteSeedRepository,
    RemoteUserRepository,
    ReviewRepository,
    SeedBatch,
    SeedRepository,
    SqliteCourseRepository,
    SqliteEnrollmentRepository,
    SqliteReviewRepository,
    SqliteSeedRepository,
    SqliteUserRepository,
    UserRepository,
};

pub use storage::{BlobStore, LocalBlobStore, RemoteBlobStore};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    AddLessonRequest,
    CatalogService,
    CourseService,
    CreateCourseRequest,
    EnrollmentService,
    IdentityService,
    RegisterUserRequest,
    ReviewService,
    SeedService,
    UpdateCourseRequest,
    UpdateLessonRequest,
    UpdateUserRequest,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use app::AppState;

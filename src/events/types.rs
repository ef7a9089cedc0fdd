// events/types.rs
//
// All domain events in the system.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events are immutable
// - Events carry only the data needed to react
// - No business logic in event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

// ============================================================================
// LIVE UPDATE NOTIFICATIONS (hosted backend only)
// ============================================================================

/// Emitted by the hosted backend after every acknowledged write.
///
/// Subscribers re-run their queries against the named collection and
/// receive a full refreshed result set; no incremental diff is carried.
/// The embedded backend never emits this — callers re-query after
/// mutations instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub collection: String,
}

impl CollectionChanged {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            collection: collection.into(),
        }
    }
}

impl DomainEvent for CollectionChanged {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "CollectionChanged" }
}

// ============================================================================
// IDENTITY EVENTS
// ============================================================================

/// Emitted when a new user registers or is created by admin tooling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegistered {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub email: String,
    pub role: String, // "admin", "teacher", "student"
}

impl UserRegistered {
    pub fn new(user_id: Uuid, email: String, role: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            user_id,
            email,
            role,
        }
    }
}

impl DomainEvent for UserRegistered {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "UserRegistered" }
}

/// Emitted when a directory entry is removed. Dependent records are left
/// in place; readers degrade their display values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRemoved {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub user_id: Uuid,
}

impl UserRemoved {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            user_id,
        }
    }
}

impl DomainEvent for UserRemoved {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "UserRemoved" }
}

// ============================================================================
// COURSE EVENTS
// ============================================================================

/// Emitted when a new Course is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseCreated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub course_id: Uuid,
    pub title: String,
    pub teacher_id: Uuid,
}

impl CourseCreated {
    pub fn new(course_id: Uuid, title: String, teacher_id: Uuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            course_id,
            title,
            teacher_id,
        }
    }
}

impl DomainEvent for CourseCreated {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "CourseCreated" }
}

/// Emitted when course metadata or its lesson set changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseUpdated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub course_id: Uuid,
}

impl CourseUpdated {
    pub fn new(course_id: Uuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            course_id,
        }
    }
}

impl DomainEvent for CourseUpdated {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "CourseUpdated" }
}

/// Emitted when a course (and all of its lessons) is deleted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDeleted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub course_id: Uuid,
}

impl CourseDeleted {
    pub fn new(course_id: Uuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            course_id,
        }
    }
}

impl DomainEvent for CourseDeleted {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "CourseDeleted" }
}

// ============================================================================
// ENROLLMENT EVENTS
// ============================================================================

/// Emitted when a student requests enrollment (status Pending)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentRequested {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub enrollment_id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
}

impl EnrollmentRequested {
    pub fn new(enrollment_id: Uuid, student_id: Uuid, course_id: Uuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            enrollment_id,
            student_id,
            course_id,
        }
    }
}

impl DomainEvent for EnrollmentRequested {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "EnrollmentRequested" }
}

/// Emitted on an admin approval/rejection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentStatusChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub enrollment_id: Uuid,
    pub status: String, // "pending", "approved", "rejected"
}

impl EnrollmentStatusChanged {
    pub fn new(enrollment_id: Uuid, status: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            enrollment_id,
            status,
        }
    }
}

impl DomainEvent for EnrollmentStatusChanged {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "EnrollmentStatusChanged" }
}

// ============================================================================
// REVIEW EVENTS
// ============================================================================

/// Emitted when a review is appended to a course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSubmitted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub review_id: Uuid,
    pub course_id: Uuid,
    pub rating: u8,
}

impl ReviewSubmitted {
    pub fn new(review_id: Uuid, course_id: Uuid, rating: u8) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            review_id,
            course_id,
            rating,
        }
    }
}

impl DomainEvent for ReviewSubmitted {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "ReviewSubmitted" }
}

// ============================================================================
// SEEDING EVENTS
// ============================================================================

/// Emitted once after a successful first-run seed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCompleted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub user_count: usize,
    pub course_count: usize,
    pub degraded_assets: usize,
}

impl SeedCompleted {
    pub fn new(user_count: usize, course_count: usize, degraded_assets: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            user_count,
            course_count,
            degraded_assets,
        }
    }
}

impl DomainEvent for SeedCompleted {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "SeedCompleted" }
}

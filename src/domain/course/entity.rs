use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::media::MediaSource;

/// A course aggregate: metadata plus its ordered lesson list.
///
/// Lessons have no identity outside the course; deleting a course removes
/// them all. The lesson order is significant and is preserved exactly as
/// stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Internal immutable identifier
    pub id: Uuid,

    pub title: String,

    pub description: String,

    /// Authoring teacher. Not a hard foreign key: a removed user leaves
    /// this dangling and readers fall back to an "Unknown" display value.
    pub teacher_id: Uuid,

    pub status: CourseStatus,

    /// Cover image reference
    pub image: Option<MediaSource>,

    /// Lessons in stored order. Populated on reads; list/write operations
    /// on course metadata do not touch it.
    #[serde(default)]
    pub lessons: Vec<Lesson>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    Draft,
    Published,
    Archived,
}

impl Course {
    /// Create a new course in Draft with an empty lesson list.
    pub fn new(title: String, description: String, teacher_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            teacher_id,
            status: CourseStatus::Draft,
            image: None,
            lessons: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge provided metadata fields, touching the update timestamp.
    pub fn apply_update(
        &mut self,
        title: Option<String>,
        description: Option<String>,
        status: Option<CourseStatus>,
    ) {
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(status) = status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }

    pub fn set_image(&mut self, image: Option<MediaSource>) {
        self.image = image;
        self.updated_at = Utc::now();
    }

    pub fn lesson_ids(&self) -> Vec<Uuid> {
        self.lessons.iter().map(|l| l.id).collect()
    }
}

/// A lesson owned by a course.
///
/// The video slot is either an owned blob reference or an external URL,
/// never both; the MediaSource enum makes that structural. Size fields
/// are informational (megabytes) and only meaningful for uploaded files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Uuid,

    pub course_id: Uuid,

    pub title: String,

    /// Rich-text markup, opaque to the repository
    pub content: String,

    pub video: Option<MediaSource>,

    pub video_size_mb: Option<f64>,

    pub attachment: Option<MediaSource>,

    /// Declared file name of an uploaded attachment
    pub attachment_name: Option<String>,

    pub attachment_size_mb: Option<f64>,

    /// Free-text duration label, e.g. "12 min"
    pub duration: Option<String>,

    /// Explicit place in the course order. Gaps are fine after deletions;
    /// duplicates within a course are not.
    pub position: u32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    /// Create a lesson with empty media slots. The position is assigned
    /// by the repository when the lesson is appended.
    pub fn new(course_id: Uuid, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            course_id,
            title,
            content,
            video: None,
            video_size_mb: None,
            attachment: None,
            attachment_name: None,
            attachment_size_mb: None,
            duration: None,
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(
        &mut self,
        title: Option<String>,
        content: Option<String>,
        duration: Option<Option<String>>,
    ) {
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(content) = content {
            self.content = content;
        }
        if let Some(duration) = duration {
            self.duration = duration;
        }
        self.updated_at = Utc::now();
    }

    /// Point the video slot at an uploaded file, dropping URL state.
    pub fn set_video_stored(&mut self, source: MediaSource, size_mb: f64) {
        self.video = Some(source);
        self.video_size_mb = Some(size_mb);
        self.updated_at = Utc::now();
    }

    /// Point the video slot at an external URL, dropping file-derived state.
    pub fn set_video_external(&mut self, url: String) {
        self.video = Some(MediaSource::external(url));
        self.video_size_mb = None;
        self.updated_at = Utc::now();
    }

    /// Clear the video slot and its derived metadata.
    pub fn clear_video(&mut self) {
        self.video = None;
        self.video_size_mb = None;
        self.updated_at = Utc::now();
    }

    pub fn set_attachment_stored(&mut self, source: MediaSource, file_name: String, size_mb: f64) {
        self.attachment = Some(source);
        self.attachment_name = Some(file_name);
        self.attachment_size_mb = Some(size_mb);
        self.updated_at = Utc::now();
    }

    pub fn set_attachment_external(&mut self, url: String) {
        self.attachment = Some(MediaSource::external(url));
        self.attachment_name = None;
        self.attachment_size_mb = None;
        self.updated_at = Utc::now();
    }

    pub fn clear_attachment(&mut self) {
        self.attachment = None;
        self.attachment_name = None;
        self.attachment_size_mb = None;
        self.updated_at = Utc::now();
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseStatus::Draft => write!(f, "draft"),
            CourseStatus::Published => write!(f, "published"),
            CourseStatus::Archived => write!(f, "archived"),
        }
    }
}

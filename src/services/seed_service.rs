// src/services/seed_service.rs
//
// First-run seeding.
//
// Sequence: gate on an empty user collection, fetch every remote asset,
// move the fetched bytes into the blob store, then commit all records as
// one atomic batch. A failed asset fetch or upload degrades that record
// to no media reference; it never aborts the seed, and no record is
// written before its media has settled one way or the other.
//
// Record ids are v5 UUIDs over fixed names so that both backends produce
// the identical first-run dataset.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use uuid::Uuid;

use crate::domain::course::{Course, CourseStatus, Lesson};
use crate::domain::enrollment::{Enrollment, EnrollmentStatus};
use crate::domain::review::Review;
use crate::domain::user::{User, UserRole};
use crate::domain::MediaSource;
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, SeedCompleted};
use crate::repositories::{SeedBatch, SeedRepository, SeedUser};
use crate::services::identity_service::digest_credential;
use crate::storage::BlobStore;

fn seed_id(name: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("learnhub:seed:{}", name).as_bytes())
}

/// One remote asset the seed dataset wants in the blob store.
#[derive(Debug, Clone)]
pub struct SeedAsset {
    key: &'static str,
    url: String,
    storage_path: String,
}

fn default_assets() -> Vec<SeedAsset> {
    vec![
        SeedAsset {
            key: "teacher-photo",
            url: "https://static.learnhub.app/seed/teacher.jpg".to_string(),
            storage_path: format!("users/{}/photo.jpg", seed_id("user:teacher")),
        },
        SeedAsset {
            key: "course-rust-image",
            url: "https://static.learnhub.app/seed/rust-fundamentals.jpg".to_string(),
            storage_path: format!("courses/{}/cover.jpg", seed_id("course:rust")),
        },
        SeedAsset {
            key: "course-web-image",
            url: "https://static.learnhub.app/seed/web-apis.jpg".to_string(),
            storage_path: format!("courses/{}/cover.jpg", seed_id("course:web")),
        },
    ]
}

pub struct SeedService {
    seed_repo: Arc<dyn SeedRepository>,
    blob_store: Arc<dyn BlobStore>,
    event_bus: Arc<EventBus>,
    http: Client,
    assets: Vec<SeedAsset>,
}

impl SeedService {
    pub fn new(
        seed_repo: Arc<dyn SeedRepository>,
        blob_store: Arc<dyn BlobStore>,
        event_bus: Arc<EventBus>,
    ) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::StorageUnavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            seed_repo,
            blob_store,
            event_bus,
            http,
            assets: default_assets(),
        })
    }

    #[cfg(test)]
    pub fn with_assets(mut self, assets: Vec<SeedAsset>) -> Self {
        self.assets = assets;
        self
    }

    /// Seed the demonstration dataset on first run. Returns true when a
    /// seed was performed, false when records already existed.
    pub async fn seed_if_empty(&self) -> AppResult<bool> {
        if !self.seed_repo.is_empty().await? {
            log::debug!("store already has users, skipping seed");
            return Ok(false);
        }

        // Every fetch resolves before the first write
        let mut fetched: HashMap<&'static str, Vec<u8>> = HashMap::new();
        for asset in &self.assets {
            match self.fetch_asset(&asset.url).await {
                Ok(bytes) => {
                    fetched.insert(asset.key, bytes);
                }
                Err(e) => {
                    log::warn!("seed asset {} unavailable, seeding without it: {}", asset.key, e);
                }
            }
        }

        // Uploads next; a failed upload degrades exactly like a failed fetch
        let mut media: HashMap<&'static str, MediaSource> = HashMap::new();
        for asset in &self.assets {
            if let Some(bytes) = fetched.get(asset.key) {
                match self.blob_store.put(&asset.storage_path, bytes).await {
                    Ok(source) => {
                        media.insert(asset.key, source);
                    }
                    Err(e) => {
                        log::warn!("seed asset {} failed to store, seeding without it: {}", asset.key, e);
                    }
                }
            }
        }

        let degraded = self.assets.len() - media.len();
        let batch = build_seed_batch(&media);
        self.seed_repo.commit(&batch).await?;

        self.event_bus.emit(SeedCompleted::new(
            batch.users.len(),
            batch.courses.len(),
            degraded,
        ));

        Ok(true)
    }

    async fn fetch_asset(&self, url: &str) -> AppResult<Vec<u8>> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::Other(format!(
                "asset fetch returned {}",
                response.status()
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// The literal first-run dataset: 1 admin, 1 teacher, 2 students, 2
/// published courses (3 and 2 lessons), 2 enrollments (one approved, one
/// pending), 1 review.
fn build_seed_batch(media: &HashMap<&'static str, MediaSource>) -> SeedBatch {
    let mut admin = User::new(
        "Morgan Hale".to_string(),
        "admin@learnhub.app".to_string(),
        UserRole::Admin,
    );
    admin.id = seed_id("user:admin");

    let mut teacher = User::new(
        "Elena Vasquez".to_string(),
        "elena@learnhub.app".to_string(),
        UserRole::Teacher,
    );
    teacher.id = seed_id("user:teacher");
    teacher.photo = media.get("teacher-photo").cloned();

    let mut student_one = User::new(
        "Sam Porter".to_string(),
        "sam@learnhub.app".to_string(),
        UserRole::Student,
    );
    student_one.id = seed_id("user:student-1");

    let mut student_two = User::new(
        "Noor Haddad".to_string(),
        "noor@learnhub.app".to_string(),
        UserRole::Student,
    );
    student_two.id = seed_id("user:student-2");

    let mut rust_course = Course::new(
        "Rust Fundamentals".to_string(),
        "Ownership, borrowing and fearless systems programming from first principles.".to_string(),
        teacher.id,
    );
    rust_course.id = seed_id("course:rust");
    rust_course.status = CourseStatus::Published;
    rust_course.image = media.get("course-rust-image").cloned();
    rust_course.lessons = seed_lessons(
        rust_course.id,
        "course:rust",
        &[
            ("Getting Started", "<p>Install the toolchain and build your first binary.</p>", "15 min"),
            ("Ownership and Borrowing", "<p>The rules that make the language what it is.</p>", "25 min"),
            ("Error Handling", "<p>Results, propagation and recoverable failures.</p>", "20 min"),
        ],
    );
    if let Some(lesson) = rust_course.lessons.first_mut() {
        lesson.set_video_external("https://videos.learnhub.app/seed/rust-getting-started.mp4".to_string());
    }

    let mut web_course = Course::new(
        "Building Web APIs".to_string(),
        "Design and ship a production HTTP service, from routes to deployment.".to_string(),
        teacher.id,
    );
    web_course.id = seed_id("course:web");
    web_course.status = CourseStatus::Published;
    web_course.image = media.get("course-web-image").cloned();
    web_course.lessons = seed_lessons(
        web_course.id,
        "course:web",
        &[
            ("REST in Practice", "<p>Resources, verbs and pragmatic trade-offs.</p>", "18 min"),
            ("Authentication", "<p>Sessions, tokens and where secrets live.</p>", "22 min"),
        ],
    );

    let mut approved = Enrollment::new(student_one.id, rust_course.id);
    approved.id = seed_id("enrollment:student-1:rust");
    approved.set_status(EnrollmentStatus::Approved);

    let mut pending = Enrollment::new(student_two.id, rust_course.id);
    pending.id = seed_id("enrollment:student-2:rust");

    let mut review = Review::new(
        student_one.id,
        rust_course.id,
        5,
        "The ownership chapter finally made the borrow checker click.".to_string(),
    );
    review.id = seed_id("review:student-1:rust");

    let users = vec![
        SeedUser { user: admin, credential: digest_credential("admin123") },
        SeedUser { user: teacher, credential: digest_credential("teacher123") },
        SeedUser { user: student_one, credential: digest_credential("student123") },
        SeedUser { user: student_two, credential: digest_credential("student123") },
    ];

    SeedBatch {
        users,
        courses: vec![rust_course, web_course],
        enrollments: vec![approved, pending],
        reviews: vec![review],
    }
}

fn seed_lessons(course_id: Uuid, course_key: &str, specs: &[(&str, &str, &str)]) -> Vec<Lesson> {
    specs
        .iter()
        .enumerate()
        .map(|(index, (title, content, duration))| {
            let mut lesson = Lesson::new(course_id, title.to_string(), content.to_string());
            lesson.id = seed_id(&format!("lesson:{}:{}", course_key, index));
            lesson.duration = Some(duration.to_string());
            lesson.position = index as u32;
            lesson
        })
        .collect()
}

// src/services/course_service.rs
//
// Course aggregate orchestration: uploads always land in the blob store
// before the record that references them is written, and every media
// slot follows the same remove / replace-with-file / replace-with-URL /
// leave-unchanged instruction set.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::course::{validate_course, validate_lesson, Course, CourseStatus, Lesson};
use crate::domain::{MediaPatch, MediaSource, MediaUpload};
use crate::error::{AppError, AppResult};
use crate::events::{CourseCreated, CourseDeleted, CourseUpdated, EventBus};
use crate::repositories::CourseRepository;
use crate::storage::BlobStore;

#[derive(Debug, Clone)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    /// Defaults to Draft when absent.
    pub status: Option<CourseStatus>,
    pub image: MediaPatch,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<CourseStatus>,
    pub image: MediaPatch,
}

#[derive(Debug, Clone)]
pub struct AddLessonRequest {
    pub title: String,
    pub content: String,
    pub duration: Option<String>,
    /// When both a file and a URL arrive, the file wins and the URL is
    /// ignored.
    pub video_file: Option<MediaUpload>,
    pub video_url: Option<String>,
    pub attachment: Option<MediaUpload>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub duration: Option<Option<String>>,
    pub video: MediaPatch,
    pub attachment: MediaPatch,
}

pub struct CourseService {
    course_repo: Arc<dyn CourseRepository>,
    blob_store: Arc<dyn BlobStore>,
    event_bus: Arc<EventBus>,
}

impl CourseService {
    pub fn new(
        course_repo: Arc<dyn CourseRepository>,
        blob_store: Arc<dyn BlobStore>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            course_repo,
            blob_store,
            event_bus,
        }
    }

    pub async fn create(&self, request: CreateCourseRequest, teacher_id: Uuid) -> AppResult<Course> {
        let mut course = Course::new(request.title, request.description, teacher_id);
        if let Some(status) = request.status {
            course.apply_update(None, None, Some(status));
        }
        validate_course(&course).map_err(AppError::Domain)?;

        self.apply_image_patch(&mut course, request.image).await?;

        self.course_repo.insert(&course).await?;

        self.event_bus.emit(CourseCreated::new(
            course.id,
            course.title.clone(),
            course.teacher_id,
        ));

        Ok(course)
    }

    pub async fn update(&self, course_id: Uuid, request: UpdateCourseRequest) -> AppResult<Course> {
        let mut course = self
            .course_repo
            .get_by_id(course_id)
            .await?
            .ok_or(AppError::NotFound)?;

        course.apply_update(request.title, request.description, request.status);
        validate_course(&course).map_err(AppError::Domain)?;

        self.apply_image_patch(&mut course, request.image).await?;

        self.course_repo.update_meta(&course).await?;

        self.event_bus.emit(CourseUpdated::new(course.id));
        Ok(course)
    }

    /// Delete the course and all of its lessons.
    pub async fn delete(&self, course_id: Uuid) -> AppResult<()> {
        self.course_repo.delete(course_id).await?;
        self.event_bus.emit(CourseDeleted::new(course_id));
        Ok(())
    }

    pub async fn get(&self, course_id: Uuid) -> AppResult<Option<Course>> {
        self.course_repo.get_by_id(course_id).await
    }

    pub async fn list_published(&self) -> AppResult<Vec<Course>> {
        self.course_repo.list_published().await
    }

    pub async fn list_by_teacher(&self, teacher_id: Uuid) -> AppResult<Vec<Course>> {
        self.course_repo.list_by_teacher(teacher_id).await
    }

    pub async fn add_lesson(&self, course_id: Uuid, request: AddLessonRequest) -> AppResult<Lesson> {
        let mut lesson = Lesson::new(course_id, request.title, request.content);
        lesson.duration = request.duration;
        validate_lesson(&lesson).map_err(AppError::Domain)?;

        if let Some(upload) = request.video_file {
            self.upload_video(&mut lesson, upload).await?;
        } else if let Some(url) = request.video_url {
            lesson.set_video_external(url);
        }

        if let Some(upload) = request.attachment {
            self.upload_attachment(&mut lesson, upload).await?;
        }

        lesson.position = self.course_repo.append_lesson(&lesson).await?;

        self.event_bus.emit(CourseUpdated::new(course_id));
        Ok(lesson)
    }

    pub async fn update_lesson(
        &self,
        course_id: Uuid,
        lesson_id: Uuid,
        request: UpdateLessonRequest,
    ) -> AppResult<Lesson> {
        let course = self
            .course_repo
            .get_by_id(course_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let mut lesson = course
            .lessons
            .iter()
            .find(|lesson| lesson.id == lesson_id)
            .cloned()
            .ok_or(AppError::NotFound)?;

        lesson.apply_update(request.title, request.content, request.duration);
        validate_lesson(&lesson).map_err(AppError::Domain)?;

        // Same instruction set for both slots
        match request.video {
            MediaPatch::Keep => {}
            MediaPatch::Remove => lesson.clear_video(),
            MediaPatch::UploadFile(upload) => self.upload_video(&mut lesson, upload).await?,
            MediaPatch::SetUrl(url) => lesson.set_video_external(url),
        }
        match request.attachment {
            MediaPatch::Keep => {}
            MediaPatch::Remove => lesson.clear_attachment(),
            MediaPatch::UploadFile(upload) => self.upload_attachment(&mut lesson, upload).await?,
            MediaPatch::SetUrl(url) => lesson.set_attachment_external(url),
        }

        self.course_repo.update_lesson(&lesson).await?;

        self.event_bus.emit(CourseUpdated::new(course_id));
        Ok(lesson)
    }

    pub async fn delete_lesson(&self, course_id: Uuid, lesson_id: Uuid) -> AppResult<()> {
        self.course_repo.delete_lesson(course_id, lesson_id).await?;
        self.event_bus.emit(CourseUpdated::new(course_id));
        Ok(())
    }

    /// Adopt a new lesson order; the payload must be a permutation of the
    /// current lesson ids.
    pub async fn reorder_lessons(&self, course_id: Uuid, ordered_ids: Vec<Uuid>) -> AppResult<()> {
        self.course_repo
            .reorder_lessons(course_id, &ordered_ids)
            .await?;
        self.event_bus.emit(CourseUpdated::new(course_id));
        Ok(())
    }

    /// Resolve a course image reference for display this session.
    pub async fn image_url(&self, course: &Course) -> AppResult<Option<String>> {
        match &course.image {
            None => Ok(None),
            Some(source) => Ok(Some(self.blob_store.resolve(source).await?)),
        }
    }

    async fn apply_image_patch(&self, course: &mut Course, patch: MediaPatch) -> AppResult<()> {
        match patch {
            MediaPatch::Keep => {}
            MediaPatch::Remove => course.set_image(None),
            MediaPatch::UploadFile(upload) => {
                let path = format!("courses/{}/{}", course.id, upload.file_name);
                let source = self.blob_store.put(&path, &upload.bytes).await?;
                course.set_image(Some(source));
            }
            MediaPatch::SetUrl(url) => course.set_image(Some(MediaSource::external(url))),
        }
        Ok(())
    }

    async fn upload_video(&self, lesson: &mut Lesson, upload: MediaUpload) -> AppResult<()> {
        let path = format!(
            "courses/{}/lessons/{}/video/{}",
            lesson.course_id, lesson.id, upload.file_name
        );
        let size_mb = upload.size_mb();
        let source = self.blob_store.put(&path, &upload.bytes).await?;
        lesson.set_video_stored(source, size_mb);
        Ok(())
    }

    async fn upload_attachment(&self, lesson: &mut Lesson, upload: MediaUpload) -> AppResult<()> {
        let path = format!(
            "courses/{}/lessons/{}/attachment/{}",
            lesson.course_id, lesson.id, upload.file_name
        );
        let size_mb = upload.size_mb();
        let source = self.blob_store.put(&path, &upload.bytes).await?;
        lesson.set_attachment_stored(source, upload.file_name, size_mb);
        Ok(())
    }
}

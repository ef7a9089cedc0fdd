// src/repositories/remote/remote_course_repository.rs
//
// Course aggregate on the hosted backend.
//
// The course document holds metadata only; lessons are documents of
// their own carrying course_id and an explicit integer position. Reads
// reassemble the aggregate client-side, sorted by position. Reorders and
// cascading deletes go through one atomic batch.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{COURSES, LESSONS};
use crate::domain::course::{is_lesson_permutation, Course, CourseStatus, Lesson};
use crate::domain::media::MediaSource;
use crate::error::{AppError, AppResult};
use crate::remote::{Filter, RemoteStore, WriteBatch};
use crate::repositories::CourseRepository;

/// Course metadata as stored; the lesson list is never embedded here.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CourseDoc {
    id: Uuid,
    title: String,
    description: String,
    teacher_id: Uuid,
    status: CourseStatus,
    image: Option<MediaSource>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CourseDoc {
    pub(crate) fn from_course(course: &Course) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            teacher_id: course.teacher_id,
            status: course.status,
            image: course.image.clone(),
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }

    fn into_course(self, lessons: Vec<Lesson>) -> Course {
        Course {
            id: self.id,
            title: self.title,
            description: self.description,
            teacher_id: self.teacher_id,
            status: self.status,
            image: self.image,
            lessons,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub struct RemoteCourseRepository {
    store: Arc<RemoteStore>,
}

impl RemoteCourseRepository {
    pub fn new(store: Arc<RemoteStore>) -> Self {
        Self { store }
    }

    async fn get_course_doc(&self, id: Uuid) -> AppResult<Option<CourseDoc>> {
        self.store.get_doc(COURSES, &id.to_string()).await
    }

    async fn lessons_for(&self, course_id: Uuid) -> AppResult<Vec<Lesson>> {
        let mut lessons: Vec<Lesson> = self
            .store
            .query_docs(LESSONS, &[Filter::eq("course_id", course_id.to_string())])
            .await?;
        lessons.sort_by_key(|lesson| lesson.position);
        Ok(lessons)
    }

    async fn assemble(&self, docs: Vec<CourseDoc>) -> AppResult<Vec<Course>> {
        let mut courses = Vec::with_capacity(docs.len());
        for doc in docs {
            let lessons = self.lessons_for(doc.id).await?;
            courses.push(doc.into_course(lessons));
        }
        Ok(courses)
    }

    async fn get_owned_lesson(&self, course_id: Uuid, lesson_id: Uuid) -> AppResult<Lesson> {
        let lesson: Lesson = self
            .store
            .get_doc(LESSONS, &lesson_id.to_string())
            .await?
            .ok_or(AppError::NotFound)?;
        if lesson.course_id != course_id {
            return Err(AppError::NotFound);
        }
        Ok(lesson)
    }
}

#[async_trait]
impl CourseRepository for RemoteCourseRepository {
    async fn insert(&self, course: &Course) -> AppResult<()> {
        self.store
            .set_doc(COURSES, &course.id.to_string(), &CourseDoc::from_course(course))
            .await
    }

    async fn update_meta(&self, course: &Course) -> AppResult<()> {
        if self.get_course_doc(course.id).await?.is_none() {
            return Err(AppError::NotFound);
        }
        self.store
            .set_doc(COURSES, &course.id.to_string(), &CourseDoc::from_course(course))
            .await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        if self.get_course_doc(id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        // Course and lessons disappear together or not at all
        let lessons = self.lessons_for(id).await?;
        let mut batch = WriteBatch::new();
        batch.delete(COURSES, id.to_string());
        for lesson in &lessons {
            batch.delete(LESSONS, lesson.id.to_string());
        }
        self.store.commit(batch).await
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Course>> {
        match self.get_course_doc(id).await? {
            None => Ok(None),
            Some(doc) => {
                let lessons = self.lessons_for(id).await?;
                Ok(Some(doc.into_course(lessons)))
            }
        }
    }

    async fn list_all(&self) -> AppResult<Vec<Course>> {
        let docs: Vec<CourseDoc> = self.store.list_docs(COURSES).await?;
        self.assemble(docs).await
    }

    async fn list_published(&self) -> AppResult<Vec<Course>> {
        let docs: Vec<CourseDoc> = self
            .store
            .query_docs(COURSES, &[Filter::eq("status", "published")])
            .await?;
        self.assemble(docs).await
    }

    async fn list_by_teacher(&self, teacher_id: Uuid) -> AppResult<Vec<Course>> {
        let docs: Vec<CourseDoc> = self
            .store
            .query_docs(COURSES, &[Filter::eq("teacher_id", teacher_id.to_string())])
            .await?;
        self.assemble(docs).await
    }

    async fn append_lesson(&self, lesson: &Lesson) -> AppResult<u32> {
        if self.get_course_doc(lesson.course_id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        let siblings = self.lessons_for(lesson.course_id).await?;
        let position = siblings
            .iter()
            .map(|l| l.position + 1)
            .max()
            .unwrap_or(0);

        let mut doc = lesson.clone();
        doc.position = position;
        self.store
            .set_doc(LESSONS, &doc.id.to_string(), &doc)
            .await?;

        Ok(position)
    }

    async fn update_lesson(&self, lesson: &Lesson) -> AppResult<()> {
        let existing = self.get_owned_lesson(lesson.course_id, lesson.id).await?;

        // Position is owned by append/reorder, not by field updates
        let mut doc = lesson.clone();
        doc.position = existing.position;
        self.store.set_doc(LESSONS, &doc.id.to_string(), &doc).await
    }

    async fn delete_lesson(&self, course_id: Uuid, lesson_id: Uuid) -> AppResult<()> {
        self.get_owned_lesson(course_id, lesson_id).await?;
        self.store.delete_doc(LESSONS, &lesson_id.to_string()).await
    }

    async fn reorder_lessons(&self, course_id: Uuid, ordered_ids: &[Uuid]) -> AppResult<()> {
        let current = self.lessons_for(course_id).await?;
        let current_ids: Vec<Uuid> = current.iter().map(|l| l.id).collect();

        if !is_lesson_permutation(&current_ids, ordered_ids) {
            return Err(AppError::InvalidOrder);
        }

        let now = Utc::now();
        let mut batch = WriteBatch::new();
        for (index, lesson_id) in ordered_ids.iter().enumerate() {
            let mut doc = current
                .iter()
                .find(|l| l.id == *lesson_id)
                .cloned()
                .ok_or(AppError::InvalidOrder)?;
            doc.position = index as u32;
            doc.updated_at = now;
            batch.set(LESSONS, doc.id.to_string(), &doc)?;
        }
        self.store.commit(batch).await
    }
}

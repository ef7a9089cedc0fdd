// src/repositories/course_repository.rs
//
// Course aggregate persistence: course metadata plus its ordered lessons.
//
// Storage invariants owned here:
// - get_by_id / list_* return lessons sorted by their explicit position
// - deleting a course removes every lesson (FK cascade)
// - append assigns max(position)+1, so a gap left by deletion can never
//   produce a duplicate position
// - reorder applies a full permutation atomically or not at all

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
#[cfg(test)]
use mockall::automock;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::ConnectionPool;
use crate::domain::course::{is_lesson_permutation, Course, CourseStatus, Lesson};
use crate::error::{AppError, AppResult};
use crate::repositories::{media_to_json, parse_media, parse_timestamp, parse_uuid};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Persist a new course. The lesson list is expected to be empty;
    /// lessons only enter through append_lesson or a seed batch.
    async fn insert(&self, course: &Course) -> AppResult<()>;

    /// Rewrite course metadata (title, description, status, image).
    /// Lessons are untouched. NotFound for a missing id.
    async fn update_meta(&self, course: &Course) -> AppResult<()>;

    /// Remove the course and, transitively, all of its lessons.
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Course>>;

    async fn list_all(&self) -> AppResult<Vec<Course>>;

    async fn list_published(&self) -> AppResult<Vec<Course>>;

    async fn list_by_teacher(&self, teacher_id: Uuid) -> AppResult<Vec<Course>>;

    /// Append at the end of the current order, returning the assigned
    /// position. NotFound when the owning course is absent.
    async fn append_lesson(&self, lesson: &Lesson) -> AppResult<u32>;

    /// Rewrite one lesson in place (position untouched). NotFound when
    /// the lesson does not belong to the course.
    async fn update_lesson(&self, lesson: &Lesson) -> AppResult<()>;

    async fn delete_lesson(&self, course_id: Uuid, lesson_id: Uuid) -> AppResult<()>;

    /// Adopt a new total order. The payload must be exactly a permutation
    /// of the current lesson id set (InvalidOrder otherwise) and the
    /// write is atomic: a rejected reorder leaves the stored order
    /// unchanged.
    async fn reorder_lessons(&self, course_id: Uuid, ordered_ids: &[Uuid]) -> AppResult<()>;
}

pub struct SqliteCourseRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteCourseRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_course(row: &Row) -> Result<Course, rusqlite::Error> {
        let id_str: String = row.get("id")?;
        let teacher_id_str: String = row.get("teacher_id")?;

        let status_str: String = row.get("status")?;
        let status = match status_str.as_str() {
            "draft" => CourseStatus::Draft,
            "published" => CourseStatus::Published,
            "archived" => CourseStatus::Archived,
            _ => return Err(rusqlite::Error::InvalidQuery),
        };

        let created_at_str: String = row.get("created_at")?;
        let updated_at_str: String = row.get("updated_at")?;

        Ok(Course {
            id: parse_uuid(&id_str)?,
            title: row.get("title")?,
            description: row.get("description")?,
            teacher_id: parse_uuid(&teacher_id_str)?,
            status,
            image: parse_media(row.get("image")?)?,
            lessons: Vec::new(),
            created_at: parse_timestamp(&created_at_str)?,
            updated_at: parse_timestamp(&updated_at_str)?,
        })
    }

    fn row_to_lesson(row: &Row) -> Result<Lesson, rusqlite::Error> {
        let id_str: String = row.get("id")?;
        let course_id_str: String = row.get("course_id")?;
        let created_at_str: String = row.get("created_at")?;
        let updated_at_str: String = row.get("updated_at")?;

        Ok(Lesson {
            id: parse_uuid(&id_str)?,
            course_id: parse_uuid(&course_id_str)?,
            title: row.get("title")?,
            content: row.get("content")?,
            video: parse_media(row.get("video")?)?,
            video_size_mb: row.get("video_size_mb")?,
            attachment: parse_media(row.get("attachment")?)?,
            attachment_name: row.get("attachment_name")?,
            attachment_size_mb: row.get("attachment_size_mb")?,
            duration: row.get("duration")?,
            position: row.get::<_, i64>("position")? as u32,
            created_at: parse_timestamp(&created_at_str)?,
            updated_at: parse_timestamp(&updated_at_str)?,
        })
    }

    fn load_lessons(conn: &Connection, course_id: Uuid) -> AppResult<Vec<Lesson>> {
        let mut stmt = conn.prepare(
            "SELECT id, course_id, title, content, video, video_size_mb,
                    attachment, attachment_name, attachment_size_mb, duration,
                    position, created_at, updated_at
             FROM lessons WHERE course_id = ?1 ORDER BY position",
        )?;

        let lessons = stmt
            .query_map(params![course_id.to_string()], Self::row_to_lesson)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lessons)
    }

    fn load_courses(conn: &Connection, where_clause: &str, args: &[&dyn rusqlite::ToSql]) -> AppResult<Vec<Course>> {
        let sql = format!(
            "SELECT id, title, description, teacher_id, status, image, created_at, updated_at
             FROM courses {} ORDER BY title",
            where_clause
        );
        let mut stmt = conn.prepare(&sql)?;

        let mut courses: Vec<Course> = stmt
            .query_map(args, Self::row_to_course)?
            .collect::<Result<Vec<_>, _>>()?;

        for course in &mut courses {
            course.lessons = Self::load_lessons(conn, course.id)?;
        }

        Ok(courses)
    }

    pub(crate) fn insert_lesson_row(conn: &Connection, lesson: &Lesson, position: u32) -> AppResult<()> {
        conn.execute(
            "INSERT INTO lessons (
                id, course_id, title, content, video, video_size_mb,
                attachment, attachment_name, attachment_size_mb, duration,
                position, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                lesson.id.to_string(),
                lesson.course_id.to_string(),
                lesson.title,
                lesson.content,
                media_to_json(&lesson.video)?,
                lesson.video_size_mb,
                media_to_json(&lesson.attachment)?,
                lesson.attachment_name,
                lesson.attachment_size_mb,
                lesson.duration,
                position as i64,
                lesson.created_at.to_rfc3339(),
                lesson.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub(crate) fn insert_course_row(conn: &Connection, course: &Course) -> AppResult<()> {
        conn.execute(
            "INSERT INTO courses (id, title, description, teacher_id, status, image, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                course.id.to_string(),
                course.title,
                course.description,
                course.teacher_id.to_string(),
                course.status.to_string(),
                media_to_json(&course.image)?,
                course.created_at.to_rfc3339(),
                course.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl CourseRepository for SqliteCourseRepository {
    async fn insert(&self, course: &Course) -> AppResult<()> {
        let conn = self.pool.get()?;
        Self::insert_course_row(&conn, course)
    }

    async fn update_meta(&self, course: &Course) -> AppResult<()> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute(
            "UPDATE courses SET title = ?1, description = ?2, status = ?3, image = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                course.title,
                course.description,
                course.status.to_string(),
                media_to_json(&course.image)?,
                course.updated_at.to_rfc3339(),
                course.id.to_string(),
            ],
        )?;

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let conn = self.pool.get()?;

        // Lessons go with the course via the FK cascade
        let rows_affected =
            conn.execute("DELETE FROM courses WHERE id = ?1", params![id.to_string()])?;

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Course>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, title, description, teacher_id, status, image, created_at, updated_at
             FROM courses WHERE id = ?1",
        )?;

        let course = match stmt.query_row(params![id.to_string()], Self::row_to_course) {
            Ok(course) => course,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(AppError::Database(e)),
        };

        let mut course = course;
        course.lessons = Self::load_lessons(&conn, course.id)?;
        Ok(Some(course))
    }

    async fn list_all(&self) -> AppResult<Vec<Course>> {
        let conn = self.pool.get()?;
        Self::load_courses(&conn, "", &[])
    }

    async fn list_published(&self) -> AppResult<Vec<Course>> {
        let conn = self.pool.get()?;
        Self::load_courses(
            &conn,
            "WHERE status = ?1",
            &[&CourseStatus::Published.to_string()],
        )
    }

    async fn list_by_teacher(&self, teacher_id: Uuid) -> AppResult<Vec<Course>> {
        let conn = self.pool.get()?;
        Self::load_courses(&conn, "WHERE teacher_id = ?1", &[&teacher_id.to_string()])
    }

    async fn append_lesson(&self, lesson: &Lesson) -> AppResult<u32> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let course_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM courses WHERE id = ?1)",
            params![lesson.course_id.to_string()],
            |row| row.get(0),
        )?;
        if !course_exists {
            return Err(AppError::NotFound);
        }

        let position: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM lessons WHERE course_id = ?1",
            params![lesson.course_id.to_string()],
            |row| row.get(0),
        )?;

        Self::insert_lesson_row(&tx, lesson, position as u32)?;

        tx.commit()?;
        Ok(position as u32)
    }

    async fn update_lesson(&self, lesson: &Lesson) -> AppResult<()> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute(
            "UPDATE lessons SET title = ?1, content = ?2, video = ?3, video_size_mb = ?4,
                    attachment = ?5, attachment_name = ?6, attachment_size_mb = ?7,
                    duration = ?8, updated_at = ?9
             WHERE id = ?10 AND course_id = ?11",
            params![
                lesson.title,
                lesson.content,
                media_to_json(&lesson.video)?,
                lesson.video_size_mb,
                media_to_json(&lesson.attachment)?,
                lesson.attachment_name,
                lesson.attachment_size_mb,
                lesson.duration,
                lesson.updated_at.to_rfc3339(),
                lesson.id.to_string(),
                lesson.course_id.to_string(),
            ],
        )?;

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn delete_lesson(&self, course_id: Uuid, lesson_id: Uuid) -> AppResult<()> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute(
            "DELETE FROM lessons WHERE id = ?1 AND course_id = ?2",
            params![lesson_id.to_string(), course_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn reorder_lessons(&self, course_id: Uuid, ordered_ids: &[Uuid]) -> AppResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let current: Vec<Uuid> = {
            let mut stmt =
                tx.prepare("SELECT id FROM lessons WHERE course_id = ?1 ORDER BY position")?;
            let ids = stmt
                .query_map(params![course_id.to_string()], |row| {
                    let id_str: String = row.get(0)?;
                    parse_uuid(&id_str)
                })?
                .collect::<Result<Vec<_>, _>>()?;
            ids
        };

        if !is_lesson_permutation(&current, ordered_ids) {
            // Dropping the transaction rolls back; the stored order stays.
            return Err(AppError::InvalidOrder);
        }

        // Park every position in negative space first so the unique
        // (course_id, position) index never sees a transient duplicate.
        tx.execute(
            "UPDATE lessons SET position = -1 - position WHERE course_id = ?1",
            params![course_id.to_string()],
        )?;

        let now = Utc::now().to_rfc3339();
        for (index, lesson_id) in ordered_ids.iter().enumerate() {
            tx.execute(
                "UPDATE lessons SET position = ?1, updated_at = ?2 WHERE id = ?3 AND course_id = ?4",
                params![
                    index as i64,
                    now,
                    lesson_id.to_string(),
                    course_id.to_string()
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

// src/services/catalog_service.rs
//
// Read-side composition over current repository state. Every query takes
// fresh snapshots and recomputes the join; nothing here is cached or
// persisted, so there is no staleness to manage.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::enrollment::EnrollmentStatus;
use crate::domain::views::{
    join_courses_with_teachers, join_enrollment_details, CourseWithTeacher, EnrollmentDetails,
};
use crate::error::AppResult;
use crate::repositories::{CourseRepository, EnrollmentRepository, UserRepository};

pub struct CatalogService {
    user_repo: Arc<dyn UserRepository>,
    course_repo: Arc<dyn CourseRepository>,
    enrollment_repo: Arc<dyn EnrollmentRepository>,
}

impl CatalogService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        course_repo: Arc<dyn CourseRepository>,
        enrollment_repo: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        Self {
            user_repo,
            course_repo,
            enrollment_repo,
        }
    }

    /// The public browse surface: published courses with teacher names.
    pub async fn published_courses(&self) -> AppResult<Vec<CourseWithTeacher>> {
        let courses = self.course_repo.list_published().await?;
        let users = self.user_repo.list_all().await?;
        Ok(join_courses_with_teachers(courses, &users))
    }

    /// Admin surface: every enrollment with display names, dangling ids
    /// degraded to "Unknown".
    pub async fn enrollments_with_display_names(&self) -> AppResult<Vec<EnrollmentDetails>> {
        let enrollments = self.enrollment_repo.list_all().await?;
        let users = self.user_repo.list_all().await?;
        let courses = self.course_repo.list_all().await?;
        Ok(join_enrollment_details(enrollments, &users, &courses))
    }

    /// The student's "my courses" surface: approved enrollments only.
    pub async fn approved_courses_for_student(
        &self,
        student_id: Uuid,
    ) -> AppResult<Vec<CourseWithTeacher>> {
        let enrollments = self.enrollment_repo.list_by_student(student_id).await?;

        let mut courses = Vec::new();
        for enrollment in enrollments
            .iter()
            .filter(|e| e.status == EnrollmentStatus::Approved)
        {
            // A course deleted after approval simply drops out of the view
            if let Some(course) = self.course_repo.get_by_id(enrollment.course_id).await? {
                courses.push(course);
            }
        }

        let users = self.user_repo.list_all().await?;
        Ok(join_courses_with_teachers(courses, &users))
    }
}

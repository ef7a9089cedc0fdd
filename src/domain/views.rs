// src/domain/views.rs
//
// Join views: read-only combinations of records from multiple
// collections, recomputed from snapshots on every query. Never persisted.
//
// Unresolved ids degrade to "Unknown" display values instead of failing:
// deleting a user does not cascade, so dangling references are expected.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::course::Course;
use crate::domain::enrollment::Enrollment;
use crate::domain::user::User;

pub const UNKNOWN_TEACHER: &str = "Unknown Teacher";
pub const UNKNOWN_STUDENT: &str = "Unknown Student";
pub const UNKNOWN_COURSE: &str = "Unknown Course";

/// A course decorated with its teacher's display name.
#[derive(Debug, Clone, Serialize)]
pub struct CourseWithTeacher {
    pub course: Course,
    pub teacher_name: String,
}

/// An enrollment decorated with student and course display names.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentDetails {
    pub enrollment: Enrollment,
    pub student_name: String,
    pub course_title: String,
}

fn name_index(users: &[User]) -> HashMap<Uuid, &str> {
    users.iter().map(|u| (u.id, u.name.as_str())).collect()
}

/// Decorate courses with teacher names from a user snapshot.
pub fn join_courses_with_teachers(courses: Vec<Course>, users: &[User]) -> Vec<CourseWithTeacher> {
    let names = name_index(users);
    courses
        .into_iter()
        .map(|course| {
            let teacher_name = names
                .get(&course.teacher_id)
                .map(|n| n.to_string())
                .unwrap_or_else(|| UNKNOWN_TEACHER.to_string());
            CourseWithTeacher {
                course,
                teacher_name,
            }
        })
        .collect()
}

/// Decorate enrollments with student and course display names.
pub fn join_enrollment_details(
    enrollments: Vec<Enrollment>,
    users: &[User],
    courses: &[Course],
) -> Vec<EnrollmentDetails> {
    let names = name_index(users);
    let titles: HashMap<Uuid, &str> = courses.iter().map(|c| (c.id, c.title.as_str())).collect();

    enrollments
        .into_iter()
        .map(|enrollment| {
            let student_name = names
                .get(&enrollment.student_id)
                .map(|n| n.to_string())
                .unwrap_or_else(|| UNKNOWN_STUDENT.to_string());
            let course_title = titles
                .get(&enrollment.course_id)
                .map(|t| t.to_string())
                .unwrap_or_else(|| UNKNOWN_COURSE.to_string());
            EnrollmentDetails {
                enrollment,
                student_name,
                course_title,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserRole;

    fn teacher() -> User {
        User::new(
            "Grace Hopper".to_string(),
            "grace@example.com".to_string(),
            UserRole::Teacher,
        )
    }

    #[test]
    fn test_course_join_resolves_teacher_name() {
        let teacher = teacher();
        let course = Course::new("Compilers".to_string(), "".to_string(), teacher.id);

        let joined = join_courses_with_teachers(vec![course], &[teacher.clone()]);
        assert_eq!(joined[0].teacher_name, "Grace Hopper");
    }

    #[test]
    fn test_course_join_degrades_to_unknown() {
        let course = Course::new("Compilers".to_string(), "".to_string(), Uuid::new_v4());

        let joined = join_courses_with_teachers(vec![course], &[]);
        assert_eq!(joined[0].teacher_name, UNKNOWN_TEACHER);
    }

    #[test]
    fn test_enrollment_join_degrades_per_side() {
        let teacher = teacher();
        let student = User::new(
            "Alan Turing".to_string(),
            "alan@example.com".to_string(),
            UserRole::Student,
        );
        let course = Course::new("Logic".to_string(), "".to_string(), teacher.id);

        let known = Enrollment::new(student.id, course.id);
        let dangling = Enrollment::new(Uuid::new_v4(), Uuid::new_v4());

        let joined = join_enrollment_details(
            vec![known, dangling],
            &[student.clone()],
            std::slice::from_ref(&course),
        );

        assert_eq!(joined[0].student_name, "Alan Turing");
        assert_eq!(joined[0].course_title, "Logic");
        assert_eq!(joined[1].student_name, UNKNOWN_STUDENT);
        assert_eq!(joined[1].course_title, UNKNOWN_COURSE);
    }
}

// src/services/contract_tests.rs
//
// Repository contract suite.
//
// Every scenario here is written against the trait objects the services
// hold, never against a concrete backend type, so the suite expresses
// the behavior both implementations must share. The harness below wires
// the embedded backend (pooled SQLite plus on-disk blob store); the
// hosted implementations satisfy the same traits and the same rules.

#[cfg(test)]
mod suite {
    use std::sync::Arc;

    use uuid::Uuid;

    use crate::db::connection::test_support::{create_test_pool, TestDb};
    use crate::domain::course::CourseStatus;
    use crate::domain::enrollment::EnrollmentStatus;
    use crate::domain::user::UserRole;
    use crate::domain::views::{UNKNOWN_COURSE, UNKNOWN_STUDENT};
    use crate::domain::{MediaPatch, MediaSource, MediaUpload};
    use crate::error::AppError;
    use crate::events::EventBus;
    use crate::repositories::{
        SqliteCourseRepository, SqliteEnrollmentRepository, SqliteReviewRepository,
        SqliteSeedRepository, SqliteUserRepository,
    };
    use crate::services::{
        AddLessonRequest, CatalogService, CourseService, CreateCourseRequest, EnrollmentService,
        IdentityService, RegisterUserRequest, ReviewService, SeedService, UpdateCourseRequest,
        UpdateLessonRequest, UpdateUserRequest,
    };
    use crate::storage::LocalBlobStore;

    struct Backend {
        identity: IdentityService,
        courses: CourseService,
        enrollments: EnrollmentService,
        reviews: ReviewService,
        catalog: CatalogService,
        seeder: SeedService,
        _db: TestDb,
        _media: tempfile::TempDir,
    }

    fn embedded_backend() -> Backend {
        let db = create_test_pool();
        let media_dir = tempfile::tempdir().expect("create media dir");
        let blob_store = Arc::new(LocalBlobStore::new(media_dir.path().to_path_buf()));
        let event_bus = Arc::new(EventBus::new());

        let user_repo = Arc::new(SqliteUserRepository::new(db.pool.clone()));
        let course_repo = Arc::new(SqliteCourseRepository::new(db.pool.clone()));
        let enrollment_repo = Arc::new(SqliteEnrollmentRepository::new(db.pool.clone()));
        let review_repo = Arc::new(SqliteReviewRepository::new(db.pool.clone()));
        let seed_repo = Arc::new(SqliteSeedRepository::new(db.pool.clone()));

        Backend {
            identity: IdentityService::new(
                user_repo.clone(),
                blob_store.clone(),
                event_bus.clone(),
            ),
            courses: CourseService::new(course_repo.clone(), blob_store.clone(), event_bus.clone()),
            enrollments: EnrollmentService::new(enrollment_repo.clone(), event_bus.clone()),
            reviews: ReviewService::new(review_repo, event_bus.clone()),
            catalog: CatalogService::new(user_repo, course_repo, enrollment_repo),
            seeder: SeedService::new(seed_repo, blob_store, event_bus)
                .expect("create seed service")
                .with_assets(Vec::new()),
            _db: db,
            _media: media_dir,
        }
    }

    fn draft_course() -> CreateCourseRequest {
        CreateCourseRequest {
            title: "Rust Fundamentals".to_string(),
            description: "Intro".to_string(),
            status: None,
            image: MediaPatch::Keep,
        }
    }

    async fn course_with_lessons(backend: &Backend, titles: &[&str]) -> (Uuid, Vec<Uuid>) {
        let course = backend
            .courses
            .create(draft_course(), Uuid::new_v4())
            .await
            .unwrap();
        let mut lesson_ids = Vec::new();
        for title in titles {
            let lesson = backend
                .courses
                .add_lesson(
                    course.id,
                    AddLessonRequest {
                        title: title.to_string(),
                        content: "<p>x</p>".to_string(),
                        duration: None,
                        video_file: None,
                        video_url: None,
                        attachment: None,
                    },
                )
                .await
                .unwrap();
            lesson_ids.push(lesson.id);
        }
        (course.id, lesson_ids)
    }

    #[tokio::test]
    async fn enrolling_twice_stores_exactly_one_record() {
        let backend = embedded_backend();
        let student = Uuid::new_v4();
        let course = Uuid::new_v4();

        backend.enrollments.enroll(student, course).await.unwrap();
        let second = backend.enrollments.enroll(student, course).await;
        assert!(matches!(second, Err(AppError::AlreadyEnrolled)));

        assert_eq!(backend.enrollments.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn every_permutation_round_trips_through_reorder() {
        let backend = embedded_backend();
        let (course_id, ids) = course_with_lessons(&backend, &["A", "B", "C"]).await;

        // All six orderings of three lessons
        let permutations = [
            vec![ids[0], ids[1], ids[2]],
            vec![ids[0], ids[2], ids[1]],
            vec![ids[1], ids[0], ids[2]],
            vec![ids[1], ids[2], ids[0]],
            vec![ids[2], ids[0], ids[1]],
            vec![ids[2], ids[1], ids[0]],
        ];

        for permutation in permutations {
            backend
                .courses
                .reorder_lessons(course_id, permutation.clone())
                .await
                .unwrap();
            let loaded = backend.courses.get(course_id).await.unwrap().unwrap();
            assert_eq!(loaded.lesson_ids(), permutation);
        }
    }

    #[tokio::test]
    async fn invalid_reorder_is_rejected_and_changes_nothing() {
        let backend = embedded_backend();
        let (course_id, ids) = course_with_lessons(&backend, &["A", "B", "C"]).await;

        let before = backend
            .courses
            .get(course_id)
            .await
            .unwrap()
            .unwrap()
            .lesson_ids();

        let foreign = vec![ids[0], ids[1], Uuid::new_v4()];
        assert!(matches!(
            backend.courses.reorder_lessons(course_id, foreign).await,
            Err(AppError::InvalidOrder)
        ));

        let omitting = vec![ids[0], ids[2]];
        assert!(matches!(
            backend.courses.reorder_lessons(course_id, omitting).await,
            Err(AppError::InvalidOrder)
        ));

        let after = backend
            .courses
            .get(course_id)
            .await
            .unwrap()
            .unwrap()
            .lesson_ids();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn second_registration_with_same_email_fails() {
        let backend = embedded_backend();

        backend
            .identity
            .register(RegisterUserRequest {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                credential: "pw-one".to_string(),
            })
            .await
            .unwrap();

        let second = backend
            .identity
            .register(RegisterUserRequest {
                name: "Impostor".to_string(),
                email: "ada@example.com".to_string(),
                credential: "pw-two".to_string(),
            })
            .await;
        assert!(matches!(second, Err(AppError::DuplicateEmail)));

        let holders: Vec<_> = backend
            .identity
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .filter(|u| u.email == "ada@example.com")
            .collect();
        assert_eq!(holders.len(), 1);
        assert_eq!(holders[0].name, "Ada");
    }

    #[tokio::test]
    async fn deleting_a_course_takes_its_lessons_with_it() {
        let backend = embedded_backend();
        let (course_id, _) = course_with_lessons(&backend, &["A", "B"]).await;

        backend.courses.delete(course_id).await.unwrap();

        assert!(backend.courses.get(course_id).await.unwrap().is_none());
        // No path can expose the former lessons: published and per-teacher
        // listings reassemble from storage, and both come back empty
        assert!(backend.courses.list_published().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn publishing_moves_a_course_into_the_browse_surface() {
        let backend = embedded_backend();
        let course = backend
            .courses
            .create(draft_course(), Uuid::new_v4())
            .await
            .unwrap();

        assert!(backend.courses.list_published().await.unwrap().is_empty());

        backend
            .courses
            .update(
                course.id,
                UpdateCourseRequest {
                    status: Some(CourseStatus::Published),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let published = backend.courses.list_published().await.unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].id, course.id);
    }

    #[tokio::test]
    async fn lessons_append_in_order_and_video_upload_replaces_url_state() {
        let backend = embedded_backend();
        let (course_id, ids) = course_with_lessons(&backend, &["L1", "L2"]).await;

        let loaded = backend.courses.get(course_id).await.unwrap().unwrap();
        let titles: Vec<&str> = loaded.lessons.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["L1", "L2"]);

        let updated = backend
            .courses
            .update_lesson(
                course_id,
                ids[0],
                UpdateLessonRequest {
                    video: MediaPatch::UploadFile(MediaUpload::new("intro.mp4", vec![0u8; 1024])),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let video = updated.video.unwrap();
        assert!(video.is_stored());
        assert!(video.external_url().is_none());
        assert!(updated.video_size_mb.is_some());

        // Read back from storage, not from the returned value
        let loaded = backend.courses.get(course_id).await.unwrap().unwrap();
        assert!(loaded.lessons[0].video.as_ref().unwrap().is_stored());
    }

    #[tokio::test]
    async fn stored_photo_resolves_repeatedly_within_a_session() {
        let backend = embedded_backend();
        let user = backend
            .identity
            .register(RegisterUserRequest {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                credential: "pw".to_string(),
            })
            .await
            .unwrap();

        let user = backend
            .identity
            .update_profile(
                user.id,
                UpdateUserRequest {
                    photo: MediaPatch::UploadFile(MediaUpload::new("me.png", b"png".to_vec())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let first = backend.identity.photo_url(&user).await.unwrap().unwrap();
        let second = backend.identity.photo_url(&user).await.unwrap().unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn seeding_happens_once_and_produces_the_demo_dataset() {
        let backend = embedded_backend();

        assert!(backend.seeder.seed_if_empty().await.unwrap());
        assert!(!backend.seeder.seed_if_empty().await.unwrap());

        let users = backend.identity.list_all().await.unwrap();
        assert_eq!(users.len(), 4);
        assert_eq!(users.iter().filter(|u| u.role == UserRole::Admin).count(), 1);
        assert_eq!(users.iter().filter(|u| u.role == UserRole::Teacher).count(), 1);
        assert_eq!(users.iter().filter(|u| u.role == UserRole::Student).count(), 2);

        let published = backend.courses.list_published().await.unwrap();
        assert_eq!(published.len(), 2);
        let mut lesson_counts: Vec<usize> =
            published.iter().map(|c| c.lessons.len()).collect();
        lesson_counts.sort_unstable();
        assert_eq!(lesson_counts, vec![2, 3]);

        let enrollments = backend.enrollments.list_all().await.unwrap();
        assert_eq!(enrollments.len(), 2);
        assert_eq!(
            enrollments
                .iter()
                .filter(|e| e.status == EnrollmentStatus::Approved)
                .count(),
            1
        );

        // Seeded credentials authenticate
        let teacher = backend
            .identity
            .authenticate("elena@learnhub.app", "teacher123")
            .await
            .unwrap();
        assert_eq!(teacher.role, UserRole::Teacher);
    }

    #[tokio::test]
    async fn joins_degrade_dangling_references_to_unknown() {
        let backend = embedded_backend();
        assert!(backend.seeder.seed_if_empty().await.unwrap());

        let student = backend
            .identity
            .authenticate("sam@learnhub.app", "student123")
            .await
            .unwrap();

        let details = backend
            .catalog
            .enrollments_with_display_names()
            .await
            .unwrap();
        assert!(details.iter().any(|d| d.student_name == "Sam Porter"));

        // Removing the student leaves the ledger intact but unresolvable
        backend.identity.remove(student.id).await.unwrap();

        let details = backend
            .catalog
            .enrollments_with_display_names()
            .await
            .unwrap();
        assert_eq!(details.len(), 2);
        assert!(details.iter().any(|d| d.student_name == UNKNOWN_STUDENT));
        assert!(details.iter().all(|d| d.course_title != UNKNOWN_COURSE));
    }

    #[tokio::test]
    async fn approved_courses_view_follows_the_ledger() {
        let backend = embedded_backend();
        assert!(backend.seeder.seed_if_empty().await.unwrap());

        let approved_student = backend
            .identity
            .authenticate("sam@learnhub.app", "student123")
            .await
            .unwrap();
        let pending_student = backend
            .identity
            .authenticate("noor@learnhub.app", "student123")
            .await
            .unwrap();

        let mine = backend
            .catalog
            .approved_courses_for_student(approved_student.id)
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].course.title, "Rust Fundamentals");
        assert_eq!(mine[0].teacher_name, "Elena Vasquez");

        let pending = backend
            .catalog
            .approved_courses_for_student(pending_student.id)
            .await
            .unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn reviews_append_and_never_dedupe() {
        let backend = embedded_backend();
        let student = Uuid::new_v4();
        let course = Uuid::new_v4();

        backend
            .reviews
            .submit(student, course, 5, "great".to_string())
            .await
            .unwrap();
        backend
            .reviews
            .submit(student, course, 2, "on reflection".to_string())
            .await
            .unwrap();

        let reviews = backend.reviews.list_for_course(course).await.unwrap();
        assert_eq!(reviews.len(), 2);
    }

    #[tokio::test]
    async fn course_image_is_stored_before_the_record_references_it() {
        let backend = embedded_backend();
        let course = backend
            .courses
            .create(
                CreateCourseRequest {
                    title: "With Cover".to_string(),
                    description: "".to_string(),
                    status: Some(CourseStatus::Published),
                    image: MediaPatch::UploadFile(MediaUpload::new("cover.jpg", b"jpg".to_vec())),
                },
                Uuid::new_v4(),
            )
            .await
            .unwrap();

        assert!(matches!(course.image, Some(MediaSource::Stored { .. })));
        let url = backend.courses.image_url(&course).await.unwrap().unwrap();
        assert!(!url.is_empty());
    }
}

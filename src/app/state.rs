// src/app/state.rs
//
// The "open the store, seed if empty" startup sequence as an explicit,
// asynchronously-initialized handle. Callers get services over trait
// objects; nothing downstream ever learns which backend is wired in.

use std::path::Path;
use std::sync::Arc;

use crate::db::{create_connection_pool, create_connection_pool_at, initialize_database};
use crate::error::AppResult;
use crate::events::EventBus;
use crate::remote::{RemoteConfig, RemoteStore};
use crate::repositories::{
    CourseRepository, EnrollmentRepository, RemoteCourseRepository, RemoteEnrollmentRepository,
    RemoteReviewRepository, RemoteSeedRepository, RemoteUserRepository, ReviewRepository,
    SeedRepository, SqliteCourseRepository, SqliteEnrollmentRepository, SqliteReviewRepository,
    SqliteSeedRepository, SqliteUserRepository, UserRepository,
};
use crate::services::{
    CatalogService, CourseService, EnrollmentService, IdentityService, ReviewService, SeedService,
};
use crate::storage::{BlobStore, LocalBlobStore, RemoteBlobStore};

/// All services, Arc-wrapped for sharing with a UI layer.
pub struct AppState {
    pub event_bus: Arc<EventBus>,
    pub identity: Arc<IdentityService>,
    pub courses: Arc<CourseService>,
    pub enrollments: Arc<EnrollmentService>,
    pub reviews: Arc<ReviewService>,
    pub catalog: Arc<CatalogService>,
}

impl AppState {
    /// Embedded backend at the default application data paths.
    pub async fn open_embedded() -> AppResult<Self> {
        let pool = Arc::new(create_connection_pool()?);
        {
            let conn = pool.get()?;
            initialize_database(&conn)?;
        }
        let blob_store: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::open_default()?);
        Self::assemble_embedded(pool, blob_store).await
    }

    /// Embedded backend at explicit paths (tooling, tests).
    pub async fn open_embedded_at(db_path: &Path, media_root: &Path) -> AppResult<Self> {
        let pool = Arc::new(create_connection_pool_at(db_path)?);
        {
            let conn = pool.get()?;
            initialize_database(&conn)?;
        }
        std::fs::create_dir_all(media_root)?;
        let blob_store: Arc<dyn BlobStore> =
            Arc::new(LocalBlobStore::new(media_root.to_path_buf()));
        Self::assemble_embedded(pool, blob_store).await
    }

    /// Hosted backend behind the given endpoint.
    pub async fn connect_hosted(config: RemoteConfig) -> AppResult<Self> {
        let event_bus = Arc::new(EventBus::new());

        let blob_store: Arc<dyn BlobStore> = Arc::new(RemoteBlobStore::new(&config)?);
        let store = Arc::new(RemoteStore::new(config)?.with_notifier(event_bus.clone()));

        let user_repo: Arc<dyn UserRepository> = Arc::new(RemoteUserRepository::new(store.clone()));
        let course_repo: Arc<dyn CourseRepository> =
            Arc::new(RemoteCourseRepository::new(store.clone()));
        let enrollment_repo: Arc<dyn EnrollmentRepository> =
            Arc::new(RemoteEnrollmentRepository::new(store.clone()));
        let review_repo: Arc<dyn ReviewRepository> =
            Arc::new(RemoteReviewRepository::new(store.clone()));
        let seed_repo: Arc<dyn SeedRepository> = Arc::new(RemoteSeedRepository::new(store));

        Self::assemble(
            user_repo,
            course_repo,
            enrollment_repo,
            review_repo,
            seed_repo,
            blob_store,
            event_bus,
        )
        .await
    }

    async fn assemble_embedded(
        pool: Arc<crate::db::ConnectionPool>,
        blob_store: Arc<dyn BlobStore>,
    ) -> AppResult<Self> {
        let event_bus = Arc::new(EventBus::new());

        let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(pool.clone()));
        let course_repo: Arc<dyn CourseRepository> =
            Arc::new(SqliteCourseRepository::new(pool.clone()));
        let enrollment_repo: Arc<dyn EnrollmentRepository> =
            Arc::new(SqliteEnrollmentRepository::new(pool.clone()));
        let review_repo: Arc<dyn ReviewRepository> =
            Arc::new(SqliteReviewRepository::new(pool.clone()));
        let seed_repo: Arc<dyn SeedRepository> = Arc::new(SqliteSeedRepository::new(pool));

        Self::assemble(
            user_repo,
            course_repo,
            enrollment_repo,
            review_repo,
            seed_repo,
            blob_store,
            event_bus,
        )
        .await
    }

    async fn assemble(
        user_repo: Arc<dyn UserRepository>,
        course_repo: Arc<dyn CourseRepository>,
        enrollment_repo: Arc<dyn EnrollmentRepository>,
        review_repo: Arc<dyn ReviewRepository>,
        seed_repo: Arc<dyn SeedRepository>,
        blob_store: Arc<dyn BlobStore>,
        event_bus: Arc<EventBus>,
    ) -> AppResult<Self> {
        // First run only: every asset fetch resolves before the batch commits
        let seeder = SeedService::new(seed_repo, blob_store.clone(), event_bus.clone())?;
        seeder.seed_if_empty().await?;

        let identity = Arc::new(IdentityService::new(
            user_repo.clone(),
            blob_store.clone(),
            event_bus.clone(),
        ));
        let courses = Arc::new(CourseService::new(
            course_repo.clone(),
            blob_store,
            event_bus.clone(),
        ));
        let enrollments = Arc::new(EnrollmentService::new(
            enrollment_repo.clone(),
            event_bus.clone(),
        ));
        let reviews = Arc::new(ReviewService::new(review_repo, event_bus.clone()));
        let catalog = Arc::new(CatalogService::new(user_repo, course_repo, enrollment_repo));

        Ok(Self {
            event_bus,
            identity,
            courses,
            enrollments,
            reviews,
            catalog,
        })
    }
}

// src/services/identity_service.rs
use std::sync::Arc;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::user::{validate_email, validate_user, User, UserRole};
use crate::domain::{MediaPatch, MediaSource};
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, UserRegistered, UserRemoved};
use crate::repositories::UserRepository;
use crate::storage::BlobStore;

/// Placeholder avatar every new registration starts with.
const DEFAULT_AVATAR_URL: &str = "https://static.learnhub.app/assets/avatar-placeholder.png";

/// Credentials are digested before they reach a repository; the exact
/// input string is hashed, so matching stays case-sensitive end to end.
pub(crate) fn digest_credential(raw: &str) -> String {
    format!("{:x}", Sha256::digest(raw.as_bytes()))
}

#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub credential: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    /// None and Some("") both mean "leave the credential alone".
    pub credential: Option<String>,
    pub photo: MediaPatch,
}

pub struct IdentityService {
    user_repo: Arc<dyn UserRepository>,
    blob_store: Arc<dyn BlobStore>,
    event_bus: Arc<EventBus>,
}

impl IdentityService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        blob_store: Arc<dyn BlobStore>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            user_repo,
            blob_store,
            event_bus,
        }
    }

    /// Exact email + credential match. The returned record never carries
    /// the credential.
    pub async fn authenticate(&self, email: &str, credential: &str) -> AppResult<User> {
        self.user_repo
            .authenticate(email, &digest_credential(credential))
            .await
    }

    /// Self-registration: default role Student, placeholder avatar.
    pub async fn register(&self, request: RegisterUserRequest) -> AppResult<User> {
        validate_email(&request.email).map_err(AppError::Domain)?;

        let mut user = User::new(request.name, request.email, UserRole::Student);
        user.set_photo(Some(MediaSource::external(DEFAULT_AVATAR_URL)));
        validate_user(&user).map_err(AppError::Domain)?;

        self.user_repo
            .insert(&user, &digest_credential(&request.credential))
            .await?;

        self.event_bus.emit(UserRegistered::new(
            user.id,
            user.email.clone(),
            user.role.to_string(),
        ));

        Ok(user)
    }

    /// Merge provided fields into the record. A new photo is stored in
    /// the blob store before the reference write; a dangling photo
    /// reference is never persisted.
    pub async fn update_profile(&self, user_id: Uuid, request: UpdateUserRequest) -> AppResult<User> {
        let mut user = self
            .user_repo
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        user.apply_update(request.name, request.email, request.role);
        validate_user(&user).map_err(AppError::Domain)?;

        match request.photo {
            MediaPatch::Keep => {}
            MediaPatch::Remove => user.set_photo(None),
            MediaPatch::UploadFile(upload) => {
                let path = format!("users/{}/{}", user.id, upload.file_name);
                let source = self.blob_store.put(&path, &upload.bytes).await?;
                user.set_photo(Some(source));
            }
            MediaPatch::SetUrl(url) => user.set_photo(Some(MediaSource::external(url))),
        }

        self.user_repo.update(&user).await?;

        if let Some(credential) = request.credential {
            if !credential.is_empty() {
                self.user_repo
                    .set_credential(user.id, &digest_credential(&credential))
                    .await?;
            }
        }

        Ok(user)
    }

    /// Remove the directory entry only. Courses, enrollments and reviews
    /// that reference it stay behind; readers degrade their display.
    pub async fn remove(&self, user_id: Uuid) -> AppResult<()> {
        self.user_repo.delete(user_id).await?;
        self.event_bus.emit(UserRemoved::new(user_id));
        Ok(())
    }

    pub async fn list_all(&self) -> AppResult<Vec<User>> {
        self.user_repo.list_all().await
    }

    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<User>> {
        self.user_repo.get_by_id(user_id).await
    }

    /// Resolve a user's photo reference to a display URL for this session.
    pub async fn photo_url(&self, user: &User) -> AppResult<Option<String>> {
        match &user.photo {
            None => Ok(None),
            Some(source) => Ok(Some(self.blob_store.resolve(source).await?)),
        }
    }
}

// src/repositories/remote/remote_user_repository.rs
//
// Identity Directory on the hosted backend.
//
// Email uniqueness without a server-enforced schema: every email owns a
// reservation document in user_emails keyed by the digest of the exact
// (case-sensitive) address, written create-only. A conflict on the
// reservation IS the uniqueness violation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{USERS, USER_EMAILS};
use crate::domain::user::User;
use crate::error::{AppError, AppResult};
use crate::remote::{Filter, RemoteStore};
use crate::repositories::UserRepository;

/// Stored user document: the entity plus the repository-internal
/// credential digest, which never leaves the repository layer.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct UserDoc {
    #[serde(flatten)]
    pub(crate) user: User,
    pub(crate) credential: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct EmailClaim {
    user_id: Uuid,
}

pub(crate) fn email_key(email: &str) -> String {
    format!("{:x}", Sha256::digest(email.as_bytes()))
}

pub struct RemoteUserRepository {
    store: Arc<RemoteStore>,
}

impl RemoteUserRepository {
    pub fn new(store: Arc<RemoteStore>) -> Self {
        Self { store }
    }

    async fn get_doc(&self, id: Uuid) -> AppResult<Option<UserDoc>> {
        self.store.get_doc(USERS, &id.to_string()).await
    }
}

#[async_trait]
impl UserRepository for RemoteUserRepository {
    async fn insert(&self, user: &User, credential: &str) -> AppResult<()> {
        let claim_key = email_key(&user.email);
        let claim = EmailClaim { user_id: user.id };

        // The create-only reservation is the atomic uniqueness check.
        if !self.store.create_doc(USER_EMAILS, &claim_key, &claim).await? {
            return Err(AppError::DuplicateEmail);
        }

        let doc = UserDoc {
            user: user.clone(),
            credential: credential.to_string(),
        };
        if let Err(e) = self.store.set_doc(USERS, &user.id.to_string(), &doc).await {
            // Release the reservation so the email is not burned; best effort.
            let _ = self.store.delete_doc(USER_EMAILS, &claim_key).await;
            return Err(e);
        }

        Ok(())
    }

    async fn authenticate(&self, email: &str, credential: &str) -> AppResult<User> {
        let docs: Vec<UserDoc> = self
            .store
            .query_docs(USERS, &[Filter::eq("email", email)])
            .await?;

        docs.into_iter()
            .find(|doc| doc.credential == credential)
            .map(|doc| doc.user)
            .ok_or(AppError::InvalidCredentials)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.get_doc(id).await?.map(|doc| doc.user))
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let existing = self.get_doc(user.id).await?.ok_or(AppError::NotFound)?;

        // A changed email has to move its reservation before the profile
        // write goes out.
        let old_key = email_key(&existing.user.email);
        let new_key = email_key(&user.email);
        if new_key != old_key {
            let claim = EmailClaim { user_id: user.id };
            if !self.store.create_doc(USER_EMAILS, &new_key, &claim).await? {
                return Err(AppError::DuplicateEmail);
            }
        }

        let doc = UserDoc {
            user: user.clone(),
            credential: existing.credential,
        };
        self.store.set_doc(USERS, &user.id.to_string(), &doc).await?;

        if new_key != old_key {
            let _ = self.store.delete_doc(USER_EMAILS, &old_key).await;
        }

        Ok(())
    }

    async fn set_credential(&self, id: Uuid, credential: &str) -> AppResult<()> {
        let mut existing = self.get_doc(id).await?.ok_or(AppError::NotFound)?;
        existing.credential = credential.to_string();
        self.store.set_doc(USERS, &id.to_string(), &existing).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let existing = self.get_doc(id).await?.ok_or(AppError::NotFound)?;

        self.store.delete_doc(USERS, &id.to_string()).await?;
        let _ = self
            .store
            .delete_doc(USER_EMAILS, &email_key(&existing.user.email))
            .await;

        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        let docs: Vec<UserDoc> = self.store.list_docs(USERS).await?;
        Ok(docs.into_iter().map(|doc| doc.user).collect())
    }
}

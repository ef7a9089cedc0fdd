// src/repositories/user_repository.rs
//
// Identity Directory persistence
//
// The credential column holds a digest, never a raw secret, and is only
// ever consulted inside authenticate(); no query result carries it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
#[cfg(test)]
use mockall::automock;
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::db::ConnectionPool;
use crate::domain::user::{User, UserRole};
use crate::error::{AppError, AppResult};
use crate::repositories::{media_to_json, parse_media, parse_timestamp, parse_uuid};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new directory entry. The email uniqueness check is atomic
    /// with the insert; a collision fails with DuplicateEmail.
    async fn insert(&self, user: &User, credential: &str) -> AppResult<()>;

    /// Exact, case-sensitive email + credential match, or InvalidCredentials.
    async fn authenticate(&self, email: &str, credential: &str) -> AppResult<User>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Rewrite the metadata fields of an existing entry. Fails with
    /// NotFound for a missing id and DuplicateEmail if the email was
    /// changed to one another entry holds.
    async fn update(&self, user: &User) -> AppResult<()>;

    async fn set_credential(&self, id: Uuid, credential: &str) -> AppResult<()>;

    /// Delete the entry only; referencing records elsewhere are left as
    /// dangling ids for readers to degrade.
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn list_all(&self) -> AppResult<Vec<User>>;
}

pub struct SqliteUserRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteUserRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &Row) -> Result<User, rusqlite::Error> {
        let id_str: String = row.get("id")?;
        let role_str: String = row.get("role")?;
        let role = match role_str.as_str() {
            "admin" => UserRole::Admin,
            "teacher" => UserRole::Teacher,
            "student" => UserRole::Student,
            _ => return Err(rusqlite::Error::InvalidQuery),
        };

        let created_at_str: String = row.get("created_at")?;
        let updated_at_str: String = row.get("updated_at")?;

        Ok(User {
            id: parse_uuid(&id_str)?,
            email: row.get("email")?,
            name: row.get("name")?,
            role,
            photo: parse_media(row.get("photo")?)?,
            created_at: parse_timestamp(&created_at_str)?,
            updated_at: parse_timestamp(&updated_at_str)?,
        })
    }

    fn map_email_constraint(e: rusqlite::Error) -> AppError {
        if let rusqlite::Error::SqliteFailure(ref err, Some(ref msg)) = e {
            if err.code == rusqlite::ErrorCode::ConstraintViolation && msg.contains("users.email") {
                return AppError::DuplicateEmail;
            }
        }
        AppError::Database(e)
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn insert(&self, user: &User, credential: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        let photo_json = media_to_json(&user.photo)?;

        conn.execute(
            "INSERT INTO users (id, email, name, role, credential, photo, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user.id.to_string(),
                user.email,
                user.name,
                user.role.to_string(),
                credential,
                photo_json,
                user.created_at.to_rfc3339(),
                user.updated_at.to_rfc3339(),
            ],
        )
        .map_err(Self::map_email_constraint)?;

        Ok(())
    }

    async fn authenticate(&self, email: &str, credential: &str) -> AppResult<User> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, email, name, role, photo, created_at, updated_at
             FROM users WHERE email = ?1 AND credential = ?2",
        )?;

        match stmt.query_row(params![email, credential], Self::row_to_user) {
            Ok(user) => Ok(user),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::InvalidCredentials),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, email, name, role, photo, created_at, updated_at
             FROM users WHERE id = ?1",
        )?;

        match stmt.query_row(params![id.to_string()], Self::row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let conn = self.pool.get()?;
        let photo_json = media_to_json(&user.photo)?;

        let rows_affected = conn
            .execute(
                "UPDATE users SET email = ?1, name = ?2, role = ?3, photo = ?4, updated_at = ?5
                 WHERE id = ?6",
                params![
                    user.email,
                    user.name,
                    user.role.to_string(),
                    photo_json,
                    user.updated_at.to_rfc3339(),
                    user.id.to_string(),
                ],
            )
            .map_err(Self::map_email_constraint)?;

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn set_credential(&self, id: Uuid, credential: &str) -> AppResult<()> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute(
            "UPDATE users SET credential = ?1, updated_at = ?2 WHERE id = ?3",
            params![credential, Utc::now().to_rfc3339(), id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, email, name, role, photo, created_at, updated_at
             FROM users
             ORDER BY name",
        )?;

        let users: Vec<User> = stmt
            .query_map([], Self::row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }
}

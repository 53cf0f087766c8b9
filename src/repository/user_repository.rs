//! User repository
//!
//! Lookup by id/email and account creation with duplicate-email rejection.
//! Passwords are bcrypt-hashed on the way in and never read back out as
//! anything but the hash.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::errors::{RepoResult, RepositoryError};
use crate::models::{NewUser, Role, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> RepoResult<User> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        user_from_row(&row)
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn create(&self, new: &NewUser) -> RepoResult<User> {
        if self.find_by_email(&new.email).await?.is_some() {
            return Err(RepositoryError::DuplicateKey("email".to_string()));
        }

        let password_hash = bcrypt::hash(&new.password, bcrypt::DEFAULT_COST)?;

        let row = sqlx::query(&format!(
            "INSERT INTO users (id, name, email, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.email)
        .bind(&password_hash)
        .bind(new.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        user_from_row(&row)
    }
}

fn user_from_row(row: &PgRow) -> RepoResult<User> {
    let raw_role: String = row.get("role");
    let role = Role::parse(&raw_role).ok_or_else(|| RepositoryError::Decode {
        column: "role",
        value: raw_role,
    })?;

    Ok(User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role,
        created_at: row.get("created_at"),
    })
}

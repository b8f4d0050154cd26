//! Account registration, login and bearer-token resolution.
//!
//! Tokens are opaque random strings with a server-side expiry; password
//! hashing is salted SHA-256. Both are boundary plumbing, not part of the
//! board core.

use rand::Rng;
use rand::distributions::Alphanumeric;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use corkboard_types::{AuthData, UpdateProfile, User, UserPublic, ids};

use crate::db;
use crate::error::{CorkboardError, Result};

const TOKEN_LEN: usize = 48;
const TOKEN_TTL_HOURS: i64 = 24 * 7;

fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Register a new account and issue a token.
pub async fn register(
    pool: &SqlitePool,
    email: &str,
    password: &str,
    full_name: &str,
) -> Result<AuthData> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(CorkboardError::Validation(
            "a valid email is required".to_string(),
        ));
    }
    if password.len() < 8 {
        return Err(CorkboardError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    if full_name.trim().is_empty() {
        return Err(CorkboardError::Validation(
            "full_name is required".to_string(),
        ));
    }

    if db::users::get_by_email(pool, &email).await?.is_some() {
        return Err(CorkboardError::Conflict(
            "an account with this email already exists".to_string(),
        ));
    }

    let now = ids::now_rfc3339();
    let salt = random_string(16);
    let user = User {
        id: ids::new_id(),
        email,
        password_hash: hash_password(password, &salt),
        password_salt: salt,
        full_name: full_name.trim().to_string(),
        avatar_url: None,
        role: "member".to_string(),
        created_at: now.clone(),
        updated_at: now,
    };
    db::users::create(pool, &user).await?;

    tracing::info!(user_id = %user.id, "registered new account");
    issue_token(pool, user).await
}

/// Verify credentials and issue a token.
pub async fn login(pool: &SqlitePool, email: &str, password: &str) -> Result<AuthData> {
    let email = email.trim().to_lowercase();
    let user = db::users::get_by_email(pool, &email)
        .await?
        .ok_or(CorkboardError::InvalidCredentials)?;

    if hash_password(password, &user.password_salt) != user.password_hash {
        return Err(CorkboardError::InvalidCredentials);
    }

    issue_token(pool, user).await
}

/// Resolve a bearer token to its user id.
pub async fn authenticate(pool: &SqlitePool, token: &str) -> Result<String> {
    db::auth_tokens::lookup_user(pool, token)
        .await?
        .ok_or(CorkboardError::Unauthorized)
}

/// The caller's own public profile.
pub async fn get_profile(pool: &SqlitePool, user_id: &str) -> Result<UserPublic> {
    let user = db::users::get(pool, user_id)
        .await?
        .ok_or(CorkboardError::UserNotFound)?;
    Ok(UserPublic::from(user))
}

pub async fn update_profile(
    pool: &SqlitePool,
    user_id: &str,
    updates: UpdateProfile,
) -> Result<UserPublic> {
    let user = db::users::get(pool, user_id)
        .await?
        .ok_or(CorkboardError::UserNotFound)?;

    let full_name = match updates.full_name {
        Some(name) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(CorkboardError::Validation(
                    "full_name cannot be empty".to_string(),
                ));
            }
            name
        }
        None => user.full_name.clone(),
    };
    let avatar_url = updates.avatar_url.or(user.avatar_url);

    db::users::update_profile(pool, user_id, &full_name, avatar_url.as_deref()).await?;
    get_profile(pool, user_id).await
}

async fn issue_token(pool: &SqlitePool, user: User) -> Result<AuthData> {
    let token = random_string(TOKEN_LEN);
    let expires_at = (chrono::Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).to_rfc3339();
    db::auth_tokens::insert(pool, &token, &user.id, &expires_at).await?;
    Ok(AuthData {
        token,
        user: UserPublic::from(user),
    })
}

use crate::auth;
use crate::config::AuthConfig;
use crate::error::{option_to_result, AppError, AppResult};
use crate::models::UserProfile;
use crate::repositories::UserRepository;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for signup, login, and the authenticated-user lookup
pub struct AuthService {
    user_repo: Arc<UserRepository>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(user_repo: Arc<UserRepository>, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    /// Register a new user and issue their first token
    pub async fn signup(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> AppResult<(UserProfile, String)> {
        let email = email.trim().to_lowercase();
        let username = username.trim();

        validate_email(&email)?;
        validate_username(username)?;
        validate_password(password)?;

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Validation("Email already registered".into()));
        }
        if self.user_repo.find_by_username(username).await?.is_some() {
            return Err(AppError::Validation("Username already taken".into()));
        }

        let password_hash = auth::hash_password(password)?;
        let user = self
            .user_repo
            .create(&email, username, &password_hash)
            .await?;

        let token = auth::issue_token(user.id, &user.email, &self.config)?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok((user.profile(), token))
    }

    /// Authenticate by email and password and issue a fresh token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(UserProfile, String)> {
        let email = email.trim().to_lowercase();

        // Same error for unknown email and bad password
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

        if !auth::verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized("Invalid email or password".into()));
        }

        let token = auth::issue_token(user.id, &user.email, &self.config)?;

        info!("User {} logged in", user.id);
        Ok((user.profile(), token))
    }

    /// Look up the profile behind a verified token
    pub async fn me(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let user = option_to_result(self.user_repo.find_by_id(user_id).await?, "User not found")?;

        Ok(user.profile())
    }
}

fn validate_email(email: &str) -> AppResult<()> {
    if email.len() < 3 || !email.contains('@') {
        return Err(AppError::Validation("Invalid email address".into()));
    }
    Ok(())
}

fn validate_username(username: &str) -> AppResult<()> {
    if username.len() < 3 || username.len() > 30 {
        return Err(AppError::Validation(
            "Username must be 3-30 characters".into(),
        ));
    }
    if !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(AppError::Validation(
            "Username may only contain letters, digits, and underscores".into(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

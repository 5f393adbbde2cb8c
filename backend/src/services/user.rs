//! User service for authentication and user management
//!
//! Password hashing and verification run on the blocking thread pool; the
//! JWT service is passed by reference with its keys already derived.

use super::images::replace_image;
use crate::auth::{JwtService, PasswordService};
use crate::error::{ApiError, ApiResult};
use crate::repositories::{NewUser, UserChanges, UserRepository};
use crate::storage::{self, FileStore, ImageUpload, Namespace};
use secrecy::{ExposeSecret, SecretString};
use storefront_shared::errors::AuthError;
use storefront_shared::types::{
    AuthResponse, LoginRequest, RegisterRequest, UpdateUserRequest, UserResponse,
};
use storefront_shared::validation::{
    normalize_email, provided, validate_email, validate_password, validate_required_text,
};
use tracing::info;
use uuid::Uuid;

const USER_NOT_FOUND: &str = "User not found";

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user and sign them in
    pub async fn register(
        users: &dyn UserRepository,
        jwt: &JwtService,
        req: RegisterRequest,
    ) -> ApiResult<AuthResponse> {
        let name = req.name.trim().to_string();
        validate_required_text("name", &name)?;

        let email = normalize_email(&req.email);
        validate_email(&email)?;
        validate_password(req.password.expose_secret())?;

        let password_hash = PasswordService::hash_async(req.password).await?;

        // The unique index on users.email decides duplicates
        let user = users
            .create(NewUser {
                name,
                email,
                password_hash,
            })
            .await?;

        let token = jwt.issue(user.id)?;
        info!(user_id = %user.id, "User registered");

        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }

    /// Login with email and password
    ///
    /// Unknown emails and wrong passwords get the same response.
    pub async fn login(
        users: &dyn UserRepository,
        jwt: &JwtService,
        req: LoginRequest,
    ) -> ApiResult<AuthResponse> {
        let email = normalize_email(&req.email);
        if email.is_empty() || req.password.expose_secret().is_empty() {
            return Err(ApiError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let user = users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let valid = PasswordService::verify_async(req.password, user.password_hash.clone()).await?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = jwt.issue(user.id)?;
        info!(user_id = %user.id, "User logged in");

        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }

    pub async fn get(users: &dyn UserRepository, id: Uuid) -> ApiResult<UserResponse> {
        users
            .find_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))
    }

    pub async fn list(users: &dyn UserRepository) -> ApiResult<Vec<UserResponse>> {
        let records = users.list().await?;
        Ok(records.into_iter().map(UserResponse::from).collect())
    }

    /// Apply a partial profile update
    ///
    /// Blank strings count as "not provided". A supplied password is only
    /// rehashed when it differs from the current one.
    pub async fn update_profile(
        users: &dyn UserRepository,
        id: Uuid,
        req: UpdateUserRequest,
    ) -> ApiResult<UserResponse> {
        let name = provided(req.name).map(|n| n.trim().to_string());
        if let Some(name) = &name {
            validate_required_text("name", name)?;
        }

        let email = provided(req.email).map(|e| normalize_email(&e));
        if let Some(email) = &email {
            validate_email(email)?;
        }

        let password = req
            .password
            .filter(|p| !p.expose_secret().trim().is_empty());
        let password_hash = match password {
            Some(password) => Self::rehash_if_changed(users, id, password).await?,
            None => None,
        };

        let user = users
            .update(
                id,
                UserChanges {
                    name,
                    email,
                    password_hash,
                },
            )
            .await?
            .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

        info!(user_id = %id, "User profile updated");
        Ok(user.into())
    }

    async fn rehash_if_changed(
        users: &dyn UserRepository,
        id: Uuid,
        password: SecretString,
    ) -> ApiResult<Option<String>> {
        validate_password(password.expose_secret())?;

        let current = users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

        let unchanged = PasswordService::verify_async(
            SecretString::new(password.expose_secret().clone()),
            current.password_hash,
        )
        .await?;
        if unchanged {
            return Ok(None);
        }

        Ok(Some(PasswordService::hash_async(password).await?))
    }

    /// Delete a user, then remove their image
    pub async fn delete(
        users: &dyn UserRepository,
        files: &dyn FileStore,
        id: Uuid,
    ) -> ApiResult<()> {
        let removed = users
            .delete(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

        if let Some(path) = removed.image_path.as_deref() {
            storage::discard(files, path).await;
        }

        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Replace the user's avatar
    pub async fn upload_image(
        users: &dyn UserRepository,
        files: &dyn FileStore,
        allowed_types: &[String],
        id: Uuid,
        upload: ImageUpload,
    ) -> ApiResult<UserResponse> {
        // Unknown ids fail before anything is written to disk
        if users.find_by_id(id).await?.is_none() {
            return Err(ApiError::NotFound(USER_NOT_FOUND.to_string()));
        }

        let user = replace_image(
            files,
            Namespace::Users,
            allowed_types,
            upload,
            USER_NOT_FOUND,
            |path| async move { users.set_image(id, Some(&path)).await },
        )
        .await?;

        Ok(user.into())
    }
}

pub(crate) use crate::auth::dto::{LoginRequest, LoginResponse, MeResponse, RegisterRequest};

use tracing::debug;
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::store::{NewUser, Store, User};
use crate::validate::is_valid_email;

/// Validates credentials and inserts the user. Checks run in a fixed order so
/// clients always see the first failing rule: password length, username
/// length, username charset, email syntax, email uniqueness, username
/// uniqueness.
pub async fn register(store: &dyn Store, req: RegisterRequest) -> Result<User, ApiError> {
    if req.password.chars().count() < 8 {
        return Err(ApiError::PasswordTooShort);
    }
    if req.username.chars().count() < 4 {
        return Err(ApiError::UsernameTooShort);
    }
    if !req.username.chars().all(char::is_alphanumeric) {
        return Err(ApiError::InvalidUsername);
    }

    let email = req.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::InvalidEmail);
    }

    if store.user_by_email(&email).await?.is_some() {
        return Err(ApiError::EmailTaken);
    }
    if store.user_by_username(&req.username).await?.is_some() {
        return Err(ApiError::UsernameTaken);
    }

    let password_hash = hash_password(&req.password)?;
    // A concurrent registration can still win the race; the store's unique
    // constraints turn that into the same conflict error.
    let user = store
        .create_user(NewUser {
            username: req.username,
            email,
            password_hash,
        })
        .await?;
    debug!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Exchanges email + password for a token pair. Unknown email and wrong
/// password produce the identical error so the response does not leak which
/// accounts exist.
pub async fn login(
    store: &dyn Store,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let email = req.email.trim().to_lowercase();
    let user = store
        .user_by_email(&email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let access = keys.sign_access(user.id)?;
    let refresh = keys.sign_refresh(user.id)?;
    debug!(user_id = %user.id, "login succeeded");
    Ok(LoginResponse {
        access,
        refresh,
        username: user.username,
        email: user.email,
    })
}

/// Resolves an authenticated id to display data. The account can vanish
/// between token issuance and use, so absence is reported, not unwrapped.
pub async fn whoami(store: &dyn Store, user_id: Uuid) -> Result<MeResponse, ApiError> {
    let user = store
        .user_by_id(user_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    Ok(MeResponse {
        username: user.username,
        email: user.email,
    })
}

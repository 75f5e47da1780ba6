use axum::{extract::State, Extension};
use axum_extra::extract::cookie::CookieJar;

use crate::api::error::ApiError;
use crate::api::extract::AppJson;
use crate::api::middleware::{cleared_session_cookie, session_cookie};
use crate::api::response::ApiResponse;
use crate::api::AppState;
use crate::auth::{hash_password, verify_password, AuthError};
use crate::models::*;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Trimmed, non-blank value of an optional field.
fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterInput>,
) -> Result<ApiResponse<User>, ApiError> {
    let (Some(name), Some(email), Some(password)) = (
        present(input.name),
        present(input.email),
        input.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("All fields are required"));
    };

    validate_name(&name).map_err(ApiError::BadRequest)?;
    validate_email(&email).map_err(ApiError::BadRequest)?;
    validate_password(&password).map_err(ApiError::BadRequest)?;

    if state.db.get_user_by_email(&email)?.is_some() {
        return Err(ApiError::bad_request("User already exists"));
    }

    let password_hash = hash_password(&password)?;
    let user = state.db.create_user(NewUser {
        name,
        email,
        password_hash: Some(password_hash),
        auth_provider: AuthProvider::Local,
    })?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(ApiResponse::created(user, "User registered successfully"))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(input): AppJson<LoginInput>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>), ApiError> {
    let (Some(email), Some(password)) = (
        present(input.email),
        input.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let user = state
        .db
        .get_user_by_email(&email)?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    let verified = match (&user.auth_provider, &user.password_hash) {
        (AuthProvider::Local, Some(hash)) => verify_password(&password, hash)?,
        _ => false,
    };
    if !verified {
        tracing::warn!(user_id = %user.id, "Rejected login attempt");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.tokens.issue(&user)?;
    let jar = jar.add(session_cookie(token.clone()));
    Ok((
        jar,
        ApiResponse::ok(LoginResponse { user, token }, "Login successful"),
    ))
}

pub async fn google_login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(input): AppJson<GoogleLoginInput>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>), ApiError> {
    let code = present(input.code)
        .ok_or_else(|| ApiError::bad_request("Google authorization code is required"))?;

    let identity = state.identity.exchange_code(&code).await.map_err(|e| {
        tracing::warn!("Google code exchange failed: {e}");
        match e {
            AuthError::NotConfigured(_) => ApiError::from(e),
            _ => ApiError::unauthorized("Invalid Google authorization code"),
        }
    })?;

    let user = match state.db.get_user_by_email(&identity.email)? {
        Some(user) => user,
        None => {
            let user = state.db.create_user(NewUser {
                name: identity.name,
                email: identity.email,
                password_hash: None,
                auth_provider: AuthProvider::Google,
            })?;
            tracing::info!(user_id = %user.id, "User registered through Google");
            user
        }
    };

    let token = state.tokens.issue(&user)?;
    let jar = jar.add(session_cookie(token.clone()));
    Ok((
        jar,
        ApiResponse::ok(LoginResponse { user, token }, "Google login successful"),
    ))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, ApiResponse<Option<()>>) {
    (
        jar.remove(cleared_session_cookie()),
        ApiResponse::ok(None, "Logout successful"),
    )
}

pub async fn current_user(Extension(user): Extension<User>) -> ApiResponse<User> {
    ApiResponse::ok(user, "User retrieved")
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppJson(input): AppJson<UpdateProfileInput>,
) -> Result<ApiResponse<User>, ApiError> {
    let name = present(input.name);
    let email = present(input.email);
    if name.is_none() && email.is_none() {
        return Err(ApiError::bad_request("At least one field is required to update"));
    }
    if let Some(name) = &name {
        validate_name(name).map_err(ApiError::BadRequest)?;
    }
    if let Some(email) = &email {
        validate_email(email).map_err(ApiError::BadRequest)?;
    }

    let updated = state
        .db
        .update_user(user.id, name, email)
        .map_err(|e| {
            if matches!(e.downcast_ref::<ModelError>(), Some(ModelError::EmailTaken)) {
                ApiError::bad_request("Email already in use")
            } else {
                ApiError::from(e)
            }
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::ok(updated, "User updated successfully"))
}

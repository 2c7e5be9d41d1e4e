use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::DatabaseConnection;

use crate::db::entities::user;
use crate::db::services::user_service;
use crate::web::error::{AppError, FieldErrors};
use crate::web::models::{Claims, LoginRequest, LoginResponse, RegisterRequest, UserResponse};

pub async fn register_user(
    pool: &DatabaseConnection,
    req: RegisterRequest,
) -> Result<UserResponse, AppError> {
    let mut errors = FieldErrors::new();
    if req.email.is_empty() || !req.email.contains('@') {
        errors.push("email", "Enter a valid email address.");
    }
    if req.name.is_empty() {
        errors.push("name", "This field may not be blank.");
    }
    if req.password.len() < 8 {
        errors.push("password", "Ensure this field has at least 8 characters.");
    }
    errors.into_result()?;

    let existing_user = user_service::find_user_by_email(pool, &req.email).await?;
    if existing_user.is_some() {
        return Err(AppError::UserAlreadyExists(
            "A user with this email already exists.".to_string(),
        ));
    }

    let password_hash =
        hash(&req.password, DEFAULT_COST).map_err(|e| AppError::PasswordHashingError(e.to_string()))?;

    let user_model = user_service::create_user(pool, &req.email, &req.name, &password_hash).await?;
    Ok(UserResponse::from(user_model))
}

pub async fn login_user(
    pool: &DatabaseConnection,
    req: LoginRequest,
    jwt_secret: &str,
) -> Result<LoginResponse, AppError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidCredentials);
    }

    let user = match user_service::find_user_by_email(pool, &req.email).await? {
        Some(u) => u,
        None => return Err(AppError::InvalidCredentials),
    };

    let valid_password = verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;

    if !valid_password {
        return Err(AppError::InvalidCredentials);
    }

    create_jwt_for_user(&user, jwt_secret)
}

pub fn create_jwt_for_user(
    user: &user::Model,
    jwt_secret: &str,
) -> Result<LoginResponse, AppError> {
    let now = Utc::now();
    // Token valid for 24 hours
    let expiration = (now + Duration::hours(24)).timestamp() as usize;

    let claims = Claims {
        sub: user.email.clone(),
        user_id: user.id,
        exp: expiration,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )
    .map_err(|e| AppError::TokenCreationError(e.to_string()))?;

    Ok(LoginResponse {
        token,
        user_id: user.id,
        email: user.email.clone(),
    })
}

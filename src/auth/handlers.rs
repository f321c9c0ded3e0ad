use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use crate::auth::{
    dto::{is_valid_email, is_valid_password, RegistrationRequest},
    password::hash_password,
    repo_types::User,
};
use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_AUTHORITY: &str = "ROLE_USER";

pub fn register_routes() -> Router<AppState> {
    Router::new().route("/register", post(register))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegistrationRequest>,
) -> Result<String, ApiError> {
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    if !is_valid_password(&payload.password) {
        warn!("password too short");
        return Err(ApiError::Validation(
            "Password must be at least 8 characters long".into(),
        ));
    }

    if User::exists(&state.db, &payload.email).await? {
        warn!(email = %payload.email, "user already exists");
        return Err(ApiError::Conflict("User already exists".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.email, &hash, DEFAULT_AUTHORITY).await?;

    info!(username = %user.username, "user registered");
    Ok("New user successfully registered".to_string())
}

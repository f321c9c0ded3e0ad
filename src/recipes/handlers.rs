use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{debug, instrument};

use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::recipes::dto::{CreatedRecipeResponse, RecipeDto, RecipeInput, SearchParams};
use crate::recipes::services::{self, SearchKind};
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/recipe/search", get(search_recipe))
        .route("/recipe/:id", get(get_recipe))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/recipe/new", post(post_recipe))
        .route("/recipe/:id", put(update_recipe))
        .route("/recipe/:id", delete(delete_recipe))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<RecipeDto>, ApiError> {
    let dto = services::get_recipe(&state.db, id).await?;
    Ok(Json(dto))
}

#[instrument(skip(state))]
pub async fn search_recipe(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<RecipeDto>>, ApiError> {
    let recipes = match services::resolve_search(params.category, params.name)? {
        SearchKind::Category(category) => {
            debug!(category, "searching by category");
            services::search_by_category(&state.db, &category).await?
        }
        SearchKind::Name(name) => {
            debug!(name, "searching by name");
            services::search_by_name(&state.db, &name).await?
        }
    };
    Ok(Json(recipes))
}

#[instrument(skip(state, payload))]
pub async fn post_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<RecipeInput>,
) -> Result<(StatusCode, Json<CreatedRecipeResponse>), ApiError> {
    let id = services::save_recipe(&state.db, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(CreatedRecipeResponse { id })))
}

#[instrument(skip(state, payload))]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<RecipeInput>,
) -> Result<StatusCode, ApiError> {
    services::update_recipe(&state.db, &user, id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    services::delete_recipe(&state.db, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

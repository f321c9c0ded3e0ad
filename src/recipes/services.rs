use sqlx::PgPool;
use tracing::{debug, error, info, warn};

use crate::auth::repo_types::User;
use crate::error::ApiError;
use crate::recipes::dto::{RecipeDto, RecipeInput};
use crate::recipes::repo;
use crate::recipes::repo_types::Recipe;

/// Which search to run, resolved from the mutually exclusive query
/// parameters.
#[derive(Debug, PartialEq, Eq)]
pub enum SearchKind {
    Category(String),
    Name(String),
}

/// Exactly one of `category` / `name` must be supplied; both or
/// neither is a bad request.
pub fn resolve_search(
    category: Option<String>,
    name: Option<String>,
) -> Result<SearchKind, ApiError> {
    match (category, name) {
        (Some(_), Some(_)) => {
            error!("both category and name parameters were provided");
            Err(ApiError::Validation(
                "Both category and name parameters were provided".into(),
            ))
        }
        (Some(category), None) => Ok(SearchKind::Category(category)),
        (None, Some(name)) => Ok(SearchKind::Name(name)),
        (None, None) => {
            error!("neither category nor name parameters were provided");
            Err(ApiError::Validation(
                "Neither category nor name parameters were provided".into(),
            ))
        }
    }
}

/// Fully validated create payload, ready to persist.
#[derive(Debug)]
pub struct ValidatedRecipe {
    pub name: String,
    pub description: String,
    pub category: String,
    pub ingredients: Vec<String>,
    pub directions: Vec<String>,
}

fn recipe_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Recipe not found for ID: {id}"))
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn require_text(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !is_blank(&v) => Ok(v),
        _ => Err(ApiError::Validation(message.into())),
    }
}

fn require_list(value: Option<Vec<String>>, message: &str) -> Result<Vec<String>, ApiError> {
    match value {
        Some(v) if !v.is_empty() && v.iter().all(|entry| !is_blank(entry)) => Ok(v),
        _ => Err(ApiError::Validation(message.into())),
    }
}

/// Create requires every field, non-blank, lists with at least one
/// non-blank entry.
pub fn validate_create(input: RecipeInput) -> Result<ValidatedRecipe, ApiError> {
    Ok(ValidatedRecipe {
        name: require_text(input.name, "Recipe name is mandatory")?,
        description: require_text(input.description, "Recipe description is mandatory")?,
        category: require_text(input.category, "Recipe category is mandatory")?,
        ingredients: require_list(input.ingredients, "At least one ingredient is required")?,
        directions: require_list(input.directions, "At least one direction is required")?,
    })
}

/// Null-skipping merge: fields present in the input replace the
/// existing value, absent fields keep it. Supplied fields must still
/// satisfy the create-time rules. The id never moves.
pub fn merge_update(existing: &mut Recipe, input: RecipeInput) -> Result<(), ApiError> {
    if let Some(name) = input.name {
        existing.name = validate_supplied_text(name, "Recipe name is mandatory")?;
    }
    if let Some(description) = input.description {
        existing.description =
            validate_supplied_text(description, "Recipe description is mandatory")?;
    }
    if let Some(category) = input.category {
        existing.category = validate_supplied_text(category, "Recipe category is mandatory")?;
    }
    if let Some(ingredients) = input.ingredients {
        existing.ingredients =
            require_list(Some(ingredients), "At least one ingredient is required")?;
    }
    if let Some(directions) = input.directions {
        existing.directions = require_list(Some(directions), "At least one direction is required")?;
    }
    Ok(())
}

fn validate_supplied_text(value: String, message: &str) -> Result<String, ApiError> {
    if is_blank(&value) {
        return Err(ApiError::Validation(message.into()));
    }
    Ok(value)
}

pub async fn get_recipe(db: &PgPool, id: i64) -> Result<RecipeDto, ApiError> {
    debug!(id, "searching for recipe");
    let recipe = repo::find_by_id(db, id)
        .await?
        .ok_or_else(|| recipe_not_found(id))?;
    Ok(RecipeDto::from_recipe(&recipe)?)
}

/// Persist a new recipe owned by the authenticated caller; the store
/// assigns id and date.
pub async fn save_recipe(
    db: &PgPool,
    current_user: &str,
    input: RecipeInput,
) -> Result<i64, ApiError> {
    let validated = validate_create(input)?;

    // The caller authenticated moments ago; a missing record here is
    // an abnormal state, not a client error.
    let owner = User::find_by_username(db, current_user)
        .await?
        .ok_or_else(|| anyhow::anyhow!("authenticated user {current_user} has no record"))?;

    let id = repo::create(
        db,
        &owner.username,
        &validated.name,
        &validated.description,
        &validated.category,
        &validated.ingredients,
        &validated.directions,
    )
    .await?;

    info!(id, owner = %owner.username, "recipe created");
    Ok(id)
}

pub async fn update_recipe(
    db: &PgPool,
    current_user: &str,
    id: i64,
    input: RecipeInput,
) -> Result<(), ApiError> {
    let mut existing = repo::find_by_id(db, id)
        .await?
        .ok_or_else(|| recipe_not_found(id))?;

    if existing.owner_username != current_user {
        warn!(id, user = %current_user, "update denied for non-owner");
        return Err(ApiError::Unauthorized(
            "You are not authorized to update this recipe.".into(),
        ));
    }

    merge_update(&mut existing, input)?;
    existing.id = id;
    repo::update(db, &existing).await?;

    info!(id, "recipe updated");
    Ok(())
}

pub async fn delete_recipe(db: &PgPool, current_user: &str, id: i64) -> Result<(), ApiError> {
    let existing = repo::find_by_id(db, id)
        .await?
        .ok_or_else(|| recipe_not_found(id))?;

    // Asymmetric with update's 401, preserved as observed upstream.
    if existing.owner_username != current_user {
        warn!(id, user = %current_user, "delete denied for non-owner");
        return Err(ApiError::Forbidden(
            "You are not authorized to delete this recipe.".into(),
        ));
    }

    repo::delete(db, id).await?;
    info!(id, "recipe deleted");
    Ok(())
}

pub async fn search_by_category(db: &PgPool, category: &str) -> Result<Vec<RecipeDto>, ApiError> {
    to_dtos(repo::search_by_category(db, category).await?, category)
}

pub async fn search_by_name(db: &PgPool, name: &str) -> Result<Vec<RecipeDto>, ApiError> {
    to_dtos(repo::search_by_name(db, name).await?, name)
}

/// An empty result set is a 404, never an empty list.
fn to_dtos(recipes: Vec<Recipe>, term: &str) -> Result<Vec<RecipeDto>, ApiError> {
    if recipes.is_empty() {
        debug!(term, "no recipes found");
        return Err(ApiError::NotFound(format!(
            "No recipes found for {term}: {term}"
        )));
    }
    recipes
        .iter()
        .map(|recipe| RecipeDto::from_recipe(recipe).map_err(ApiError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn full_input() -> RecipeInput {
        RecipeInput {
            name: Some("Borscht".into()),
            description: Some("Beet soup".into()),
            category: Some("soup".into()),
            ingredients: Some(vec!["beets".into(), "cabbage".into()]),
            directions: Some(vec!["chop".into(), "simmer".into()]),
        }
    }

    fn existing_recipe() -> Recipe {
        Recipe {
            id: 7,
            name: "Borscht".into(),
            description: "Beet soup".into(),
            category: "soup".into(),
            date: datetime!(2024-05-01 12:00:00 UTC),
            owner_username: "chef@test.com".into(),
            ingredients: vec!["beets".into()],
            directions: vec!["simmer".into()],
        }
    }

    #[test]
    fn validate_create_accepts_full_input() {
        let validated = validate_create(full_input()).unwrap();
        assert_eq!(validated.name, "Borscht");
        assert_eq!(validated.ingredients.len(), 2);
    }

    #[test]
    fn validate_create_rejects_missing_name() {
        let input = RecipeInput {
            name: None,
            ..full_input()
        };
        let err = validate_create(input).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn validate_create_rejects_blank_category() {
        let input = RecipeInput {
            category: Some("   ".into()),
            ..full_input()
        };
        assert!(matches!(
            validate_create(input),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn validate_create_rejects_empty_ingredient_list() {
        let input = RecipeInput {
            ingredients: Some(vec![]),
            ..full_input()
        };
        assert!(matches!(
            validate_create(input),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn validate_create_rejects_blank_direction_entry() {
        let input = RecipeInput {
            directions: Some(vec!["stir".into(), "".into()]),
            ..full_input()
        };
        assert!(matches!(
            validate_create(input),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn merge_replaces_supplied_fields_only() {
        let mut recipe = existing_recipe();
        let input = RecipeInput {
            name: Some("Green Borscht".into()),
            ingredients: Some(vec!["sorrel".into()]),
            ..Default::default()
        };

        merge_update(&mut recipe, input).unwrap();

        assert_eq!(recipe.name, "Green Borscht");
        assert_eq!(recipe.ingredients, vec!["sorrel".to_string()]);
        // Absent fields keep the existing value.
        assert_eq!(recipe.description, "Beet soup");
        assert_eq!(recipe.category, "soup");
        assert_eq!(recipe.directions, vec!["simmer".to_string()]);
    }

    #[test]
    fn merge_with_empty_input_keeps_everything() {
        let mut recipe = existing_recipe();
        merge_update(&mut recipe, RecipeInput::default()).unwrap();
        assert_eq!(recipe.name, "Borscht");
        assert_eq!(recipe.ingredients, vec!["beets".to_string()]);
    }

    #[test]
    fn merge_rejects_blank_supplied_name() {
        let mut recipe = existing_recipe();
        let input = RecipeInput {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(
            merge_update(&mut recipe, input),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn merge_rejects_empty_supplied_directions() {
        let mut recipe = existing_recipe();
        let input = RecipeInput {
            directions: Some(vec![]),
            ..Default::default()
        };
        assert!(matches!(
            merge_update(&mut recipe, input),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn resolve_search_picks_category() {
        let kind = resolve_search(Some("soup".into()), None).unwrap();
        assert_eq!(kind, SearchKind::Category("soup".into()));
    }

    #[test]
    fn resolve_search_picks_name() {
        let kind = resolve_search(None, Some("borscht".into())).unwrap();
        assert_eq!(kind, SearchKind::Name("borscht".into()));
    }

    #[test]
    fn resolve_search_rejects_both_parameters() {
        let err = resolve_search(Some("soup".into()), Some("borscht".into())).unwrap_err();
        match err {
            ApiError::Validation(msg) => {
                assert_eq!(msg, "Both category and name parameters were provided");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn resolve_search_rejects_neither_parameter() {
        let err = resolve_search(None, None).unwrap_err();
        match err {
            ApiError::Validation(msg) => {
                assert_eq!(msg, "Neither category nor name parameters were provided");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn missing_recipe_message_names_the_id() {
        match recipe_not_found(99) {
            ApiError::NotFound(msg) => assert_eq!(msg, "Recipe not found for ID: 99"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn empty_search_result_is_not_found() {
        let err = to_dtos(vec![], "catX").unwrap_err();
        match err {
            ApiError::NotFound(msg) => {
                assert_eq!(msg, "No recipes found for catX: catX");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn search_results_map_to_projections() {
        let dtos = to_dtos(vec![existing_recipe()], "soup").unwrap();
        assert_eq!(dtos.len(), 1);
        assert_eq!(dtos[0].name, "Borscht");
    }
}

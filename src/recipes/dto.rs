use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;

use crate::recipes::repo_types::Recipe;

/// Wire projection of a recipe. The owner is never exposed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecipeDto {
    pub name: String,
    pub description: String,
    pub category: String,
    pub date: String,
    pub ingredients: Vec<String>,
    pub directions: Vec<String>,
}

impl RecipeDto {
    pub fn from_recipe(recipe: &Recipe) -> anyhow::Result<Self> {
        Ok(Self {
            name: recipe.name.clone(),
            description: recipe.description.clone(),
            category: recipe.category.clone(),
            date: recipe.date.format(&Rfc3339)?,
            ingredients: recipe.ingredients.clone(),
            directions: recipe.directions.clone(),
        })
    }
}

/// Request body for create and update. Every field is optional at the
/// serde level so update can tell an absent field from a supplied one;
/// create requires all of them.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub directions: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct CreatedRecipeResponse {
    #[serde(rename = "Recipe created for id")]
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub category: Option<String>,
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample_recipe() -> Recipe {
        Recipe {
            id: 7,
            name: "Borscht".into(),
            description: "Beet soup".into(),
            category: "soup".into(),
            date: datetime!(2024-05-01 12:00:00 UTC),
            owner_username: "chef@test.com".into(),
            ingredients: vec!["beets".into(), "cabbage".into()],
            directions: vec!["chop".into(), "simmer".into()],
        }
    }

    #[test]
    fn projection_omits_owner_and_formats_date() {
        let dto = RecipeDto::from_recipe(&sample_recipe()).unwrap();
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["name"], "Borscht");
        assert_eq!(json["date"], "2024-05-01T12:00:00Z");
        assert_eq!(json["ingredients"][1], "cabbage");
        assert!(json.get("owner_username").is_none());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn created_response_uses_literal_key() {
        let json = serde_json::to_value(CreatedRecipeResponse { id: 42 }).unwrap();
        assert_eq!(json["Recipe created for id"], 42);
    }

    #[test]
    fn input_distinguishes_absent_from_supplied() {
        let input: RecipeInput = serde_json::from_str(r#"{"name": "Pho"}"#).unwrap();
        assert_eq!(input.name.as_deref(), Some("Pho"));
        assert!(input.description.is_none());
        assert!(input.ingredients.is_none());
    }
}

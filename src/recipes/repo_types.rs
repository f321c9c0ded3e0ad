use sqlx::FromRow;
use time::OffsetDateTime;

/// Header row of the recipes table, without the list attributes.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub date: OffsetDateTime,
    pub owner_username: String,
}

/// Fully materialized recipe: header plus both ordered list
/// attributes, ready for mapping or persisting.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub date: OffsetDateTime,
    pub owner_username: String,
    pub ingredients: Vec<String>,
    pub directions: Vec<String>,
}

impl Recipe {
    pub fn from_parts(row: RecipeRow, ingredients: Vec<String>, directions: Vec<String>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            date: row.date,
            owner_username: row.owner_username,
            ingredients,
            directions,
        }
    }
}

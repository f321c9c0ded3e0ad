use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};

use crate::recipes::repo_types::{Recipe, RecipeRow};

const RECIPE_COLUMNS: &str = "id, name, description, category, date, owner_username";

/// Fetch a recipe by id with both list attributes fully materialized:
/// one header query plus one query per list table, merged in memory.
pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<Recipe>> {
    let row = sqlx::query_as::<_, RecipeRow>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let ingredients = sqlx::query_scalar::<_, String>(
        r#"
        SELECT ingredient FROM recipe_ingredients
        WHERE recipe_id = $1
        ORDER BY position
        "#,
    )
    .bind(id)
    .fetch_all(db)
    .await?;

    let directions = sqlx::query_scalar::<_, String>(
        r#"
        SELECT direction FROM recipe_directions
        WHERE recipe_id = $1
        ORDER BY position
        "#,
    )
    .bind(id)
    .fetch_all(db)
    .await?;

    Ok(Some(Recipe::from_parts(row, ingredients, directions)))
}

/// Insert a new recipe with its list rows in one transaction.
/// `date` is assigned by the store; returns the generated id.
pub async fn create(
    db: &PgPool,
    owner_username: &str,
    name: &str,
    description: &str,
    category: &str,
    ingredients: &[String],
    directions: &[String],
) -> anyhow::Result<i64> {
    let mut tx = db.begin().await?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO recipes (name, description, category, owner_username)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(category)
    .bind(owner_username)
    .fetch_one(&mut *tx)
    .await?;

    insert_lists(&mut tx, id, ingredients, directions).await?;

    tx.commit().await?;
    Ok(id)
}

/// Overwrite a recipe's mutable fields and list rows; the store
/// refreshes `date` as part of the same statement.
pub async fn update(db: &PgPool, recipe: &Recipe) -> anyhow::Result<()> {
    let mut tx = db.begin().await?;

    sqlx::query(
        r#"
        UPDATE recipes
        SET name = $2, description = $3, category = $4, date = now()
        WHERE id = $1
        "#,
    )
    .bind(recipe.id)
    .bind(&recipe.name)
    .bind(&recipe.description)
    .bind(&recipe.category)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe.id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM recipe_directions WHERE recipe_id = $1")
        .bind(recipe.id)
        .execute(&mut *tx)
        .await?;

    insert_lists(&mut tx, recipe.id, &recipe.ingredients, &recipe.directions).await?;

    tx.commit().await?;
    Ok(())
}

pub async fn delete(db: &PgPool, id: i64) -> anyhow::Result<()> {
    // List rows cascade with the header.
    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Case-insensitive exact category match, newest first.
pub async fn search_by_category(db: &PgPool, category: &str) -> anyhow::Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, RecipeRow>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE LOWER(category) = LOWER($1) ORDER BY date DESC"
    ))
    .bind(category)
    .fetch_all(db)
    .await?;
    attach_lists(db, rows).await
}

/// Case-insensitive name substring match, newest first. The term is
/// escaped so LIKE metacharacters match literally.
pub async fn search_by_name(db: &PgPool, name: &str) -> anyhow::Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, RecipeRow>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE name ILIKE '%' || $1 || '%' ORDER BY date DESC"
    ))
    .bind(escape_like(name))
    .fetch_all(db)
    .await?;
    attach_lists(db, rows).await
}

/// Backslash-escape `%`, `_` and `\` so a bound search term cannot act
/// as a LIKE pattern.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

async fn insert_lists(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: i64,
    ingredients: &[String],
    directions: &[String],
) -> anyhow::Result<()> {
    for (position, ingredient) in ingredients.iter().enumerate() {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, position, ingredient) VALUES ($1, $2, $3)",
        )
        .bind(recipe_id)
        .bind(position as i32)
        .bind(ingredient)
        .execute(&mut **tx)
        .await?;
    }
    for (position, direction) in directions.iter().enumerate() {
        sqlx::query(
            "INSERT INTO recipe_directions (recipe_id, position, direction) VALUES ($1, $2, $3)",
        )
        .bind(recipe_id)
        .bind(position as i32)
        .bind(direction)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Batch-load both list attributes for a page of header rows with a
/// single query per table, avoiding per-row fan-out.
async fn attach_lists(db: &PgPool, rows: Vec<RecipeRow>) -> anyhow::Result<Vec<Recipe>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

    let mut ingredients: HashMap<i64, Vec<String>> = HashMap::new();
    let ingredient_rows = sqlx::query_as::<_, (i64, String)>(
        r#"
        SELECT recipe_id, ingredient FROM recipe_ingredients
        WHERE recipe_id = ANY($1)
        ORDER BY recipe_id, position
        "#,
    )
    .bind(&ids)
    .fetch_all(db)
    .await?;
    for (recipe_id, ingredient) in ingredient_rows {
        ingredients.entry(recipe_id).or_default().push(ingredient);
    }

    let mut directions: HashMap<i64, Vec<String>> = HashMap::new();
    let direction_rows = sqlx::query_as::<_, (i64, String)>(
        r#"
        SELECT recipe_id, direction FROM recipe_directions
        WHERE recipe_id = ANY($1)
        ORDER BY recipe_id, position
        "#,
    )
    .bind(&ids)
    .fetch_all(db)
    .await?;
    for (recipe_id, direction) in direction_rows {
        directions.entry(recipe_id).or_default().push(direction);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let id = row.id;
            Recipe::from_parts(
                row,
                ingredients.remove(&id).unwrap_or_default(),
                directions.remove(&id).unwrap_or_default(),
            )
        })
        .collect())
}

use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

/// One line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

pub type Recipe = Vec<Ingredient>;

/// Drink as the rest of the app sees it. Serializes as the full-detail view;
/// see `Drink::short` for the public one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Recipe,
}

/// Row of the `drinks` table; `recipe` is a JSONB column.
#[derive(Debug, FromRow)]
pub struct DrinkRow {
    pub id: i32,
    pub title: String,
    pub recipe: Json<Recipe>,
}

impl From<DrinkRow> for Drink {
    fn from(r: DrinkRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            recipe: r.recipe.0,
        }
    }
}

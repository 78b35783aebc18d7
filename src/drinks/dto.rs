use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::drinks::repo_types::{Drink, Ingredient, Recipe};
use crate::error::ApiError;

/// Ingredient without its name, as shown on the public menu.
#[derive(Debug, Serialize)]
pub struct IngredientShort {
    pub color: String,
    pub parts: u32,
}

#[derive(Debug, Serialize)]
pub struct DrinkShort {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<IngredientShort>,
}

impl Drink {
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|i| IngredientShort {
                    color: i.color.clone(),
                    parts: i.parts,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T> DrinksResponse<T> {
    pub fn new(drinks: Vec<T>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub delete: i32,
}

/// A recipe as clients send it: a list, or a lone ingredient.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl From<RecipeInput> for Recipe {
    fn from(r: RecipeInput) -> Self {
        match r {
            RecipeInput::Many(v) => v,
            RecipeInput::One(i) => vec![i],
        }
    }
}

/// Body of POST /drinks and PATCH /drinks/:id. Missing fields overwrite with empty values.
#[derive(Debug, Deserialize)]
pub struct DrinkPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

impl DrinkPayload {
    /// Parses a raw request body. `Ok(None)` means the client sent nothing usable:
    /// no bytes, or a falsy JSON value (`null`, `false`, `0`, `""`, `{}`, `[]`).
    pub fn from_body(body: &[u8]) -> Result<Option<Self>, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::BadRequest)?;
        match &value {
            Value::Null | Value::Bool(false) => return Ok(None),
            Value::Number(n) if n.as_f64() == Some(0.0) => return Ok(None),
            Value::String(s) if s.is_empty() => return Ok(None),
            Value::Object(map) if map.is_empty() => return Ok(None),
            Value::Array(items) if items.is_empty() => return Ok(None),
            Value::Object(_) => {}
            _ => return Err(ApiError::Unprocessable),
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|_| ApiError::Unprocessable)
    }

    pub fn into_parts(self) -> (String, Recipe) {
        (
            self.title.unwrap_or_default(),
            self.recipe.map(Recipe::from).unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Drink {
        Drink {
            id: 7,
            title: "Water".into(),
            recipe: vec![Ingredient {
                name: "water".into(),
                color: "blue".into(),
                parts: 1,
            }],
        }
    }

    #[test]
    fn short_hides_ingredient_names() {
        let json = serde_json::to_value(water().short()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "title": "Water", "recipe": [{"color": "blue", "parts": 1}]})
        );
    }

    #[test]
    fn long_keeps_ingredient_names() {
        let json = serde_json::to_value(water()).unwrap();
        assert_eq!(json["recipe"][0]["name"], "water");
    }

    #[test]
    fn empty_bodies_count_as_missing() {
        for body in ["", "  ", "null", "{}", "[]", "\"\"", "false", "0", "0.0"] {
            assert!(DrinkPayload::from_body(body.as_bytes()).unwrap().is_none(), "{body:?}");
        }
    }

    #[test]
    fn invalid_json_is_a_bad_request() {
        let err = DrinkPayload::from_body(b"{title").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest));
    }

    #[test]
    fn single_ingredient_becomes_a_list() {
        let body = br#"{"title":"Milk","recipe":{"name":"milk","color":"white","parts":3}}"#;
        let (title, recipe) = DrinkPayload::from_body(body).unwrap().unwrap().into_parts();
        assert_eq!(title, "Milk");
        assert_eq!(recipe.len(), 1);
        assert_eq!(recipe[0].parts, 3);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let (title, recipe) = DrinkPayload::from_body(br#"{"title":null,"other":1}"#)
            .unwrap()
            .unwrap()
            .into_parts();
        assert_eq!(title, "");
        assert!(recipe.is_empty());
    }

    #[test]
    fn malformed_recipe_is_unprocessable() {
        let err = DrinkPayload::from_body(br#"{"title":"x","recipe":[{"color":"red"}]}"#).unwrap_err();
        assert!(matches!(err, ApiError::Unprocessable));
        for body in ["\"water\"", "true", "1"] {
            let err = DrinkPayload::from_body(body.as_bytes()).unwrap_err();
            assert!(matches!(err, ApiError::Unprocessable), "{body:?}");
        }
    }
}

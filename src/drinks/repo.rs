use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};

use crate::drinks::repo_types::{Drink, DrinkRow, Ingredient, Recipe};

/// Persistence for drinks. Every mutation commits on its own.
#[async_trait]
pub trait DrinkStore: Send + Sync {
    async fn list_all(&self) -> anyhow::Result<Vec<Drink>>;
    async fn find(&self, id: i32) -> anyhow::Result<Option<Drink>>;
    async fn insert(&self, title: &str, recipe: &Recipe) -> anyhow::Result<Drink>;
    async fn update(&self, drink: &Drink) -> anyhow::Result<()>;
    async fn delete(&self, drink: &Drink) -> anyhow::Result<()>;
    /// Drop every drink and seed the sample one.
    async fn reset(&self) -> anyhow::Result<()>;
}

/// The drink written by `reset`.
pub fn sample_drink() -> (String, Recipe) {
    (
        "water".into(),
        vec![Ingredient {
            name: "water".into(),
            color: "blue".into(),
            parts: 1,
        }],
    )
}

/// An UPDATE that touched nothing means the row vanished since it was read.
fn expect_one_row(affected: u64, id: i32) -> anyhow::Result<()> {
    if affected == 0 {
        anyhow::bail!("drink {id} does not exist");
    }
    Ok(())
}

#[derive(Clone)]
pub struct PgDrinkStore {
    db: PgPool,
}

impl PgDrinkStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DrinkStore for PgDrinkStore {
    async fn list_all(&self) -> anyhow::Result<Vec<Drink>> {
        let rows = sqlx::query_as::<_, DrinkRow>(
            r#"
            SELECT id, title, recipe
            FROM drinks
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list drinks")?;
        Ok(rows.into_iter().map(Drink::from).collect())
    }

    async fn find(&self, id: i32) -> anyhow::Result<Option<Drink>> {
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            SELECT id, title, recipe
            FROM drinks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("find drink {id}"))?;
        Ok(row.map(Drink::from))
    }

    async fn insert(&self, title: &str, recipe: &Recipe) -> anyhow::Result<Drink> {
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            INSERT INTO drinks (title, recipe)
            VALUES ($1, $2)
            RETURNING id, title, recipe
            "#,
        )
        .bind(title)
        .bind(Json(recipe))
        .fetch_one(&self.db)
        .await
        .context("insert drink")?;
        Ok(row.into())
    }

    async fn update(&self, drink: &Drink) -> anyhow::Result<()> {
        let done = sqlx::query(
            r#"
            UPDATE drinks
               SET title = $2, recipe = $3
             WHERE id = $1
            "#,
        )
        .bind(drink.id)
        .bind(&drink.title)
        .bind(Json(&drink.recipe))
        .execute(&self.db)
        .await
        .with_context(|| format!("update drink {}", drink.id))?;
        expect_one_row(done.rows_affected(), drink.id)
    }

    async fn delete(&self, drink: &Drink) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(drink.id)
            .execute(&self.db)
            .await
            .with_context(|| format!("delete drink {}", drink.id))?;
        Ok(())
    }

    async fn reset(&self) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        sqlx::query("TRUNCATE drinks RESTART IDENTITY")
            .execute(&mut *tx)
            .await
            .context("truncate drinks")?;
        let (title, recipe) = sample_drink();
        sqlx::query("INSERT INTO drinks (title, recipe) VALUES ($1, $2)")
            .bind(title)
            .bind(Json(recipe))
            .execute(&mut *tx)
            .await
            .context("seed sample drink")?;
        tx.commit().await.context("commit tx")?;
        Ok(())
    }
}

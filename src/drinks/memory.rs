use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::drinks::repo::{sample_drink, DrinkStore};
use crate::drinks::repo_types::{Drink, Recipe};

#[derive(Default)]
struct Table {
    next_id: i32,
    rows: BTreeMap<i32, Drink>,
}

/// In-process drink table. Ids start at 1 and are never reused until `reset`.
#[derive(Default)]
pub struct MemoryDrinkStore {
    table: RwLock<Table>,
}

impl MemoryDrinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    async fn list_all(&self) -> anyhow::Result<Vec<Drink>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find(&self, id: i32) -> anyhow::Result<Option<Drink>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, title: &str, recipe: &Recipe) -> anyhow::Result<Drink> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let drink = Drink {
            id: table.next_id,
            title: title.to_string(),
            recipe: recipe.clone(),
        };
        table.rows.insert(drink.id, drink.clone());
        Ok(drink)
    }

    async fn update(&self, drink: &Drink) -> anyhow::Result<()> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&drink.id) {
            Some(row) => {
                *row = drink.clone();
                Ok(())
            }
            None => anyhow::bail!("drink {} does not exist", drink.id),
        }
    }

    async fn delete(&self, drink: &Drink) -> anyhow::Result<()> {
        self.table.write().await.rows.remove(&drink.id);
        Ok(())
    }

    async fn reset(&self) -> anyhow::Result<()> {
        {
            let mut table = self.table.write().await;
            *table = Table::default();
        }
        let (title, recipe) = sample_drink();
        self.insert(&title, &recipe).await?;
        Ok(())
    }
}

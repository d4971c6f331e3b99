//! In-memory catalog for tests and single-process deployments.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{MenuItemId, Money};

use crate::error::{CatalogError, Result};
use crate::resolver::{CatalogResolver, RecipeLine, ResolvedItem};

#[derive(Debug, Clone)]
struct StoredItem {
    name: String,
    unit_price: Money,
    active: bool,
    recipe: Vec<RecipeLine>,
}

#[derive(Debug, Default)]
struct CatalogState {
    items: HashMap<MenuItemId, StoredItem>,
    unavailable: bool,
}

/// In-memory catalog resolver.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an active item and returns its id.
    pub fn add_item(&self, name: impl Into<String>, unit_price: Money) -> MenuItemId {
        let id = MenuItemId::new();
        self.state.write().unwrap().items.insert(
            id,
            StoredItem {
                name: name.into(),
                unit_price,
                active: true,
                recipe: Vec::new(),
            },
        );
        id
    }

    /// Replaces an item's recipe.
    pub fn set_recipe(&self, menu_item_id: MenuItemId, recipe: Vec<RecipeLine>) {
        if let Some(item) = self.state.write().unwrap().items.get_mut(&menu_item_id) {
            item.recipe = recipe;
        }
    }

    /// Deactivates an item; it stays in storage but is no longer orderable.
    pub fn deactivate(&self, menu_item_id: MenuItemId) {
        if let Some(item) = self.state.write().unwrap().items.get_mut(&menu_item_id) {
            item.active = false;
        }
    }

    /// Simulates catalog outage: every call fails Unavailable while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }

    fn check_available(&self) -> Result<()> {
        if self.state.read().unwrap().unavailable {
            return Err(CatalogError::Unavailable("catalog offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogResolver for InMemoryCatalog {
    async fn resolve_item(&self, menu_item_id: MenuItemId) -> Result<ResolvedItem> {
        self.check_available()?;
        let state = self.state.read().unwrap();
        state
            .items
            .get(&menu_item_id)
            .filter(|it| it.active)
            .map(|it| ResolvedItem {
                menu_item_id,
                name: it.name.clone(),
                unit_price: it.unit_price,
            })
            .ok_or(CatalogError::NotFound(menu_item_id))
    }

    async fn resolve_recipe(&self, menu_item_id: MenuItemId) -> Result<Vec<RecipeLine>> {
        self.check_available()?;
        let state = self.state.read().unwrap();
        state
            .items
            .get(&menu_item_id)
            .map(|it| it.recipe.clone())
            .ok_or(CatalogError::NotFound(menu_item_id))
    }
}

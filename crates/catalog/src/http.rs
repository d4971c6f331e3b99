//! HTTP client against the menu catalog service.

use std::time::Duration;

use async_trait::async_trait;
use common::{IngredientId, MenuItemId, Money};
use serde::Deserialize;

use crate::error::{CatalogError, Result};
use crate::resolver::{CatalogResolver, RecipeLine, ResolvedItem};

/// Per-request timeout. A stalled catalog becomes a reported Unavailable
/// instead of an indefinite hang.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct MenuItemDto {
    menu_item_id: MenuItemId,
    name: String,
    /// The catalog serves prices as decimal numbers; converted to cents at
    /// this boundary and fixed-point from then on.
    price: f64,
}

#[derive(Debug, Deserialize)]
struct RecipeLineDto {
    ingredient_id: IngredientId,
    quantity: i64,
}

/// Resolver backed by the menu catalog's HTTP API.
pub struct HttpCatalogResolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogResolver {
    /// Creates a resolver for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn to_cents(price: f64) -> Money {
        Money::from_cents((price * 100.0).round() as i64)
    }
}

#[async_trait]
impl CatalogResolver for HttpCatalogResolver {
    #[tracing::instrument(skip(self))]
    async fn resolve_item(&self, menu_item_id: MenuItemId) -> Result<ResolvedItem> {
        // The catalog lists active items only; absence from the active list
        // covers both unknown and deactivated ids.
        let items: Vec<MenuItemDto> = self
            .client
            .get(format!("{}/items", self.base_url))
            .query(&[("active_only", "true")])
            .send()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        items
            .into_iter()
            .find(|it| it.menu_item_id == menu_item_id)
            .map(|it| ResolvedItem {
                menu_item_id: it.menu_item_id,
                name: it.name,
                unit_price: Self::to_cents(it.price),
            })
            .ok_or(CatalogError::NotFound(menu_item_id))
    }

    #[tracing::instrument(skip(self))]
    async fn resolve_recipe(&self, menu_item_id: MenuItemId) -> Result<Vec<RecipeLine>> {
        let response = self
            .client
            .get(format!("{}/items/{}/recipe", self.base_url, menu_item_id))
            .send()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(menu_item_id));
        }

        let lines: Vec<RecipeLineDto> = response
            .error_for_status()
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        Ok(lines
            .into_iter()
            .map(|l| RecipeLine {
                ingredient_id: l.ingredient_id,
                quantity_per_unit: l.quantity,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_prices_convert_to_cents_exactly() {
        assert_eq!(HttpCatalogResolver::to_cents(3.50), Money::from_cents(350));
        assert_eq!(HttpCatalogResolver::to_cents(5.00), Money::from_cents(500));
        // 0.29 has no exact binary representation; rounding fixes it.
        assert_eq!(HttpCatalogResolver::to_cents(0.29), Money::from_cents(29));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let resolver = HttpCatalogResolver::new("http://menu:8000/").unwrap();
        assert_eq!(resolver.base_url, "http://menu:8000");
    }
}

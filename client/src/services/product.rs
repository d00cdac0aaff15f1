//! Product service: costs the menu against the ingredient catalog

use shared::analytics::Dashboard;
use shared::catalog::IngredientCatalog;
use shared::view::{product_rows, ProductQuery, ProductRow};
use shared::{CostingSettings, MarginPolicy, Product};

use crate::error::AppResult;
use crate::external::BusyFoolApi;

#[derive(Clone)]
pub struct ProductService {
    api: BusyFoolApi,
    policy: MarginPolicy,
}

impl ProductService {
    pub fn new(api: BusyFoolApi, settings: &CostingSettings) -> AppResult<Self> {
        Ok(Self {
            api,
            policy: settings.margin_policy()?,
        })
    }

    pub async fn load(&self) -> AppResult<Vec<Product>> {
        let products = self.api.list_products().await?;
        tracing::debug!("Loaded {} products", products.len());
        Ok(products)
    }

    /// Cost, filter and sort products into table rows
    pub fn rows(
        &self,
        products: &[Product],
        catalog: &IngredientCatalog,
        query: &ProductQuery,
    ) -> Vec<ProductRow> {
        let rows = product_rows(products, catalog, &self.policy, query);
        let uncosted = rows.iter().filter(|row| !row.is_costed()).count();
        if uncosted > 0 {
            tracing::warn!("{} products could not be costed", uncosted);
        }
        rows
    }

    pub fn dashboard(
        &self,
        products: &[Product],
        catalog: &IngredientCatalog,
        limit: usize,
    ) -> AppResult<Dashboard> {
        let rows = self.rows(products, catalog, &ProductQuery::default());
        Ok(Dashboard::build(&rows, catalog, limit)?)
    }
}

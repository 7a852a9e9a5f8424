use crate::{AccountStore, CatalogItem, MoneyCents, Product, ResultEngine};

use super::Ledger;

impl<S: AccountStore> Ledger<S> {
    /// Adds `name` to `category` at `price`, overwriting an existing price.
    pub async fn add_product(
        &self,
        user_id: &str,
        category: &str,
        name: &str,
        price: MoneyCents,
    ) -> ResultEngine<()> {
        self.write(user_id, |account| account.catalog.upsert(category, name, price))
            .await?;
        tracing::info!(user_id, category, product = name, %price, "product saved");
        Ok(())
    }

    /// Removes a product; its category goes away with the last product.
    pub async fn remove_product(&self, user_id: &str, category: &str, name: &str) -> ResultEngine<()> {
        self.write(user_id, |account| account.catalog.remove(category, name))
            .await?;
        tracing::info!(user_id, category, product = name, "product removed");
        Ok(())
    }

    pub async fn update_product_price(
        &self,
        user_id: &str,
        category: &str,
        name: &str,
        price: MoneyCents,
    ) -> ResultEngine<()> {
        self.write(user_id, |account| {
            account.catalog.update_price(category, name, price)
        })
        .await?;
        tracing::info!(user_id, category, product = name, %price, "product price updated");
        Ok(())
    }

    /// `(category, product, price)` rows in insertion order.
    pub async fn list_products(&self, user_id: &str) -> ResultEngine<Vec<CatalogItem>> {
        self.read(user_id, |account| account.catalog.list()).await
    }

    pub async fn products_in(&self, user_id: &str, category: &str) -> ResultEngine<Vec<Product>> {
        self.read(user_id, |account| account.catalog.products_in(category).to_vec())
            .await
    }

    pub async fn product_price(
        &self,
        user_id: &str,
        category: &str,
        name: &str,
    ) -> ResultEngine<MoneyCents> {
        self.read(user_id, |account| account.catalog.price(category, name))
            .await?
    }
}

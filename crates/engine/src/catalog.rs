//! Category → product → unit price catalog.
//!
//! Categories and products keep insertion order, so listings are stable
//! across restarts. A category exists only while it has at least one product.

use serde::{Deserialize, Serialize};

use crate::{
    EngineError, MoneyCents, ResultEngine,
    util::{require_positive_price, required_name},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCategory {
    pub name: String,
    pub products: Vec<Product>,
}

/// A flattened `(category, product, price)` row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogItem {
    pub category: String,
    pub name: String,
    pub price: MoneyCents,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog(Vec<CatalogCategory>);

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inserts `name` in `category` or overwrites its price.
    pub fn upsert(&mut self, category: &str, name: &str, price: MoneyCents) -> ResultEngine<()> {
        let price = require_positive_price(price)?;
        let category = required_name(category, "category")?;
        let name = required_name(name, "product")?;

        let idx = match self.0.iter().position(|c| c.name == category) {
            Some(idx) => idx,
            None => {
                self.0.push(CatalogCategory {
                    name: category,
                    products: Vec::new(),
                });
                self.0.len() - 1
            }
        };

        let products = &mut self.0[idx].products;
        match products.iter_mut().find(|p| p.name == name) {
            Some(product) => product.price = price,
            None => products.push(Product { name, price }),
        }
        Ok(())
    }

    /// Removes a product, dropping its category when it was the last one.
    /// Returns the removed price.
    pub fn remove(&mut self, category: &str, name: &str) -> ResultEngine<MoneyCents> {
        let (cat_idx, prod_idx) = self.locate(category, name)?;
        let removed = self.0[cat_idx].products.remove(prod_idx);
        if self.0[cat_idx].products.is_empty() {
            self.0.remove(cat_idx);
        }
        Ok(removed.price)
    }

    /// Changes the price of an existing product.
    pub fn update_price(&mut self, category: &str, name: &str, price: MoneyCents) -> ResultEngine<()> {
        let (cat_idx, prod_idx) = self.locate(category, name)?;
        let price = require_positive_price(price)?;
        self.0[cat_idx].products[prod_idx].price = price;
        Ok(())
    }

    pub fn price(&self, category: &str, name: &str) -> ResultEngine<MoneyCents> {
        let (cat_idx, prod_idx) = self.locate(category, name)?;
        Ok(self.0[cat_idx].products[prod_idx].price)
    }

    /// Products of one category; empty when the category is unknown.
    pub fn products_in(&self, category: &str) -> &[Product] {
        let category = category.trim();
        self.0
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.products.as_slice())
            .unwrap_or_default()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.name.as_str())
    }

    /// Every product, categories first-inserted first.
    pub fn list(&self) -> Vec<CatalogItem> {
        self.0
            .iter()
            .flat_map(|c| {
                c.products.iter().map(|p| CatalogItem {
                    category: c.name.clone(),
                    name: p.name.clone(),
                    price: p.price,
                })
            })
            .collect()
    }

    fn locate(&self, category: &str, name: &str) -> ResultEngine<(usize, usize)> {
        let (category, name) = (category.trim(), name.trim());
        let not_found = || EngineError::NotFound(format!("{category} / {name}"));
        let cat_idx = self
            .0
            .iter()
            .position(|c| c.name == category)
            .ok_or_else(not_found)?;
        let prod_idx = self.0[cat_idx]
            .products
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(not_found)?;
        Ok((cat_idx, prod_idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(category: &str, name: &str, cents: i64) -> CatalogItem {
        CatalogItem {
            category: category.to_string(),
            name: name.to_string(),
            price: MoneyCents::new(cents),
        }
    }

    #[test]
    fn add_update_remove_single_product() {
        let mut catalog = Catalog::default();
        catalog.upsert("Food", "Rice", MoneyCents::new(5_000)).unwrap();
        assert_eq!(catalog.list(), vec![item("Food", "Rice", 5_000)]);

        catalog.update_price("Food", "Rice", MoneyCents::new(6_000)).unwrap();
        assert_eq!(catalog.list(), vec![item("Food", "Rice", 6_000)]);

        assert_eq!(catalog.remove("Food", "Rice").unwrap(), MoneyCents::new(6_000));
        assert!(catalog.is_empty());
        assert_eq!(catalog.categories().count(), 0);
    }

    #[test]
    fn upsert_overwrites_instead_of_duplicating() {
        let mut catalog = Catalog::default();
        catalog.upsert("Food", "Rice", MoneyCents::new(5_000)).unwrap();
        catalog.upsert(" Food ", " Rice", MoneyCents::new(5_500)).unwrap();
        assert_eq!(catalog.list(), vec![item("Food", "Rice", 5_500)]);
    }

    #[test]
    fn update_touches_only_the_target() {
        let mut catalog = Catalog::default();
        catalog.upsert("Food", "Rice", MoneyCents::new(5_000)).unwrap();
        catalog.upsert("Food", "Beans", MoneyCents::new(3_000)).unwrap();
        catalog.upsert("Home", "Soap", MoneyCents::new(1_000)).unwrap();

        catalog.update_price("Food", "Rice", MoneyCents::new(6_000)).unwrap();

        assert_eq!(
            catalog.list(),
            vec![
                item("Food", "Rice", 6_000),
                item("Food", "Beans", 3_000),
                item("Home", "Soap", 1_000),
            ]
        );
    }

    #[test]
    fn removing_one_of_many_keeps_the_category() {
        let mut catalog = Catalog::default();
        catalog.upsert("Food", "Rice", MoneyCents::new(5_000)).unwrap();
        catalog.upsert("Food", "Beans", MoneyCents::new(3_000)).unwrap();
        catalog.remove("Food", "Rice").unwrap();
        assert_eq!(catalog.list(), vec![item("Food", "Beans", 3_000)]);
    }

    #[test]
    fn misses_and_bad_prices_are_reported() {
        let mut catalog = Catalog::default();
        assert!(matches!(
            catalog.remove("Food", "Rice"),
            Err(EngineError::NotFound(_))
        ));
        assert!(matches!(
            catalog.update_price("Food", "Rice", MoneyCents::new(100)),
            Err(EngineError::NotFound(_))
        ));
        assert!(matches!(
            catalog.upsert("Food", "Rice", MoneyCents::ZERO),
            Err(EngineError::InvalidPrice(_))
        ));

        catalog.upsert("Food", "Rice", MoneyCents::new(100)).unwrap();
        assert!(matches!(
            catalog.update_price("Food", "Rice", MoneyCents::new(-1)),
            Err(EngineError::InvalidPrice(_))
        ));
        assert_eq!(catalog.price("Food", "Rice").unwrap(), MoneyCents::new(100));
    }

    #[test]
    fn products_in_unknown_category_is_empty() {
        let catalog = Catalog::default();
        assert!(catalog.products_in("Food").is_empty());
    }
}

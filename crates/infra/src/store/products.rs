use std::sync::{Arc, RwLock};

use keygate_core::ProductId;
use keygate_products::Product;

/// Product catalog store abstraction.
pub trait ProductStore: Send + Sync {
    fn insert(&self, product: Product) -> Result<(), ProductStoreError>;

    fn get(&self, id: ProductId) -> Result<Option<Product>, ProductStoreError>;

    /// Replace a stored product. Fails if it does not exist.
    fn update(&self, product: &Product) -> Result<(), ProductStoreError>;

    /// All products in creation order.
    fn list(&self) -> Result<Vec<Product>, ProductStoreError>;

    /// Highest-priced product; the earliest created wins a tie.
    fn most_expensive(&self) -> Result<Option<Product>, ProductStoreError>;

    fn exists_by_name(&self, name: &str) -> Result<bool, ProductStoreError>;
}

impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    fn insert(&self, product: Product) -> Result<(), ProductStoreError> {
        (**self).insert(product)
    }

    fn get(&self, id: ProductId) -> Result<Option<Product>, ProductStoreError> {
        (**self).get(id)
    }

    fn update(&self, product: &Product) -> Result<(), ProductStoreError> {
        (**self).update(product)
    }

    fn list(&self) -> Result<Vec<Product>, ProductStoreError> {
        (**self).list()
    }

    fn most_expensive(&self) -> Result<Option<Product>, ProductStoreError> {
        (**self).most_expensive()
    }

    fn exists_by_name(&self, name: &str) -> Result<bool, ProductStoreError> {
        (**self).exists_by_name(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductStoreError {
    #[error("product {0} not found")]
    NotFound(ProductId),
    #[error("product {0} already exists")]
    AlreadyExists(ProductId),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ProductStoreError {
    fn poisoned() -> Self {
        Self::Storage("product store lock poisoned".to_string())
    }
}

/// In-memory product store for tests/dev. Keeps insertion order.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl ProductStore for InMemoryProductStore {
    fn insert(&self, product: Product) -> Result<(), ProductStoreError> {
        let mut products = self.products.write().map_err(|_| ProductStoreError::poisoned())?;
        if products.iter().any(|p| p.id == product.id) {
            return Err(ProductStoreError::AlreadyExists(product.id));
        }
        products.push(product);
        Ok(())
    }

    fn get(&self, id: ProductId) -> Result<Option<Product>, ProductStoreError> {
        let products = self.products.read().map_err(|_| ProductStoreError::poisoned())?;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    fn update(&self, product: &Product) -> Result<(), ProductStoreError> {
        let mut products = self.products.write().map_err(|_| ProductStoreError::poisoned())?;
        let slot = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or(ProductStoreError::NotFound(product.id))?;
        *slot = product.clone();
        Ok(())
    }

    fn list(&self) -> Result<Vec<Product>, ProductStoreError> {
        let products = self.products.read().map_err(|_| ProductStoreError::poisoned())?;
        Ok(products.clone())
    }

    fn most_expensive(&self) -> Result<Option<Product>, ProductStoreError> {
        let products = self.products.read().map_err(|_| ProductStoreError::poisoned())?;
        Ok(products
            .iter()
            .reduce(|best, p| if p.price > best.price { p } else { best })
            .cloned())
    }

    fn exists_by_name(&self, name: &str) -> Result<bool, ProductStoreError> {
        let products = self.products.read().map_err(|_| ProductStoreError::poisoned())?;
        Ok(products.iter().any(|p| p.name == name))
    }
}

#[cfg(test)]
mod tests {
    use keygate_products::{NewProduct, Price};

    use super::*;

    fn product(name: &str, cents: i64) -> Product {
        NewProduct {
            name: Some(name.to_string()),
            price: Some(Price::from_cents(cents)),
            description: None,
        }
        .into_product()
        .unwrap()
    }

    #[test]
    fn list_keeps_insertion_order() {
        let store = InMemoryProductStore::new();
        store.insert(product("b", 100)).unwrap();
        store.insert(product("a", 200)).unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn most_expensive_prefers_earliest_on_tie() {
        let store = InMemoryProductStore::new();
        assert!(store.most_expensive().unwrap().is_none());

        store.insert(product("cheap", 100)).unwrap();
        store.insert(product("first", 500)).unwrap();
        store.insert(product("second", 500)).unwrap();

        assert_eq!(store.most_expensive().unwrap().unwrap().name, "first");
    }

    #[test]
    fn update_requires_existing_product() {
        let store = InMemoryProductStore::new();
        let mut p = product("widget", 100);
        assert_eq!(store.update(&p), Err(ProductStoreError::NotFound(p.id)));

        store.insert(p.clone()).unwrap();
        p.name = "gadget".to_string();
        store.update(&p).unwrap();
        assert_eq!(store.get(p.id).unwrap().unwrap().name, "gadget");
        assert!(store.exists_by_name("gadget").unwrap());
        assert!(!store.exists_by_name("widget").unwrap());
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = InMemoryProductStore::new();
        let p = product("widget", 100);
        store.insert(p.clone()).unwrap();
        assert_eq!(store.insert(p.clone()), Err(ProductStoreError::AlreadyExists(p.id)));
    }
}

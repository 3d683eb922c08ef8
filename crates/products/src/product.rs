use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use keygate_core::ProductId;

use crate::Price;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProductError {
    #[error("{0}")]
    Validation(String),
}

impl ProductError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated creation input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProduct {
    pub name: Option<String>,
    pub price: Option<Price>,
    pub description: Option<String>,
}

impl NewProduct {
    /// Validate and build a product. Name must be non-empty and price non-zero.
    pub fn into_product(self) -> Result<Product, ProductError> {
        let name = self.name.filter(|n| !n.is_empty());
        let price = self.price.filter(|p| !p.is_zero());
        let (Some(name), Some(price)) = (name, price) else {
            return Err(ProductError::validation("Name and price are required"));
        };

        let now = Utc::now();
        Ok(Product {
            id: ProductId::new(),
            name,
            price,
            description: Some(self.description.unwrap_or_default()),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update. Outer `None` means "field not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Option<Price>>,
    pub description: Option<Option<String>>,
}

impl Product {
    /// Apply a patch. On error the product is left untouched.
    pub fn apply(&mut self, patch: ProductPatch) -> Result<(), ProductError> {
        let name = patch.name.unwrap_or_else(|| self.name.clone());
        let price = patch.price.unwrap_or(Some(self.price));

        let price = match price {
            Some(p) if !name.is_empty() && !p.is_zero() => p,
            _ => return Err(ProductError::validation("Name and price cannot be empty")),
        };

        self.name = name;
        self.price = price;
        if let Some(description) = patch.description {
            self.description = description;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Product {
        NewProduct {
            name: Some("Widget".to_string()),
            price: Some(Price::from_cents(999)),
            description: None,
        }
        .into_product()
        .unwrap()
    }

    #[test]
    fn create_defaults_description_to_empty() {
        let product = widget();
        assert_eq!(product.description.as_deref(), Some(""));
        assert_eq!(product.created_at, product.updated_at);
    }

    #[test]
    fn create_requires_name_and_price() {
        let missing_price = NewProduct {
            name: Some("Widget".to_string()),
            ..Default::default()
        };
        let empty_name = NewProduct {
            name: Some(String::new()),
            price: Some(Price::from_cents(100)),
            ..Default::default()
        };
        let zero_price = NewProduct {
            name: Some("Widget".to_string()),
            price: Some(Price::from_cents(0)),
            ..Default::default()
        };

        for input in [missing_price, empty_name, zero_price] {
            assert_eq!(
                input.into_product().unwrap_err(),
                ProductError::validation("Name and price are required")
            );
        }
    }

    #[test]
    fn patch_updates_only_supplied_fields() {
        let mut product = widget();
        product
            .apply(ProductPatch {
                price: Some(Some(Price::from_cents(1250))),
                description: Some(None),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(product.name, "Widget");
        assert_eq!(product.price.to_string(), "12.50");
        assert_eq!(product.description, None);
    }

    #[test]
    fn patch_rejects_emptying_required_fields() {
        let mut product = widget();
        let before = product.clone();

        let err = product
            .apply(ProductPatch {
                name: Some(String::new()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err, ProductError::validation("Name and price cannot be empty"));

        let err = product
            .apply(ProductPatch {
                price: Some(None),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err, ProductError::validation("Name and price cannot be empty"));
        assert_eq!(product, before);
    }
}

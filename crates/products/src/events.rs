//! Product lifecycle events, one type per queue.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use backoffice_core::ProductId;
use backoffice_events::Event;

use crate::category::Category;
use crate::product::Product;

pub const PRODUCT_CREATED: &str = "products.product.created";
pub const PRODUCT_UPDATED: &str = "products.product.updated";
pub const PRODUCT_DELETED: &str = "products.product.deleted";

/// Event: ProductCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub active: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductUpdated. Carries the full post-update state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdated {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub active: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductDeleted. Only the id survives a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDeleted {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

impl ProductCreated {
    pub fn from_product(product: &Product, occurred_at: DateTime<Utc>) -> Self {
        Self {
            product_id: product.id_typed(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            price: product.price(),
            category: product.category(),
            active: product.active(),
            occurred_at,
        }
    }
}

impl ProductUpdated {
    pub fn from_product(product: &Product, occurred_at: DateTime<Utc>) -> Self {
        Self {
            product_id: product.id_typed(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            price: product.price(),
            category: product.category(),
            active: product.active(),
            occurred_at,
        }
    }
}

impl Event for ProductCreated {
    fn event_type(&self) -> &'static str {
        PRODUCT_CREATED
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

impl Event for ProductUpdated {
    fn event_type(&self) -> &'static str {
        PRODUCT_UPDATED
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

impl Event for ProductDeleted {
    fn event_type(&self) -> &'static str {
        PRODUCT_DELETED
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_payload_uses_canonical_category() {
        let product = Product::new(
            ProductId::new(),
            "Coca",
            "Lata 350ml",
            Decimal::new(650, 2),
            Category::Drink,
            true,
        );
        let event = ProductCreated::from_product(&product, Utc::now());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["category"], "Bebida");
        assert_eq!(json["price"], "6.50");
        assert_eq!(json["product_id"], product.id_typed().to_string());
    }

    #[test]
    fn deleted_payload_is_id_only() {
        let event = ProductDeleted {
            product_id: ProductId::new(),
            occurred_at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["occurred_at", "product_id"]);
    }
}

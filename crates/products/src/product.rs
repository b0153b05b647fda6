use rust_decimal::Decimal;

use backoffice_core::{Entity, ProductId, Validate, ValidationErrors, Validator};

use crate::category::Category;

pub const NAME_LEN: (usize, usize) = (2, 40);
pub const DESCRIPTION_LEN: (usize, usize) = (5, 200);
/// Inclusive price bounds, in whole currency units.
pub const PRICE_RANGE: (i64, i64) = (1, 9999);
/// Decimal places a price may carry; the store keeps cents.
pub const PRICE_SCALE: u32 = 2;

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    category: Category,
    active: bool,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        category: Category,
        active: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            price,
            category,
            active,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn active(&self) -> bool {
        self.active
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Validate for Product {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .id("id", self.id.as_uuid())
            .length("name", &self.name, NAME_LEN.0, NAME_LEN.1)
            .length("description", &self.description, DESCRIPTION_LEN.0, DESCRIPTION_LEN.1)
            .range(
                "price",
                self.price,
                Decimal::from(PRICE_RANGE.0),
                Decimal::from(PRICE_RANGE.1),
            )
            .check(
                "price",
                self.price.normalize().scale() <= PRICE_SCALE,
                format!("price must have at most {PRICE_SCALE} decimal places"),
            )
            .finish()
    }
}

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use backoffice_core::DomainError;

/// Product category. The wire form is the canonical, case-sensitive name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Lanche")]
    Sandwich,
    #[serde(rename = "Acompanhamento")]
    Side,
    #[serde(rename = "Bebida")]
    Drink,
    #[serde(rename = "Sobremesa")]
    Dessert,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Sandwich,
        Category::Side,
        Category::Drink,
        Category::Dessert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sandwich => "Lanche",
            Category::Side => "Acompanhamento",
            Category::Drink => "Bebida",
            Category::Dessert => "Sobremesa",
        }
    }

    /// Parse the canonical name. Anything else is rejected; there is no
    /// fallback member.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| DomainError::unrecognized("category", value))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

//! Query predicates per aggregate and their `Record` bindings.

use backoffice_core::{CustomerId, EmployeeId, ProductId};
use backoffice_parties::{Customer, Employee};
use backoffice_products::{Category, Product};

use super::Record;

/// Customer predicates. String comparisons are case-exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerFilter {
    /// Matches on id, or on tax id / e-mail when given.
    AnyOf {
        id: CustomerId,
        tax_id: Option<String>,
        email: Option<String>,
    },
    Email(String),
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeFilter {
    /// Matches on id, or on e-mail when given.
    AnyOf { id: EmployeeId, email: Option<String> },
    Email(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductFilter {
    /// Matches on id, name or description.
    AnyOf {
        id: ProductId,
        name: String,
        description: String,
    },
    ActiveInCategory(Category),
    Active,
}

fn eq_opt(value: &str, wanted: &Option<String>) -> bool {
    wanted.as_deref().is_some_and(|w| w == value)
}

impl Record for Customer {
    type Filter = CustomerFilter;
    const KIND: &'static str = "customer";

    fn matches(&self, filter: &CustomerFilter) -> bool {
        match filter {
            CustomerFilter::AnyOf { id, tax_id, email } => {
                self.id_typed() == *id || eq_opt(self.tax_id(), tax_id) || eq_opt(self.email(), email)
            }
            CustomerFilter::Email(email) => self.email() == email,
            CustomerFilter::Active => self.active(),
        }
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![
            ("email", self.email().to_string()),
            ("tax_id", self.tax_id().to_string()),
        ]
    }
}

impl Record for Employee {
    type Filter = EmployeeFilter;
    const KIND: &'static str = "employee";

    fn matches(&self, filter: &EmployeeFilter) -> bool {
        match filter {
            EmployeeFilter::AnyOf { id, email } => self.id_typed() == *id || eq_opt(self.email(), email),
            EmployeeFilter::Email(email) => self.email() == email,
        }
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("email", self.email().to_string())]
    }
}

impl Record for Product {
    type Filter = ProductFilter;
    const KIND: &'static str = "product";

    fn matches(&self, filter: &ProductFilter) -> bool {
        match filter {
            ProductFilter::AnyOf {
                id,
                name,
                description,
            } => self.id_typed() == *id || self.name() == name || self.description() == description,
            ProductFilter::ActiveInCategory(category) => self.active() && self.category() == *category,
            ProductFilter::Active => self.active(),
        }
    }
}

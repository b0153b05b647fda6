use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use backoffice_core::{CustomerId, EmployeeId, ProductId};
use backoffice_identity::{
    CustomerSignIn, EmailVerification, EmployeeSignIn, PasswordRecovery, PasswordReset,
};
use backoffice_parties::{Customer, CustomerChanges, Employee};
use backoffice_products::{Category, Product};

fn active_by_default() -> bool {
    true
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterCustomerRequest {
    /// Client-chosen id; a fresh one is generated when absent.
    #[serde(default)]
    pub id: Option<CustomerId>,
    pub name: String,
    pub email: String,
    pub tax_id: String,
    pub password: String,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

impl RegisterCustomerRequest {
    pub fn into_domain(self) -> (Customer, String) {
        let customer = Customer::new(
            self.id.unwrap_or_default(),
            self.name,
            self.email,
            self.tax_id,
            self.active,
        );
        (customer, self.password)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    pub id: CustomerId,
    pub name: String,
    pub active: bool,
}

impl From<UpdateCustomerRequest> for CustomerChanges {
    fn from(body: UpdateCustomerRequest) -> Self {
        CustomerChanges {
            id: body.id,
            name: body.name,
            active: body.active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterEmployeeRequest {
    #[serde(default)]
    pub id: Option<EmployeeId>,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

impl RegisterEmployeeRequest {
    pub fn into_domain(self) -> (Employee, String) {
        let employee = Employee::new(self.id.unwrap_or_default(), self.name, self.email, self.active);
        (employee, self.password)
    }
}

/// Body of product create and update. `category` is kept as text so an
/// unknown name can be reported like any other invalid field; `active` is
/// required so an update never flips it implicitly.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    #[serde(default)]
    pub id: Option<ProductId>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub active: bool,
}

impl ProductRequest {
    /// Builds the product under `id`; fails with the rejected category name.
    pub fn into_domain(self, id: ProductId) -> Result<Product, String> {
        let category = Category::parse(&self.category).map_err(|_| self.category.clone())?;
        Ok(Product::new(
            id,
            self.name,
            self.description,
            self.price,
            category,
            self.active,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: String,
}

#[derive(Deserialize)]
pub struct CustomerSignInRequest {
    pub tax_id: String,
    pub password: String,
}

impl From<CustomerSignInRequest> for CustomerSignIn {
    fn from(body: CustomerSignInRequest) -> Self {
        CustomerSignIn {
            tax_id: body.tax_id,
            password: body.password,
        }
    }
}

#[derive(Deserialize)]
pub struct EmployeeSignInRequest {
    pub email: String,
    pub password: String,
}

impl From<EmployeeSignInRequest> for EmployeeSignIn {
    fn from(body: EmployeeSignInRequest) -> Self {
        EmployeeSignIn {
            email: body.email,
            password: body.password,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EmailVerificationRequest {
    pub email: String,
    pub code: String,
}

impl From<EmailVerificationRequest> for EmailVerification {
    fn from(body: EmailVerificationRequest) -> Self {
        EmailVerification {
            email: body.email,
            code: body.code,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PasswordRecoveryRequest {
    pub email: String,
}

impl From<PasswordRecoveryRequest> for PasswordRecovery {
    fn from(body: PasswordRecoveryRequest) -> Self {
        PasswordRecovery { email: body.email }
    }
}

#[derive(Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

impl From<PasswordResetRequest> for PasswordReset {
    fn from(body: PasswordResetRequest) -> Self {
        PasswordReset {
            email: body.email,
            code: body.code,
            new_password: body.new_password,
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub tax_id: String,
    pub active: bool,
}

impl From<&Customer> for CustomerResponse {
    fn from(c: &Customer) -> Self {
        Self {
            id: c.id_typed(),
            name: c.name().to_string(),
            email: c.email().to_string(),
            tax_id: c.tax_id().to_string(),
            active: c.active(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub active: bool,
}

impl From<&Product> for ProductResponse {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id_typed(),
            name: p.name().to_string(),
            description: p.description().to_string(),
            price: p.price(),
            category: p.category(),
            active: p.active(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse<Id> {
    pub id: Id,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_customer_defaults_id_and_active() {
        let body: RegisterCustomerRequest = serde_json::from_value(json!({
            "name": "João Silva",
            "email": "joao@example.com",
            "tax_id": "52998224725",
            "password": "secret-123",
        }))
        .unwrap();
        let (customer, password) = body.into_domain();
        assert!(customer.active());
        assert!(!customer.id_typed().is_nil());
        assert_eq!(password, "secret-123");
    }

    #[test]
    fn product_request_rejects_unknown_category_by_name() {
        let body: ProductRequest = serde_json::from_value(json!({
            "name": "X-Burger",
            "description": "Pão, carne e queijo",
            "price": "25.90",
            "category": "lanche",
            "active": true,
        }))
        .unwrap();
        assert_eq!(body.into_domain(ProductId::new()).unwrap_err(), "lanche");
    }

    #[test]
    fn updates_must_state_the_active_flag() {
        let customer = serde_json::from_value::<UpdateCustomerRequest>(json!({
            "id": CustomerId::new(),
            "name": "Ana",
        }));
        assert!(customer.is_err());

        let product = serde_json::from_value::<ProductRequest>(json!({
            "name": "X-Burger",
            "description": "Pão, carne e queijo",
            "price": "25.90",
            "category": "Lanche",
        }));
        assert!(product.is_err());

        let changes: CustomerChanges = serde_json::from_value::<UpdateCustomerRequest>(json!({
            "id": CustomerId::new(),
            "name": "Ana",
            "active": false,
        }))
        .unwrap()
        .into();
        assert!(!changes.active);
    }

    #[test]
    fn product_response_uses_canonical_category_name() {
        let product = Product::new(
            ProductId::new(),
            "Refrigerante",
            "Lata 350ml",
            Decimal::new(600, 2),
            Category::Drink,
            true,
        );
        let value = serde_json::to_value(ProductResponse::from(&product)).unwrap();
        assert_eq!(value["category"], "Bebida");
        assert_eq!(value["price"], "6.00");
    }
}

use backoffice_core::{CustomerId, Entity, Validate, ValidationErrors, Validator};

pub const NAME_LEN: (usize, usize) = (2, 50);
pub const EMAIL_LEN: (usize, usize) = (2, 100);
pub const TAX_ID_LEN: usize = backoffice_core::tax_id::CPF_LEN;

/// Aggregate root: Customer.
///
/// `email` and `tax_id` are fixed at registration; later changes go through
/// [`CustomerChanges`], which can only touch `name` and `active`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: CustomerId,
    name: String,
    email: String,
    tax_id: String,
    active: bool,
}

/// Mutable subset of a customer, as submitted by an update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerChanges {
    pub id: CustomerId,
    pub name: String,
    pub active: bool,
}

impl Customer {
    pub fn new(
        id: CustomerId,
        name: impl Into<String>,
        email: impl Into<String>,
        tax_id: impl Into<String>,
        active: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            tax_id: tax_id.into(),
            active,
        }
    }

    /// Apply `changes` on top of this stored record, keeping its id, e-mail
    /// and tax id no matter what the request carried.
    pub fn with_changes(&self, changes: &CustomerChanges) -> Self {
        Self {
            id: self.id,
            name: changes.name.clone(),
            email: self.email.clone(),
            tax_id: self.tax_id.clone(),
            active: changes.active,
        }
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn tax_id(&self) -> &str {
        &self.tax_id
    }

    pub fn active(&self) -> bool {
        self.active
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Validate for Customer {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .id("id", self.id.as_uuid())
            .length("name", &self.name, NAME_LEN.0, NAME_LEN.1)
            .email("email", &self.email)
            .length("email", &self.email, EMAIL_LEN.0, EMAIL_LEN.1)
            .exact_length("tax_id", &self.tax_id, TAX_ID_LEN)
            .tax_id("tax_id", &self.tax_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_core::FieldViolation;
    use proptest::prelude::*;

    fn valid() -> Customer {
        Customer::new(CustomerId::new(), "João Silva", "joao@x.com", "52998224725", true)
    }

    fn fields(err: &ValidationErrors) -> Vec<&str> {
        err.violations()
            .iter()
            .map(|FieldViolation { field, .. }| field.as_str())
            .collect()
    }

    #[test]
    fn valid_customer_passes() {
        valid().validate().unwrap();
    }

    #[test]
    fn repeated_digit_tax_id_is_rejected() {
        let c = Customer::new(CustomerId::new(), "João", "joao@x.com", "11111111111", true);
        let err = c.validate().unwrap_err();
        assert_eq!(fields(&err), vec!["tax_id"]);
    }

    #[test]
    fn short_tax_id_reports_length_and_checksum() {
        let c = Customer::new(CustomerId::new(), "João", "joao@x.com", "123", true);
        let err = c.validate().unwrap_err();
        assert_eq!(fields(&err), vec!["tax_id", "tax_id"]);
    }

    #[test]
    fn nil_id_and_bad_email_are_reported() {
        let c = Customer::new(
            CustomerId::from_uuid(Default::default()),
            "João",
            "joao-at-x.com",
            "52998224725",
            true,
        );
        let err = c.validate().unwrap_err();
        assert_eq!(fields(&err), vec!["id", "email"]);
    }

    #[test]
    fn changes_keep_email_and_tax_id() {
        let stored = valid();
        let changes = CustomerChanges {
            id: CustomerId::new(),
            name: "João Souza".to_string(),
            active: false,
        };

        let updated = stored.with_changes(&changes);
        assert_eq!(updated.id_typed(), stored.id_typed());
        assert_eq!(updated.email(), "joao@x.com");
        assert_eq!(updated.tax_id(), "52998224725");
        assert_eq!(updated.name(), "João Souza");
        assert!(!updated.active());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

        #[test]
        fn name_length_boundary(name in "[A-Za-z]{0,60}") {
            let c = Customer::new(CustomerId::new(), name.clone(), "joao@x.com", "52998224725", true);
            let ok = c.validate().is_ok();
            prop_assert_eq!(ok, (NAME_LEN.0..=NAME_LEN.1).contains(&name.len()));
        }
    }
}

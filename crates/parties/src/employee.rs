use backoffice_core::{EmployeeId, Entity, Validate, ValidationErrors, Validator};

pub const NAME_LEN: (usize, usize) = (2, 50);
pub const EMAIL_LEN: (usize, usize) = (2, 100);

/// Aggregate root: Employee (back-office operator, admin group).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    id: EmployeeId,
    name: String,
    email: String,
    active: bool,
}

impl Employee {
    pub fn new(id: EmployeeId, name: impl Into<String>, email: impl Into<String>, active: bool) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            active,
        }
    }

    pub fn id_typed(&self) -> EmployeeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn active(&self) -> bool {
        self.active
    }
}

impl Entity for Employee {
    type Id = EmployeeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Validate for Employee {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .id("id", self.id.as_uuid())
            .length("name", &self.name, NAME_LEN.0, NAME_LEN.1)
            .email("email", &self.email)
            .length("email", &self.email, EMAIL_LEN.0, EMAIL_LEN.1)
            .finish()
    }
}

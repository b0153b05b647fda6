use serde::{Deserialize, Serialize};

/// Directory group a registered person belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserGroup {
    Customer,
    /// Employees; the group that may operate the back office.
    Admin,
}

/// Names of the groups as they exist in the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNames {
    pub customer: String,
    pub admin: String,
}

impl GroupNames {
    pub fn name_of(&self, group: UserGroup) -> &str {
        match group {
            UserGroup::Customer => &self.customer,
            UserGroup::Admin => &self.admin,
        }
    }
}

impl Default for GroupNames {
    fn default() -> Self {
        Self {
            customer: "customer".to_string(),
            admin: "admin".to_string(),
        }
    }
}

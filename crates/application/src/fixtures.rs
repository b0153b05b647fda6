//! In-memory wiring shared by the unit tests.

use std::sync::Arc;

use rust_decimal::Decimal;

use backoffice_core::{CustomerId, EmployeeId, ProductId};
use backoffice_events::InMemoryEventPublisher;
use backoffice_identity::{GroupNames, IdentityDirectory};
use backoffice_infra::ProductQueues;
use backoffice_infra::identity::InMemoryIdentityProvider;
use backoffice_infra::repository::{InMemoryRepository, Repository, UnitOfWork};
use backoffice_parties::{Customer, Employee};
use backoffice_products::{Category, Product};

use crate::exclusivity::EmailExclusivity;
use crate::gateways::{CustomerGateway, EmployeeGateway, ProductGateway};
use crate::use_cases::{CustomerUseCase, EmployeeUseCase, IdentityUseCase, ProductUseCase};

pub const CPF_A: &str = "52998224725";
pub const CPF_B: &str = "11144477735";
pub const JWT_SECRET: &str = "test-secret";

pub fn customer(email: &str, tax_id: &str) -> Customer {
    Customer::new(CustomerId::new(), "João Silva", email, tax_id, true)
}

pub fn employee(email: &str) -> Employee {
    Employee::new(EmployeeId::new(), "Maria Souza", email, true)
}

pub fn product(name: &str, description: &str, category: Category) -> Product {
    Product::new(ProductId::new(), name, description, Decimal::new(2590, 2), category, true)
}

pub struct Stack {
    pub customers: Arc<InMemoryRepository<Customer>>,
    pub employees: Arc<InMemoryRepository<Employee>>,
    pub products: Arc<InMemoryRepository<Product>>,
    pub idp: Arc<InMemoryIdentityProvider>,
    pub publisher: Arc<InMemoryEventPublisher>,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            customers: Arc::new(InMemoryRepository::new()),
            employees: Arc::new(InMemoryRepository::new()),
            products: Arc::new(InMemoryRepository::new()),
            idp: Arc::new(InMemoryIdentityProvider::new(JWT_SECRET)),
            publisher: Arc::new(InMemoryEventPublisher::new(ProductQueues::default().routes())),
        }
    }

    pub fn directory(&self) -> IdentityDirectory {
        IdentityDirectory::new(self.idp.clone(), GroupNames::default())
    }

    pub fn exclusivity(&self) -> EmailExclusivity {
        EmailExclusivity::new(self.customers.clone(), self.employees.clone())
    }

    pub fn customer_gateway(&self) -> CustomerGateway {
        CustomerGateway::new(self.customers.clone(), self.employees.clone(), self.directory())
    }

    pub fn employee_gateway(&self) -> EmployeeGateway {
        EmployeeGateway::new(self.employees.clone(), self.customers.clone(), self.directory())
    }

    pub fn product_gateway(&self) -> ProductGateway {
        ProductGateway::new(self.products.clone(), self.publisher.clone())
    }

    pub fn customer_use_case(&self) -> CustomerUseCase {
        CustomerUseCase::new(self.customer_gateway(), self.directory())
    }

    pub fn employee_use_case(&self) -> EmployeeUseCase {
        EmployeeUseCase::new(self.employee_gateway())
    }

    pub fn product_use_case(&self) -> ProductUseCase {
        ProductUseCase::new(self.product_gateway())
    }

    pub fn identity_use_case(&self) -> IdentityUseCase {
        IdentityUseCase::new(self.directory())
    }

    pub async fn seed_customer(&self, customer: Customer) {
        seed(&*self.customers, UnitOfWork::new().insert(customer)).await;
    }

    pub async fn seed_employee(&self, employee: Employee) {
        seed(&*self.employees, UnitOfWork::new().insert(employee)).await;
    }

    pub async fn seed_product(&self, product: Product) {
        seed(&*self.products, UnitOfWork::new().insert(product)).await;
    }
}

async fn seed<R: backoffice_infra::repository::Record>(repo: &dyn Repository<R>, work: UnitOfWork<R>) {
    work.commit(repo).await.expect("seed commit");
}

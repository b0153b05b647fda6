//! Service wiring: repositories, identity provider and queue publisher are
//! chosen once at startup and shared by every request.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use backoffice_application::{
    CustomerGateway, CustomerUseCase, EmployeeGateway, EmployeeUseCase, IdentityUseCase,
    ProductGateway, ProductUseCase, RequestContext,
};
use backoffice_events::{EventPublisher, InMemoryEventPublisher, PublishError};
use backoffice_identity::{IdentityDirectory, IdentityError, IdentityProviderClient};
use backoffice_infra::identity::{InMemoryIdentityProvider, KeycloakIdentityProvider};
use backoffice_infra::queue::RedisStreamsPublisher;
use backoffice_infra::repository::{
    InMemoryRepository, PostgresRepository, Repository, RepositoryError, connect_and_migrate,
};
use backoffice_infra::{PersistentStores, Settings};
use backoffice_parties::{Customer, Employee};
use backoffice_products::Product;

#[derive(Debug, Error)]
pub enum ServicesError {
    #[error("database: {0}")]
    Database(#[from] RepositoryError),

    #[error("identity provider: {0}")]
    Identity(#[from] IdentityError),

    #[error("event queue: {0}")]
    Queue(#[from] PublishError),
}

pub struct AppServices {
    pub customers: CustomerUseCase,
    pub employees: EmployeeUseCase,
    pub products: ProductUseCase,
    pub identity: IdentityUseCase,
    /// Cancelled when the server shuts down; every request context hangs off it.
    shutdown: CancellationToken,
}

struct Adapters {
    customers: Arc<dyn Repository<Customer>>,
    employees: Arc<dyn Repository<Employee>>,
    products: Arc<dyn Repository<Product>>,
    idp: Arc<dyn IdentityProviderClient>,
    publisher: Arc<dyn EventPublisher>,
}

impl AppServices {
    pub async fn build(
        settings: &Settings,
        shutdown: CancellationToken,
    ) -> Result<Self, ServicesError> {
        let adapters = match &settings.persistent {
            Some(stores) => persistent_adapters(stores, settings).await?,
            None => {
                info!("persistent stores disabled; using in-memory adapters");
                in_memory_adapters(settings)
            }
        };
        Ok(Self::from_adapters(adapters, settings, shutdown))
    }

    fn from_adapters(adapters: Adapters, settings: &Settings, shutdown: CancellationToken) -> Self {
        let directory = IdentityDirectory::new(adapters.idp, settings.groups.clone());

        let customer_gateway = CustomerGateway::new(
            adapters.customers.clone(),
            adapters.employees.clone(),
            directory.clone(),
        );
        let employee_gateway =
            EmployeeGateway::new(adapters.employees, adapters.customers, directory.clone());
        let product_gateway = ProductGateway::new(adapters.products, adapters.publisher);

        Self {
            customers: CustomerUseCase::new(customer_gateway, directory.clone()),
            employees: EmployeeUseCase::new(employee_gateway),
            products: ProductUseCase::new(product_gateway),
            identity: IdentityUseCase::new(directory),
            shutdown,
        }
    }

    /// Fresh per-request context, cancelled together with the server.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_cancellation(self.shutdown.child_token())
    }
}

fn in_memory_adapters(settings: &Settings) -> Adapters {
    Adapters {
        customers: Arc::new(InMemoryRepository::<Customer>::new()),
        employees: Arc::new(InMemoryRepository::<Employee>::new()),
        products: Arc::new(InMemoryRepository::<Product>::new()),
        idp: Arc::new(InMemoryIdentityProvider::new(settings.jwt_secret.as_bytes())),
        publisher: Arc::new(InMemoryEventPublisher::new(settings.queues.routes())),
    }
}

async fn persistent_adapters(
    stores: &PersistentStores,
    settings: &Settings,
) -> Result<Adapters, ServicesError> {
    let pool = connect_and_migrate(&stores.database_url).await?;
    info!("database connected and migrated");

    let idp = KeycloakIdentityProvider::new(stores.keycloak.clone())?;
    let publisher = RedisStreamsPublisher::new(&stores.redis_url, settings.queues.routes())?;

    Ok(Adapters {
        customers: Arc::new(PostgresRepository::<Customer>::new(pool.clone())),
        employees: Arc::new(PostgresRepository::<Employee>::new(pool.clone())),
        products: Arc::new(PostgresRepository::<Product>::new(pool)),
        idp: Arc::new(idp),
        publisher: Arc::new(publisher),
    })
}

use std::sync::Arc;

use chrono::Utc;
use tracing::{instrument, warn};
use uuid::Uuid;

use backoffice_core::ProductId;
use backoffice_events::{Event, EventEnvelope, EventPublisher};
use backoffice_infra::repository::{
    ProductFilter, Record, Repository, RepositoryError, UnitOfWork,
};
use backoffice_products::{Category, Product, ProductCreated, ProductDeleted, ProductUpdated};

use crate::context::RequestContext;
use crate::pipeline::{self, Outcome, cancellable};

/// Product storage plus lifecycle event publication.
///
/// Each mutation commits first and publishes the matching event only after
/// the commit went through. Completion requires both.
#[derive(Clone)]
pub struct ProductGateway {
    products: Arc<dyn Repository<Product>>,
    publisher: Arc<dyn EventPublisher>,
}

impl ProductGateway {
    pub fn new(products: Arc<dyn Repository<Product>>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { products, publisher }
    }

    #[instrument(skip_all, fields(product_id = %product.id_typed()))]
    pub async fn register(&self, ctx: &RequestContext, product: &Product) -> Outcome {
        let commit = UnitOfWork::new().insert(product.clone()).commit(&*self.products);
        pipeline::commit_then_remote(ctx, Product::KIND, product.id_typed(), commit, || {
            self.publish(product.id_typed(), ProductCreated::from_product(product, Utc::now()))
        })
        .await
    }

    #[instrument(skip_all, fields(product_id = %product.id_typed()))]
    pub async fn update(&self, ctx: &RequestContext, product: &Product) -> Outcome {
        let commit = UnitOfWork::new().update(product.clone()).commit(&*self.products);
        pipeline::commit_then_remote(ctx, Product::KIND, product.id_typed(), commit, || {
            self.publish(product.id_typed(), ProductUpdated::from_product(product, Utc::now()))
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &RequestContext, id: ProductId) -> Outcome {
        let commit = UnitOfWork::<Product>::new().delete(id).commit(&*self.products);
        pipeline::commit_then_remote(ctx, Product::KIND, id, commit, || {
            self.publish(
                id,
                ProductDeleted {
                    product_id: id,
                    occurred_at: Utc::now(),
                },
            )
        })
        .await
    }

    /// Looks up products colliding on id, name or description, then keeps
    /// only an exact id match. A name/description collision under another
    /// id therefore answers `false`.
    pub async fn exists(
        &self,
        ctx: &RequestContext,
        id: ProductId,
        name: &str,
        description: &str,
    ) -> Result<bool, RepositoryError> {
        let filter = ProductFilter::AnyOf {
            id,
            name: name.to_string(),
            description: description.to_string(),
        };
        let matches = cancellable(ctx, self.products.find(&filter)).await?;
        Ok(matches.iter().any(|p| p.id_typed() == id))
    }

    pub async fn exists_by_id(&self, ctx: &RequestContext, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(self.get(ctx, id).await?.is_some())
    }

    pub async fn get(&self, ctx: &RequestContext, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        cancellable(ctx, self.products.find_by_id(&id)).await
    }

    /// Active products in `category`; empty when there are none.
    pub async fn get_by_category(
        &self,
        ctx: &RequestContext,
        category: Category,
    ) -> Result<Vec<Product>, RepositoryError> {
        cancellable(ctx, self.products.find(&ProductFilter::ActiveInCategory(category))).await
    }

    /// Active products; empty when there are none.
    pub async fn list_all(&self, ctx: &RequestContext) -> Result<Vec<Product>, RepositoryError> {
        cancellable(ctx, self.products.find(&ProductFilter::Active)).await
    }

    async fn publish<E: Event>(&self, id: ProductId, event: E) -> bool {
        let envelope = match EventEnvelope::new(Uuid::from(id), event).encode() {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(product_id = %id, error = %err, "event encoding failed");
                return false;
            }
        };
        match self.publisher.publish(envelope).await {
            Ok(()) => true,
            Err(err) => {
                warn!(product_id = %id, error = %err, "event publication failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, Stack};
    use backoffice_products::events::{PRODUCT_CREATED, PRODUCT_DELETED, PRODUCT_UPDATED};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn mutations_publish_after_commit() {
        let stack = Stack::new();
        let gateway = stack.product_gateway();
        let ctx = RequestContext::new();
        let product = fixtures::product("X-Burger", "Pão, carne e queijo", Category::Sandwich);

        assert_eq!(gateway.register(&ctx, &product).await, Outcome::Completed);
        assert_eq!(gateway.update(&ctx, &product).await, Outcome::Completed);
        assert_eq!(gateway.delete(&ctx, product.id_typed()).await, Outcome::Completed);

        let types: Vec<_> = stack
            .publisher
            .messages()
            .into_iter()
            .map(|m| m.envelope.event_type().to_string())
            .collect();
        assert_eq!(types, [PRODUCT_CREATED, PRODUCT_UPDATED, PRODUCT_DELETED]);
        assert_eq!(stack.publisher.messages_on("produto-excluido").len(), 1);
    }

    #[tokio::test]
    async fn failed_commit_publishes_nothing() {
        let stack = Stack::new();
        stack.products.fail_commits(true);
        let ctx = RequestContext::new();

        let product = fixtures::product("X-Burger", "Pão, carne e queijo", Category::Sandwich);
        let outcome = stack.product_gateway().register(&ctx, &product).await;
        assert!(matches!(outcome, Outcome::NotApplied(_)));
        assert!(stack.publisher.messages().is_empty());
    }

    #[tokio::test]
    async fn unreachable_queue_keeps_committed_product() {
        let stack = Stack::new();
        stack.publisher.set_unreachable(true);
        let gateway = stack.product_gateway();
        let ctx = RequestContext::new();
        let product = fixtures::product("X-Burger", "Pão, carne e queijo", Category::Sandwich);

        let outcome = gateway.register(&ctx, &product).await;
        assert!(matches!(outcome, Outcome::PartiallyApplied(_)));
        assert_eq!(gateway.get(&ctx, product.id_typed()).await.unwrap(), Some(product));
    }

    #[tokio::test]
    async fn exists_requires_exact_id_match() {
        let stack = Stack::new();
        let stored = fixtures::product("X-Burger", "Pão, carne e queijo", Category::Sandwich);
        stack.seed_product(stored.clone()).await;
        let gateway = stack.product_gateway();
        let ctx = RequestContext::new();

        assert!(gateway.exists(&ctx, stored.id_typed(), "other", "other text").await.unwrap());
        assert!(!gateway.exists(&ctx, ProductId::new(), "X-Burger", "Pão, carne e queijo").await.unwrap());
        assert!(gateway.exists_by_id(&ctx, stored.id_typed()).await.unwrap());
        assert!(!gateway.exists_by_id(&ctx, ProductId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn category_reads_round_trip_and_skip_inactive() {
        let stack = Stack::new();
        let drink = Product::new(
            ProductId::new(),
            "Suco",
            "Suco de laranja natural",
            Decimal::new(650, 2),
            Category::Drink,
            true,
        );
        let retired = Product::new(
            ProductId::new(),
            "Refri",
            "Refrigerante lata",
            Decimal::new(500, 2),
            Category::Drink,
            false,
        );
        stack.seed_product(drink.clone()).await;
        stack.seed_product(retired).await;
        let gateway = stack.product_gateway();
        let ctx = RequestContext::new();

        let drinks = gateway.get_by_category(&ctx, Category::Drink).await.unwrap();
        assert_eq!(drinks, vec![drink.clone()]);
        assert_eq!(drinks[0].category().as_str(), "Bebida");
        assert_eq!(gateway.get_by_category(&ctx, Category::Drink).await.unwrap(), drinks);
        assert!(gateway.get_by_category(&ctx, Category::Dessert).await.unwrap().is_empty());
        assert_eq!(gateway.list_all(&ctx).await.unwrap(), vec![drink]);
    }
}

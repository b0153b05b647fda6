use tracing::{debug, info};

use backoffice_core::{ProductId, Validate};
use backoffice_products::{Category, Product};

use crate::context::RequestContext;
use crate::error::UseCaseError;
use crate::gateways::ProductGateway;
use crate::use_cases::read_failed;

pub const KEY: &str = "product";
pub const ALREADY_EXISTS: &str = "Product already exists";
pub const DOES_NOT_EXIST: &str = "Product does not exist";

#[derive(Clone)]
pub struct ProductUseCase {
    gateway: ProductGateway,
}

impl ProductUseCase {
    pub fn new(gateway: ProductGateway) -> Self {
        Self { gateway }
    }

    pub async fn register(&self, ctx: &RequestContext, product: Option<Product>) -> Result<bool, UseCaseError> {
        let product = product.ok_or(UseCaseError::InvalidArgument("product"))?;

        let exists = self
            .gateway
            .exists(ctx, product.id_typed(), product.name(), product.description())
            .await;
        match exists {
            Ok(false) => {}
            Ok(true) => {
                ctx.notify(KEY, ALREADY_EXISTS);
                return Ok(false);
            }
            Err(err) => return Ok(read_failed(ctx, KEY, err, false)),
        }

        if let Err(errors) = product.validate() {
            ctx.notify_violations(&errors);
            return Ok(false);
        }

        if self.gateway.register(ctx, &product).await.is_completed() {
            info!(product_id = %product.id_typed(), "product registered");
            return Ok(true);
        }
        ctx.notify(KEY, format!("error registering product {}", product.id_typed()));
        Ok(false)
    }

    pub async fn update(&self, ctx: &RequestContext, product: Option<Product>) -> Result<bool, UseCaseError> {
        let product = product.ok_or(UseCaseError::InvalidArgument("product"))?;

        if !self.require_existing(ctx, product.id_typed()).await {
            return Ok(false);
        }

        if let Err(errors) = product.validate() {
            ctx.notify_violations(&errors);
            return Ok(false);
        }

        if self.gateway.update(ctx, &product).await.is_completed() {
            return Ok(true);
        }
        ctx.notify(KEY, format!("error updating product {}", product.id_typed()));
        Ok(false)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: ProductId) -> Result<bool, UseCaseError> {
        if !self.require_existing(ctx, id).await {
            return Ok(false);
        }

        if self.gateway.delete(ctx, id).await.is_completed() {
            return Ok(true);
        }
        ctx.notify(KEY, format!("error deleting product {id}"));
        Ok(false)
    }

    pub async fn get(&self, ctx: &RequestContext, id: ProductId) -> Option<Product> {
        match self.gateway.get(ctx, id).await {
            Ok(found) => found,
            Err(err) => read_failed(ctx, KEY, err, None),
        }
    }

    pub async fn list_all(&self, ctx: &RequestContext) -> Vec<Product> {
        match self.gateway.list_all(ctx).await {
            Ok(products) => products,
            Err(err) => read_failed(ctx, KEY, err, Vec::new()),
        }
    }

    /// Active products in the category named `raw` (case-sensitive wire
    /// name). An unrecognized name yields an empty list.
    pub async fn get_by_category(&self, ctx: &RequestContext, raw: &str) -> Vec<Product> {
        let category = match Category::parse(raw) {
            Ok(category) => category,
            Err(err) => {
                debug!(category = raw, error = %err, "unrecognized category");
                return Vec::new();
            }
        };
        match self.gateway.get_by_category(ctx, category).await {
            Ok(products) => products,
            Err(err) => read_failed(ctx, KEY, err, Vec::new()),
        }
    }

    async fn require_existing(&self, ctx: &RequestContext, id: ProductId) -> bool {
        match self.gateway.exists_by_id(ctx, id).await {
            Ok(true) => true,
            Ok(false) => {
                ctx.notify(KEY, DOES_NOT_EXIST);
                false
            }
            Err(err) => read_failed(ctx, KEY, err, false),
        }
    }
}

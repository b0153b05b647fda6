//! Service configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured when present. Required
//! variables are only required when persistent stores are switched on; the
//! in-memory wiring runs with nothing set.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;
use tracing::warn;

use backoffice_events::QueueRoutes;
use backoffice_identity::GroupNames;
use backoffice_products::events::{PRODUCT_CREATED, PRODUCT_DELETED, PRODUCT_UPDATED};

use crate::identity::KeycloakConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
/// Development-only HS256 secret.
pub const INSECURE_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Queue (stream) names for product events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQueues {
    pub created: String,
    pub updated: String,
    pub deleted: String,
}

impl Default for ProductQueues {
    fn default() -> Self {
        Self {
            created: "produto-criado".to_string(),
            updated: "produto-atualizado".to_string(),
            deleted: "produto-excluido".to_string(),
        }
    }
}

impl ProductQueues {
    pub fn routes(&self) -> QueueRoutes {
        QueueRoutes::new()
            .route(PRODUCT_CREATED, self.created.clone())
            .route(PRODUCT_UPDATED, self.updated.clone())
            .route(PRODUCT_DELETED, self.deleted.clone())
    }
}

/// Backing services used when persistent stores are enabled.
#[derive(Debug, Clone)]
pub struct PersistentStores {
    pub database_url: String,
    pub redis_url: String,
    pub keycloak: KeycloakConfig,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// `None` selects the in-memory adapters.
    pub persistent: Option<PersistentStores>,
    pub queues: ProductQueues,
    pub groups: GroupNames,
}

impl Settings {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| var(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));

        let bind_raw = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|e| ConfigError::InvalidValue {
            var: "BIND_ADDR".to_string(),
            message: format!("{e}"),
        })?;

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using the insecure development secret");
            INSECURE_JWT_SECRET.to_string()
        });

        let persistent = match var("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => parse_bool("USE_PERSISTENT_STORES", &raw)?,
        };

        let persistent = if persistent {
            Some(PersistentStores {
                database_url: required("DATABASE_URL")?,
                redis_url: var("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
                keycloak: KeycloakConfig::new(
                    required("IDP_BASE_URL")?,
                    required("IDP_REALM")?,
                    required("IDP_CLIENT_ID")?,
                    required("IDP_CLIENT_SECRET")?,
                ),
            })
        } else {
            None
        };

        let defaults = ProductQueues::default();
        let queues = ProductQueues {
            created: var("QUEUE_PRODUCT_CREATED").unwrap_or(defaults.created),
            updated: var("QUEUE_PRODUCT_UPDATED").unwrap_or(defaults.updated),
            deleted: var("QUEUE_PRODUCT_DELETED").unwrap_or(defaults.deleted),
        };

        let default_groups = GroupNames::default();
        let groups = GroupNames {
            customer: var("IDP_CUSTOMER_GROUP").unwrap_or(default_groups.customer),
            admin: var("IDP_ADMIN_GROUP").unwrap_or(default_groups.admin),
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            persistent,
            queues,
            groups,
        })
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            message: format!("expected a boolean, got {other:?}"),
        }),
    }
}

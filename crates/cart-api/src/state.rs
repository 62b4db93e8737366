//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the cart store, pricing configuration and server settings.

use crate::store::CartStore;
use cart_core::PricingConfig;
use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
        }
    }
}

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live carts
    pub carts: CartStore,
    /// Pricing applied to every summary
    pub pricing: Arc<PricingConfig>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state from the environment and `config/pricing.toml`
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let pricing = PricingConfig::load()
            .map_err(|e| anyhow::anyhow!("Failed to load pricing config: {}", e))?;

        Ok(Self::with_pricing(pricing, config))
    }

    /// Create state with explicit pricing (used by tests and embedders)
    pub fn with_pricing(pricing: PricingConfig, config: AppConfig) -> Self {
        Self {
            carts: CartStore::new(),
            pricing: Arc::new(pricing),
            config,
        }
    }
}

//! # marketcart cart server
//!
//! ## Usage
//!
//! ```bash
//! # Optional pricing overrides (defaults: 0.08 / 100 / 15)
//! export CART_TAX_RATE=0.08
//! export CART_FREE_SHIPPING_THRESHOLD=100
//! export CART_FLAT_SHIPPING_FEE=15
//!
//! # Run the server
//! cart-server
//! ```

use cart_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!(
        "Pricing: tax_rate={}, free shipping above {}, flat fee {}",
        state.pricing.tax_rate,
        state.pricing.currency.format(state.pricing.free_shipping_threshold),
        state.pricing.currency.format(state.pricing.flat_shipping_fee)
    );

    let app = routes::create_router(state);

    info!("Cart server starting on http://{}", addr);
    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Carts: POST http://{}/api/v1/carts", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` filters, `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

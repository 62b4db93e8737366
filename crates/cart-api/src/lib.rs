//! # cart-api
//!
//! HTTP API layer for marketcart-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for cart mutation, pricing and checkout
//! - An in-memory cart store
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/pricing` | Pricing config |
//! | POST | `/api/v1/carts` | Create cart |
//! | GET | `/api/v1/carts/{id}` | Cart rows and summary |
//! | DELETE | `/api/v1/carts/{id}` | Clear cart |
//! | GET | `/api/v1/carts/{id}/summary` | Summary with display strings |
//! | POST | `/api/v1/carts/{id}/items` | Add or merge item |
//! | PATCH | `/api/v1/carts/{id}/items` | Set quantity |
//! | DELETE | `/api/v1/carts/{id}/items` | Remove item |
//! | POST | `/api/v1/carts/{id}/checkout` | Create order |

pub mod handlers;
pub mod routes;
pub mod state;
pub mod store;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
pub use store::CartStore;

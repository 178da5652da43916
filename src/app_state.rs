//! Application state for the Actix-web server
//!
//! `AppState` is wrapped in `web::Data` and shared across all HTTP handlers.
//! It is built once at startup and never mutated afterwards; the only
//! interior mutability is the metrics store inside the registry.

use rust_comic_scraper::config::Config;
use rust_comic_scraper::registry::Registry;

pub struct AppState {
    /// Source registry and dispatcher
    pub registry: Registry,
    /// Application configuration
    pub config: Config,
}

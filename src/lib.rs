// Library interface for rust_comic_scraper
// The HTTP binary and the integration tests both go through these modules

pub mod config;
pub mod document;
pub mod error;
pub mod helpers;
pub mod http_client;
pub mod metrics;
pub mod models;
pub mod registry;
pub mod response;
pub mod sources;

mod app_state;

use crate::app_state::AppState;
use actix_web::http::StatusCode;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use rust_comic_scraper::config::Config;
use rust_comic_scraper::registry::Registry;
use rust_comic_scraper::response;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct ApiQuery {
    source: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    url: Option<String>,
}

/// `/api?source=komikcast&type=latest`
/// `/api?source=komikcast&type=detail&url=one-piece`
/// `/api?source=shinigami&type=chapter&url=https://shinigamitoon.com/series/solo-leveling/chapter-01/`
#[get("/api")]
async fn api(data: web::Data<AppState>, query: web::Query<ApiQuery>) -> impl Responder {
    let query = query.into_inner();
    let envelope = response::respond(
        &data.registry,
        query.source.as_deref(),
        query.kind.as_deref(),
        query.url.as_deref(),
    )
    .await;

    let status = StatusCode::from_u16(envelope.outcome.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(envelope)
}

#[get("/sources")]
async fn list_sources(data: web::Data<AppState>) -> impl Responder {
    let sources: Vec<_> = data
        .registry
        .source_ids()
        .into_iter()
        .filter_map(|id| data.registry.get(id))
        .map(|adapter| json!({"id": adapter.id(), "base_url": adapter.base_url()}))
        .collect();
    HttpResponse::Ok().json(json!({
        "sources": sources,
        "max_concurrent_requests": data.config.dispatch.max_concurrent_requests,
    }))
}

#[get("/metrics")]
async fn get_metrics(data: web::Data<AppState>) -> impl Responder {
    let metrics: Vec<_> = data
        .registry
        .metrics()
        .get_all_metrics()
        .into_iter()
        .map(|m| {
            let rate = m.success_rate();
            json!({"metrics": m, "success_rate": rate})
        })
        .collect();
    HttpResponse::Ok().json(metrics)
}

fn init_logging() {
    let err = match log4rs::init_file("log4rs.yml", Default::default()) {
        Ok(()) => return,
        Err(e) => e,
    };

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {l} {t} - {m}{n}",
        )))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));

    match config {
        Ok(config) => {
            if log4rs::init_config(config).is_ok() {
                log::warn!("log4rs.yml not loaded ({}), logging to console", err);
            }
        }
        Err(e) => eprintln!("failed to configure logging: {}", e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let cfg = Config::load();

    let registry = match Registry::from_config(&cfg) {
        Ok(registry) => registry,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e));
        }
    };

    info!("Fetcher initialized:");
    info!("  Timeout: {}s", cfg.http.timeout().as_secs());
    info!("  Max redirects: {}", cfg.http.max_redirects);
    info!("  Max retries: {}", cfg.http.max_retries);
    info!("  Max concurrent operations: {}", cfg.dispatch.max_concurrent_requests);

    let host = cfg.server.host.clone();
    let first_port = cfg.server.port;
    let data = web::Data::new(AppState {
        registry,
        config: cfg,
    });

    // Try to bind to an available port starting at the configured one
    let mut last_err: Option<std::io::Error> = None;
    for port in first_port..=first_port.saturating_add(10) {
        let data_clone = data.clone();
        let addr = format!("{}:{}", host, port);
        match HttpServer::new(move || {
            App::new()
                .app_data(data_clone.clone())
                .service(api)
                .service(list_sources)
                .service(get_metrics)
        })
        .bind(&addr)
        {
            Ok(server) => {
                info!("Listening on http://{}", addr);
                return server.run().await;
            }
            Err(e) => {
                error!("Failed to bind {}: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::AddrInUse, "no port available")
    }))
}

use actix_web::web;

pub mod games;
pub mod health;

/// Register every route. Middleware is wrapped by the caller (`main.rs`
/// wraps logging and request tracing; tests may wrap only what they need).
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check: /health
    health::configure_routes(cfg);

    // Games routes: /api/games/**
    cfg.service(web::scope("/api/games").configure(games::configure_routes));
}

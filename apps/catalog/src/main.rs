use actix_web::{web, App, HttpServer};
use catalog::config::db::DbKind;
use catalog::config::server::ServerSettings;
use catalog::config::storage::StorageSettings;
use catalog::infra::state::build_state;
use catalog::middleware::{RequestTrace, StructuredLogger};
use catalog::routes;
use catalog::telemetry;
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment
    // (docker env_file, or `set -a; . ./.env; set +a` locally).
    let server = match ServerSettings::from_env() {
        Ok(server) => server,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };
    let storage = StorageSettings::from_env();

    let app_state = match build_state()
        .with_db(DbKind::Postgres)
        .with_storage(storage)
        .with_request_timeout(server.request_timeout)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    info!(host = %server.host, port = server.port, "catalog listening");

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await
}

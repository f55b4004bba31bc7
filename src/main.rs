use actix_governor::Governor;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use attendance_tracker::config::{Config, StorageBackend};
use attendance_tracker::db::init_db;
use attendance_tracker::docs::ApiDoc;
use attendance_tracker::repository::{AttendanceStore, MemoryStore, MySqlStore};
use attendance_tracker::routes;
use tracing::{info, warn};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance tracker is running"
}

/// Rolling daily log file; keep the guard alive or buffered lines are lost.
fn init_tracing(log_dir: &str) -> WorkerGuard {
    let file_appender = rolling::daily(log_dir, "app.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    guard
}

async fn serve<S: AttendanceStore>(config: Config, store: S) -> anyhow::Result<()> {
    let store = Data::new(store);
    let limiter = routes::build_limiter_config(config.rate_api_per_min)?;
    let api_prefix = config.api_prefix.clone();

    info!(
        addr = %config.server_addr,
        backend = %config.storage_backend,
        prefix = %api_prefix,
        "Server starting..."
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Governor::new(&limiter))
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .service(index)
            .configure(|cfg| routes::configure::<S>(cfg, &api_prefix))
    })
    .bind(config.server_addr.as_str())?
    .run()
    .await?;

    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let _guard = init_tracing(&config.log_dir);

    match config.storage_backend {
        StorageBackend::Mysql => {
            let pool = init_db(&config).await?;
            serve(config, MySqlStore::new(pool)).await
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage, records are lost on restart");
            serve(config, MemoryStore::new()).await
        }
    }
}

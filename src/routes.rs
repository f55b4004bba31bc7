use crate::{api::attendance, error::AppError, repository::AttendanceStore};
use actix_governor::{
    GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;

/// Per peer-IP limiter shared by every API route.
pub fn build_limiter_config(
    requests_per_min: u32,
) -> anyhow::Result<GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit: {requests_per_min} requests/min"))
}

/// Malformed JSON bodies, query strings and path segments answer with the
/// same `{"error": ...}` shape as every other client error.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid request body: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid query string: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid path parameter: {err}")).into()
    }));
}

pub fn configure<S: AttendanceStore>(cfg: &mut web::ServiceConfig, api_prefix: &str) {
    extractor_configs(cfg);

    cfg.service(
        web::scope(api_prefix).service(
            web::scope("/attendance")
                // /attendance
                .service(
                    web::resource("")
                        .route(web::get().to(attendance::list_attendance::<S>))
                        .route(web::post().to(attendance::create_attendance::<S>)),
                )
                // /attendance/employee-history/{employee_id}
                .service(
                    web::resource("/employee-history/{employee_id}")
                        .route(web::get().to(attendance::employee_history::<S>)),
                )
                // /attendance/employee-details/{employee_id}
                .service(
                    web::resource("/employee-details/{employee_id}")
                        .route(web::get().to(attendance::employee_details::<S>)),
                )
                // /attendance/{id}
                .service(
                    web::resource("/{id}")
                        .route(web::delete().to(attendance::delete_attendance::<S>)),
                ),
        ),
    );
}

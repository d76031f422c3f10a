use crate::{
    api::{menu_access, payroll},
    auth::middleware::auth_middleware,
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub type Limiter = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter allowing `requests_per_min` with a burst of the same size.
pub fn protected_limiter(requests_per_min: u32) -> anyhow::Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);

    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit: {requests_per_min} per minute"))
}

// Malformed bodies, queries and paths surface as validation errors in the
// standard error envelope.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| AppError::Validation(err.to_string()).into()),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiter: &Limiter) {
    cfg.service(
        web::scope(&config.api_prefix)
            .configure(extractor_configs)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(limiter)) // rate limiting
            .service(
                web::scope("/menu-access")
                    // /menu-access
                    .service(
                        web::resource("")
                            .route(web::get().to(menu_access::list_overrides))
                            .route(web::post().to(menu_access::set_access)),
                    )
                    .service(web::resource("/me").route(web::get().to(menu_access::my_access)))
                    .service(
                        web::resource("/me/navigation")
                            .route(web::get().to(menu_access::my_navigation)),
                    )
                    .service(
                        web::resource("/defaults")
                            .route(web::get().to(menu_access::role_defaults_table)),
                    )
                    // /menu-access/{user_id}
                    .service(
                        web::resource("/{user_id}")
                            .route(web::delete().to(menu_access::reset_access)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    // /payroll
                    .service(web::resource("").route(web::get().to(payroll::list_payrolls)))
                    .service(web::resource("/me").route(web::get().to(payroll::my_payslips)))
                    .service(web::resource("/bpjs").route(web::get().to(payroll::bpjs_breakdown)))
                    .service(
                        web::resource("/generate")
                            .route(web::post().to(payroll::generate_payroll)),
                    )
                    // /payroll/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payroll::get_payroll))
                            .route(web::put().to(payroll::update_payroll))
                            .route(web::delete().to(payroll::delete_payroll)),
                    )
                    // /payroll/{id}/status
                    .service(
                        web::resource("/{id}/status")
                            .route(web::put().to(payroll::update_payroll_status)),
                    ),
            ),
    );
}

use crate::{
    api::{attendance, schedule},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let dashboard_limiter = Arc::new(build_limiter(config.rate_dashboard_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let admin_limiter = Arc::new(build_limiter(config.rate_admin_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .wrap(dashboard_limiter.clone())
                            .route(web::get().to(attendance::dashboard)),
                    )
                    // /attendance/refresh
                    .service(
                        web::resource("/refresh")
                            .wrap(refresh_limiter)
                            .route(web::post().to(attendance::refresh)),
                    )
                    // /attendance/{id}
                    .service(
                        web::resource("/{id}")
                            .wrap(admin_limiter)
                            .route(web::delete().to(attendance::delete_attendance)),
                    ),
            )
            .service(
                web::scope("/schedules")
                    // /schedules
                    .service(
                        web::resource("")
                            .wrap(dashboard_limiter)
                            .route(web::get().to(schedule::schedule_view)),
                    ),
            ),
    );
}

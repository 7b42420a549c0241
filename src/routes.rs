use crate::{
    api::{attendance, employee, history},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
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

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let recover_limiter = Arc::new(build_limiter(config.rate_recover_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            )
            .service(
                web::resource("/recover")
                    .wrap(recover_limiter.clone())
                    .route(web::post().to(handlers::recover)),
            )
            .service(
                web::resource("/reset-password")
                    .wrap(recover_limiter.clone())
                    .route(web::post().to(handlers::reset_password)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/clock")
                    // /clock/status
                    .service(
                        web::resource("/status").route(web::get().to(attendance::clock_status)),
                    )
                    // the four state-machine transitions
                    .service(
                        web::resource("/start-work")
                            .route(web::post().to(attendance::start_work)),
                    )
                    .service(
                        web::resource("/end-work").route(web::post().to(attendance::end_work)),
                    )
                    .service(
                        web::resource("/start-break")
                            .route(web::post().to(attendance::start_break)),
                    )
                    .service(
                        web::resource("/end-break").route(web::post().to(attendance::end_break)),
                    ),
            )
            .service(
                web::scope("/history")
                    // /history
                    .service(web::resource("").route(web::get().to(history::history)))
                    // /history/summary
                    .service(web::resource("/summary").route(web::get().to(history::summary)))
                    // /history/export
                    .service(web::resource("/export").route(web::get().to(history::export))),
            )
            .service(
                web::scope("/employees")
                    .service(web::resource("").route(web::get().to(employee::list_employees))),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// CLOCK ACTION
//  └─ Authorization: Bearer access_token
//       └─ guard -> mutate -> re-read, under the per-employee lock

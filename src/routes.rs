use crate::api::{
    analytics, employee, leave_request, trainer, training_program, training_session,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;

use crate::error::AppError;

pub type RateLimitConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
///
/// Build once and share it between workers so the quota is process-wide.
pub fn build_rate_limiter(requests_per_min: u32) -> Option<RateLimitConfig> {
    let ms_per_request = (60_000 / requests_per_min.max(1) as u64).max(1);
    GovernorConfigBuilder::default()
        .milliseconds_per_request(ms_per_request)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
}

/// Body and query parse failures answer with the same JSON shape as handler errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::bad_request(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::bad_request(err.to_string()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiter: &RateLimitConfig) {
    cfg.service(
        web::scope(api_prefix)
            .wrap(Governor::new(limiter)) // rate limiting
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    )
                    // /leave/{id}/cancel
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::put().to(leave_request::cancel_leave)),
                    ),
            )
            .service(
                web::scope("/trainers")
                    .service(
                        web::resource("")
                            .route(web::get().to(trainer::list_trainers))
                            .route(web::post().to(trainer::create_trainer)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(trainer::get_trainer))
                            .route(web::put().to(trainer::update_trainer))
                            .route(web::delete().to(trainer::delete_trainer)),
                    ),
            )
            .service(
                web::scope("/training-programs")
                    .service(
                        web::resource("")
                            .route(web::get().to(training_program::list_programs))
                            .route(web::post().to(training_program::create_program)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(training_program::get_program))
                            .route(web::put().to(training_program::update_program))
                            .route(web::delete().to(training_program::delete_program)),
                    ),
            )
            .service(
                web::scope("/training-sessions")
                    .service(
                        web::resource("")
                            .route(web::get().to(training_session::list_sessions))
                            .route(web::post().to(training_session::create_session)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(training_session::get_session))
                            .route(web::put().to(training_session::update_session_status))
                            .route(web::delete().to(training_session::delete_session)),
                    )
                    // /training-sessions/{id}/participants
                    .service(
                        web::resource("/{id}/participants")
                            .route(web::post().to(training_session::add_participant)),
                    )
                    .service(
                        web::resource("/{id}/participants/{employee_id}")
                            .route(web::put().to(training_session::update_participant)),
                    )
                    .service(
                        web::resource("/{id}/feedback")
                            .route(web::post().to(training_session::add_feedback)),
                    ),
            )
            .service(
                web::resource("/analytics/employees/{field}")
                    .route(web::get().to(analytics::employee_breakdown)),
            )
            .service(web::resource("/org-chart").route(web::get().to(analytics::org_chart))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_builds_for_any_positive_rate() {
        for rpm in [1, 60, 1000, 120_000] {
            assert!(build_rate_limiter(rpm).is_some(), "rpm {}", rpm);
        }
    }
}

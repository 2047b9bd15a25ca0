// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_middleware;

// Arma el router completo. Separado de main() para poder levantarlo en tests.
pub fn build_router(app_state: AppState) -> Router {
    // Rutas de autenticación (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new().route("/me", get(handlers::auth::get_me));

    let property_routes = Router::new()
        .route(
            "/",
            post(handlers::properties::create_property)
                .get(handlers::properties::list_my_properties),
        )
        .route("/{property_id}", get(handlers::properties::get_property));

    let broker_routes = Router::new()
        .route("/clients-new", get(handlers::broker_clients::list_clients))
        .route("/clients/{client_id}", get(handlers::broker_clients::get_client))
        .route(
            "/prospects",
            get(handlers::prospects::list_prospects).post(handlers::prospects::create_prospect),
        )
        .route(
            "/prospects/recalculate-scores",
            post(handlers::prospects::recalculate_all_scores),
        )
        .route(
            "/prospects/{prospect_id}",
            get(handlers::prospects::get_prospect)
                .patch(handlers::prospects::update_prospect)
                .delete(handlers::prospects::delete_prospect),
        )
        .route(
            "/prospects/{prospect_id}/status",
            get(handlers::prospects::get_prospect_status)
                .patch(handlers::prospects::change_prospect_status),
        )
        .route(
            "/prospects/{prospect_id}/calculate-score",
            get(handlers::prospects::get_prospect_score)
                .post(handlers::prospects::recalculate_prospect_score),
        )
        .route(
            "/invitations",
            post(handlers::invitations::create_invitation)
                .get(handlers::invitations::list_broker_invitations),
        );

    let owner_routes = Router::new()
        .route("/invitations", get(handlers::invitations::list_pending_invitations))
        .route(
            "/invitations/{invitation_id}/respond",
            post(handlers::invitations::respond_invitation),
        )
        .route(
            "/broker-clients/{client_id}/manage-properties",
            put(handlers::owner::manage_properties),
        );

    let admin_routes = Router::new()
        .route(
            "/runners/payouts",
            get(handlers::payouts::list_runner_payouts)
                .post(handlers::payouts::process_runner_payouts),
        )
        .route(
            "/providers/payouts",
            get(handlers::payouts::list_provider_payouts)
                .post(handlers::payouts::process_provider_payouts),
        );

    let operation_routes = Router::new()
        .route(
            "/contracts",
            post(handlers::operations::create_contract).get(handlers::operations::list_contracts),
        )
        .route(
            "/runner/visits",
            post(handlers::operations::schedule_visit).get(handlers::operations::list_visits),
        )
        .route(
            "/runner/visits/{visit_id}/complete",
            post(handlers::operations::complete_visit),
        )
        .route(
            "/provider/jobs",
            post(handlers::operations::create_job).get(handlers::operations::list_jobs),
        )
        .route(
            "/provider/jobs/{job_id}/complete",
            post(handlers::operations::complete_job),
        )
        .route("/maintenance", post(handlers::operations::create_maintenance))
        .route("/maintenance/{request_id}", get(handlers::operations::get_maintenance))
        .route(
            "/maintenance/{request_id}/status",
            patch(handlers::operations::update_maintenance_status),
        );

    let notification_routes = Router::new()
        .route("/notifications", get(handlers::notifications::list_notifications))
        .route("/notifications/read-all", post(handlers::notifications::mark_all_read))
        .route(
            "/notifications/{notification_id}/read",
            post(handlers::notifications::mark_read),
        );

    // Todo lo protegido pasa por el middleware de autenticación
    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/properties", property_routes)
        .nest("/api/broker", broker_routes)
        .nest("/api/owner", owner_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api", operation_routes.merge(notification_routes))
        .route("/api/realtime", get(handlers::realtime::realtime))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state)
}

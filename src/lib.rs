use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod validation;

use database::manager::Database;

/// Shared application state, threaded through every handler via axum `State`.
/// The database handle is passed explicitly rather than held in a process-wide
/// singleton so tests can substitute their own pools.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

pub fn app(state: AppState) -> Router {
    let config = config::config();

    let protected = Router::new()
        .merge(patient_routes())
        .merge(doctor_routes())
        .merge(mapping_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::jwt_auth_middleware,
        ));

    let mut router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api", get(handlers::api_index))
        // Public auth routes
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        // Protected record APIs
        .merge(protected)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(TraceLayer::new_for_http());

    if config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

fn patient_routes() -> Router<AppState> {
    use handlers::patients;

    Router::new()
        .route("/api/patients", post(patients::create).get(patients::list))
        .route(
            "/api/patients/:id",
            get(patients::get_by_id).put(patients::update).delete(patients::remove),
        )
}

fn doctor_routes() -> Router<AppState> {
    use handlers::doctors;

    Router::new()
        .route("/api/doctors", post(doctors::create).get(doctors::list))
        .route(
            "/api/doctors/:id",
            get(doctors::get_by_id).put(doctors::update).delete(doctors::remove),
        )
}

fn mapping_routes() -> Router<AppState> {
    use handlers::mappings;

    // GET interprets the path segment as a patient id, DELETE as a mapping id
    // (the original API shape). One route entry since the patterns collide.
    Router::new()
        .route("/api/mappings", post(mappings::create).get(mappings::list))
        .route(
            "/api/mappings/:id",
            get(mappings::doctors_for_patient).delete(mappings::remove),
        )
}

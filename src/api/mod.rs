mod handlers;
pub mod middleware;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::engine::Engine;
use middleware::SecurityConfig;

/// Shared handler state: the store for writes, the engine for reads.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub engine: Engine<Database>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            engine: Engine::new(db.clone()),
            db,
        }
    }
}

/// Router with security disabled (local use and tests).
pub fn create_router(db: Database) -> Router {
    create_router_with_security(db, SecurityConfig::disabled())
}

pub fn create_router_with_security(db: Database, security: SecurityConfig) -> Router {
    let api = Router::new()
        // Catalog
        .route("/courses", get(handlers::list_courses).post(handlers::create_course))
        .route("/courses/{course}", get(handlers::get_course_outline))
        .route("/courses/{course}/modules", post(handlers::create_module))
        .route(
            "/courses/{course}/modules/{module}/lessons",
            post(handlers::create_lesson),
        )
        .route(
            "/courses/{course}/modules/{module}/lessons/{lesson}/quizzes",
            get(handlers::list_quizzes).post(handlers::create_quiz),
        )
        // People
        .route("/team-leaders", post(handlers::create_team_leader))
        .route(
            "/team-leaders/{id}/analytics",
            get(handlers::team_leader_analytics),
        )
        .route("/students", post(handlers::create_student))
        .route("/students/{id}/enrollments", post(handlers::enroll_student))
        // Ledger
        .route("/students/{id}/submissions", post(handlers::submit_quiz))
        // Progression
        .route(
            "/students/{id}/courses/{course}/statuses",
            get(handlers::course_statuses),
        )
        .route(
            "/students/{id}/courses/{course}/modules/{module}/access",
            get(handlers::module_access),
        )
        .route(
            "/students/{id}/courses/{course}/modules/{module}/progress",
            get(handlers::module_progress),
        )
        .route(
            "/students/{id}/courses/{course}/modules/{module}/lessons/{lesson}/access",
            get(handlers::lesson_access),
        )
        .route(
            "/students/{id}/courses/{course}/modules/{module}/lessons/{lesson}/next",
            get(handlers::next_lesson),
        )
        // Analytics
        .route("/students/{id}/analytics", get(handlers::student_summary))
        .route(
            "/students/{id}/analytics/courses/{course_id}",
            get(handlers::course_progress),
        )
        // Health
        .route("/health", get(handlers::health));

    let mut api = api.route_layer(from_fn_with_state(
        security.clone(),
        middleware::auth_middleware,
    ));
    if let Some(limiter) = security.rate_limiter.clone() {
        api = api.route_layer(from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&security)),
        )
        .with_state(AppState::new(db))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    match &security.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
        }
        None => CorsLayer::permissive(),
    }
}

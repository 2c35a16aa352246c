pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod response;
pub mod routes;
pub mod state;
pub mod utils;

use axum::middleware;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Coursedesk API",
        version = "1.0.0",
        description = "Students, assignments, weekly content and discussion board. Every response is a `{success, data | message | error}` envelope."
    ),
    paths(
        handlers::students::handle_get,
        handlers::students::handle_post,
        handlers::students::handle_put,
        handlers::students::handle_delete,
        handlers::assignments::handle_get,
        handlers::assignments::handle_post,
        handlers::assignments::handle_put,
        handlers::assignments::handle_delete,
        handlers::weekly::handle_get,
        handlers::weekly::handle_post,
        handlers::weekly::handle_put,
        handlers::weekly::handle_delete,
        handlers::discussion::handle_get,
        handlers::discussion::handle_post,
        handlers::discussion::handle_put,
        handlers::discussion::handle_delete,
    ),
    components(schemas(
        error::ErrorBody,
        common::records::Student,
        common::records::Assignment,
        common::records::AssignmentComment,
        common::records::Week,
        common::records::WeekComment,
        common::records::Topic,
        common::records::Reply,
        models::students::CreateStudentRequest,
        models::students::UpdateStudentRequest,
        models::students::ChangePasswordRequest,
        models::assignments::CreateAssignmentRequest,
        models::assignments::UpdateAssignmentRequest,
        models::assignments::CreateAssignmentCommentRequest,
        models::weekly::CreateWeekRequest,
        models::weekly::UpdateWeekRequest,
        models::weekly::CreateWeekCommentRequest,
        models::discussion::CreateTopicRequest,
        models::discussion::UpdateTopicRequest,
        models::discussion::CreateReplyRequest,
    )),
    tags(
        (name = "Students", description = "Student accounts administered by course staff"),
        (name = "Assignments", description = "Assignments and their comments"),
        (name = "Weekly", description = "Weekly course content and its comments"),
        (name = "Discussion", description = "Discussion board topics and replies"),
    ),
)]
pub struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = routes::cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .fallback(handlers::fallback::not_found)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

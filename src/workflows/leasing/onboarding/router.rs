use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use uuid::Uuid;

use super::accounts::{AccountDirectory, RoleDirectory};
use super::domain::{LeaseId, OnboardingRequest, SpaceId};
use super::repository::{LeaseFilter, LeasingRepository};
use super::service::{ErrorKind, LeaseOnboardingService, OnboardingError};

/// Router builder exposing the onboarding surface and its collaborating
/// lease read/terminate endpoints.
pub fn onboarding_router<S, A, R>(service: Arc<LeaseOnboardingService<S, A, R>>) -> Router
where
    S: LeasingRepository + 'static,
    A: AccountDirectory + 'static,
    R: RoleDirectory + 'static,
{
    Router::new()
        .route("/api/v1/leasing/onboardings", post(onboard_handler::<S, A, R>))
        .route(
            "/api/v1/leasing/spaces/:space_id/availability",
            get(availability_handler::<S, A, R>),
        )
        .route("/api/v1/leasing/leases", get(list_handler::<S, A, R>))
        .route(
            "/api/v1/leasing/leases/:lease_id",
            get(lease_handler::<S, A, R>),
        )
        .route(
            "/api/v1/leasing/leases/:lease_id/terminate",
            post(terminate_handler::<S, A, R>),
        )
        .with_state(service)
}

/// Failure body of the onboarding contract.
#[derive(Debug, Serialize)]
struct FailureResponse {
    success: bool,
    message: String,
    error_detail: String,
}

fn failure(error: OnboardingError) -> Response {
    let kind = error.kind();
    let status = match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = FailureResponse {
        success: false,
        message: error.to_string(),
        error_detail: kind.label().to_string(),
    };
    (status, axum::Json(body)).into_response()
}

pub(crate) async fn onboard_handler<S, A, R>(
    State(service): State<Arc<LeaseOnboardingService<S, A, R>>>,
    axum::Json(request): axum::Json<OnboardingRequest>,
) -> Response
where
    S: LeasingRepository + 'static,
    A: AccountDirectory + 'static,
    R: RoleDirectory + 'static,
{
    match service.onboard(request) {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn availability_handler<S, A, R>(
    State(service): State<Arc<LeaseOnboardingService<S, A, R>>>,
    Path(space_id): Path<Uuid>,
) -> Response
where
    S: LeasingRepository + 'static,
    A: AccountDirectory + 'static,
    R: RoleDirectory + 'static,
{
    match service.check_space(&SpaceId(space_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn list_handler<S, A, R>(
    State(service): State<Arc<LeaseOnboardingService<S, A, R>>>,
    Query(filter): Query<LeaseFilter>,
) -> Response
where
    S: LeasingRepository + 'static,
    A: AccountDirectory + 'static,
    R: RoleDirectory + 'static,
{
    match service.leases(&filter) {
        Ok(leases) => (StatusCode::OK, axum::Json(leases)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn lease_handler<S, A, R>(
    State(service): State<Arc<LeaseOnboardingService<S, A, R>>>,
    Path(lease_id): Path<Uuid>,
) -> Response
where
    S: LeasingRepository + 'static,
    A: AccountDirectory + 'static,
    R: RoleDirectory + 'static,
{
    match service.lease(&LeaseId(lease_id)) {
        Ok(detail) => (StatusCode::OK, axum::Json(detail)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn terminate_handler<S, A, R>(
    State(service): State<Arc<LeaseOnboardingService<S, A, R>>>,
    Path(lease_id): Path<Uuid>,
) -> Response
where
    S: LeasingRepository + 'static,
    A: AccountDirectory + 'static,
    R: RoleDirectory + 'static,
{
    match service.terminate(&LeaseId(lease_id)) {
        Ok(detail) => (StatusCode::OK, axum::Json(detail)).into_response(),
        Err(error) => failure(error),
    }
}

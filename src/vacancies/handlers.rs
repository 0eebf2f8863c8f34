use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::applications;
use crate::auth::repo_types::Role;
use crate::auth::services::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{CreateVacancyRequest, VacancyWithCount};
use super::repo::{self, Vacancy};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/vacancies", get(list_public))
        .route("/vacancies/recruiter", get(list_recruiter))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/vacancies", post(create))
}

/// GET /vacancies. The public board, no auth required.
#[instrument(skip(state))]
pub async fn list_public(
    State(state): State<AppState>,
) -> Result<Json<Vec<Vacancy>>, ApiError> {
    let vacancies = repo::list_public(&state.db).await?;
    Ok(Json(vacancies))
}

/// POST /vacancies. Recruiters only.
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(payload): Json<CreateVacancyRequest>,
) -> Result<(StatusCode, Json<Vacancy>), ApiError> {
    if actor.role != Role::Recruiter {
        warn!(user_id = %actor.id, "non-recruiter tried to create a vacancy");
        return Err(ApiError::Forbidden(
            "only recruiters can create vacancies".into(),
        ));
    }

    let (Some(title), Some(company), Some(location), Some(description)) = (
        non_empty(payload.title.as_deref()),
        non_empty(payload.company.as_deref()),
        non_empty(payload.location.as_deref()),
        non_empty(payload.description.as_deref()),
    ) else {
        warn!(user_id = %actor.id, "vacancy with missing fields");
        return Err(ApiError::BadRequest("missing required fields".into()));
    };

    let vacancy = repo::create(&state.db, actor.id, title, company, location, description).await?;

    info!(vacancy_id = %vacancy.id, recruiter_id = %actor.id, "vacancy created");
    Ok((StatusCode::CREATED, Json(vacancy)))
}

/// GET /vacancies/recruiter. The caller's own vacancies, each annotated
/// with a live application count.
#[instrument(skip(state))]
pub async fn list_recruiter(
    State(state): State<AppState>,
    actor: AuthUser,
) -> Result<Json<Vec<VacancyWithCount>>, ApiError> {
    if actor.role != Role::Recruiter {
        warn!(user_id = %actor.id, "non-recruiter tried to list own vacancies");
        return Err(ApiError::Forbidden(
            "only recruiters can list their vacancies".into(),
        ));
    }

    let vacancies = repo::list_by_recruiter(&state.db, actor.id).await?;

    let mut items = Vec::with_capacity(vacancies.len());
    for vacancy in vacancies {
        let count = applications::repo::count_by_vacancy(&state.db, vacancy.id).await?;
        items.push(VacancyWithCount::from_parts(vacancy, count));
    }
    Ok(Json(items))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

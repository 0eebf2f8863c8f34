use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::repo_types::Role;
use crate::auth::services::AuthUser;
use crate::error::{is_foreign_key_violation, is_unique_violation, ApiError};
use crate::state::AppState;
use crate::vacancies;
use crate::vacancies::repo::Vacancy;

use super::dto::{ApplicationWithVacancy, ApplyRequest, UpdateStatusRequest, UpdateStatusResponse};
use super::repo::{self, Application};
use super::services::with_vacancy;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/applications", get(list_mine))
        .route("/applications/recruiter", get(list_recruiter))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/applications", post(apply))
        .route("/applications/:id", patch(update_status))
}

/// POST /applications. Candidates only, at most once per vacancy.
#[instrument(skip(state, payload))]
pub async fn apply(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(payload): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<Application>), ApiError> {
    if actor.role != Role::Candidate {
        warn!(user_id = %actor.id, "non-candidate tried to apply");
        return Err(ApiError::Forbidden("only candidates can apply".into()));
    }

    let (Some(vacancy_id_raw), Some(resume_url)) = (
        non_empty(payload.vacancy_id.as_deref()),
        non_empty(payload.resume_url.as_deref()),
    ) else {
        warn!(user_id = %actor.id, "application with missing fields");
        return Err(ApiError::BadRequest("missing required fields".into()));
    };

    let vacancy_id = Uuid::parse_str(vacancy_id_raw)
        .map_err(|_| ApiError::BadRequest("invalid vacancyId".into()))?;

    if repo::exists_for(&state.db, actor.id, vacancy_id).await? {
        warn!(user_id = %actor.id, %vacancy_id, "duplicate application");
        return Err(ApiError::Conflict("already applied to this vacancy".into()));
    }

    let application = match repo::create(&state.db, actor.id, vacancy_id, resume_url).await {
        Ok(a) => a,
        // Pre-check raced with a concurrent submission; the unique pair
        // constraint decides the winner.
        Err(e) if is_unique_violation(&e) => {
            warn!(user_id = %actor.id, %vacancy_id, "duplicate application");
            return Err(ApiError::Conflict("already applied to this vacancy".into()));
        }
        Err(e) if is_foreign_key_violation(&e) => {
            warn!(user_id = %actor.id, %vacancy_id, "application to unknown vacancy");
            return Err(ApiError::BadRequest("unknown vacancy".into()));
        }
        Err(e) => return Err(e.into()),
    };

    info!(application_id = %application.id, user_id = %actor.id, %vacancy_id, "application created");
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /applications. The candidate's own applications with vacancy
/// snapshots attached best-effort.
#[instrument(skip(state))]
pub async fn list_mine(
    State(state): State<AppState>,
    actor: AuthUser,
) -> Result<Json<Vec<ApplicationWithVacancy>>, ApiError> {
    if actor.role != Role::Candidate {
        warn!(user_id = %actor.id, "non-candidate tried to list own applications");
        return Err(ApiError::Forbidden(
            "only candidates can list their applications".into(),
        ));
    }

    let applications = repo::list_by_user(&state.db, actor.id).await?;

    let mut items = Vec::with_capacity(applications.len());
    for application in applications {
        items.push(with_vacancy(&state.db, application).await);
    }
    Ok(Json(items))
}

/// GET /applications/recruiter. Every application to the caller's
/// vacancies. Two-step: own vacancies first, then one membership query over
/// their ids.
#[instrument(skip(state))]
pub async fn list_recruiter(
    State(state): State<AppState>,
    actor: AuthUser,
) -> Result<Json<Vec<ApplicationWithVacancy>>, ApiError> {
    if actor.role != Role::Recruiter {
        warn!(user_id = %actor.id, "non-recruiter tried to list applicants");
        return Err(ApiError::Forbidden(
            "only recruiters can list applicants".into(),
        ));
    }

    let vacancies = vacancies::repo::list_by_recruiter(&state.db, actor.id).await?;
    if vacancies.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let ids: Vec<Uuid> = vacancies.iter().map(|v| v.id).collect();
    let by_id: HashMap<Uuid, Vacancy> = vacancies.into_iter().map(|v| (v.id, v)).collect();

    let applications = repo::list_by_vacancies(&state.db, &ids).await?;
    let items = applications
        .into_iter()
        .map(|a| {
            let vacancy = by_id.get(&a.vacancy_id).cloned();
            ApplicationWithVacancy::from_parts(a, vacancy)
        })
        .collect();
    Ok(Json(items))
}

/// PATCH /applications/:id. Recruiters only, and only on applications to
/// their own vacancies.
#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    if actor.role != Role::Recruiter {
        warn!(user_id = %actor.id, "non-recruiter tried to change a status");
        return Err(ApiError::Forbidden(
            "only recruiters can change application status".into(),
        ));
    }

    let Some(status) = non_empty(payload.status.as_deref()) else {
        warn!(user_id = %actor.id, application_id = %id, "status change with missing status");
        return Err(ApiError::BadRequest("status is required".into()));
    };

    let Some(owner) = repo::find_owner(&state.db, id).await? else {
        warn!(user_id = %actor.id, application_id = %id, "status change for unknown application");
        return Err(ApiError::NotFound("application not found".into()));
    };

    if owner != actor.id {
        warn!(user_id = %actor.id, application_id = %id, "status change on someone else's vacancy");
        return Err(ApiError::Forbidden(
            "application belongs to another recruiter's vacancy".into(),
        ));
    }

    repo::update_status(&state.db, id, status).await?;

    info!(application_id = %id, user_id = %actor.id, %status, "application status updated");
    Ok(Json(UpdateStatusResponse { success: true }))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

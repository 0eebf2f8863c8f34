use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::vacancies::repo::Vacancy;

/// Request body for vacancy creation. Optional fields so missing input maps
/// to a 400 from the handler's own presence check.
#[derive(Debug, Deserialize)]
pub struct CreateVacancyRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Vacancy annotated with a live count of its applications, as shown on the
/// recruiter's own listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VacancyWithCount {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub recruiter_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub applications_count: i64,
}

impl VacancyWithCount {
    pub fn from_parts(vacancy: Vacancy, applications_count: i64) -> Self {
        Self {
            id: vacancy.id,
            title: vacancy.title,
            company: vacancy.company,
            location: vacancy.location,
            description: vacancy.description,
            recruiter_id: vacancy.recruiter_id,
            created_at: vacancy.created_at,
            applications_count,
        }
    }
}

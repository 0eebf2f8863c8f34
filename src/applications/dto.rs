use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::applications::repo::Application;
use crate::vacancies::repo::Vacancy;

/// Request body for applying to a vacancy.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub vacancy_id: Option<String>,
    pub resume_url: Option<String>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
}

/// Application joined with a snapshot of its vacancy. The snapshot is None
/// when the lookup failed; listings never fail on a missing join.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWithVacancy {
    pub id: Uuid,
    pub vacancy_id: Uuid,
    pub user_id: Uuid,
    pub resume_url: String,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub vacancy: Option<Vacancy>,
}

impl ApplicationWithVacancy {
    pub fn from_parts(application: Application, vacancy: Option<Vacancy>) -> Self {
        Self {
            id: application.id,
            vacancy_id: application.vacancy_id,
            user_id: application.user_id,
            resume_url: application.resume_url,
            status: application.status,
            created_at: application.created_at,
            vacancy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn application() -> Application {
        Application {
            id: Uuid::new_v4(),
            vacancy_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            resume_url: "http://r".into(),
            status: "PENDING".into(),
            created_at: datetime!(2026-02-01 9:30 UTC),
        }
    }

    #[test]
    fn apply_request_uses_camel_case_keys() {
        let req: ApplyRequest =
            serde_json::from_str(r#"{"vacancyId":"v-1","resumeUrl":"http://r"}"#).unwrap();
        assert_eq!(req.vacancy_id.as_deref(), Some("v-1"));
        assert_eq!(req.resume_url.as_deref(), Some("http://r"));
    }

    #[test]
    fn missing_vacancy_snapshot_serializes_as_null() {
        let json = serde_json::to_value(ApplicationWithVacancy::from_parts(application(), None))
            .unwrap();
        assert!(json["vacancy"].is_null());
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["createdAt"], "2026-02-01T09:30:00Z");
        assert!(json["resumeUrl"].is_string());
    }
}

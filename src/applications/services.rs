use sqlx::PgPool;

use crate::applications::dto::ApplicationWithVacancy;
use crate::applications::repo::Application;
use crate::vacancies;

/// Best-effort join of an application to its vacancy snapshot. Any lookup
/// failure (missing record, query error) attaches None instead of
/// propagating; a broken reference must not break the listing.
pub async fn with_vacancy(db: &PgPool, application: Application) -> ApplicationWithVacancy {
    let vacancy = vacancies::repo::find_by_id(db, application.vacancy_id)
        .await
        .ok()
        .flatten();
    ApplicationWithVacancy::from_parts(application, vacancy)
}

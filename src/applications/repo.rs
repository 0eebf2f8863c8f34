use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Application record. `status` is the only mutable field.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub vacancy_id: Uuid,
    pub user_id: Uuid,
    pub resume_url: String,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Whether the candidate already applied to this vacancy.
pub async fn exists_for(
    db: &PgPool,
    user_id: Uuid,
    vacancy_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM applications WHERE user_id = $1 AND vacancy_id = $2
        )
        "#,
    )
    .bind(user_id)
    .bind(vacancy_id)
    .fetch_one(db)
    .await
}

/// Insert a new application with initial status PENDING, bumping the
/// applicant's advisory counter in the same transaction. The UNIQUE
/// (user_id, vacancy_id) constraint backstops the caller's existence
/// pre-check; callers classify the violation.
pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    vacancy_id: Uuid,
    resume_url: &str,
) -> Result<Application, sqlx::Error> {
    let mut tx = db.begin().await?;
    let application = sqlx::query_as::<_, Application>(
        r#"
        INSERT INTO applications (vacancy_id, user_id, resume_url, status)
        VALUES ($1, $2, $3, 'PENDING')
        RETURNING id, vacancy_id, user_id, resume_url, status, created_at
        "#,
    )
    .bind(vacancy_id)
    .bind(user_id)
    .bind(resume_url)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE users SET application_count = application_count + 1 WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(application)
}

/// One candidate's applications, newest first.
pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<Application>, sqlx::Error> {
    sqlx::query_as::<_, Application>(
        r#"
        SELECT id, vacancy_id, user_id, resume_url, status, created_at
        FROM applications
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Applications for a set of vacancies, newest first. The array parameter
/// has no size bound, so recruiters with any number of vacancies see every
/// application in one query.
pub async fn list_by_vacancies(
    db: &PgPool,
    vacancy_ids: &[Uuid],
) -> Result<Vec<Application>, sqlx::Error> {
    sqlx::query_as::<_, Application>(
        r#"
        SELECT id, vacancy_id, user_id, resume_url, status, created_at
        FROM applications
        WHERE vacancy_id = ANY($1)
        ORDER BY created_at DESC
        "#,
    )
    .bind(vacancy_ids)
    .fetch_all(db)
    .await
}

/// The recruiter owning the vacancy an application points at. None when the
/// application does not exist.
pub async fn find_owner(db: &PgPool, application_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT v.recruiter_id
        FROM applications a
        JOIN vacancies v ON v.id = a.vacancy_id
        WHERE a.id = $1
        "#,
    )
    .bind(application_id)
    .fetch_optional(db)
    .await
}

/// Mutate the status field, nothing else.
pub async fn update_status(
    db: &PgPool,
    application_id: Uuid,
    status: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE applications SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(application_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Live count of applications for one vacancy.
pub async fn count_by_vacancy(db: &PgPool, vacancy_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM applications WHERE vacancy_id = $1")
        .bind(vacancy_id)
        .fetch_one(db)
        .await
}

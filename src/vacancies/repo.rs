use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Vacancy record. Fields are immutable after creation; the record is owned
/// exclusively by the recruiter that created it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vacancy {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub recruiter_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn create(
    db: &PgPool,
    recruiter_id: Uuid,
    title: &str,
    company: &str,
    location: &str,
    description: &str,
) -> Result<Vacancy, sqlx::Error> {
    sqlx::query_as::<_, Vacancy>(
        r#"
        INSERT INTO vacancies (title, company, location, description, recruiter_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, title, company, location, description, recruiter_id, created_at
        "#,
    )
    .bind(title)
    .bind(company)
    .bind(location)
    .bind(description)
    .bind(recruiter_id)
    .fetch_one(db)
    .await
}

/// All vacancies, newest first. The public board.
pub async fn list_public(db: &PgPool) -> Result<Vec<Vacancy>, sqlx::Error> {
    sqlx::query_as::<_, Vacancy>(
        r#"
        SELECT id, title, company, location, description, recruiter_id, created_at
        FROM vacancies
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(db)
    .await
}

/// Vacancies owned by one recruiter, newest first.
pub async fn list_by_recruiter(db: &PgPool, recruiter_id: Uuid) -> Result<Vec<Vacancy>, sqlx::Error> {
    sqlx::query_as::<_, Vacancy>(
        r#"
        SELECT id, title, company, location, description, recruiter_id, created_at
        FROM vacancies
        WHERE recruiter_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(recruiter_id)
    .fetch_all(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Vacancy>, sqlx::Error> {
    sqlx::query_as::<_, Vacancy>(
        r#"
        SELECT id, title, company, location, description, recruiter_id, created_at
        FROM vacancies
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

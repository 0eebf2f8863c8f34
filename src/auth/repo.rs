use sqlx::PgPool;

use crate::auth::repo_types::{Role, User};

impl User {
    /// Find a user by email. Indexed equality lookup; the email is the
    /// case-sensitive key.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role, application_count, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Create a new user with hashed password. The unique index on email
    /// backstops the handler's pre-check; callers classify the violation.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, role, application_count, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(db)
        .await
    }
}

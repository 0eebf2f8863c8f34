use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, warn};
use uuid::Uuid;

pub(crate) use crate::auth::dto::{Claims, JwtKeys};
use crate::auth::repo_types::Role;
use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_hours,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: TimeDuration::hours(ttl_hours),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, user_id: Uuid, role: Role) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + self.ttl;
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, ?role, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        // No leeway: the stated lifetime is exact.
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, role = ?data.claims.role, "jwt verified");
        Ok(data.claims)
    }
}

/// Splits `Bearer <token>` into the token. The scheme must match exactly and
/// the token must be non-empty.
pub(crate) fn parse_bearer(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

/// Authenticated caller, extracted from the Authorization header. The single
/// chokepoint: every protected handler takes this as an argument, so no
/// protected operation is reachable without a verified token.
#[derive(Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".into()))?;

        let token = parse_bearer(auth_header)
            .ok_or_else(|| ApiError::Unauthorized("malformed Authorization header".into()))?;

        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired token");
                return Err(ApiError::Unauthorized("invalid or expired token".into()));
            }
        };

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}



#[cfg(test)]
mod jwt_tests {
    use super::*;

    fn make_keys_with_ttl(secret: &str, issuer: &str, audience: &str, ttl: TimeDuration) -> JwtKeys {
        JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl,
        }
    }

    fn make_keys() -> JwtKeys {
        JwtKeys::from_ref(&AppState::fake())
    }

    #[tokio::test]
    async fn sign_and_verify_carries_subject_and_role() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, Role::Recruiter).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Recruiter);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[tokio::test]
    async fn expired_token_fails_verification() {
        let keys = make_keys_with_ttl("s", "iss", "aud", TimeDuration::hours(-1));
        let token = keys.sign(Uuid::new_v4(), Role::Candidate).expect("sign");
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn token_shortly_before_expiry_verifies() {
        let keys = make_keys_with_ttl("s", "iss", "aud", TimeDuration::seconds(2));
        let token = keys.sign(Uuid::new_v4(), Role::Candidate).expect("sign");
        assert!(keys.verify(&token).is_ok());
    }

    #[tokio::test]
    async fn wrong_secret_fails_verification() {
        let good = make_keys_with_ttl("secret-a", "iss", "aud", TimeDuration::hours(1));
        let bad = make_keys_with_ttl("secret-b", "iss", "aud", TimeDuration::hours(1));
        let token = good.sign(Uuid::new_v4(), Role::Candidate).expect("sign");
        assert!(bad.verify(&token).is_err());
    }

    #[tokio::test]
    async fn wrong_issuer_or_audience_fails_verification() {
        let good = make_keys_with_ttl("same", "good-iss", "good-aud", TimeDuration::hours(1));
        let bad = make_keys_with_ttl("same", "bad-iss", "bad-aud", TimeDuration::hours(1));
        let token = good.sign(Uuid::new_v4(), Role::Candidate).expect("sign");
        assert!(bad.verify(&token).is_err());
    }

    #[tokio::test]
    async fn tampered_token_fails_verification() {
        let keys = make_keys();
        let mut token = keys.sign(Uuid::new_v4(), Role::Candidate).expect("sign");
        token.push('x');
        assert!(keys.verify(&token).is_err());
    }
}

use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::state::AppState;
use crate::{applications, auth, vacancies};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(vacancies::router())
                .merge(applications::router()),
        )
        .route("/health", get(|| async { "ok" }))
        .fallback(not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

async fn not_found() -> ApiError {
    ApiError::NotFound("not found".into())
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::extract::FromRef;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::build_app;
    use crate::auth::dto::JwtKeys;
    use crate::auth::repo_types::Role;
    use crate::state::AppState;

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn sign(state: &AppState, role: Role) -> String {
        JwtKeys::from_ref(state)
            .sign(Uuid::new_v4(), role)
            .expect("sign token")
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(request(Method::GET, "/health", None, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unmatched_route_returns_json_404() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(request(Method::GET, "/api/nope", None, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = body_json(res).await;
        assert_eq!(body["error"], "not found");
    }

    #[tokio::test]
    async fn protected_route_requires_token() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(request(Method::POST, "/api/vacancies", None, Some("{}")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_authorization_header_is_rejected() {
        let app = build_app(AppState::fake());
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/vacancies")
            .header(header::AUTHORIZATION, "Token abc")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(res).await;
        assert_eq!(body["error"], "malformed Authorization header");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(request(
                Method::POST,
                "/api/vacancies",
                Some("not-a-jwt"),
                Some("{}"),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(res).await;
        assert_eq!(body["error"], "invalid or expired token");
    }

    #[tokio::test]
    async fn candidate_cannot_create_vacancy() {
        let state = AppState::fake();
        let token = sign(&state, Role::Candidate);
        let app = build_app(state);
        let res = app
            .oneshot(request(
                Method::POST,
                "/api/vacancies",
                Some(&token),
                Some("{}"),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn vacancy_with_empty_description_is_rejected() {
        let state = AppState::fake();
        let token = sign(&state, Role::Recruiter);
        let app = build_app(state);
        let body = r#"{"title":"Dev","company":"Acme","location":"Remote","description":""}"#;
        let res = app
            .oneshot(request(
                Method::POST,
                "/api/vacancies",
                Some(&token),
                Some(body),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn recruiter_cannot_apply() {
        let state = AppState::fake();
        let token = sign(&state, Role::Recruiter);
        let app = build_app(state);
        let res = app
            .oneshot(request(
                Method::POST,
                "/api/applications",
                Some(&token),
                Some("{}"),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn candidate_cannot_update_status() {
        let state = AppState::fake();
        let token = sign(&state, Role::Candidate);
        let app = build_app(state);
        let uri = format!("/api/applications/{}", Uuid::new_v4());
        let res = app
            .oneshot(request(Method::PATCH, &uri, Some(&token), Some("{}")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn status_update_without_status_is_rejected() {
        let state = AppState::fake();
        let token = sign(&state, Role::Recruiter);
        let app = build_app(state);
        let uri = format!("/api/applications/{}", Uuid::new_v4());
        let res = app
            .oneshot(request(Method::PATCH, &uri, Some(&token), Some("{}")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

use std::net::SocketAddr;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, payments};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(payments::router())
        .route("/credits", get(credits))
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

async fn credits() -> Json<serde_json::Value> {
    Json(json!({
        "author": "payvault contributors",
        "github": "https://github.com/payvault/payvault",
        "message": "Secure payment API for developers."
    }))
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
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::OffsetDateTime;
    use tower::ServiceExt;

    use super::build_app;
    use crate::auth::extractor::TOKEN_HEADER;
    use crate::auth::jwt::Claims;
    use crate::state::AppState;

    // These tests only exercise paths that fail before any database query,
    // so the fake state's lazy pool is never actually connected.

    async fn body_json(res: axum::http::Response<Body>) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn expired_token(secret: &str) -> String {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: 1,
            iat: (now - 7200) as usize,
            exp: (now - 3600) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn credits_is_public() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/credits").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let v = body_json(res).await;
        assert!(v["author"].is_string());
    }

    #[tokio::test]
    async fn missing_token_yields_401() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/payments").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let v = body_json(res).await;
        assert_eq!(v["message"], "Token is missing!");
    }

    #[tokio::test]
    async fn malformed_token_yields_401() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(
                Request::get("/payment/1")
                    .header(TOKEN_HEADER, "definitely-not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let v = body_json(res).await;
        assert_eq!(v["message"], "Invalid token!");
    }

    #[tokio::test]
    async fn expired_token_yields_distinct_401() {
        let state = AppState::fake();
        let token = expired_token(&state.config.jwt.secret);
        let app = build_app(state);
        let res = app
            .oneshot(
                Request::get("/payments")
                    .header(TOKEN_HEADER, token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let v = body_json(res).await;
        assert_eq!(v["message"], "Token has expired!");
    }

    #[tokio::test]
    async fn create_payment_without_token_yields_401() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(json_request(
                Method::POST,
                "/payment",
                r#"{"amount": 25.5, "currency": "EUR"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let v = body_json(res).await;
        assert_eq!(v["message"], "Token is missing!");
    }

    #[tokio::test]
    async fn register_with_missing_fields_yields_400() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(json_request(Method::POST, "/register", "{}"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let v = body_json(res).await;
        assert_eq!(v["message"], "Invalid input!");
    }

    #[tokio::test]
    async fn register_with_empty_password_yields_400() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(json_request(
                Method::POST,
                "/register",
                r#"{"username": "alice", "password": ""}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_with_missing_fields_yields_400() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(json_request(
                Method::POST,
                "/login",
                r#"{"username": "alice"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let v = body_json(res).await;
        assert_eq!(v["message"], "Invalid input!");
    }

    #[tokio::test]
    async fn register_with_unparseable_body_yields_400() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(json_request(Method::POST, "/register", "not json"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let v = body_json(res).await;
        assert_eq!(v["message"], "Invalid input!");
    }
}

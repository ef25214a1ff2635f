use std::net::SocketAddr;

use anyhow::Context;
use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth, auth::middleware::require_auth, categories, state::AppState, transactions};

pub fn build_app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(categories::router())
        .merge(transactions::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(auth::router())
        .route("/health", get(|| async { "ok" }))
        .merge(protected)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
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

pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.config.host, state.config.port)
        .parse()
        .context("invalid APP_HOST/APP_PORT")?;
    let app = build_app(state);

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::auth::JwtKeys;

    fn bearer() -> String {
        let token = JwtKeys::new("test").issue(1).unwrap();
        format!("Bearer {token}")
    }

    async fn send(req: Request<Body>) -> (StatusCode, Value) {
        let response = build_app(AppState::fake()).oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get_with(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(method: Method, uri: &str, auth: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    const PROTECTED: [(&str, &str); 10] = [
        ("GET", "/transactions"),
        ("POST", "/transactions"),
        ("GET", "/transactions/1"),
        ("PUT", "/transactions/1"),
        ("DELETE", "/transactions/1"),
        ("GET", "/categories"),
        ("POST", "/categories"),
        ("GET", "/categories/1"),
        ("PUT", "/categories/1"),
        ("DELETE", "/categories/1"),
    ];

    #[tokio::test]
    async fn health_is_public() {
        let response = build_app(AppState::fake())
            .oneshot(get_with("/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        for (method, uri) in PROTECTED {
            let req = json_request(method.parse().unwrap(), uri, None, "{}");
            let (status, body) = send(req).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["error"], "authorization header required", "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn protected_routes_reject_bad_tokens() {
        let forged = format!("Bearer {}", JwtKeys::new("other-secret").issue(1).unwrap());
        for auth in ["Bearer not-a-token", forged.as_str()] {
            for (method, uri) in PROTECTED {
                let req = json_request(method.parse().unwrap(), uri, Some(auth), "{}");
                let (status, body) = send(req).await;
                assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
                assert_eq!(body["error"], "invalid or expired token");
            }
        }
    }

    #[tokio::test]
    async fn invalid_type_filter_is_rejected() {
        let auth = bearer();
        let (status, body) = send(get_with("/transactions?type=transfer", Some(&auth))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "invalid type filter: must be 'income' or 'expense'"
        );
    }

    #[tokio::test]
    async fn pagination_bounds_are_checked_before_the_database() {
        let auth = bearer();
        let (status, body) = send(get_with("/transactions?limit=500", Some(&auth))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "limit must be between 1 and 100");

        let (status, body) = send(get_with("/transactions?page=0", Some(&auth))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "page must be a positive integer");
    }

    #[tokio::test]
    async fn transaction_payload_is_validated() {
        let auth = bearer();
        let req = json_request(
            Method::POST,
            "/transactions",
            Some(&auth),
            r#"{"amount": -4, "type": "expense", "category_id": 1}"#,
        );
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "amount must be positive");
    }

    #[tokio::test]
    async fn malformed_inputs_render_as_bad_request() {
        let auth = bearer();
        let (status, body) = send(get_with("/transactions/abc", Some(&auth))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let req = json_request(Method::POST, "/categories", Some(&auth), "{not json");
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn blank_category_name_is_rejected() {
        let auth = bearer();
        let req = json_request(Method::POST, "/categories", Some(&auth), r#"{"name": "  "}"#);
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "category name is required");
    }

    #[tokio::test]
    async fn register_enforces_password_length() {
        let req = json_request(
            Method::POST,
            "/register",
            None,
            r#"{"username": "alice", "password": "12345"}"#,
        );
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "password must be at least 6 characters");
    }
}

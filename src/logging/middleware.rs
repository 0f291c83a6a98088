use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

/// Severity a completed request is logged at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Quiet,
    Success,
    ClientError,
    ServerError,
}

impl Outcome {
    /// Health probes arrive every few seconds and are only logged at debug.
    pub fn classify(route: &str, status: StatusCode) -> Self {
        if status.is_server_error() {
            Outcome::ServerError
        } else if status.is_client_error() {
            Outcome::ClientError
        } else if route.starts_with("/health") {
            Outcome::Quiet
        } else {
            Outcome::Success
        }
    }
}

pub async fn log_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let req_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;

    match Outcome::classify(&route, status) {
        Outcome::ServerError => tracing::error!(
            request_id = %req_id, method = %method, route = %route,
            status = status.as_u16(), duration_ms, "request failed"
        ),
        Outcome::ClientError => tracing::warn!(
            request_id = %req_id, method = %method, route = %route,
            status = status.as_u16(), duration_ms, "request rejected"
        ),
        Outcome::Success => tracing::info!(
            request_id = %req_id, method = %method, route = %route,
            status = status.as_u16(), duration_ms, "request completed"
        ),
        Outcome::Quiet => tracing::debug!(
            request_id = %req_id, route = %route,
            status = status.as_u16(), duration_ms, "probe"
        ),
    }

    response
}

pub fn request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    #[test]
    fn test_classify() {
        assert_eq!(Outcome::classify("/health/ready", StatusCode::OK), Outcome::Quiet);
        assert_eq!(
            Outcome::classify("/health/ready", StatusCode::SERVICE_UNAVAILABLE),
            Outcome::ServerError
        );
        assert_eq!(Outcome::classify("/api/blocks", StatusCode::CREATED), Outcome::Success);
        assert_eq!(
            Outcome::classify("/api/blocks/{id}", StatusCode::NOT_FOUND),
            Outcome::ClientError
        );
    }

    #[tokio::test]
    async fn test_request_id_is_set_and_propagated() {
        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(propagate_request_id_layer())
            .layer(axum::middleware::from_fn(log_request))
            .layer(request_id_layer());

        let res = app
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("x-request-id"));
    }
}

/**
 * Analytics Routes
 * Page visit tracking for the published site
 */
use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use uuid::Uuid;

use crate::db::models::NewPageVisit;
use crate::routes::ErrorResponse;
use crate::AppState;

const MAX_PAGE_LEN: usize = 2048;

/// Request body for POST /api/analytics/visit
#[derive(Debug, Deserialize, Serialize)]
pub struct TrackVisitRequest {
    pub page: String,
    pub session_id: Option<String>,
    pub referrer: Option<String>,
}

/// Response for POST /api/analytics/visit
#[derive(Debug, Serialize, Deserialize)]
pub struct TrackVisitResponse {
    pub success: bool,
    pub session_id: String,
}

fn header_str(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Client address, preferring the first hop in `X-Forwarded-For`
fn client_ip(headers: &HeaderMap, addr: SocketAddr) -> String {
    header_str(headers, "x-forwarded-for")
        .and_then(|forwarded| forwarded.split(',').next().map(|ip| ip.trim().to_string()))
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| addr.ip().to_string())
}

/// POST /api/analytics/visit
pub async fn track_visit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<TrackVisitRequest>,
) -> Response {
    let page = payload.page.trim();
    if page.is_empty() || page.len() > MAX_PAGE_LEN {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_message(
                "Invalid page",
                "Page must be a non-empty path",
            )),
        )
            .into_response();
    }

    let session_id = payload
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let visit = NewPageVisit {
        session_id,
        page: page.to_string(),
        user_agent: header_str(&headers, header::USER_AGENT),
        referrer: payload
            .referrer
            .or_else(|| header_str(&headers, header::REFERER)),
        ip_address: Some(client_ip(&headers, addr)),
    };

    match state.visits.record(visit).await {
        Ok(visit) => (
            StatusCode::CREATED,
            Json(TrackVisitResponse {
                success: true,
                session_id: visit.session_id,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to record page visit: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to record visit")),
            )
                .into_response()
        }
    }
}

/// GET /api/analytics/summary
pub async fn visit_summary(State(state): State<AppState>) -> Response {
    match state.visits.summary().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            tracing::error!("Failed to load visit summary: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Database error")),
            )
                .into_response()
        }
    }
}

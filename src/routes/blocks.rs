/**
 * Block Routes
 * Editor API over the block repository: list, create, update, delete, reorder
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blocks::{
    Block, BlockContent, BlockError, BlockStyles, BlockType, Direction, OrderAssignment,
};
use crate::routes::{ErrorResponse, SuccessResponse};
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for GET /api/blocks
#[derive(Debug, Serialize)]
pub struct BlockListResponse {
    pub blocks: Vec<Block>,
}

/// Request body for POST /api/blocks
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateBlockRequest {
    pub block_type: BlockType,
    pub block_order: Option<i64>,
    pub content: Option<Value>,
    pub styles: Option<Value>,
}

/// Request body for PUT /api/blocks/{id}
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateBlockRequest {
    pub content: Value,
    pub styles: Value,
}

/// Request body for POST /api/blocks/reorder
#[derive(Debug, Deserialize, Serialize)]
pub struct ReorderRequest {
    pub blocks: Vec<OrderAssignment>,
}

/// Request body for POST /api/blocks/{id}/move
#[derive(Debug, Deserialize, Serialize)]
pub struct MoveRequest {
    pub direction: Option<Direction>,
    pub index: Option<usize>,
}

/// Response for GET /api/blocks/defaults/{block_type}
#[derive(Debug, Serialize)]
pub struct DefaultsResponse {
    pub block_type: BlockType,
    pub content: BlockContent,
    pub styles: BlockStyles,
}

// ============================================================================
// Helpers
// ============================================================================

fn bad_request(error: &str, message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::with_message(error, message)),
    )
        .into_response()
}

/// Map a core error onto an HTTP response.
fn error_response(err: BlockError) -> Response {
    match err {
        BlockError::NotFound(_) => {
            (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found"))).into_response()
        }
        BlockError::MalformedReorder(_) => bad_request("Malformed reorder", err.to_string()),
        BlockError::InvalidContent(_)
        | BlockError::NegativeOrder(_)
        | BlockError::TypeMismatch { .. } => bad_request("Invalid block", err.to_string()),
        BlockError::Persistence(e) => {
            tracing::error!("Database error in block route: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Database error")),
            )
                .into_response()
        }
    }
}

fn decode_content(block_type: BlockType, value: Value) -> Result<BlockContent, Response> {
    BlockContent::from_value(block_type, value)
        .map_err(|e| bad_request("Invalid block content", e.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/blocks - All blocks in render order, legacy content migrated
pub async fn list_blocks(State(state): State<AppState>) -> Response {
    match state.blocks.list_migrated().await {
        Ok(blocks) => (
            StatusCode::OK,
            Json(BlockListResponse { blocks }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/blocks/{id}
pub async fn get_block(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.blocks.get_by_id(id).await {
        Ok(block) => (StatusCode::OK, Json(block)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/blocks/defaults/{block_type} - Starting content for a new block
pub async fn get_defaults(Path(block_type): Path<String>) -> Response {
    let block_type: BlockType = match block_type.parse() {
        Ok(t) => t,
        Err(e) => return bad_request("Invalid block type", format!("{}", e)),
    };

    (
        StatusCode::OK,
        Json(DefaultsResponse {
            block_type,
            content: BlockContent::default_for(block_type),
            styles: BlockStyles::default_for(block_type),
        }),
    )
        .into_response()
}

/// POST /api/blocks - Create a block
///
/// With only `block_type` the block is appended with default content. Any
/// omitted field otherwise falls back to the append position or the defaults.
pub async fn create_block(
    State(state): State<AppState>,
    Json(payload): Json<CreateBlockRequest>,
) -> Response {
    let block_type = payload.block_type;

    let created = if payload.block_order.is_none()
        && payload.content.is_none()
        && payload.styles.is_none()
    {
        state.blocks.append_default(block_type).await
    } else {
        let content = match payload.content {
            Some(value) => match decode_content(block_type, value) {
                Ok(content) => content,
                Err(response) => return response,
            },
            None => BlockContent::default_for(block_type),
        };
        let styles = payload
            .styles
            .map(BlockStyles::from_value)
            .unwrap_or_else(|| BlockStyles::default_for(block_type));

        match payload.block_order {
            Some(order) => match state.blocks.create(block_type, order, content, styles).await {
                Ok(id) => state.blocks.get_by_id(id).await,
                Err(e) => Err(e),
            },
            None => state.blocks.append_with(block_type, content, styles).await,
        }
    };

    match created {
        Ok(block) => (StatusCode::CREATED, Json(block)).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/blocks/{id} - Replace content and styles
pub async fn update_block(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateBlockRequest>,
) -> Response {
    let block_type = match state.blocks.get_by_id(id).await {
        Ok(block) => block.block_type,
        Err(e) => return error_response(e),
    };

    let content = match decode_content(block_type, payload.content) {
        Ok(content) => content,
        Err(response) => return response,
    };
    let styles = BlockStyles::from_value(payload.styles);

    if let Err(e) = state.blocks.update_content(id, content, styles).await {
        return error_response(e);
    }

    match state.blocks.get_by_id(id).await {
        Ok(block) => (StatusCode::OK, Json(block)).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/blocks/{id}
pub async fn delete_block(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.blocks.delete(id).await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/blocks/reorder - Persist the complete new order
pub async fn reorder_blocks(
    State(state): State<AppState>,
    Json(payload): Json<ReorderRequest>,
) -> Response {
    if let Err(e) = state.blocks.reorder_all(&payload.blocks).await {
        return error_response(e);
    }
    list_blocks(State(state)).await
}

/// POST /api/blocks/{id}/move - Up/down step or drag-and-drop index
pub async fn move_block(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<MoveRequest>,
) -> Response {
    let moved = match (payload.direction, payload.index) {
        (Some(direction), None) => state.blocks.move_block(id, direction).await,
        (None, Some(index)) => state.blocks.move_block_to(id, index).await,
        _ => {
            return bad_request(
                "Invalid move",
                "Provide exactly one of `direction` or `index`",
            )
        }
    };

    if let Err(e) = moved {
        return error_response(e);
    }
    list_blocks(State(state)).await
}

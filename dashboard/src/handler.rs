use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use common::{
    models::{EthPrice, Pair, QueryState, Token, TokenDetail},
    Error as CommonError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use store::ViewSnapshot;
use tracing::{debug, info};

use crate::{page::PageRenderer, service::DashboardService, view};

#[derive(Clone)]
pub struct AppState {
    pub service: DashboardService,
    pub pages: Arc<PageRenderer>,
}

// Wrapper so common::Error can be returned from handlers
pub struct ApiError(CommonError);

impl From<CommonError> for ApiError {
    fn from(err: CommonError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            CommonError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            CommonError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            CommonError::UpstreamError(msg) => (StatusCode::BAD_GATEWAY, msg),
            CommonError::GraphQlError(msg) => (StatusCode::BAD_GATEWAY, msg),
            CommonError::ParseError(msg) => (StatusCode::BAD_GATEWAY, msg),
            CommonError::HttpError(e) => (
                StatusCode::BAD_GATEWAY,
                format!("External API request failed: {}", e),
            ),
            CommonError::ConfigError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            CommonError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

// Server-rendered dashboard
pub async fn dashboard_page(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.service.snapshot().await;
    Html(state.pages.render(&view::build(&snapshot)))
}

// Select a token from the grid, then go back to the page
pub async fn select_token(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
) -> Result<Redirect, ApiError> {
    debug!("Selecting token {}", token_id);
    state.service.select_token(&token_id).await?;
    Ok(Redirect::to("/"))
}

// Reset the view and refetch everything, bypassing the cache
pub async fn reload(State(state): State<AppState>) -> Redirect {
    info!("Reload requested");
    // The load settles in the background; the page shows it loading meanwhile.
    let _load = state.service.reload().await;
    Redirect::to("/")
}

pub async fn get_tokens(State(state): State<AppState>) -> Json<QueryState<Vec<Token>>> {
    Json(state.service.snapshot().await.subgraph.tokens)
}

pub async fn get_pairs(State(state): State<AppState>) -> Json<QueryState<Vec<Pair>>> {
    Json(state.service.snapshot().await.subgraph.pairs)
}

pub async fn get_eth_price(State(state): State<AppState>) -> Json<QueryState<EthPrice>> {
    Json(state.service.snapshot().await.subgraph.eth_price)
}

pub async fn get_selection(State(state): State<AppState>) -> Json<ViewSnapshot> {
    Json(state.service.snapshot().await.view)
}

#[derive(Debug, Deserialize)]
pub struct TokenDetailQuery {
    pub block: Option<u64>,
}

// Token data with its pair ids, optionally as of a block
pub async fn get_token_detail(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<TokenDetailQuery>,
) -> Result<Json<TokenDetail>, ApiError> {
    let detail = state.service.token_detail(&address, query.block).await?;
    Ok(Json(detail))
}

//! Ad admission and public search endpoints.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, CreatedAdDto};
use crate::domain::normalize_filter;
use crate::models::ad::{AdInput, Page, SearchResult};

/// `POST /api/v1/ad`
pub async fn create_ad(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AdInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedAdDto>>), ApiError> {
    let Json(input) = payload?;

    let ad = state.ad_service().create_ad(input, Utc::now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedAdDto {
            id: ad.id,
            message: "Ad created successfully".to_string(),
        })),
    ))
}

/// `GET /api/v1/ad`
///
/// `age`, `gender`, `country` and `platform` may repeat; each repetition
/// widens that dimension.
pub async fn search_ads(
    State(state): State<Arc<AppState>>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<ApiResponse<Page<SearchResult>>>, ApiError> {
    let Query(params) = params?;
    let filter = normalize_filter(&params).map_err(|e| ApiError::validation(e.to_string()))?;

    let page = state.ad_service().search_ads(&filter, Utc::now()).await?;

    Ok(Json(ApiResponse::success(page)))
}

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use super::api_types::{
    ContentResponse, MessageResponse, PageResponse, PaginationResponse, StatsResponse,
    TemplateResponse,
};
use super::params::{DateBound, parse_date, parse_optional, parse_required};
use crate::application::ports::{ContentFilter, ContentQuery, ContentSortField};
use crate::application::services::ProcessRequest;
use crate::domain::{ContentId, ContentType, PageRequest, SortOrder, TemplateId};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::error::ApiError;
use crate::presentation::extractors::{ApiJson, ApiQuery, AuthUser};
use crate::presentation::state::AppState;

/// Base64 voice notes are large; applies to the process route only.
pub const PROCESS_BODY_LIMIT: usize = 50 * 1024 * 1024;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessContentRequest {
    pub format_id: String,
    pub content_type: String,
    pub content: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProcessedContentRequest {
    pub processed_content: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListContentParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub template_name: Option<String>,
    pub content_type: Option<String>,
    pub format_id: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl ListContentParams {
    fn into_query(self) -> Result<ContentQuery, ApiError> {
        Ok(ContentQuery {
            filter: ContentFilter {
                content_type: parse_optional::<ContentType>(
                    "contentType",
                    self.content_type.as_deref(),
                )?,
                template_id: parse_optional::<TemplateId>("formatId", self.format_id.as_deref())?,
                search: self.search,
                template_name: self.template_name,
                date_from: parse_date("dateFrom", self.date_from.as_deref(), DateBound::Start)?,
                date_to: parse_date("dateTo", self.date_to.as_deref(), DateBound::End)?,
            },
            page: PageRequest::new(self.page, self.limit),
            sort_by: parse_optional::<ContentSortField>("sortBy", self.sort_by.as_deref())?
                .unwrap_or_default(),
            sort_order: parse_optional::<SortOrder>("sortOrder", self.sort_order.as_deref())?
                .unwrap_or_default(),
        })
    }
}

#[derive(Serialize)]
pub struct FormatContentResponse {
    pub format: TemplateResponse,
    pub data: Vec<ContentResponse>,
    pub pagination: PaginationResponse,
}

#[tracing::instrument(skip(state, claims, request), fields(user_id = %claims.user_id))]
pub async fn process_content_handler(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(request): ApiJson<ProcessContentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content_type: ContentType = parse_required("contentType", &request.content_type)?;
    let template_id: TemplateId = parse_required("formatId", &request.format_id)?;

    if content_type == ContentType::Text {
        tracing::debug!(content = %sanitize_prompt(&request.content), "Processing text content");
    }

    // Cancelled when this future is dropped (client went away) or on shutdown.
    let cancel = state.shutdown.child_token();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let view = state
        .processing_service
        .process(
            claims.user_id,
            ProcessRequest {
                template_id,
                content_type,
                content: request.content,
            },
            &cancel,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ContentResponse::from(view))))
}

#[tracing::instrument(skip(state, claims, params), fields(user_id = %claims.user_id))]
pub async fn list_content_handler(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiQuery(params): ApiQuery<ListContentParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .content_service
        .list(claims.user_id, params.into_query()?)
        .await?;
    Ok(Json(PageResponse::<ContentResponse>::from(page)))
}

#[tracing::instrument(skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn content_stats_handler(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.content_service.stats(claims.user_id).await?;
    Ok(Json(StatsResponse::from(stats)))
}

#[tracing::instrument(skip(state, claims, params), fields(user_id = %claims.user_id))]
pub async fn list_content_by_format_handler(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(format_id): Path<String>,
    ApiQuery(params): ApiQuery<ListContentParams>,
) -> Result<impl IntoResponse, ApiError> {
    let template_id: TemplateId = parse_required("formatId", &format_id)?;
    let (template, page) = state
        .content_service
        .list_by_template(claims.user_id, template_id, params.into_query()?)
        .await?;

    let page = PageResponse::<ContentResponse>::from(page);
    Ok(Json(FormatContentResponse {
        format: template.into(),
        data: page.data,
        pagination: page.pagination,
    }))
}

#[tracing::instrument(skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn get_content_handler(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: ContentId = parse_required("id", &id)?;
    let view = state.content_service.get(claims.user_id, id).await?;
    Ok(Json(ContentResponse::from(view)))
}

#[tracing::instrument(skip(state, claims, request), fields(user_id = %claims.user_id))]
pub async fn update_content_handler(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateProcessedContentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: ContentId = parse_required("id", &id)?;
    let view = state
        .content_service
        .update_processed_text(claims.user_id, id, &request.processed_content)
        .await?;
    Ok(Json(ContentResponse::from(view)))
}

#[tracing::instrument(skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn delete_content_handler(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: ContentId = parse_required("id", &id)?;
    state.content_service.delete(claims.user_id, id).await?;
    Ok(Json(MessageResponse::new(
        "Processed content deleted successfully",
    )))
}

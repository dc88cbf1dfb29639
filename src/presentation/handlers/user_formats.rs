use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use super::api_types::{MessageResponse, PageResponse, TemplateResponse};
use super::params::{parse_optional, parse_required};
use crate::application::ports::{TemplateQuery, TemplateSortField};
use crate::domain::{NewTemplate, PageRequest, SortOrder, TemplateChanges, TemplateId};
use crate::presentation::error::ApiError;
use crate::presentation::extractors::{ApiJson, ApiQuery, AuthUser};
use crate::presentation::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserFormatRequest {
    pub title: String,
    pub description: Option<String>,
    pub instruction: Option<String>,
    pub icon_name: String,
    pub format: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserFormatRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instruction: Option<String>,
    pub icon_name: Option<String>,
    pub format: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListUserFormatsParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListUserFormatsParams {
    fn into_query(self) -> Result<TemplateQuery, ApiError> {
        Ok(TemplateQuery {
            search: self.search,
            page: PageRequest::new(self.page, self.limit),
            sort_by: parse_optional::<TemplateSortField>("sortBy", self.sort_by.as_deref())?
                .unwrap_or_default(),
            sort_order: parse_optional::<SortOrder>("sortOrder", self.sort_order.as_deref())?
                .unwrap_or_default(),
        })
    }
}

#[tracing::instrument(skip(state, claims, request), fields(user_id = %claims.user_id))]
pub async fn create_user_format_handler(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(request): ApiJson<CreateUserFormatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let template = state
        .template_service
        .create(
            claims.user_id,
            NewTemplate {
                title: request.title,
                description: request.description,
                instruction: request.instruction,
                icon_name: request.icon_name,
                format: request.format,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(TemplateResponse::from(template))))
}

#[tracing::instrument(skip(state, claims, params), fields(user_id = %claims.user_id))]
pub async fn list_user_formats_handler(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiQuery(params): ApiQuery<ListUserFormatsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .template_service
        .list(claims.user_id, params.into_query()?)
        .await?;
    Ok(Json(PageResponse::<TemplateResponse>::from(page)))
}

#[tracing::instrument(skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn get_user_format_handler(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: TemplateId = parse_required("id", &id)?;
    let template = state.template_service.get(claims.user_id, id).await?;
    Ok(Json(TemplateResponse::from(template)))
}

#[tracing::instrument(skip(state, claims, request), fields(user_id = %claims.user_id))]
pub async fn update_user_format_handler(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateUserFormatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: TemplateId = parse_required("id", &id)?;
    let template = state
        .template_service
        .update(
            claims.user_id,
            id,
            TemplateChanges {
                title: request.title,
                description: request.description,
                instruction: request.instruction,
                icon_name: request.icon_name,
                format: request.format,
            },
        )
        .await?;
    Ok(Json(TemplateResponse::from(template)))
}

#[tracing::instrument(skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn delete_user_format_handler(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: TemplateId = parse_required("id", &id)?;
    state.template_service.delete(claims.user_id, id).await?;
    Ok(Json(MessageResponse::new("User format deleted successfully")))
}

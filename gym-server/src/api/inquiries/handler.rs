//! Inquiry API Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::inquiry::{FollowUp, Inquiry, InquiryCreate, InquiryUpdate};
use shared::models::PaginatedResponse;
use shared::util::{now_millis, snowflake_id};

use crate::auth::CurrentActor;
use crate::core::ServerState;
use crate::db::query::{Op, QuerySpec, SqlValue};
use crate::db::repository::inquiry as inquiry_repo;
use crate::utils::time::parse_day_start;
use crate::utils::validation::{
    validate_optional_text, validate_required_text, MAX_NAME_LEN, MAX_NOTE_LEN,
    MAX_SHORT_TEXT_LEN,
};

/// Query params for listing inquiries
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// GET /api/inquiries - 获取咨询列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<PaginatedResponse<Inquiry>>> {
    let mut spec = QuerySpec::new("created_at").paginate(query.page, query.limit);

    if let Some(status) = &query.status {
        spec = spec.filter("status", Op::Eq, SqlValue::Text(status.clone()));
    }
    if let Some(search) = &query.search {
        spec = spec.search(vec!["name", "phone", "email"], search);
    }

    let (inquiries, total) = inquiry_repo::find_page(&state.pool, &spec).await?;
    Ok(ApiResponse::success(PaginatedResponse::new(
        inquiries,
        total,
        spec.page(),
        spec.limit(),
    )))
}

/// POST /api/inquiries - 创建咨询
pub async fn create(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<InquiryCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Inquiry>>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.source, "source", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let now = now_millis();
    let tz = state.config.timezone;
    let inquiry = Inquiry {
        id: snowflake_id(),
        name: payload.name.trim().to_string(),
        phone: payload.phone.trim().to_string(),
        email: payload.email,
        source: payload.source,
        status: payload.status.unwrap_or_default(),
        next_follow_up_date: payload
            .next_follow_up_date
            .as_deref()
            .map(|raw| parse_day_start(raw, tz))
            .transpose()?,
        last_contacted_at: None,
        note: payload.note,
        follow_ups: Vec::new(),
        created_by: actor.clone(),
        updated_by: actor,
        created_at: now,
        updated_at: now,
    };

    inquiry_repo::insert(&state.pool, &inquiry).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message("Inquiry created", inquiry)),
    ))
}

/// PUT /api/inquiries/:id - 更新咨询（可附加跟进记录）
pub async fn update(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(payload): Json<InquiryUpdate>,
) -> AppResult<ApiResponse<Inquiry>> {
    let mut inquiry = inquiry_repo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::InquiryNotFound, format!("Inquiry {} not found", id))
        })?;

    let now = now_millis();
    let tz = state.config.timezone;

    if let Some(name) = payload.name {
        validate_required_text(&name, "name", MAX_NAME_LEN)?;
        inquiry.name = name.trim().to_string();
    }
    if let Some(phone) = payload.phone {
        validate_required_text(&phone, "phone", MAX_SHORT_TEXT_LEN)?;
        inquiry.phone = phone.trim().to_string();
    }
    if let Some(email) = payload.email {
        inquiry.email = Some(email);
    }
    if let Some(source) = payload.source {
        validate_optional_text(&Some(source.clone()), "source", MAX_SHORT_TEXT_LEN)?;
        inquiry.source = Some(source);
    }
    if let Some(status) = payload.status {
        inquiry.status = status;
    }
    if let Some(raw) = payload.next_follow_up_date {
        inquiry.next_follow_up_date = Some(parse_day_start(&raw, tz)?);
    }
    if let Some(raw) = payload.last_contacted_at {
        inquiry.last_contacted_at = Some(parse_day_start(&raw, tz)?);
    }
    if let Some(note) = payload.note {
        validate_optional_text(&Some(note.clone()), "note", MAX_NOTE_LEN)?;
        inquiry.note = Some(note);
    }

    if let Some(follow_up) = payload.follow_up {
        validate_optional_text(&follow_up.note, "follow_up.note", MAX_NOTE_LEN)?;
        inquiry.follow_ups.push(FollowUp {
            date: follow_up
                .date
                .as_deref()
                .map(|raw| parse_day_start(raw, tz))
                .transpose()?,
            note: follow_up.note,
            status: follow_up.status.unwrap_or_default(),
            by: actor.clone(),
            created_at: now,
        });
    }

    inquiry.updated_by = actor;
    inquiry.updated_at = now;

    inquiry_repo::save(&state.pool, &inquiry).await?;
    Ok(ApiResponse::success_with_message("Inquiry updated", inquiry))
}

/// DELETE /api/inquiries/:id - 删除咨询
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    if !inquiry_repo::delete(&state.pool, id).await? {
        return Err(AppError::with_message(
            ErrorCode::InquiryNotFound,
            format!("Inquiry {} not found", id),
        ));
    }
    Ok(ApiResponse::success_with_message("Inquiry deleted", ()))
}

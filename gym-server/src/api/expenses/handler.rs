//! Expense API Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::expense::{Expense, ExpenseCreate, ExpenseUpdate};
use shared::models::PaginatedResponse;
use shared::util::{now_millis, snowflake_id};

use crate::auth::CurrentActor;
use crate::core::ServerState;
use crate::db::query::{Op, QuerySpec, SqlValue};
use crate::db::repository::expense as expense_repo;
use crate::utils::time::{day_end_millis, parse_date, parse_day_start};
use crate::utils::validation::{
    validate_amount, validate_optional_text, validate_required_text, MAX_NAME_LEN, MAX_NOTE_LEN,
};

/// Query params for listing expenses
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
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

/// GET /api/expenses - 获取支出列表 (按日期过滤 + 分页)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<PaginatedResponse<Expense>>> {
    let tz = state.config.timezone;
    let mut spec = QuerySpec::new("date").paginate(query.page, query.limit);

    if let Some(from) = &query.start_date {
        spec = spec.filter("date", Op::Gte, SqlValue::Int(parse_day_start(from, tz)?));
    }
    if let Some(to) = &query.end_date {
        let date = parse_date(to)?;
        spec = spec.filter("date", Op::Lte, SqlValue::Int(day_end_millis(date, tz)));
    }

    let (expenses, total) = expense_repo::find_page(&state.pool, &spec).await?;
    Ok(ApiResponse::success(PaginatedResponse::new(
        expenses,
        total,
        spec.page(),
        spec.limit(),
    )))
}

/// POST /api/expenses - 创建支出
pub async fn create(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<ExpenseCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Expense>>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_amount(payload.amount, "amount")?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let now = now_millis();
    let expense = Expense {
        id: snowflake_id(),
        name: payload.name.trim().to_string(),
        amount: payload.amount,
        date: parse_day_start(&payload.date, state.config.timezone)?,
        note: payload.note,
        created_by: actor,
        created_at: now,
        updated_at: now,
    };

    expense_repo::insert(&state.pool, &expense).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            "Expense created successfully",
            expense,
        )),
    ))
}

/// PUT /api/expenses/:id - 更新支出
pub async fn update(
    State(state): State<ServerState>,
    CurrentActor(_actor): CurrentActor,
    Path(id): Path<i64>,
    Json(payload): Json<ExpenseUpdate>,
) -> AppResult<ApiResponse<Expense>> {
    let mut expense = expense_repo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ExpenseNotFound, format!("Expense {} not found", id))
        })?;

    if let Some(name) = payload.name {
        validate_required_text(&name, "name", MAX_NAME_LEN)?;
        expense.name = name.trim().to_string();
    }
    if let Some(amount) = payload.amount {
        validate_amount(amount, "amount")?;
        expense.amount = amount;
    }
    if let Some(date) = payload.date {
        expense.date = parse_day_start(&date, state.config.timezone)?;
    }
    if let Some(note) = payload.note {
        validate_optional_text(&Some(note.clone()), "note", MAX_NOTE_LEN)?;
        expense.note = Some(note);
    }
    expense.updated_at = now_millis();

    expense_repo::save(&state.pool, &expense).await?;
    Ok(ApiResponse::success_with_message("Expense updated", expense))
}

/// DELETE /api/expenses/:id - 删除支出
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    if !expense_repo::delete(&state.pool, id).await? {
        return Err(AppError::with_message(
            ErrorCode::ExpenseNotFound,
            format!("Expense {} not found", id),
        ));
    }
    Ok(ApiResponse::success_with_message("Expense deleted", ()))
}

//! Member API Handlers
//!
//! Thin orchestration over the billing engine: load the aggregate, take the
//! member's write lock, mutate in memory, persist whole on success.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::member::{
    ActivityEntry, AdjustPaymentRequest, ExtendRequest, ManualAdjustmentRequest, Member,
    MemberCreate, MemberStatus, MemberUpdate, PaymentEntry, PaymentRequest, PaymentStatus,
    RestartRequest, StatusChangeRequest,
};
use shared::models::PaginatedResponse;
use shared::util::{now_millis, snowflake_id};

use crate::auth::CurrentActor;
use crate::billing::lifecycle::FreshCycleOptions;
use crate::billing::{adjust, cycle, duration, lifecycle, payments, summary};
use crate::core::ServerState;
use crate::db::query::{Op, QuerySpec, SqlValue};
use crate::db::repository::member as member_repo;
use crate::utils::time::{day_end_millis, parse_date, parse_day_start};
use crate::utils::validation::{
    validate_amount, validate_optional_text, validate_required_text, MAX_EMAIL_LEN, MAX_NAME_LEN,
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN,
};

async fn load_member(state: &ServerState, id: i64) -> AppResult<Member> {
    member_repo::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::with_message(ErrorCode::MemberNotFound, format!("Member {} not found", id)))
}

fn status_label(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Paid => "Paid",
        PaymentStatus::Pending => "Pending",
        PaymentStatus::FreeTrial => "Free Trial",
    }
}

fn validate_contact_fields(
    email: &Option<String>,
    address: &Option<String>,
    health_notes: &Option<String>,
) -> AppResult<()> {
    validate_optional_text(email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(address, "address", MAX_NOTE_LEN)?;
    validate_optional_text(health_notes, "health_notes", MAX_NOTE_LEN)?;
    Ok(())
}

// ── List ────────────────────────────────────────────────────────────

fn default_sort_by() -> String {
    "created_at".to_string()
}

fn default_sort_order() -> String {
    "desc".to_string()
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// Query params for listing members
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub payment_status: Option<String>,
    pub member_status: Option<String>,
    pub membership_type: Option<String>,
    pub personal_trainer: Option<String>,
    pub min_remaining: Option<f64>,
    pub max_remaining: Option<f64>,
    pub min_fee: Option<f64>,
    pub max_fee: Option<f64>,
    pub min_paid: Option<f64>,
    pub max_paid: Option<f64>,
    pub start_from: Option<String>,
    pub start_to: Option<String>,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Member list row, enriched with the latest ledger entry
#[derive(Debug, Serialize)]
pub struct MemberListItem {
    #[serde(flatten)]
    pub member: Member,
    pub last_payment: Option<PaymentEntry>,
}

fn build_list_spec(state: &ServerState, query: &ListQuery) -> AppResult<QuerySpec> {
    let tz = state.config.timezone;
    let sort_field = member_repo::SAFE_SORT_FIELDS
        .iter()
        .find(|f| **f == query.sort_by)
        .copied()
        .unwrap_or("created_at");

    let mut spec = QuerySpec::new("created_at")
        .order_by(sort_field, query.sort_order.to_lowercase() != "asc")
        .paginate(query.page, query.limit)
        .filter_opt(
            "payment_status",
            Op::Eq,
            query.payment_status.clone().map(SqlValue::Text),
        )
        .filter_opt(
            "member_status",
            Op::Eq,
            query.member_status.clone().map(SqlValue::Text),
        )
        .filter_opt(
            "membership_type",
            Op::Eq,
            query.membership_type.clone().map(SqlValue::Text),
        )
        .filter_opt(
            "personal_trainer",
            Op::Eq,
            query.personal_trainer.clone().map(SqlValue::Text),
        )
        .filter_opt("remaining_amount", Op::Gte, query.min_remaining.map(SqlValue::Float))
        .filter_opt("remaining_amount", Op::Lte, query.max_remaining.map(SqlValue::Float))
        .filter_opt("fee", Op::Gte, query.min_fee.map(SqlValue::Float))
        .filter_opt("fee", Op::Lte, query.max_fee.map(SqlValue::Float))
        .filter_opt("paid_amount", Op::Gte, query.min_paid.map(SqlValue::Float))
        .filter_opt("paid_amount", Op::Lte, query.max_paid.map(SqlValue::Float));

    if let Some(from) = &query.start_from {
        spec = spec.filter(
            "start_date",
            Op::Gte,
            SqlValue::Int(parse_day_start(from, tz)?),
        );
    }
    if let Some(to) = &query.start_to {
        let date = parse_date(to)?;
        spec = spec.filter("start_date", Op::Lte, SqlValue::Int(day_end_millis(date, tz)));
    }
    if let Some(search) = &query.search {
        spec = spec.search(vec!["name", "email", "phone", "assigned_trainer"], search);
    }

    Ok(spec)
}

/// GET /api/members - 获取会员列表 (过滤 + 排序 + 分页)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<PaginatedResponse<MemberListItem>>> {
    let spec = build_list_spec(&state, &query)?;
    let (members, total) = member_repo::find_page(&state.pool, &spec).await?;

    let items = members
        .into_iter()
        .map(|member| {
            let last_payment = member.payment_history.last().cloned();
            MemberListItem {
                member,
                last_payment,
            }
        })
        .collect();

    Ok(ApiResponse::success(PaginatedResponse::new(
        items,
        total,
        spec.page(),
        spec.limit(),
    )))
}

// ── Create / Read / Update / Delete ─────────────────────────────────

/// POST /api/members - 创建会员
pub async fn create(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<MemberCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Member>>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_contact_fields(&payload.email, &payload.address, &payload.health_notes)?;
    validate_amount(payload.fee, "fee")?;
    validate_amount(payload.paid_amount, "paid_amount")?;

    let duration = match payload.duration.as_deref() {
        Some(label) => duration::normalize(label)?.to_string(),
        None => "1 Month".to_string(),
    };

    if member_repo::phone_exists(&state.pool, &payload.phone, None).await? {
        return Err(AppError::new(ErrorCode::DuplicatePhone));
    }
    if let Some(email) = &payload.email
        && member_repo::email_exists(&state.pool, email, None).await?
    {
        return Err(AppError::new(ErrorCode::DuplicateEmail));
    }

    let now = now_millis();
    let tz = state.config.timezone;
    let start_date = match payload.start_date.as_deref() {
        Some(raw) => parse_day_start(raw, tz)?,
        None => now,
    };
    let dob = payload
        .dob
        .as_deref()
        .map(|raw| parse_day_start(raw, tz))
        .transpose()?;

    let payment_status =
        if payload.payment_status.as_deref() == Some("Free Trial") && payload.fee == 0.0 {
            PaymentStatus::FreeTrial
        } else {
            PaymentStatus::Pending
        };

    let mut member = Member {
        id: snowflake_id(),
        name: payload.name.trim().to_string(),
        phone: payload.phone.trim().to_string(),
        email: payload.email,
        dob,
        gender: payload.gender,
        address: payload.address,
        emergency_name: payload.emergency_name,
        emergency_phone: payload.emergency_phone,
        health_notes: payload.health_notes,
        membership_type: payload.membership_type.unwrap_or_else(|| "Basic".to_string()),
        start_date,
        registration_date: now,
        duration,
        fee: payload.fee,
        paid_amount: 0.0,
        remaining_amount: payload.fee,
        payment_status,
        member_status: MemberStatus::Active,
        reminder_status: Default::default(),
        promised_payment_date: None,
        inactive_since: None,
        personal_trainer: payload.personal_trainer,
        assigned_trainer: payload.assigned_trainer,
        created_by: actor.clone(),
        updated_by: actor.clone(),
        payment_cycles: Vec::new(),
        payment_history: Vec::new(),
        activity_history: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    cycle::ensure_cycles(&mut member, now);
    if payload.paid_amount > 0.0 {
        // The enrollment path allocates through the engine but does not
        // demand a promise date for a partial first payment
        payments::record_payment(
            &mut member,
            payments::PaymentArgs {
                amount: payload.paid_amount,
                note: payload.payment_note,
                ..Default::default()
            },
            state.config.month_policy,
            &actor,
            now,
        )?;
    } else {
        summary::sync_summary(&mut member);
    }

    member.activity_history.push(ActivityEntry {
        action: "create".to_string(),
        by: actor,
        at: now,
        changes: Some(json!({
            "fee": member.fee,
            "paid_amount": member.paid_amount,
            "remaining_amount": member.remaining_amount,
            "payment_status": status_label(member.payment_status),
        })),
    });

    member_repo::insert(&state.pool, &member).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            "Member created successfully",
            member,
        )),
    ))
}

/// Member detail response (member + derived due-now fields)
#[derive(Debug, Serialize)]
pub struct MemberDetail {
    #[serde(flatten)]
    pub member: Member,
    /// Outstanding balance including overdue-cycle rollover
    pub due_now_amount: f64,
    pub overdue_cycles: u32,
}

fn to_detail(member: Member, now: i64) -> MemberDetail {
    let due_now_amount = summary::due_now_amount(&member, now);
    let overdue_cycles = summary::overdue_cycles(&member, now);
    MemberDetail {
        member,
        due_now_amount,
        overdue_cycles,
    }
}

/// GET /api/members/:id - 获取单个会员（含到期应付）
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<MemberDetail>> {
    let member = load_member(&state, id).await?;
    Ok(ApiResponse::success(to_detail(member, now_millis())))
}

/// PUT /api/members/:id - 更新会员（白名单字段）
pub async fn update(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(payload): Json<MemberUpdate>,
) -> AppResult<ApiResponse<Member>> {
    let _guard = state.lock_member(id).await;
    let mut member = load_member(&state, id).await?;
    let now = now_millis();
    let tz = state.config.timezone;

    let mut diff: HashMap<&'static str, serde_json::Value> = HashMap::new();
    let mut record =
        |field: &'static str, from: serde_json::Value, to: serde_json::Value| {
            if from != to {
                diff.insert(field, json!({ "from": from, "to": to }));
            }
        };

    if let Some(name) = payload.name {
        validate_required_text(&name, "name", MAX_NAME_LEN)?;
        record("name", json!(member.name), json!(name));
        member.name = name.trim().to_string();
    }
    if let Some(phone) = payload.phone {
        validate_required_text(&phone, "phone", MAX_SHORT_TEXT_LEN)?;
        if member_repo::phone_exists(&state.pool, &phone, Some(id)).await? {
            return Err(AppError::new(ErrorCode::DuplicatePhone));
        }
        record("phone", json!(member.phone), json!(phone));
        member.phone = phone.trim().to_string();
    }
    if let Some(email) = payload.email {
        validate_optional_text(&Some(email.clone()), "email", MAX_EMAIL_LEN)?;
        if member_repo::email_exists(&state.pool, &email, Some(id)).await? {
            return Err(AppError::new(ErrorCode::DuplicateEmail));
        }
        record("email", json!(member.email), json!(email));
        member.email = Some(email);
    }
    if let Some(dob) = payload.dob {
        let parsed = parse_day_start(&dob, tz)?;
        record("dob", json!(member.dob), json!(parsed));
        member.dob = Some(parsed);
    }
    if let Some(gender) = payload.gender {
        record("gender", json!(member.gender), json!(gender));
        member.gender = Some(gender);
    }
    if let Some(address) = payload.address {
        validate_optional_text(&Some(address.clone()), "address", MAX_NOTE_LEN)?;
        member.address = Some(address);
    }
    if let Some(emergency_name) = payload.emergency_name {
        validate_optional_text(&Some(emergency_name.clone()), "emergency_name", MAX_NAME_LEN)?;
        member.emergency_name = Some(emergency_name);
    }
    if let Some(emergency_phone) = payload.emergency_phone {
        validate_optional_text(
            &Some(emergency_phone.clone()),
            "emergency_phone",
            MAX_SHORT_TEXT_LEN,
        )?;
        member.emergency_phone = Some(emergency_phone);
    }
    if let Some(health_notes) = payload.health_notes {
        validate_optional_text(&Some(health_notes.clone()), "health_notes", MAX_NOTE_LEN)?;
        member.health_notes = Some(health_notes);
    }
    if let Some(membership_type) = payload.membership_type {
        validate_required_text(&membership_type, "membership_type", MAX_SHORT_TEXT_LEN)?;
        record(
            "membership_type",
            json!(member.membership_type),
            json!(membership_type),
        );
        member.membership_type = membership_type;
    }
    if let Some(trainer) = payload.personal_trainer {
        record(
            "personal_trainer",
            json!(member.personal_trainer),
            json!(trainer),
        );
        member.personal_trainer = Some(trainer);
    }
    if let Some(trainer) = payload.assigned_trainer {
        validate_optional_text(&Some(trainer.clone()), "assigned_trainer", MAX_NAME_LEN)?;
        record(
            "assigned_trainer",
            json!(member.assigned_trainer),
            json!(trainer),
        );
        member.assigned_trainer = Some(trainer);
    }
    if let Some(label) = payload.duration {
        let normalized = duration::normalize(&label)?.to_string();
        record("duration", json!(member.duration), json!(normalized));
        member.duration = normalized;
    }
    if let Some(fee) = payload.fee {
        validate_amount(fee, "fee")?;
        record("fee", json!(member.fee), json!(fee));
        // Fee changes only affect cycles created from here on; existing
        // cycles keep their snapshot
        member.fee = fee;
    }
    if let Some(raw) = payload.start_date {
        let start = parse_day_start(&raw, tz)?;
        record("start_date", json!(member.start_date), json!(start));
        member.start_date = start;
    }

    // While the first cycle is still unfunded the chain is only a label;
    // reseed it so start/fee/duration edits take effect immediately
    let chain_unfunded = member.payment_cycles.len() <= 1
        && member
            .payment_cycles
            .first()
            .map(|c| c.payments.is_empty() && c.paid_amount == 0.0)
            .unwrap_or(true);
    if chain_unfunded
        && (diff.contains_key("fee") || diff.contains_key("duration") || diff.contains_key("start_date"))
    {
        member.payment_cycles.clear();
        cycle::ensure_cycles(&mut member, now);
    }

    if !diff.is_empty() {
        member.activity_history.push(ActivityEntry {
            action: "update".to_string(),
            by: actor.clone(),
            at: now,
            changes: Some(json!(diff)),
        });
    }

    member.updated_by = actor;
    member.updated_at = now;
    summary::sync_summary(&mut member);
    member_repo::save(&state.pool, &member).await?;

    Ok(ApiResponse::success_with_message(
        "Member updated successfully",
        member,
    ))
}

/// DELETE /api/members/:id - 删除会员
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    let _guard = state.lock_member(id).await;
    if !member_repo::delete(&state.pool, id).await? {
        return Err(AppError::with_message(
            ErrorCode::MemberNotFound,
            format!("Member {} not found", id),
        ));
    }
    Ok(ApiResponse::success_with_message(
        "Member deleted successfully",
        (),
    ))
}

// ── Billing operations ──────────────────────────────────────────────

/// POST /api/members/:id/pay - 记录支付
pub async fn pay(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentRequest>,
) -> AppResult<ApiResponse<MemberDetail>> {
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.payment_mode, "payment_mode", MAX_SHORT_TEXT_LEN)?;

    let _guard = state.lock_member(id).await;
    let mut member = load_member(&state, id).await?;
    let now = now_millis();
    let tz = state.config.timezone;

    let promise_date = payload
        .promise_date
        .as_deref()
        .map(|raw| parse_day_start(raw, tz))
        .transpose()?;

    payments::record_payment(
        &mut member,
        payments::PaymentArgs {
            amount: payload.amount,
            payment_month: payload.payment_month,
            payment_mode: payload.payment_mode,
            note: payload.note,
            promise_date,
            require_promise_for_partial: true,
        },
        state.config.month_policy,
        &actor,
        now,
    )?;

    member.updated_by = actor;
    member.updated_at = now;
    member_repo::save(&state.pool, &member).await?;

    Ok(ApiResponse::success_with_message(
        "Payment recorded",
        to_detail(member, now),
    ))
}

/// PUT /api/members/:id/payment-history/:index - 调整历史支付
pub async fn adjust_payment(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path((id, index)): Path<(i64, usize)>,
    Json(payload): Json<AdjustPaymentRequest>,
) -> AppResult<ApiResponse<MemberDetail>> {
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let _guard = state.lock_member(id).await;
    let mut member = load_member(&state, id).await?;
    let now = now_millis();

    adjust::adjust_history_entry(
        &mut member,
        index,
        payload.amount,
        &actor,
        payload.note.as_deref(),
        now,
    )?;

    member.updated_by = actor;
    member.updated_at = now;
    member_repo::save(&state.pool, &member).await?;

    Ok(ApiResponse::success_with_message(
        "Payment adjusted",
        to_detail(member, now),
    ))
}

/// DELETE /api/members/:id/payment-history/:index - 删除历史支付（冲销）
pub async fn delete_payment(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path((id, index)): Path<(i64, usize)>,
) -> AppResult<ApiResponse<MemberDetail>> {
    let _guard = state.lock_member(id).await;
    let mut member = load_member(&state, id).await?;
    let now = now_millis();

    adjust::delete_history_entry(&mut member, index, &actor, None, now)?;

    member.updated_by = actor;
    member.updated_at = now;
    member_repo::save(&state.pool, &member).await?;

    Ok(ApiResponse::success_with_message(
        "Payment entry deleted",
        to_detail(member, now),
    ))
}

/// POST /api/members/:id/adjustments - 手动调整
pub async fn manual_adjustment(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(payload): Json<ManualAdjustmentRequest>,
) -> AppResult<ApiResponse<MemberDetail>> {
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let _guard = state.lock_member(id).await;
    let mut member = load_member(&state, id).await?;
    let now = now_millis();

    adjust::apply_manual_adjustment(&mut member, payload.amount, &actor, payload.note, now)?;

    member.updated_by = actor;
    member.updated_at = now;
    member_repo::save(&state.pool, &member).await?;

    Ok(ApiResponse::success_with_message(
        "Adjustment applied",
        to_detail(member, now),
    ))
}

// ── Lifecycle ───────────────────────────────────────────────────────

fn fresh_options(
    state: &ServerState,
    start_date: Option<String>,
    fee: Option<f64>,
    duration: Option<String>,
    clear_dues: bool,
) -> AppResult<FreshCycleOptions> {
    let start = start_date
        .as_deref()
        .map(|raw| parse_day_start(raw, state.config.timezone))
        .transpose()?;
    Ok(FreshCycleOptions {
        start_date: start,
        fee,
        duration,
        clear_dues,
    })
}

/// PUT /api/members/:id/status - 状态切换 (暂停/恢复/重新开卡)
pub async fn change_status(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(payload): Json<StatusChangeRequest>,
) -> AppResult<ApiResponse<MemberDetail>> {
    let _guard = state.lock_member(id).await;
    let mut member = load_member(&state, id).await?;
    let now = now_millis();

    let fresh = if payload.fresh_cycle {
        Some(fresh_options(
            &state,
            payload.start_date,
            payload.fee,
            payload.duration,
            payload.clear_dues,
        )?)
    } else {
        None
    };

    lifecycle::set_status(&mut member, payload.status, fresh, &actor, now)?;

    member.updated_at = now;
    member_repo::save(&state.pool, &member).await?;

    Ok(ApiResponse::success_with_message(
        "Member status updated",
        to_detail(member, now),
    ))
}

/// POST /api/members/:id/restart - 重新开卡（新周期）
pub async fn restart(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(payload): Json<RestartRequest>,
) -> AppResult<ApiResponse<MemberDetail>> {
    let _guard = state.lock_member(id).await;
    let mut member = load_member(&state, id).await?;
    let now = now_millis();

    let opts = fresh_options(
        &state,
        payload.start_date,
        payload.fee,
        payload.duration,
        payload.clear_dues,
    )?;
    lifecycle::restart(&mut member, opts, &actor, now)?;

    member.updated_at = now;
    member_repo::save(&state.pool, &member).await?;

    Ok(ApiResponse::success_with_message(
        "Membership restarted",
        to_detail(member, now),
    ))
}

/// POST /api/members/:id/extend - 延长当前周期
pub async fn extend(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(payload): Json<ExtendRequest>,
) -> AppResult<ApiResponse<MemberDetail>> {
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let _guard = state.lock_member(id).await;
    let mut member = load_member(&state, id).await?;
    let now = now_millis();

    lifecycle::extend_current_cycle(&mut member, payload.days, payload.note, &actor, now)?;

    member.updated_at = now;
    member_repo::save(&state.pool, &member).await?;

    Ok(ApiResponse::success_with_message(
        "Cycle extended",
        to_detail(member, now),
    ))
}

// ── Dashboard ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DueSoonMember {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub remaining_amount: f64,
    pub end_date: i64,
}

#[derive(Debug, Default, Serialize)]
pub struct DashboardStats {
    pub total_members: u64,
    pub active_members: u64,
    pub total_fee: f64,
    pub total_paid: f64,
    pub total_remaining: f64,
    pub total_due_now: f64,
    pub pending_count: u64,
    pub due_next_week_count: u64,
    pub payment_status_counts: HashMap<String, u64>,
    pub membership_type_counts: HashMap<String, u64>,
    pub due_next_week_members: Vec<DueSoonMember>,
}

/// GET /api/members/dashboard - 会员统计
pub async fn dashboard(
    State(state): State<ServerState>,
) -> AppResult<ApiResponse<DashboardStats>> {
    use crate::billing::money;

    let members = member_repo::find_all(&state.pool).await?;
    let now = now_millis();
    let next_week = now + crate::billing::calendar::days_to_ms(7);

    let mut stats = DashboardStats::default();

    for member in &members {
        stats.total_members += 1;
        if member.member_status == MemberStatus::Active {
            stats.active_members += 1;
        }

        stats.total_fee = money::add(stats.total_fee, member.fee);
        stats.total_paid = money::add(stats.total_paid, member.paid_amount);
        stats.total_remaining = money::add(stats.total_remaining, member.remaining_amount);
        stats.total_due_now = money::add(stats.total_due_now, summary::due_now_amount(member, now));

        if !money::is_settled(member.remaining_amount) {
            stats.pending_count += 1;
        }

        *stats
            .payment_status_counts
            .entry(status_label(member.payment_status).to_string())
            .or_insert(0) += 1;
        *stats
            .membership_type_counts
            .entry(member.membership_type.clone())
            .or_insert(0) += 1;

        if let Some(cycle) = member.current_cycle()
            && cycle.end_date >= now
            && cycle.end_date <= next_week
        {
            stats.due_next_week_count += 1;
            stats.due_next_week_members.push(DueSoonMember {
                id: member.id,
                name: member.name.clone(),
                phone: member.phone.clone(),
                remaining_amount: member.remaining_amount,
                end_date: cycle.end_date,
            });
        }
    }

    stats.due_next_week_members.sort_by_key(|m| m.end_date);
    stats.due_next_week_members.truncate(8);

    Ok(ApiResponse::success(stats))
}

//! Member Repository
//!
//! The aggregate is saved whole on every mutation; readers get a fully
//! hydrated [`Member`] including cycles, ledger and activity log.

use sqlx::{Row, SqlitePool};
use sqlx::sqlite::SqliteRow;

use shared::models::member::Member;

use super::{enum_from_text, enum_to_text, from_json, to_json, RepoError, RepoResult};
use crate::db::query::{bind_values, QuerySpec};

/// Sort fields the list endpoint may use
pub const SAFE_SORT_FIELDS: [&str; 6] = [
    "created_at",
    "name",
    "fee",
    "paid_amount",
    "remaining_amount",
    "start_date",
];

fn member_from_row(row: &SqliteRow) -> RepoResult<Member> {
    let gender: Option<String> = row.try_get("gender")?;
    Ok(Member {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        dob: row.try_get("dob")?,
        gender: gender
            .as_deref()
            .map(|g| enum_from_text(g, "gender"))
            .transpose()?,
        address: row.try_get("address")?,
        emergency_name: row.try_get("emergency_name")?,
        emergency_phone: row.try_get("emergency_phone")?,
        health_notes: row.try_get("health_notes")?,
        membership_type: row.try_get("membership_type")?,
        start_date: row.try_get("start_date")?,
        registration_date: row.try_get("registration_date")?,
        duration: row.try_get("duration")?,
        fee: row.try_get("fee")?,
        paid_amount: row.try_get("paid_amount")?,
        remaining_amount: row.try_get("remaining_amount")?,
        payment_status: enum_from_text(row.try_get::<&str, _>("payment_status")?, "payment_status")?,
        member_status: enum_from_text(row.try_get::<&str, _>("member_status")?, "member_status")?,
        reminder_status: enum_from_text(
            row.try_get::<&str, _>("reminder_status")?,
            "reminder_status",
        )?,
        promised_payment_date: row.try_get("promised_payment_date")?,
        inactive_since: row.try_get("inactive_since")?,
        personal_trainer: row.try_get("personal_trainer")?,
        assigned_trainer: row.try_get("assigned_trainer")?,
        created_by: from_json(row.try_get::<&str, _>("created_by")?, "created_by")?,
        updated_by: from_json(row.try_get::<&str, _>("updated_by")?, "updated_by")?,
        payment_cycles: from_json(row.try_get::<&str, _>("payment_cycles")?, "payment_cycles")?,
        payment_history: from_json(
            row.try_get::<&str, _>("payment_history")?,
            "payment_history",
        )?,
        activity_history: from_json(
            row.try_get::<&str, _>("activity_history")?,
            "activity_history",
        )?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn insert(pool: &SqlitePool, member: &Member) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO member (id, name, phone, email, dob, gender, address, emergency_name, \
         emergency_phone, health_notes, membership_type, start_date, registration_date, duration, \
         fee, paid_amount, remaining_amount, payment_status, member_status, reminder_status, \
         promised_payment_date, inactive_since, personal_trainer, assigned_trainer, created_by, \
         updated_by, payment_cycles, payment_history, activity_history, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(member.id)
    .bind(&member.name)
    .bind(&member.phone)
    .bind(&member.email)
    .bind(member.dob)
    .bind(
        member
            .gender
            .as_ref()
            .map(|g| enum_to_text(g, "gender"))
            .transpose()?,
    )
    .bind(&member.address)
    .bind(&member.emergency_name)
    .bind(&member.emergency_phone)
    .bind(&member.health_notes)
    .bind(&member.membership_type)
    .bind(member.start_date)
    .bind(member.registration_date)
    .bind(&member.duration)
    .bind(member.fee)
    .bind(member.paid_amount)
    .bind(member.remaining_amount)
    .bind(enum_to_text(&member.payment_status, "payment_status")?)
    .bind(enum_to_text(&member.member_status, "member_status")?)
    .bind(enum_to_text(&member.reminder_status, "reminder_status")?)
    .bind(member.promised_payment_date)
    .bind(member.inactive_since)
    .bind(&member.personal_trainer)
    .bind(&member.assigned_trainer)
    .bind(to_json(&member.created_by, "created_by")?)
    .bind(to_json(&member.updated_by, "updated_by")?)
    .bind(to_json(&member.payment_cycles, "payment_cycles")?)
    .bind(to_json(&member.payment_history, "payment_history")?)
    .bind(to_json(&member.activity_history, "activity_history")?)
    .bind(member.created_at)
    .bind(member.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Whole-aggregate save
pub async fn save(pool: &SqlitePool, member: &Member) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE member SET name = ?, phone = ?, email = ?, dob = ?, gender = ?, address = ?, \
         emergency_name = ?, emergency_phone = ?, health_notes = ?, membership_type = ?, \
         start_date = ?, registration_date = ?, duration = ?, fee = ?, paid_amount = ?, \
         remaining_amount = ?, payment_status = ?, member_status = ?, reminder_status = ?, \
         promised_payment_date = ?, inactive_since = ?, personal_trainer = ?, assigned_trainer = ?, \
         created_by = ?, updated_by = ?, payment_cycles = ?, payment_history = ?, \
         activity_history = ?, created_at = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&member.name)
    .bind(&member.phone)
    .bind(&member.email)
    .bind(member.dob)
    .bind(
        member
            .gender
            .as_ref()
            .map(|g| enum_to_text(g, "gender"))
            .transpose()?,
    )
    .bind(&member.address)
    .bind(&member.emergency_name)
    .bind(&member.emergency_phone)
    .bind(&member.health_notes)
    .bind(&member.membership_type)
    .bind(member.start_date)
    .bind(member.registration_date)
    .bind(&member.duration)
    .bind(member.fee)
    .bind(member.paid_amount)
    .bind(member.remaining_amount)
    .bind(enum_to_text(&member.payment_status, "payment_status")?)
    .bind(enum_to_text(&member.member_status, "member_status")?)
    .bind(enum_to_text(&member.reminder_status, "reminder_status")?)
    .bind(member.promised_payment_date)
    .bind(member.inactive_since)
    .bind(&member.personal_trainer)
    .bind(&member.assigned_trainer)
    .bind(to_json(&member.created_by, "created_by")?)
    .bind(to_json(&member.updated_by, "updated_by")?)
    .bind(to_json(&member.payment_cycles, "payment_cycles")?)
    .bind(to_json(&member.payment_history, "payment_history")?)
    .bind(to_json(&member.activity_history, "activity_history")?)
    .bind(member.created_at)
    .bind(member.updated_at)
    .bind(member.id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Member {} not found", member.id)));
    }
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Member>> {
    let row = sqlx::query("SELECT * FROM member WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(member_from_row).transpose()
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM member WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Duplicate-phone check, optionally excluding one member (for updates)
pub async fn phone_exists(
    pool: &SqlitePool,
    phone: &str,
    exclude_id: Option<i64>,
) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM member WHERE phone = ? AND id != ?",
    )
    .bind(phone)
    .bind(exclude_id.unwrap_or(0))
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Duplicate-email check, optionally excluding one member (for updates)
pub async fn email_exists(
    pool: &SqlitePool,
    email: &str,
    exclude_id: Option<i64>,
) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM member WHERE email = ? AND id != ?",
    )
    .bind(email)
    .bind(exclude_id.unwrap_or(0))
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Filtered, sorted, paginated page plus the total matching count
pub async fn find_page(
    pool: &SqlitePool,
    spec: &QuerySpec,
) -> RepoResult<(Vec<Member>, u64)> {
    let (count_sql, count_values) = spec.to_count("member");
    let total: i64 = bind_values(sqlx::query(&count_sql), count_values)
        .fetch_one(pool)
        .await?
        .try_get(0)?;

    let (sql, values) = spec.to_select("member", "*");
    let rows = bind_values(sqlx::query(&sql), values).fetch_all(pool).await?;
    let members = rows
        .iter()
        .map(member_from_row)
        .collect::<RepoResult<Vec<_>>>()?;

    Ok((members, total as u64))
}

/// All members (dashboard aggregation)
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Member>> {
    let rows = sqlx::query("SELECT * FROM member ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    rows.iter().map(member_from_row).collect()
}

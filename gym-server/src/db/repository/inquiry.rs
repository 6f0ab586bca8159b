//! Inquiry Repository

use sqlx::{Row, SqlitePool};
use sqlx::sqlite::SqliteRow;

use shared::models::inquiry::Inquiry;

use super::{enum_from_text, enum_to_text, from_json, to_json, RepoError, RepoResult};
use crate::db::query::{bind_values, QuerySpec};

fn inquiry_from_row(row: &SqliteRow) -> RepoResult<Inquiry> {
    Ok(Inquiry {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        source: row.try_get("source")?,
        status: enum_from_text(row.try_get::<&str, _>("status")?, "status")?,
        next_follow_up_date: row.try_get("next_follow_up_date")?,
        last_contacted_at: row.try_get("last_contacted_at")?,
        note: row.try_get("note")?,
        follow_ups: from_json(row.try_get::<&str, _>("follow_ups")?, "follow_ups")?,
        created_by: from_json(row.try_get::<&str, _>("created_by")?, "created_by")?,
        updated_by: from_json(row.try_get::<&str, _>("updated_by")?, "updated_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn insert(pool: &SqlitePool, inquiry: &Inquiry) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO inquiry (id, name, phone, email, source, status, next_follow_up_date, \
         last_contacted_at, note, follow_ups, created_by, updated_by, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(inquiry.id)
    .bind(&inquiry.name)
    .bind(&inquiry.phone)
    .bind(&inquiry.email)
    .bind(&inquiry.source)
    .bind(enum_to_text(&inquiry.status, "status")?)
    .bind(inquiry.next_follow_up_date)
    .bind(inquiry.last_contacted_at)
    .bind(&inquiry.note)
    .bind(to_json(&inquiry.follow_ups, "follow_ups")?)
    .bind(to_json(&inquiry.created_by, "created_by")?)
    .bind(to_json(&inquiry.updated_by, "updated_by")?)
    .bind(inquiry.created_at)
    .bind(inquiry.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn save(pool: &SqlitePool, inquiry: &Inquiry) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE inquiry SET name = ?, phone = ?, email = ?, source = ?, status = ?, \
         next_follow_up_date = ?, last_contacted_at = ?, note = ?, follow_ups = ?, \
         updated_by = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&inquiry.name)
    .bind(&inquiry.phone)
    .bind(&inquiry.email)
    .bind(&inquiry.source)
    .bind(enum_to_text(&inquiry.status, "status")?)
    .bind(inquiry.next_follow_up_date)
    .bind(inquiry.last_contacted_at)
    .bind(&inquiry.note)
    .bind(to_json(&inquiry.follow_ups, "follow_ups")?)
    .bind(to_json(&inquiry.updated_by, "updated_by")?)
    .bind(inquiry.updated_at)
    .bind(inquiry.id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Inquiry {} not found",
            inquiry.id
        )));
    }
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Inquiry>> {
    let row = sqlx::query("SELECT * FROM inquiry WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(inquiry_from_row).transpose()
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM inquiry WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn find_page(pool: &SqlitePool, spec: &QuerySpec) -> RepoResult<(Vec<Inquiry>, u64)> {
    let (count_sql, count_values) = spec.to_count("inquiry");
    let total: i64 = bind_values(sqlx::query(&count_sql), count_values)
        .fetch_one(pool)
        .await?
        .try_get(0)?;

    let (sql, values) = spec.to_select("inquiry", "*");
    let rows = bind_values(sqlx::query(&sql), values).fetch_all(pool).await?;
    let inquiries = rows
        .iter()
        .map(inquiry_from_row)
        .collect::<RepoResult<Vec<_>>>()?;

    Ok((inquiries, total as u64))
}

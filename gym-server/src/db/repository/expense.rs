//! Expense Repository

use sqlx::{Row, SqlitePool};
use sqlx::sqlite::SqliteRow;

use shared::models::expense::Expense;

use super::{from_json, to_json, RepoError, RepoResult};
use crate::db::query::{bind_values, QuerySpec};

fn expense_from_row(row: &SqliteRow) -> RepoResult<Expense> {
    Ok(Expense {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        amount: row.try_get("amount")?,
        date: row.try_get("date")?,
        note: row.try_get("note")?,
        created_by: from_json(row.try_get::<&str, _>("created_by")?, "created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn insert(pool: &SqlitePool, expense: &Expense) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO expense (id, name, amount, date, note, created_by, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(expense.id)
    .bind(&expense.name)
    .bind(expense.amount)
    .bind(expense.date)
    .bind(&expense.note)
    .bind(to_json(&expense.created_by, "created_by")?)
    .bind(expense.created_at)
    .bind(expense.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn save(pool: &SqlitePool, expense: &Expense) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE expense SET name = ?, amount = ?, date = ?, note = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&expense.name)
    .bind(expense.amount)
    .bind(expense.date)
    .bind(&expense.note)
    .bind(expense.updated_at)
    .bind(expense.id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Expense {} not found",
            expense.id
        )));
    }
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Expense>> {
    let row = sqlx::query("SELECT * FROM expense WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(expense_from_row).transpose()
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM expense WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn find_page(pool: &SqlitePool, spec: &QuerySpec) -> RepoResult<(Vec<Expense>, u64)> {
    let (count_sql, count_values) = spec.to_count("expense");
    let total: i64 = bind_values(sqlx::query(&count_sql), count_values)
        .fetch_one(pool)
        .await?
        .try_get(0)?;

    let (sql, values) = spec.to_select("expense", "*");
    let rows = bind_values(sqlx::query(&sql), values).fetch_all(pool).await?;
    let expenses = rows
        .iter()
        .map(expense_from_row)
        .collect::<RepoResult<Vec<_>>>()?;

    Ok((expenses, total as u64))
}

//! The only module that knows the `time_records` schema. Rows come out of
//! here as the internal `TimeRecord` model; nothing above this boundary
//! branches on how the table is laid out.

use crate::model::attendance::{RecordKind, TimeRecord};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use sqlx::MySqlPool;

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: u64,
    employee_id: u64,
    date: NaiveDate,
    kind: String,
    start_time: NaiveTime,
    end_time: Option<NaiveTime>,
    note: Option<String>,
}

impl TryFrom<RecordRow> for TimeRecord {
    type Error = anyhow::Error;

    fn try_from(row: RecordRow) -> Result<Self> {
        let kind: RecordKind = row
            .kind
            .parse()
            .with_context(|| format!("record {} has unknown kind {:?}", row.id, row.kind))?;

        Ok(TimeRecord {
            id: row.id,
            employee_id: row.employee_id,
            date: row.date,
            kind,
            start_time: row.start_time,
            end_time: row.end_time,
            note: row.note,
        })
    }
}

fn into_records(rows: Vec<RecordRow>) -> Result<Vec<TimeRecord>> {
    rows.into_iter().map(TimeRecord::try_from).collect()
}

/// All of one employee's records for the store's current date. The database
/// clock decides what "today" is, same as the clock writes below.
pub async fn today_records(pool: &MySqlPool, employee_id: u64) -> Result<Vec<TimeRecord>> {
    let rows = sqlx::query_as::<_, RecordRow>(
        r#"
        SELECT id, employee_id, date, kind, start_time, end_time, note
        FROM time_records
        WHERE employee_id = ?
        AND date = CURDATE()
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    into_records(rows)
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Date(NaiveDate),
    Str(&'a str),
}

/// One employee's records over an inclusive date range, oldest first,
/// optionally narrowed to a single kind.
pub async fn records_in_range(
    pool: &MySqlPool,
    employee_id: u64,
    from: NaiveDate,
    to: NaiveDate,
    kind: Option<RecordKind>,
) -> Result<Vec<TimeRecord>> {
    let mut where_sql = String::from(" WHERE employee_id = ? AND date BETWEEN ? AND ?");
    let mut args = vec![
        FilterValue::U64(employee_id),
        FilterValue::Date(from),
        FilterValue::Date(to),
    ];

    let kind_str;
    if let Some(kind) = kind {
        kind_str = kind.to_string();
        where_sql.push_str(" AND kind = ?");
        args.push(FilterValue::Str(&kind_str));
    }

    let sql = format!(
        r#"
        SELECT id, employee_id, date, kind, start_time, end_time, note
        FROM time_records
        {}
        ORDER BY date, start_time
        "#,
        where_sql
    );

    let mut query = sqlx::query_as::<_, RecordRow>(&sql);
    for arg in args {
        query = match arg {
            FilterValue::U64(v) => query.bind(v),
            FilterValue::Date(d) => query.bind(d),
            FilterValue::Str(s) => query.bind(s.to_owned()),
        };
    }

    into_records(query.fetch_all(pool).await?)
}

/// Open a new interval at the store's current date and time. Returns the
/// new row id.
pub async fn insert_record(
    pool: &MySqlPool,
    employee_id: u64,
    kind: RecordKind,
    note: Option<&str>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO time_records (employee_id, date, kind, start_time, note)
        VALUES (?, CURDATE(), ?, CURTIME(), ?)
        "#,
    )
    .bind(employee_id)
    .bind(kind.to_string())
    .bind(note)
    .execute(pool)
    .await?;

    Ok(result.last_insert_id())
}

/// Close an open interval. The `end_time IS NULL` guard makes the close a
/// no-op if the row was already closed; the caller checks the returned row
/// count. A note passed here overwrites one set at creation.
pub async fn close_record(pool: &MySqlPool, id: u64, note: Option<&str>) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE time_records
        SET end_time = CURTIME(),
            note = COALESCE(?, note)
        WHERE id = ?
        AND end_time IS NULL
        "#,
    )
    .bind(note)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

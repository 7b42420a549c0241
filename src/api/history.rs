use crate::auth::auth::AuthUser;
use crate::clock::ledger::{
    DayGroup, SortOrder, group_by_date, minutes_to_hhmm, month_bounds, range_total, signed_minutes,
    week_bounds,
};
use crate::model::attendance::{RecordKind, TimeRecord};
use crate::store::records;
use crate::utils::name_cache;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Defaults to the caller; other employees need Admin/Inspector.
    pub employee_id: Option<u64>,
    /// Inclusive start; defaults to the first of the current month.
    #[param(value_type = String, format = "date", example = "2026-02-01")]
    pub from: Option<NaiveDate>,
    /// Inclusive end; defaults to the last day of the current month.
    #[param(value_type = String, format = "date", example = "2026-02-28")]
    pub to: Option<NaiveDate>,
    /// Narrow to work or break records only.
    pub kind: Option<RecordKind>,
    /// Date direction of the grouped output; defaults to newest first.
    pub order: Option<SortOrder>,
}

#[derive(Serialize, ToSchema)]
pub struct DayView {
    #[schema(example = "2026-02-02", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub records: Vec<TimeRecord>,
    #[schema(example = 450)]
    pub total_minutes: i64,
    #[schema(example = "07:30")]
    pub total: String,
}

impl From<DayGroup> for DayView {
    fn from(group: DayGroup) -> Self {
        DayView {
            date: group.date,
            total_minutes: group.total_minutes,
            total: minutes_to_hhmm(group.total_minutes),
            records: group.records,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct HistoryResponse {
    #[schema(example = 7)]
    pub employee_id: u64,
    #[schema(example = "2026-02-01", value_type = String, format = "date")]
    pub from: NaiveDate,
    #[schema(example = "2026-02-28", value_type = String, format = "date")]
    pub to: NaiveDate,
    pub days: Vec<DayView>,
    /// Signed; a negative range is data worth inspecting, not hiding.
    #[schema(example = 9000)]
    pub net_minutes: i64,
    #[schema(example = "150:00")]
    pub net: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    Month,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// Defaults to the caller; other employees need Admin/Inspector.
    pub employee_id: Option<u64>,
    /// Calendar window to total over.
    #[param(inline)]
    pub period: Period,
    /// Any date inside the wanted window; defaults to today.
    #[param(value_type = String, format = "date", example = "2026-02-02")]
    pub date: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    #[schema(example = 7)]
    pub employee_id: u64,
    #[schema(example = "2026-02-02", value_type = String, format = "date")]
    pub from: NaiveDate,
    #[schema(example = "2026-02-08", value_type = String, format = "date")]
    pub to: NaiveDate,
    #[schema(example = 2250)]
    pub net_minutes: i64,
    #[schema(example = "37:30")]
    pub net: String,
}

fn resolve_range(query_from: Option<NaiveDate>, query_to: Option<NaiveDate>) -> (NaiveDate, NaiveDate) {
    let (month_from, month_to) = month_bounds(Local::now().date_naive());
    (query_from.unwrap_or(month_from), query_to.unwrap_or(month_to))
}

/// Day-grouped attendance history
#[utoipa::path(
    get,
    path = "/api/v1/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Grouped history with per-day and range totals", body = HistoryResponse),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "History"
)]
pub async fn history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.target_employee(query.employee_id)?;

    let (from, to) = resolve_range(query.from, query.to);
    if from > to {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "from cannot be after to"
        })));
    }

    let rows = records::records_in_range(pool.get_ref(), employee_id, from, to, query.kind)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, employee_id, "Failed to fetch history");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let net_minutes = range_total(&rows);
    let days = group_by_date(rows, query.order.unwrap_or(SortOrder::Desc))
        .into_iter()
        .map(DayView::from)
        .collect();

    Ok(HttpResponse::Ok().json(HistoryResponse {
        employee_id,
        from,
        to,
        days,
        net_minutes,
        net: minutes_to_hhmm(net_minutes),
    }))
}

/// Net total over a calendar week or month
#[utoipa::path(
    get,
    path = "/api/v1/history/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Net minutes over the calendar window", body = SummaryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "History"
)]
pub async fn summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.target_employee(query.employee_id)?;

    let anchor = query.date.unwrap_or_else(|| Local::now().date_naive());
    let (from, to) = match query.period {
        Period::Week => week_bounds(anchor),
        Period::Month => month_bounds(anchor),
    };

    let rows = records::records_in_range(pool.get_ref(), employee_id, from, to, None)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, employee_id, "Failed to fetch summary range");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let net_minutes = range_total(&rows);

    Ok(HttpResponse::Ok().json(SummaryResponse {
        employee_id,
        from,
        to,
        net_minutes,
        net: minutes_to_hhmm(net_minutes),
    }))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// CSV of the grouped history
#[utoipa::path(
    get,
    path = "/api/v1/history/export",
    params(HistoryQuery),
    responses(
        (status = 200, description = "CSV: date, employee, kind, start, end, net minutes, note",
         content_type = "text/csv"),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "History"
)]
pub async fn export(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.target_employee(query.employee_id)?;

    let (from, to) = resolve_range(query.from, query.to);
    if from > to {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "from cannot be after to"
        })));
    }

    let rows = records::records_in_range(pool.get_ref(), employee_id, from, to, query.kind)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, employee_id, "Failed to fetch export range");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let label = name_cache::resolve(pool.get_ref(), employee_id).await;

    // Spreadsheets read oldest-first more naturally, but the caller decides.
    let groups = group_by_date(rows, query.order.unwrap_or(SortOrder::Asc));

    let mut csv = String::from("date,employee,kind,start,end,net_minutes,note\n");
    for group in &groups {
        for record in &group.records {
            let end = record
                .end_time
                .map(|t| t.to_string())
                .unwrap_or_default();
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                record.date,
                csv_field(&label),
                record.kind,
                record.start_time,
                end,
                signed_minutes(record),
                csv_field(record.note.as_deref().unwrap_or("")),
            ));
        }
    }

    let filename = format!("timeclock-{}-{}-{}.csv", employee_id, from, to);

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(csv))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_fields_escape_quotes_and_separators() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }
}

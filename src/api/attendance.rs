use crate::auth::auth::AuthUser;
use crate::clock::gate::{self, ClockAction};
use crate::clock::ledger::{daily_total_as_of, elapsed_hhmm};
use crate::clock::status::{self, Status, evaluate};
use crate::model::attendance::RecordKind;
use crate::store::records;
use crate::utils::clock_lock;
use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct ClockReq {
    /// Optional annotation, set on open and overwritten on close.
    #[schema(example = "site visit", nullable = true)]
    pub note: Option<String>,

    /// Accepted for symmetry with the read endpoints, but clock actions
    /// only ever apply to the caller's own records.
    #[schema(example = 7, nullable = true)]
    pub employee_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct ClockResponse {
    #[schema(example = "working")]
    pub status: Status,

    /// Net minutes today under the live policy; may be negative.
    #[schema(example = 450)]
    pub net_minutes: i64,

    /// Clamped `HH:MM` for the elapsed-today widget.
    #[schema(example = "07:30")]
    pub net: String,

    #[schema(example = "Clocked in")]
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StatusQuery {
    /// Defaults to the caller; other employees need Admin/Inspector.
    pub employee_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "on_break")]
    pub status: Status,

    #[schema(example = 230)]
    pub net_minutes: i64,

    #[schema(example = "03:50")]
    pub net: String,

    /// Start of the interval the current status hangs on, if any.
    #[schema(example = "13:30:00", value_type = String, nullable = true)]
    pub open_since: Option<chrono::NaiveTime>,

    /// An open break with no open work row: surfaced, never auto-repaired.
    #[schema(example = false)]
    pub inconsistent: bool,
}

/// Guard, mutate, re-read. Holds the employee's clock lock for the whole
/// span so a double-submitted action cannot open a second interval.
async fn clock_action(
    auth: &AuthUser,
    pool: &MySqlPool,
    action: ClockAction,
    req: &ClockReq,
    ok_message: &str,
) -> actix_web::Result<HttpResponse> {
    let employee_id = auth.require_employee()?;

    if let Some(target) = req.employee_id {
        if !gate::can_mutate(auth.employee_id, target) {
            return Err(actix_web::error::ErrorForbidden(
                "Clock actions apply only to your own records",
            ));
        }
    }

    let _guard = clock_lock::acquire(employee_id).await;

    let today = records::today_records(pool, employee_id).await.map_err(|e| {
        tracing::error!(error = ?e, employee_id, "Failed to load today's records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // Transition guard: denials are user errors and touch nothing.
    if let Err(denied) = gate::transition_guard(evaluate(&today), action) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": denied.to_string()
        })));
    }

    let note = req.note.as_deref();
    let kind = match action {
        ClockAction::StartWork | ClockAction::EndWork => RecordKind::Work,
        ClockAction::StartBreak | ClockAction::EndBreak => RecordKind::Break,
    };

    match action {
        ClockAction::StartWork | ClockAction::StartBreak => {
            records::insert_record(pool, employee_id, kind, note)
                .await
                .map_err(|e| {
                    tracing::error!(error = ?e, employee_id, %action, "Clock insert failed");
                    actix_web::error::ErrorInternalServerError("Internal Server Error")
                })?;
        }
        ClockAction::EndWork | ClockAction::EndBreak => {
            // The guard passed, so the open row exists in the set just read.
            let open_id = status::open_record(&today, kind)
                .map(|r| r.id)
                .ok_or_else(|| actix_web::error::ErrorInternalServerError("Internal Server Error"))?;

            let affected = records::close_record(pool, open_id, note).await.map_err(|e| {
                tracing::error!(error = ?e, employee_id, %action, "Clock close failed");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

            if affected == 0 {
                return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                    "message": "No open interval found for today"
                })));
            }
        }
    }

    // Re-read so the response reflects what actually landed.
    let today = records::today_records(pool, employee_id).await.map_err(|e| {
        tracing::error!(error = ?e, employee_id, "Failed to re-read today's records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let date = today
        .first()
        .map(|r| r.date)
        .unwrap_or_else(|| Local::now().date_naive());
    let net_minutes = daily_total_as_of(&today, date, Local::now().time());

    Ok(HttpResponse::Ok().json(ClockResponse {
        status: evaluate(&today),
        net_minutes,
        net: elapsed_hhmm(net_minutes),
        message: ok_message.to_string(),
    }))
}

/// Start the day's work interval
#[utoipa::path(
    post,
    path = "/api/v1/clock/start-work",
    request_body = ClockReq,
    responses(
        (status = 200, description = "Clocked in", body = ClockResponse),
        (status = 400, description = "Already clocked in", body = Object, example = json!({
            "message": "Already clocked in"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clock"
)]
pub async fn start_work(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ClockReq>,
) -> actix_web::Result<impl Responder> {
    clock_action(&auth, pool.get_ref(), ClockAction::StartWork, &*payload, "Clocked in").await
}

/// Close the open work interval
#[utoipa::path(
    post,
    path = "/api/v1/clock/end-work",
    request_body = ClockReq,
    responses(
        (status = 200, description = "Clocked out", body = ClockResponse),
        (status = 400, description = "Not clocked in, or a break is still open", body = Object, example = json!({
            "message": "End the break before clocking out"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clock"
)]
pub async fn end_work(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ClockReq>,
) -> actix_web::Result<impl Responder> {
    clock_action(&auth, pool.get_ref(), ClockAction::EndWork, &*payload, "Clocked out").await
}

/// Open a break inside the current work interval
#[utoipa::path(
    post,
    path = "/api/v1/clock/start-break",
    request_body = ClockReq,
    responses(
        (status = 200, description = "Break started", body = ClockResponse),
        (status = 400, description = "Not working, or already on a break", body = Object, example = json!({
            "message": "Already on a break"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clock"
)]
pub async fn start_break(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ClockReq>,
) -> actix_web::Result<impl Responder> {
    clock_action(&auth, pool.get_ref(), ClockAction::StartBreak, &*payload, "Break started").await
}

/// Close the open break
#[utoipa::path(
    post,
    path = "/api/v1/clock/end-break",
    request_body = ClockReq,
    responses(
        (status = 200, description = "Break ended", body = ClockResponse),
        (status = 400, description = "No break in progress", body = Object, example = json!({
            "message": "No break in progress"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clock"
)]
pub async fn end_break(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ClockReq>,
) -> actix_web::Result<impl Responder> {
    clock_action(&auth, pool.get_ref(), ClockAction::EndBreak, &*payload, "Break ended").await
}

/// Current status and live total for today
#[utoipa::path(
    get,
    path = "/api/v1/clock/status",
    params(StatusQuery),
    responses(
        (status = 200, description = "Current attendance state", body = StatusResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clock"
)]
pub async fn clock_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<StatusQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.target_employee(query.employee_id)?;

    let today = records::today_records(pool.get_ref(), employee_id)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, employee_id, "Failed to load today's records");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let current = evaluate(&today);
    let inconsistent = status::is_inconsistent(&today);
    if inconsistent {
        tracing::warn!(employee_id, "Open break without an open work interval");
    }

    let open_since = match current {
        Status::OnBreak => status::open_record(&today, RecordKind::Break).map(|r| r.start_time),
        Status::Working => status::open_record(&today, RecordKind::Work).map(|r| r.start_time),
        Status::Out => None,
    };

    let date = today
        .first()
        .map(|r| r.date)
        .unwrap_or_else(|| Local::now().date_naive());
    let net_minutes = daily_total_as_of(&today, date, Local::now().time());

    Ok(HttpResponse::Ok().json(StatusResponse {
        employee_id,
        status: current,
        net_minutes,
        net: elapsed_hhmm(net_minutes),
        open_since,
        inconsistent,
    }))
}

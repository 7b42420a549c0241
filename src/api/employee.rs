use crate::auth::auth::AuthUser;
use crate::model::employee::Employee;
use crate::store::employees;
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    #[schema(
    example = json!([{
        "id": 7,
        "display_name": "Laura Gómez",
        "email": "laura.gomez@company.com"
    }])
)]
    pub data: Vec<Employee>,
}

/// Employee directory for the record picker
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    responses(
        (status = 200, description = "Employee directory", body = EmployeeListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin/Inspector only"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_view_all()?;

    let employees = employees::list_employees(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = ?e, "Failed to list employees");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse { data: employees }))
}

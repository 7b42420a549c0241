use crate::model::employee::Employee;
use anyhow::Result;
use sqlx::MySqlPool;

/// The whole directory, ordered for display. Small company, no pagination.
pub async fn list_employees(pool: &MySqlPool) -> Result<Vec<Employee>> {
    let employees = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, display_name, email
        FROM employees
        ORDER BY display_name IS NULL, display_name, email
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(employees)
}

pub async fn find_employee(pool: &MySqlPool, id: u64) -> Result<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, display_name, email
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(employee)
}

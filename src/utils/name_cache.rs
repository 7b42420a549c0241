use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

use crate::store::employees::find_employee;

/// employee id => label to render (display name, or email when unnamed)
pub static NAME_CACHE: Lazy<Cache<u64, String>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

pub async fn remember(employee_id: u64, label: String) {
    NAME_CACHE.insert(employee_id, label).await;
}

/// Resolve an employee's display label, hitting the store on a cache miss.
/// Unknown ids render as a numbered placeholder rather than failing a
/// whole history page over one orphaned reference.
pub async fn resolve(pool: &MySqlPool, employee_id: u64) -> String {
    if let Some(label) = NAME_CACHE.get(&employee_id).await {
        return label;
    }

    match find_employee(pool, employee_id).await {
        Ok(Some(employee)) => {
            let label = employee.label().to_owned();
            remember(employee_id, label.clone()).await;
            label
        }
        Ok(None) => format!("employee #{}", employee_id),
        Err(e) => {
            log::warn!("name lookup failed for employee {}: {:?}", employee_id, e);
            format!("employee #{}", employee_id)
        }
    }
}

/// Batch insert a chunk of labels
async fn batch_remember(entries: &[(u64, String)]) {
    let futures: Vec<_> = entries
        .iter()
        .map(|(id, label)| NAME_CACHE.insert(*id, label.clone()))
        .collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;
}

/// Load the whole directory into the in-memory cache (batched)
pub async fn warmup_name_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u64, Option<String>, String)>(
        r#"
        SELECT id, display_name, email
        FROM employees
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (id, display_name, email) = row?;
        batch.push((id, display_name.unwrap_or(email)));
        total_count += 1;

        if batch.len() >= batch_size {
            batch_remember(&batch).await;
            batch.clear();
        }
    }

    // Insert any remaining labels
    if !batch.is_empty() {
        batch_remember(&batch).await;
    }

    log::info!(
        "Employee name cache warmup complete: {} employees",
        total_count
    );

    Ok(())
}

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Interval kind. Work time counts positive in every total, break time
/// negative. Stored as the lowercase string in the `kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Work,
    Break,
}

/// One attendance interval for one employee on one calendar day.
///
/// `end_time` is null while the interval is open and is written exactly once
/// when it closes. Rows are never deleted; closing is the only mutation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 42,
        "employee_id": 7,
        "date": "2026-02-02",
        "kind": "work",
        "start_time": "09:00:00",
        "end_time": "13:00:00",
        "note": null
    })
)]
pub struct TimeRecord {
    #[schema(example = 42)]
    pub id: u64,

    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "2026-02-02", value_type = String, format = "date")]
    pub date: NaiveDate,

    pub kind: RecordKind,

    #[schema(example = "09:00:00", value_type = String)]
    pub start_time: NaiveTime,

    #[schema(example = "13:00:00", value_type = String, nullable = true)]
    pub end_time: Option<NaiveTime>,

    #[schema(example = "site visit", nullable = true)]
    pub note: Option<String>,
}

impl TimeRecord {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kind_round_trips_through_column_string() {
        assert_eq!(RecordKind::Work.to_string(), "work");
        assert_eq!(RecordKind::Break.to_string(), "break");
        assert_eq!(RecordKind::from_str("work").unwrap(), RecordKind::Work);
        assert_eq!(RecordKind::from_str("break").unwrap(), RecordKind::Break);
        assert!(RecordKind::from_str("lunch").is_err());
    }
}

use crate::model::attendance::{RecordKind, TimeRecord};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

/// Where one employee stands right now, derived from today's records alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Out,
    Working,
    OnBreak,
}

/// Derive the current status from the full set of today's records.
///
/// The input may arrive in any order; nothing here depends on which row the
/// store happened to return first. An open Break wins over an open Work row:
/// a break only exists inside a work session, so that is the state to recover
/// toward when the data disagrees with itself.
pub fn evaluate(records: &[TimeRecord]) -> Status {
    if records.iter().any(|r| r.kind == RecordKind::Break && r.is_open()) {
        return Status::OnBreak;
    }
    if records.iter().any(|r| r.kind == RecordKind::Work && r.is_open()) {
        return Status::Working;
    }
    Status::Out
}

/// The single open record of `kind`, if any. Close actions target this row.
pub fn open_record(records: &[TimeRecord], kind: RecordKind) -> Option<&TimeRecord> {
    records.iter().find(|r| r.kind == kind && r.is_open())
}

/// An open Break with no open Work row is a data-entry anomaly. It is
/// reported to the caller, never repaired in place.
pub fn is_inconsistent(records: &[TimeRecord]) -> bool {
    open_record(records, RecordKind::Break).is_some()
        && open_record(records, RecordKind::Work).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn rec(id: u64, kind: RecordKind, start: &str, end: Option<&str>) -> TimeRecord {
        TimeRecord {
            id,
            employee_id: 1,
            date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            kind,
            start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            end_time: end.map(|e| NaiveTime::parse_from_str(e, "%H:%M").unwrap()),
            note: None,
        }
    }

    #[test]
    fn no_records_means_out() {
        assert_eq!(evaluate(&[]), Status::Out);
    }

    #[test]
    fn open_work_means_working() {
        let records = vec![rec(1, RecordKind::Work, "09:00", None)];
        assert_eq!(evaluate(&records), Status::Working);
    }

    #[test]
    fn open_break_means_on_break() {
        let records = vec![
            rec(1, RecordKind::Work, "09:00", None),
            rec(2, RecordKind::Break, "11:00", None),
        ];
        assert_eq!(evaluate(&records), Status::OnBreak);
    }

    #[test]
    fn all_closed_means_out() {
        let records = vec![
            rec(1, RecordKind::Work, "09:00", Some("13:00")),
            rec(2, RecordKind::Break, "11:00", Some("11:15")),
        ];
        assert_eq!(evaluate(&records), Status::Out);
    }

    #[test]
    fn evaluation_ignores_row_order() {
        let mut records = vec![
            rec(1, RecordKind::Work, "09:00", None),
            rec(2, RecordKind::Break, "11:00", None),
        ];
        let forward = evaluate(&records);
        records.reverse();
        assert_eq!(evaluate(&records), forward);
        assert_eq!(forward, Status::OnBreak);
    }

    #[test]
    fn orphan_open_break_still_reports_on_break_and_is_flagged() {
        let records = vec![
            rec(1, RecordKind::Work, "09:00", Some("12:00")),
            rec(2, RecordKind::Break, "11:00", None),
        ];
        assert_eq!(evaluate(&records), Status::OnBreak);
        assert!(is_inconsistent(&records));
    }

    #[test]
    fn consistent_day_is_not_flagged() {
        let records = vec![
            rec(1, RecordKind::Work, "09:00", None),
            rec(2, RecordKind::Break, "11:00", None),
        ];
        assert!(!is_inconsistent(&records));
        assert!(!is_inconsistent(&[]));
    }

    #[test]
    fn open_record_finds_the_open_row_per_kind() {
        let records = vec![
            rec(1, RecordKind::Work, "09:00", Some("13:00")),
            rec(2, RecordKind::Work, "14:00", None),
            rec(3, RecordKind::Break, "11:00", Some("11:30")),
        ];
        assert_eq!(open_record(&records, RecordKind::Work).unwrap().id, 2);
        assert!(open_record(&records, RecordKind::Break).is_none());
    }
}

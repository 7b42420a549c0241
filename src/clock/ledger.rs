use crate::model::attendance::{RecordKind, TimeRecord};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Minutes covered by a closed interval; open intervals count zero here.
///
/// This is the historical-totals policy: a report over past days must not
/// grow while someone is still clocked in. Inverted intervals (end before
/// start) clamp to zero duration instead of going negative.
pub fn interval_minutes(record: &TimeRecord) -> i64 {
    match record.end_time {
        Some(end) => (end - record.start_time).num_minutes().max(0),
        None => 0,
    }
}

/// Live variant: an open interval dated `today` counts the time elapsed
/// since it started. Open intervals on any other date still count zero.
/// This feeds the "worked so far today" display and nothing else.
pub fn interval_minutes_as_of(record: &TimeRecord, today: NaiveDate, now: NaiveTime) -> i64 {
    match record.end_time {
        Some(_) => interval_minutes(record),
        None if record.date == today => (now - record.start_time).num_minutes().max(0),
        None => 0,
    }
}

fn signed(kind: RecordKind, minutes: i64) -> i64 {
    match kind {
        RecordKind::Work => minutes,
        RecordKind::Break => -minutes,
    }
}

/// Work counts positive, break negative.
pub fn signed_minutes(record: &TimeRecord) -> i64 {
    signed(record.kind, interval_minutes(record))
}

pub fn signed_minutes_as_of(record: &TimeRecord, today: NaiveDate, now: NaiveTime) -> i64 {
    signed(record.kind, interval_minutes_as_of(record, today, now))
}

/// Net minutes (work minus break) booked on `date`, closed intervals only.
pub fn daily_total(records: &[TimeRecord], date: NaiveDate) -> i64 {
    records
        .iter()
        .filter(|r| r.date == date)
        .map(signed_minutes)
        .sum()
}

/// Net minutes on `date` including the still-running interval, if any.
pub fn daily_total_as_of(records: &[TimeRecord], date: NaiveDate, now: NaiveTime) -> i64 {
    records
        .iter()
        .filter(|r| r.date == date)
        .map(|r| signed_minutes_as_of(r, date, now))
        .sum()
}

/// Net minutes over an arbitrary pre-filtered set of records.
pub fn range_total(records: &[TimeRecord]) -> i64 {
    records.iter().map(signed_minutes).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[serde(alias = "ascending")]
    Asc,
    #[serde(alias = "descending")]
    Desc,
}

/// One calendar day of history: its records and their net total.
#[derive(Debug, Serialize, ToSchema)]
pub struct DayGroup {
    #[schema(example = "2026-02-02", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub records: Vec<TimeRecord>,
    #[schema(example = 450)]
    pub total_minutes: i64,
}

/// Partition records by exact date, one group per distinct date present.
///
/// The caller picks the direction; there is no default ordering to lean on.
/// Totals use the historical policy (open intervals count zero).
pub fn group_by_date(records: Vec<TimeRecord>, order: SortOrder) -> Vec<DayGroup> {
    let mut by_date: BTreeMap<NaiveDate, Vec<TimeRecord>> = BTreeMap::new();
    for record in records {
        by_date.entry(record.date).or_default().push(record);
    }

    let groups = by_date.into_iter().map(|(date, records)| DayGroup {
        date,
        total_minutes: records.iter().map(signed_minutes).sum(),
        records,
    });

    match order {
        SortOrder::Asc => groups.collect(),
        SortOrder::Desc => {
            let mut v: Vec<DayGroup> = groups.collect();
            v.reverse();
            v
        }
    }
}

/// Monday through Sunday of the week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(6))
}

/// First through last calendar day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).expect("day 1 always exists");
    let next_first = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1).expect("valid date")
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1).expect("valid date")
    };
    (first, next_first - Duration::days(1))
}

/// Zero-padded `HH:MM`; negative totals keep their sign so a report can
/// show a day where breaks exceeded recorded work.
pub fn minutes_to_hhmm(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let m = minutes.abs();
    format!("{}{:02}:{:02}", sign, m / 60, m % 60)
}

/// Display form for elapsed-so-far widgets: clamped at zero.
pub fn elapsed_hhmm(minutes: i64) -> String {
    minutes_to_hhmm(minutes.max(0))
}

/// Strict parse of zero-padded `HH:MM` back to minutes.
pub fn hhmm_to_minutes(s: &str) -> Option<i64> {
    let (h, m) = s.split_once(':')?;
    if h.len() < 2 || m.len() != 2 {
        return None;
    }
    let hours: u32 = h.parse().ok()?;
    let mins: u32 = m.parse().ok()?;
    if mins >= 60 {
        return None;
    }
    Some(hours as i64 * 60 + mins as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(
        id: u64,
        date: &str,
        kind: RecordKind,
        start: &str,
        end: Option<&str>,
    ) -> TimeRecord {
        TimeRecord {
            id,
            employee_id: 1,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            kind,
            start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            end_time: end.map(|e| NaiveTime::parse_from_str(e, "%H:%M").unwrap()),
            note: None,
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    // Full worked day: two work blocks around a half-hour break.
    fn worked_day() -> Vec<TimeRecord> {
        vec![
            rec(1, "2026-02-02", RecordKind::Work, "09:00", Some("13:00")),
            rec(2, "2026-02-02", RecordKind::Break, "13:00", Some("13:30")),
            rec(3, "2026-02-02", RecordKind::Work, "13:30", Some("17:30")),
        ]
    }

    #[test]
    fn worked_day_nets_450_minutes() {
        let total = daily_total(&worked_day(), d("2026-02-02"));
        assert_eq!(total, 450);
        assert_eq!(minutes_to_hhmm(total), "07:30");
        assert_eq!(crate::clock::status::evaluate(&worked_day()), crate::clock::status::Status::Out);
    }

    #[test]
    fn open_interval_counts_zero_historically() {
        let records = vec![rec(1, "2026-02-02", RecordKind::Work, "13:30", None)];
        assert_eq!(interval_minutes(&records[0]), 0);
        assert_eq!(daily_total(&records, d("2026-02-02")), 0);
    }

    #[test]
    fn open_interval_counts_elapsed_time_today() {
        let mut records = worked_day();
        records.push(rec(4, "2026-02-02", RecordKind::Work, "18:00", None));
        let now = t("18:45");
        assert_eq!(daily_total_as_of(&records, d("2026-02-02"), now), 450 + 45);
    }

    #[test]
    fn open_interval_on_another_date_counts_zero_even_live() {
        let record = rec(1, "2026-02-01", RecordKind::Work, "18:00", None);
        assert_eq!(interval_minutes_as_of(&record, d("2026-02-02"), t("09:00")), 0);
    }

    #[test]
    fn inverted_interval_clamps_to_zero() {
        let record = rec(1, "2026-02-02", RecordKind::Work, "15:00", Some("14:00"));
        assert_eq!(interval_minutes(&record), 0);
        let record = rec(2, "2026-02-02", RecordKind::Work, "15:00", None);
        assert_eq!(interval_minutes_as_of(&record, d("2026-02-02"), t("14:00")), 0);
    }

    #[test]
    fn breaks_subtract_and_accumulation_may_go_negative() {
        let records = vec![
            rec(1, "2026-02-02", RecordKind::Work, "09:00", Some("09:30")),
            rec(2, "2026-02-02", RecordKind::Break, "09:30", Some("10:45")),
        ];
        let total = daily_total(&records, d("2026-02-02"));
        assert_eq!(total, -45);
        assert_eq!(minutes_to_hhmm(total), "-00:45");
        assert_eq!(elapsed_hhmm(total), "00:00");
    }

    #[test]
    fn daily_total_is_the_signed_sum_of_intervals() {
        let records = worked_day();
        let by_hand: i64 = records.iter().map(signed_minutes).sum();
        assert_eq!(daily_total(&records, d("2026-02-02")), by_hand);
        for r in &records {
            assert!(interval_minutes(r) >= 0);
        }
    }

    #[test]
    fn group_by_date_partitions_without_loss_or_duplication() {
        let records = vec![
            rec(1, "2026-02-02", RecordKind::Work, "09:00", Some("13:00")),
            rec(2, "2026-02-04", RecordKind::Work, "09:00", Some("12:00")),
            rec(3, "2026-02-02", RecordKind::Break, "13:00", Some("13:30")),
            rec(4, "2026-02-03", RecordKind::Work, "10:00", Some("11:00")),
        ];
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();

        let groups = group_by_date(records, SortOrder::Asc);
        let dates: Vec<NaiveDate> = groups.iter().map(|g| g.date).collect();
        assert_eq!(dates, vec![d("2026-02-02"), d("2026-02-03"), d("2026-02-04")]);

        let mut grouped_ids: Vec<u64> = groups
            .iter()
            .flat_map(|g| g.records.iter().map(|r| r.id))
            .collect();
        grouped_ids.sort();
        assert_eq!(grouped_ids, ids);

        for g in &groups {
            assert!(g.records.iter().all(|r| r.date == g.date));
        }
        assert_eq!(groups[0].total_minutes, 240 - 30);
    }

    #[test]
    fn group_order_is_chosen_by_the_caller() {
        let records = vec![
            rec(1, "2026-02-02", RecordKind::Work, "09:00", Some("10:00")),
            rec(2, "2026-02-04", RecordKind::Work, "09:00", Some("10:00")),
        ];
        let asc = group_by_date(records.clone(), SortOrder::Asc);
        assert_eq!(asc.first().unwrap().date, d("2026-02-02"));
        let desc = group_by_date(records, SortOrder::Desc);
        assert_eq!(desc.first().unwrap().date, d("2026-02-04"));
    }

    #[test]
    fn range_total_sums_the_filtered_set() {
        let records = vec![
            rec(1, "2026-02-02", RecordKind::Work, "09:00", Some("17:00")),
            rec(2, "2026-02-03", RecordKind::Work, "09:00", Some("17:00")),
            rec(3, "2026-02-03", RecordKind::Break, "13:00", Some("14:00")),
        ];
        assert_eq!(range_total(&records), 480 + 480 - 60);
    }

    #[test]
    fn week_runs_monday_through_sunday() {
        // 2026-02-04 is a Wednesday.
        let (from, to) = week_bounds(d("2026-02-04"));
        assert_eq!(from, d("2026-02-02"));
        assert_eq!(to, d("2026-02-08"));
        // A Monday is its own week start, a Sunday its own week end.
        assert_eq!(week_bounds(d("2026-02-02")).0, d("2026-02-02"));
        assert_eq!(week_bounds(d("2026-02-08")).1, d("2026-02-08"));
    }

    #[test]
    fn month_runs_first_through_last_day() {
        assert_eq!(month_bounds(d("2026-02-15")), (d("2026-02-01"), d("2026-02-28")));
        assert_eq!(month_bounds(d("2026-12-31")), (d("2026-12-01"), d("2026-12-31")));
        assert_eq!(month_bounds(d("2028-02-10")).1, d("2028-02-29"));
    }

    #[test]
    fn hhmm_round_trips() {
        for input in ["00:00", "07:30", "09:05", "23:59", "40:00"] {
            let minutes = hhmm_to_minutes(input).unwrap();
            assert_eq!(minutes_to_hhmm(minutes), input);
        }
    }

    #[test]
    fn hhmm_rejects_malformed_input() {
        for input in ["", "0730", "7:5", "07:60", "07:-1", "ab:cd"] {
            assert!(hhmm_to_minutes(input).is_none(), "accepted {:?}", input);
        }
    }
}

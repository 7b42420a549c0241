use crate::clock::status::Status;
use crate::model::role::Role;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The four clock mutations the presentation layer can request.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    ToSchema,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ClockAction {
    StartWork,
    EndWork,
    StartBreak,
    EndBreak,
}

/// A clock action rejected by the state machine. Rendered as the
/// user-facing validation message; the store is never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(fmt = "{}", "self.reason()")]
pub struct TransitionDenied {
    pub action: ClockAction,
    pub status: Status,
}

impl TransitionDenied {
    pub fn reason(&self) -> &'static str {
        match (self.action, self.status) {
            (ClockAction::StartWork, Status::Working) => "Already clocked in",
            (ClockAction::StartWork, Status::OnBreak) => "Already clocked in and on a break",
            (ClockAction::EndWork, Status::Out) => "Not clocked in",
            (ClockAction::EndWork, Status::OnBreak) => "End the break before clocking out",
            (ClockAction::StartBreak, Status::Out) => "Cannot start a break while clocked out",
            (ClockAction::StartBreak, Status::OnBreak) => "Already on a break",
            (ClockAction::EndBreak, Status::Out) | (ClockAction::EndBreak, Status::Working) => {
                "No break in progress"
            }
            _ => "Action not allowed in the current state",
        }
    }
}

/// Per-day state machine:
///
/// ```text
/// Out --start-work--> Working
/// Working --start-break--> OnBreak
/// OnBreak --end-break--> Working
/// Working --end-work--> Out
/// ```
///
/// `Out` opens and closes the day's cycle, and the cycle may repeat within
/// a day. Checked before any store mutation is attempted.
pub fn transition_guard(status: Status, action: ClockAction) -> Result<(), TransitionDenied> {
    let allowed = matches!(
        (status, action),
        (Status::Out, ClockAction::StartWork)
            | (Status::Working, ClockAction::EndWork)
            | (Status::Working, ClockAction::StartBreak)
            | (Status::OnBreak, ClockAction::EndBreak)
    );

    if allowed {
        Ok(())
    } else {
        Err(TransitionDenied { action, status })
    }
}

/// Clock mutations always apply to one's own records; Admin and Inspector
/// get read access elsewhere, not write access here.
pub fn can_mutate(identity_employee_id: Option<u64>, target_employee_id: u64) -> bool {
    identity_employee_id == Some(target_employee_id)
}

/// Whether the role may view and query other employees' records.
pub fn can_view_all(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Inspector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::status::{evaluate, open_record};
    use crate::model::attendance::{RecordKind, TimeRecord};
    use chrono::{NaiveDate, NaiveTime};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
    }

    // Replay helper: apply a permitted action to an in-memory record set the
    // same way the handlers mutate the store.
    fn apply(records: &mut Vec<TimeRecord>, action: ClockAction, at: NaiveTime) {
        let kind = match action {
            ClockAction::StartWork | ClockAction::EndWork => RecordKind::Work,
            ClockAction::StartBreak | ClockAction::EndBreak => RecordKind::Break,
        };
        match action {
            ClockAction::StartWork | ClockAction::StartBreak => {
                let id = records.len() as u64 + 1;
                records.push(TimeRecord {
                    id,
                    employee_id: 1,
                    date: day(),
                    kind,
                    start_time: at,
                    end_time: None,
                    note: None,
                });
            }
            ClockAction::EndWork | ClockAction::EndBreak => {
                let id = open_record(records, kind).unwrap().id;
                let rec = records.iter_mut().find(|r| r.id == id).unwrap();
                rec.end_time = Some(at);
            }
        }
    }

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    #[test]
    fn replayed_action_sequences_match_the_machine() {
        use ClockAction::*;
        use Status::*;

        // (action, state the machine lands in)
        let script = [
            (StartWork, Working, "09:00"),
            (StartBreak, OnBreak, "11:00"),
            (EndBreak, Working, "11:15"),
            (EndWork, Out, "13:00"),
            // second cycle on the same day
            (StartWork, Working, "14:00"),
            (EndWork, Out, "17:30"),
        ];

        let mut records = Vec::new();
        assert_eq!(evaluate(&records), Out);

        for (action, expected, at) in script {
            transition_guard(evaluate(&records), action).unwrap();
            apply(&mut records, action, t(at));
            assert_eq!(evaluate(&records), expected, "after {}", action);
        }

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.end_time.is_some()));
    }

    #[test]
    fn end_work_is_denied_on_break_and_nothing_mutates() {
        let mut records = Vec::new();
        apply(&mut records, ClockAction::StartWork, t("09:00"));
        apply(&mut records, ClockAction::StartBreak, t("11:00"));

        let before = records.clone();
        let denied = transition_guard(evaluate(&records), ClockAction::EndWork).unwrap_err();
        assert_eq!(denied.action, ClockAction::EndWork);
        assert_eq!(denied.status, Status::OnBreak);
        assert_eq!(denied.to_string(), "End the break before clocking out");

        // Guard failed, so the caller never applies; the record set is as it was.
        assert_eq!(records.len(), before.len());
        assert!(open_record(&records, RecordKind::Break).is_some());
    }

    #[test]
    fn full_transition_matrix() {
        use ClockAction::*;
        use Status::*;

        let allowed = [
            (Out, StartWork),
            (Working, EndWork),
            (Working, StartBreak),
            (OnBreak, EndBreak),
        ];

        for status in [Out, Working, OnBreak] {
            for action in [StartWork, EndWork, StartBreak, EndBreak] {
                let verdict = transition_guard(status, action);
                if allowed.contains(&(status, action)) {
                    assert!(verdict.is_ok(), "{status:?} + {action:?}");
                } else {
                    assert!(verdict.is_err(), "{status:?} + {action:?}");
                }
            }
        }
    }

    #[test]
    fn denial_reasons_are_user_facing() {
        let denied = transition_guard(Status::Working, ClockAction::StartWork).unwrap_err();
        assert_eq!(denied.to_string(), "Already clocked in");
        let denied = transition_guard(Status::Out, ClockAction::EndBreak).unwrap_err();
        assert_eq!(denied.to_string(), "No break in progress");
    }

    #[test]
    fn mutation_is_self_only() {
        assert!(can_mutate(Some(7), 7));
        assert!(!can_mutate(Some(7), 8));
        assert!(!can_mutate(None, 7));
    }

    #[test]
    fn admins_and_inspectors_view_all() {
        assert!(can_view_all(Role::Admin));
        assert!(can_view_all(Role::Inspector));
        assert!(!can_view_all(Role::Employee));
    }
}

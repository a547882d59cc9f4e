use chrono_tz::Tz;

use crate::clock::{DEFAULT_IST_TIME, utc_to_ist_or};
use crate::datetime::{display_timezone, format_civil_date};
use crate::repetition::RepetitionConfig;
use crate::task::{Task, TaskType};

pub const NO_SCHEDULE: &str = "No schedule";

/// One-line schedule text shown next to a recurring task, with the
/// stored UTC time rendered in IST. Unreadable times show as
/// [`DEFAULT_IST_TIME`].
///
/// Monthly schedules always use a literal `th` suffix ("1th", "21th").
/// Existing dashboards and exports match on that exact string, so it is
/// reproduced as-is.
pub fn describe(config: &RepetitionConfig) -> String {
    describe_with_fallback(config, DEFAULT_IST_TIME)
}

/// [`describe`] with the IST time to show when the stored one is missing
/// or unreadable.
#[tracing::instrument(level = "trace", fields(kind = config.kind()))]
pub fn describe_with_fallback(config: &RepetitionConfig, fallback: &str) -> String {
    let at = || utc_to_ist_or(config.at_time().unwrap_or(""), fallback);

    match config {
        RepetitionConfig::Interval { days, .. } => {
            format!("Every {days} days at {}", at())
        }
        RepetitionConfig::Weekly { on_days, .. } => {
            let days = on_days
                .iter()
                .map(|day| day.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!("Every {days} of the week at {}", at())
        }
        RepetitionConfig::Monthly { on_date, .. } => {
            format!("On day {on_date}th of every month at {}", at())
        }
        RepetitionConfig::None
        | RepetitionConfig::Unrecognized { .. }
        | RepetitionConfig::Malformed { .. } => NO_SCHEDULE.to_string(),
    }
}

/// Schedule text for any task: ad-hoc tasks show their IST due date.
pub fn describe_task(task: &Task) -> String {
    describe_task_in(task, display_timezone(), DEFAULT_IST_TIME)
}

/// Schedule text for a table shown in `tz`. Ad-hoc due dates use the
/// civil date in `tz`. Repetition times are always IST, so they carry an
/// `IST` label whenever `tz` is some other zone.
pub fn describe_task_in(task: &Task, tz: Tz, fallback: &str) -> String {
    match task.task_type {
        TaskType::Adhoc => task
            .due_date
            .map(|due| format!("Due on {}", format_civil_date(due, tz)))
            .unwrap_or_else(|| "No due date".to_string()),
        TaskType::Recurring => match task.repetition_config.as_ref() {
            Some(config) if shows_time(config) && tz != display_timezone() => {
                format!("{} IST", describe_with_fallback(config, fallback))
            }
            Some(config) => describe_with_fallback(config, fallback),
            None => NO_SCHEDULE.to_string(),
        },
    }
}

fn shows_time(config: &RepetitionConfig) -> bool {
    matches!(
        config,
        RepetitionConfig::Interval { .. }
            | RepetitionConfig::Weekly { .. }
            | RepetitionConfig::Monthly { .. }
    )
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{describe, describe_task, describe_task_in, describe_with_fallback};
    use crate::repetition::{RepetitionConfig, WeekdayCode};
    use crate::task::{Task, TaskType};

    fn at(time: &str) -> Option<String> {
        Some(time.to_string())
    }

    #[test]
    fn describes_interval() {
        let config = RepetitionConfig::Interval {
            days: 3,
            at_time: at("03:30"),
        };
        assert_eq!(describe(&config), "Every 3 days at 09:00");
    }

    #[test]
    fn describes_weekly_in_stored_order() {
        let config = RepetitionConfig::Weekly {
            on_days: vec![WeekdayCode::Mon, WeekdayCode::Wed, WeekdayCode::Fri],
            at_time: at("03:30"),
        };
        assert_eq!(describe(&config), "Every MON, WED, FRI of the week at 09:00");

        let config = RepetitionConfig::Weekly {
            on_days: vec![WeekdayCode::Sat, WeekdayCode::Tue],
            at_time: at("20:00"),
        };
        assert_eq!(describe(&config), "Every SAT, TUE of the week at 01:30");
    }

    #[test]
    fn describes_monthly_with_literal_th() {
        let config = RepetitionConfig::Monthly {
            on_date: 21,
            at_time: at("03:30"),
        };
        assert_eq!(describe(&config), "On day 21th of every month at 09:00");

        let config = RepetitionConfig::Monthly {
            on_date: 1,
            at_time: at("03:30"),
        };
        assert_eq!(describe(&config), "On day 1th of every month at 09:00");
    }

    #[test]
    fn no_schedule_for_none_and_unknown() {
        assert_eq!(describe(&RepetitionConfig::None), "No schedule");
        assert_eq!(
            describe(&RepetitionConfig::Unrecognized {
                kind: "fortnightly".to_string()
            }),
            "No schedule"
        );
    }

    #[test]
    fn missing_or_bad_time_falls_back_to_nine() {
        let config = RepetitionConfig::Interval {
            days: 7,
            at_time: None,
        };
        assert_eq!(describe(&config), "Every 7 days at 09:00");

        let config = RepetitionConfig::Interval {
            days: 7,
            at_time: at("noon"),
        };
        assert_eq!(describe(&config), "Every 7 days at 09:00");
    }

    #[test]
    fn describes_adhoc_task_by_ist_date() {
        let due = Utc
            .with_ymd_and_hms(2026, 3, 9, 20, 0, 0)
            .single()
            .expect("valid due");
        let mut task = Task::adhoc("t-1", "File GST return", Some(due));
        assert_eq!(describe_task(&task), "Due on 2026-03-10");

        task.due_date = None;
        assert_eq!(describe_task(&task), "No due date");

        task.task_type = TaskType::Recurring;
        assert_eq!(describe_task(&task), "No schedule");
    }

    #[test]
    fn configured_fallback_replaces_nine() {
        let config = RepetitionConfig::Interval {
            days: 3,
            at_time: None,
        };
        assert_eq!(
            describe_with_fallback(&config, "08:15"),
            "Every 3 days at 08:15"
        );

        let config = RepetitionConfig::Interval {
            days: 3,
            at_time: at("03:30"),
        };
        assert_eq!(
            describe_with_fallback(&config, "08:15"),
            "Every 3 days at 09:00"
        );
    }

    #[test]
    fn malformed_config_has_no_schedule() {
        let config = RepetitionConfig::Malformed {
            kind: "interval".to_string(),
            reason: "missing days".to_string(),
        };
        assert_eq!(describe(&config), "No schedule");
    }

    #[test]
    fn other_zones_use_their_own_date_and_label_ist_times() {
        let due = Utc
            .with_ymd_and_hms(2026, 3, 10, 21, 0, 0)
            .single()
            .expect("valid due");
        let task = Task::adhoc("t-1", "Late shift handover", Some(due));
        assert_eq!(
            describe_task_in(&task, chrono_tz::UTC, "09:00"),
            "Due on 2026-03-10"
        );
        assert_eq!(describe_task(&task), "Due on 2026-03-11");

        let task = Task::recurring(
            "t-2",
            "Chiller inspection",
            RepetitionConfig::Weekly {
                on_days: vec![WeekdayCode::Tue],
                at_time: at("03:30"),
            },
        );
        assert_eq!(
            describe_task_in(&task, chrono_tz::UTC, "09:00"),
            "Every TUE of the week at 09:00 IST"
        );
        assert_eq!(describe_task(&task), "Every TUE of the week at 09:00");

        let task = Task::recurring("t-3", "Retired", RepetitionConfig::None);
        assert_eq!(
            describe_task_in(&task, chrono_tz::UTC, "09:00"),
            "No schedule"
        );
    }
}

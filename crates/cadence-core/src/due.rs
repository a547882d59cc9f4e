use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, trace};

use crate::datetime::{civil_date_in, display_timezone, format_civil_date};
use crate::task::Assignment;

/// Today's civil date in `tz` as `YYYY-MM-DD`.
pub fn today_in(now: DateTime<Utc>, tz: Tz) -> String {
    format_civil_date(now, tz)
}

/// Assignments whose relevant date falls on today's IST calendar date.
pub fn due_today(assignments: &[Assignment], now: DateTime<Utc>) -> Vec<&Assignment> {
    due_today_in(assignments, now, display_timezone())
}

/// Keeps input order and never fails: assignments without a usable
/// date are left out.
#[tracing::instrument(skip(assignments, now), fields(count = assignments.len(), tz = tz.name()))]
pub fn due_today_in(assignments: &[Assignment], now: DateTime<Utc>, tz: Tz) -> Vec<&Assignment> {
    let today = civil_date_in(now, tz);

    let selected: Vec<&Assignment> = assignments
        .iter()
        .filter(|assignment| match assignment.relevant_instant() {
            Ok(instant) => civil_date_in(instant, tz) == today,
            Err(err) => {
                trace!(error = %err, "excluding assignment without a date");
                false
            }
        })
        .collect();

    debug!(today = %today, selected = selected.len(), "filtered due-today assignments");
    selected
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::{due_today, due_today_in, today_in};
    use crate::datetime::display_timezone;
    use crate::repetition::RepetitionConfig;
    use crate::task::{Assignment, Schedule, Task};

    fn instant(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .expect("valid instant")
    }

    fn adhoc(id: &str, due: Option<DateTime<Utc>>) -> Assignment {
        Assignment::new(id, Task::adhoc(id, "ad-hoc work", due), None)
    }

    fn recurring(id: &str, scheduled: Option<DateTime<Utc>>) -> Assignment {
        let config = RepetitionConfig::Interval {
            days: 1,
            at_time: Some("03:30".to_string()),
        };
        Assignment::new(
            id,
            Task::recurring(id, "daily round", config),
            Some(Schedule {
                id: format!("s-{id}"),
                scheduled_date: scheduled,
            }),
        )
    }

    fn ids<'a>(assignments: &[&'a Assignment]) -> Vec<&'a str> {
        assignments.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn due_now_is_today_and_tomorrow_is_not() {
        let now = instant(2026, 3, 10, 6, 0);
        let assignments = vec![
            adhoc("now", Some(now)),
            adhoc("later", Some(now + Duration::hours(25))),
        ];

        assert_eq!(ids(&due_today(&assignments, now)), vec!["now"]);
    }

    #[test]
    fn missing_dates_are_excluded_quietly() {
        let now = instant(2026, 3, 10, 6, 0);
        let assignments = vec![adhoc("no-due", None), recurring("no-schedule", None)];

        assert!(due_today(&assignments, now).is_empty());
    }

    #[test]
    fn compares_ist_dates_not_utc_dates() {
        // 00:30 IST on the 10th, still the 9th in UTC.
        let now = instant(2026, 3, 9, 19, 0);
        let assignments = vec![
            recurring("just-after-midnight", Some(instant(2026, 3, 9, 18, 45))),
            recurring("before-midnight", Some(instant(2026, 3, 9, 18, 15))),
            recurring("late-evening", Some(instant(2026, 3, 10, 18, 29))),
        ];

        assert_eq!(today_in(now, display_timezone()), "2026-03-10");
        assert_eq!(
            ids(&due_today(&assignments, now)),
            vec!["just-after-midnight", "late-evening"]
        );
    }

    #[test]
    fn repeated_runs_agree_and_leave_input_alone() {
        let now = instant(2026, 3, 10, 6, 0);
        let assignments = vec![
            recurring("b", Some(now)),
            adhoc("a", Some(now - Duration::hours(1))),
            adhoc("c", None),
        ];
        let before = assignments.clone();

        let first = ids(&due_today(&assignments, now));
        let second = ids(&due_today(&assignments, now));

        assert_eq!(first, vec!["b", "a"]);
        assert_eq!(first, second);
        assert_eq!(assignments, before);
    }

    #[test]
    fn honours_other_zones() {
        let now = instant(2026, 3, 10, 2, 0);
        let assignments = vec![adhoc("x", Some(instant(2026, 3, 9, 23, 0)))];

        assert_eq!(due_today(&assignments, now).len(), 1);
        assert!(due_today_in(&assignments, now, chrono_tz::UTC).is_empty());
    }
}

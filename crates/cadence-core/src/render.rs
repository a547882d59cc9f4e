use std::io::{self, IsTerminal, Write};

use chrono_tz::Tz;
use unicode_width::UnicodeWidthStr;

use crate::datetime::format_display_datetime;
use crate::describe::describe_task_in;
use crate::task::{Assignment, TaskType};

const ID_STYLE: &str = "33";
const DONE_STYLE: &str = "2";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    timezone: Tz,
    /// IST time shown for repetitions whose stored time is unreadable.
    fallback: String,
}

impl Renderer {
    pub fn new(color: bool, timezone: Tz, fallback: impl Into<String>) -> Self {
        Self {
            color,
            timezone,
            fallback: fallback.into(),
        }
    }

    /// Colour is only emitted when requested and stdout is a terminal.
    pub fn for_stdout(color: bool, timezone: Tz, fallback: impl Into<String>) -> Self {
        Self::new(color && io::stdout().is_terminal(), timezone, fallback)
    }

    #[tracing::instrument(skip(self, writer, assignments), fields(count = assignments.len()))]
    pub fn write_assignment_table<W: Write>(
        &self,
        writer: W,
        assignments: &[&Assignment],
    ) -> anyhow::Result<()> {
        let mut table = Table::new(["ID", "Task", "Type", "When", "Schedule", "Assignee"]);

        for assignment in assignments {
            let kind = match assignment.task.task_type {
                TaskType::Adhoc => "ad-hoc",
                TaskType::Recurring => "recurring",
            };
            let when = assignment
                .relevant_instant()
                .map(|instant| format_display_datetime(instant, self.timezone))
                .unwrap_or_default();
            let title_style = assignment.completed.then_some(DONE_STYLE);

            table.push([
                Cell::styled(&assignment.id, Some(ID_STYLE)),
                Cell::styled(&assignment.task.title, title_style),
                Cell::plain(kind),
                Cell::plain(when),
                Cell::plain(describe_task_in(
                    &assignment.task,
                    self.timezone,
                    &self.fallback,
                )),
                Cell::plain(assignment.assignee.as_deref().unwrap_or_default()),
            ]);
        }

        table.write(writer, self.color)
    }
}

/// Cell text is kept unstyled so column widths never count escape codes;
/// the style is applied only while writing.
struct Cell {
    text: String,
    style: Option<&'static str>,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, None)
    }

    fn styled(text: impl Into<String>, style: Option<&'static str>) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn width(&self) -> usize {
        UnicodeWidthStr::width(self.text.as_str())
    }
}

struct Table<const N: usize> {
    headers: [&'static str; N],
    rows: Vec<[Cell; N]>,
}

impl<const N: usize> Table<N> {
    fn new(headers: [&'static str; N]) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: [Cell; N]) {
        self.rows.push(row);
    }

    fn widths(&self) -> [usize; N] {
        let mut widths = self.headers.map(|header| header.width());
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }
        widths
    }

    fn write<W: Write>(&self, mut writer: W, color: bool) -> anyhow::Result<()> {
        let widths = self.widths();

        let header = self
            .headers
            .iter()
            .zip(widths)
            .map(|(title, width)| format!("{title:<width$}"))
            .collect::<Vec<_>>();
        writeln!(writer, "{}", header.join(" ").trim_end())?;

        let rule = widths.map(|width| "-".repeat(width));
        writeln!(writer, "{}", rule.join(" "))?;

        for row in &self.rows {
            let mut line = String::new();
            for (idx, (cell, width)) in row.iter().zip(widths).enumerate() {
                if idx > 0 {
                    line.push(' ');
                }
                match cell.style {
                    Some(code) if color => {
                        line.push_str(&format!("\x1b[{code}m{}\x1b[0m", cell.text));
                    }
                    _ => line.push_str(&cell.text),
                }
                line.push_str(&" ".repeat(width.saturating_sub(cell.width())));
            }
            writeln!(writer, "{}", line.trim_end())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::Renderer;
    use crate::datetime::display_timezone;
    use crate::repetition::{RepetitionConfig, WeekdayCode};
    use crate::task::{Assignment, Schedule, Task};

    fn render(renderer: &Renderer, assignments: &[&Assignment]) -> String {
        let mut buf = Vec::new();
        renderer
            .write_assignment_table(&mut buf, assignments)
            .expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn renders_ist_times_and_schedule_text() {
        let scheduled = Utc
            .with_ymd_and_hms(2026, 3, 10, 3, 30, 0)
            .single()
            .expect("valid");
        let config = RepetitionConfig::Weekly {
            on_days: vec![WeekdayCode::Tue],
            at_time: Some("03:30".to_string()),
        };
        let mut assignment = Assignment::new(
            "a-1",
            Task::recurring("t-1", "Pump room check", config),
            Some(Schedule {
                id: "s-1".to_string(),
                scheduled_date: Some(scheduled),
            }),
        );
        assignment.assignee = Some("Priya".to_string());

        let text = render(
            &Renderer::new(false, display_timezone(), "09:00"),
            &[&assignment],
        );

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID "));
        assert!(lines[2].contains("2026-03-10 09:00"));
        assert!(lines[2].contains("Every TUE of the week at 09:00"));
        assert!(!lines[2].contains("IST"));
        assert!(lines[2].contains("Priya"));
    }

    #[test]
    fn utc_table_keeps_one_zone_per_row() {
        let due = Utc
            .with_ymd_and_hms(2026, 3, 10, 21, 0, 0)
            .single()
            .expect("valid");
        let adhoc = Assignment::new("a-1", Task::adhoc("t-1", "Night audit", Some(due)), None);
        let recurring = Assignment::new(
            "a-2",
            Task::recurring(
                "t-2",
                "Diesel top-up",
                RepetitionConfig::Interval {
                    days: 2,
                    at_time: None,
                },
            ),
            Some(Schedule {
                id: "s-2".to_string(),
                scheduled_date: Some(due),
            }),
        );

        let text = render(
            &Renderer::new(false, chrono_tz::UTC, "08:15"),
            &[&adhoc, &recurring],
        );

        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[2].contains("2026-03-10 21:00"));
        assert!(lines[2].contains("Due on 2026-03-10"));
        assert!(lines[3].contains("Every 2 days at 08:15 IST"));
    }

    #[test]
    fn colour_does_not_shift_columns() {
        let mut done = Assignment::new("a-1", Task::adhoc("t-1", "Meter reading", None), None);
        done.completed = true;

        let plain = render(&Renderer::new(false, display_timezone(), "09:00"), &[&done]);
        let coloured = render(&Renderer::new(true, display_timezone(), "09:00"), &[&done]);

        assert!(coloured.contains("\x1b[33ma-1\x1b[0m"));
        assert!(coloured.contains("\x1b[2mMeter reading\x1b[0m"));
        assert_eq!(
            coloured.replace("\x1b[33m", "").replace("\x1b[2m", "").replace("\x1b[0m", ""),
            plain
        );
    }
}

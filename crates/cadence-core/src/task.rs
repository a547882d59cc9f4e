use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::repetition::RepetitionConfig;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskType {
    #[serde(alias = "AD-HOC")]
    Adhoc,
    Recurring,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(alias = "_id")]
    pub id: String,

    #[serde(default)]
    pub title: String,

    pub task_type: TaskType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetition_config: Option<RepetitionConfig>,
}

impl Task {
    pub fn adhoc(id: &str, title: &str, due_date: Option<DateTime<Utc>>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            task_type: TaskType::Adhoc,
            due_date,
            repetition_config: None,
        }
    }

    pub fn recurring(id: &str, title: &str, config: RepetitionConfig) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            task_type: TaskType::Recurring,
            due_date: None,
            repetition_config: Some(config),
        }
    }
}

/// One occurrence the backend materialised from a repetition config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(alias = "_id")]
    pub id: String,

    #[serde(default)]
    pub scheduled_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(alias = "_id")]
    pub id: String,

    pub task: Task,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    #[serde(default)]
    pub completed: bool,
}

impl Assignment {
    pub fn new(id: &str, task: Task, schedule: Option<Schedule>) -> Self {
        Self {
            id: id.to_string(),
            task,
            schedule,
            assignee: None,
            completed: false,
        }
    }

    /// The instant that decides which day this assignment belongs to:
    /// the task's due date for ad-hoc work, the schedule entry's date for
    /// recurring work.
    pub fn relevant_instant(&self) -> Result<DateTime<Utc>, CoreError> {
        let instant = match self.task.task_type {
            TaskType::Adhoc => self.task.due_date,
            TaskType::Recurring => self
                .schedule
                .as_ref()
                .and_then(|schedule| schedule.scheduled_date),
        };

        instant.ok_or_else(|| CoreError::MissingRelevantDate {
            assignment: self.id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::{Assignment, Schedule, Task, TaskType};
    use crate::error::CoreError;
    use crate::repetition::RepetitionConfig;

    #[test]
    fn decodes_backend_assignment() {
        let assignment: Assignment = serde_json::from_value(json!({
            "_id": "a-1",
            "task": {
                "_id": "t-1",
                "title": "Check fire extinguishers",
                "taskType": "RECURRING",
                "repetitionConfig": { "type": "interval", "days": 3, "atTime": "03:30" }
            },
            "schedule": { "_id": "s-1", "scheduledDate": "2026-03-10T03:30:00.000Z" },
            "assignee": "ops-team"
        }))
        .expect("decode assignment");

        assert_eq!(assignment.task.task_type, TaskType::Recurring);
        assert!(!assignment.completed);
        assert_eq!(
            assignment.relevant_instant().expect("scheduled date"),
            Utc.with_ymd_and_hms(2026, 3, 10, 3, 30, 0)
                .single()
                .expect("valid")
        );
    }

    #[test]
    fn adhoc_uses_task_due_date_not_schedule() {
        let due = Utc
            .with_ymd_and_hms(2026, 3, 9, 10, 0, 0)
            .single()
            .expect("valid");
        let scheduled = Utc
            .with_ymd_and_hms(2026, 4, 1, 10, 0, 0)
            .single()
            .expect("valid");
        let assignment = Assignment::new(
            "a-2",
            Task::adhoc("t-2", "Renew licence", Some(due)),
            Some(Schedule {
                id: "s-2".to_string(),
                scheduled_date: Some(scheduled),
            }),
        );
        assert_eq!(assignment.relevant_instant().expect("due date"), due);
    }

    #[test]
    fn missing_dates_are_reported() {
        let assignment = Assignment::new(
            "a-3",
            Task::recurring("t-3", "Weekly sync", RepetitionConfig::None),
            Some(Schedule {
                id: "s-3".to_string(),
                scheduled_date: None,
            }),
        );
        assert_eq!(
            assignment.relevant_instant(),
            Err(CoreError::MissingRelevantDate {
                assignment: "a-3".to_string()
            })
        );
    }

    #[test]
    fn accepts_hyphenated_adhoc_tag() {
        let task: Task = serde_json::from_value(json!({
            "id": "t-4",
            "taskType": "AD-HOC",
            "dueDate": null
        }))
        .expect("decode task");
        assert_eq!(task.task_type, TaskType::Adhoc);
        assert!(task.due_date.is_none());
    }
}

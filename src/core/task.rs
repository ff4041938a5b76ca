use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

use super::section::{Category, Section};
use crate::error::DaybookError;

/// Time used for ordering when a task carries none.
pub const DEFAULT_TIME: &str = "00:00";

static TIME_OF_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("valid time regex"));

fn default_time() -> String {
    DEFAULT_TIME.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Only manual tasks carry one; defaults are identified by title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_time")]
    pub time: String,
    pub category: Category,
    pub section: Section,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_manual: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// A catalog task: no id, not deletable.
    pub fn default_entry(time: &str, title: &str, category: Category, section: Section) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            description: None,
            time: time.to_string(),
            category,
            section,
            completed: false,
            is_default: true,
            is_manual: false,
            created_at: None,
        }
    }

    pub fn identity(&self) -> Identity {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => Identity::Id(id.to_string()),
            _ => Identity::TitleKey(self.title.clone()),
        }
    }

    pub fn has_identity(&self, identity: &Identity) -> bool {
        match (self.id.as_deref(), identity) {
            (Some(own), Identity::Id(id)) if !own.is_empty() => own == id.as_str(),
            (Some(own), Identity::TitleKey(_)) if !own.is_empty() => false,
            (_, Identity::TitleKey(title)) => self.title == *title,
            (_, Identity::Id(_)) => false,
        }
    }

    pub fn is_deletable(&self) -> bool {
        self.is_manual
    }

    /// Time of day used for ordering, falling back to midnight when blank.
    pub fn sort_time(&self) -> &str {
        if self.time.trim().is_empty() {
            DEFAULT_TIME
        } else {
            &self.time
        }
    }

    /// Restore `is_default == !is_manual` on data read from storage.
    /// Entries that claim neither flag are treated as defaults.
    pub fn normalize_flags(&mut self) {
        self.is_default = !self.is_manual;
    }
}

/// How a task is addressed within a section: by generated id, or by title
/// for catalog tasks that never received one. Variants never compare equal
/// to each other and titles are compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Id(String),
    TitleKey(String),
}

impl Identity {
    /// Resolve caller-supplied text against a list of tasks: an id match wins,
    /// then an exact title match.
    pub fn resolve(tasks: &[Task], raw: &str) -> Option<Self> {
        let by_id = Self::Id(raw.to_string());
        if tasks.iter().any(|t| t.has_identity(&by_id)) {
            return Some(by_id);
        }
        tasks
            .iter()
            .find(|t| t.title == raw)
            .map(Task::identity)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => f.write_str(id),
            Self::TitleKey(title) => f.write_str(title),
        }
    }
}

/// User input for a new manual task.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub category: String,
    pub time: Option<String>,
    pub description: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validate and turn the draft into a manual task with a fresh id.
    pub fn into_task(self) -> Result<Task, DaybookError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DaybookError::Validation("task title is required".into()));
        }

        let time = match self.time.as_deref().map(str::trim) {
            None | Some("") => default_time(),
            Some(t) if TIME_OF_DAY.is_match(t) => t.to_string(),
            Some(t) => {
                return Err(DaybookError::Validation(format!("time must be HH:MM, got {t:?}")));
            }
        };

        let category = Category::parse(&self.category);
        let section = category.section();

        Ok(Task {
            id: Some(Uuid::new_v4().to_string()),
            title: title.to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            time,
            category,
            section,
            completed: false,
            is_default: false,
            is_manual: true,
            created_at: Some(Utc::now()),
        })
    }
}

/// Order tasks for display: manual tasks first, then by time of day.
/// The sort is stable and works on a copy.
pub fn sort_for_display(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(display_order);
    sorted
}

fn display_order(a: &Task, b: &Task) -> Ordering {
    b.is_manual
        .cmp(&a.is_manual)
        .then_with(|| a.sort_time().cmp(b.sort_time()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual(title: &str, time: &str) -> Task {
        TaskDraft::new(title, "personal").at(time).into_task().unwrap()
    }

    fn default(title: &str, time: &str) -> Task {
        Task::default_entry(time, title, Category::Health, Section::Essential)
    }

    #[test]
    fn draft_requires_title() {
        let err = TaskDraft::new("   ", "work").into_task().unwrap_err();
        assert!(matches!(err, DaybookError::Validation(_)));
    }

    #[test]
    fn draft_defaults_and_routing() {
        let task = TaskDraft::new("  Call mom ", "family").into_task().unwrap();
        assert_eq!(task.title, "Call mom");
        assert_eq!(task.time, "00:00");
        assert_eq!(task.section, Section::Evening);
        assert!(task.is_manual && !task.is_default && !task.completed);
        assert!(task.id.is_some());
        assert!(task.created_at.is_some());
        assert_eq!(task.description, None);
    }

    #[test]
    fn draft_rejects_malformed_time() {
        assert!(TaskDraft::new("Run", "health").at("25:00").into_task().is_err());
        assert!(TaskDraft::new("Run", "health").at("7:5").into_task().is_err());
        assert_eq!(TaskDraft::new("Run", "health").at("07:05").into_task().unwrap().time, "07:05");
    }

    #[test]
    fn manual_ids_are_unique() {
        let a = manual("A", "09:00");
        let b = manual("A", "09:00");
        assert_ne!(a.id, b.id);
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn identity_variants_do_not_cross_match() {
        let d = default("Lunch break", "13:00");
        assert_eq!(d.identity(), Identity::TitleKey("Lunch break".into()));
        assert!(d.has_identity(&Identity::TitleKey("Lunch break".into())));
        assert!(!d.has_identity(&Identity::TitleKey("lunch break".into())));
        assert!(!d.has_identity(&Identity::Id("Lunch break".into())));

        let m = manual("Lunch break", "12:00");
        assert!(!m.has_identity(&Identity::TitleKey("Lunch break".into())));
        assert!(m.has_identity(&m.identity()));
    }

    #[test]
    fn resolve_prefers_id_then_title() {
        let m = manual("Read", "20:00");
        let id = m.id.clone().unwrap();
        let tasks = vec![default("Read", "19:00"), m];
        assert_eq!(Identity::resolve(&tasks, &id), Some(Identity::Id(id)));
        assert_eq!(
            Identity::resolve(&tasks, "Read"),
            Some(Identity::TitleKey("Read".into()))
        );
        assert_eq!(Identity::resolve(&tasks, "Nope"), None);
    }

    #[test]
    fn sort_puts_manual_first_then_time() {
        let tasks = vec![
            default("Breakfast", "06:30"),
            manual("Late", "23:00"),
            default("Meditate", "05:30"),
            manual("Early", "04:00"),
        ];
        let sorted = sort_for_display(&tasks);
        let titles: Vec<&str> = sorted.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Early", "Late", "Meditate", "Breakfast"]);
        // Input untouched
        assert_eq!(tasks[0].title, "Breakfast");
    }

    #[test]
    fn sort_is_stable_and_blank_time_is_midnight() {
        let mut blank = manual("Blank", "10:00");
        blank.time = String::new();
        let tasks = vec![
            manual("First", "10:00"),
            manual("Second", "10:00"),
            blank,
        ];
        let sorted = sort_for_display(&tasks);
        let titles: Vec<&str> = sorted.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Blank", "First", "Second"]);
    }

    #[test]
    fn reads_catalog_entries_without_manual_flag() {
        let json = r#"{"time":"06:00","title":"Exercise or physical activity","category":"health","section":"essential","isDefault":true}"#;
        let mut task: Task = serde_json::from_str(json).unwrap();
        task.normalize_flags();
        assert!(task.is_default);
        assert!(!task.is_manual);
        assert!(!task.completed);
        assert_eq!(task.identity(), Identity::TitleKey("Exercise or physical activity".into()));
    }
}

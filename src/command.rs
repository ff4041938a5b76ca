//! Front-end actions mapped onto store operations.
//!
//! A front end turns its events into [`Command`]s and hands them to
//! [`dispatch`]; it never calls store mutators by name. Every command ends
//! with the streak recomputed for the command's date, and every failure comes
//! back as an error [`Notice`] instead of aborting.

use crate::core::date_key::DateKey;
use crate::core::section::Section;
use crate::core::task::{Identity, TaskDraft};
use crate::core::view::StatsView;
use crate::error::DaybookError;
use crate::store::{Export, Store};

#[derive(Debug, Clone)]
pub enum Command {
    /// Open a day, seeding defaults if it was never touched.
    EnsureDay,
    AddTask(TaskDraft),
    ToggleTask { section: Section, task: Identity },
    DeleteTask { section: Section, task: Identity },
    SaveReflection(String),
    RefreshStats,
    Export,
    Reset,
}

impl Command {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::EnsureDay => "ensure-day",
            Self::AddTask(_) => "add-task",
            Self::ToggleTask { .. } => "toggle-task",
            Self::DeleteTask { .. } => "delete-task",
            Self::SaveReflection(_) => "save-reflection",
            Self::RefreshStats => "refresh-stats",
            Self::Export => "export",
            Self::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A short transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }

    fn from_error(err: &DaybookError) -> Self {
        match err {
            DaybookError::Permission(_) => Self::error("Cannot delete default tasks!"),
            DaybookError::Validation(msg) => Self::error(format!("Please check your input: {msg}")),
            other => Self::error(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Outcome {
    /// The command's own result notice.
    pub notice: Option<Notice>,
    /// Set when the change stayed in memory but could not be saved.
    pub warning: Option<Notice>,
    pub stats: StatsView,
    pub export: Option<Export>,
}

impl Outcome {
    pub fn failed(&self) -> bool {
        self.notice.as_ref().is_some_and(|n| n.level == NoticeLevel::Error)
    }
}

pub fn dispatch(store: &mut Store, date: DateKey, command: Command) -> Outcome {
    log::debug!("Dispatching {} for {}", command.tag(), date);

    let mut export = None;
    let result: Result<Option<Notice>, DaybookError> = match command {
        Command::EnsureDay => {
            store.ensure_day(date);
            Ok(None)
        }
        Command::AddTask(draft) => store
            .add_task(date, draft)
            .map(|_| Some(Notice::success("Task added to top of the list!"))),
        Command::ToggleTask { section, task } => store.toggle_task(date, section, &task).map(|t| {
            match (t.completed, t.is_manual) {
                (true, true) => Some(Notice::success("Your custom task completed!")),
                (true, false) => Some(Notice::success("Task completed!")),
                (false, _) => None,
            }
        }),
        Command::DeleteTask { section, task } => store
            .delete_task(date, section, &task)
            .map(|_| Some(Notice::success("Task deleted successfully!"))),
        Command::SaveReflection(text) => {
            store.save_reflection(date, text);
            Ok(Some(Notice::success("Reflection saved!")))
        }
        Command::RefreshStats => Ok(None),
        Command::Export => store.export(date).map(|e| {
            export = Some(e);
            Some(Notice::success("Data exported successfully!"))
        }),
        Command::Reset => store
            .reset()
            .map(|()| Some(Notice::info("All data has been reset."))),
    };

    let notice = match result {
        Ok(notice) => notice,
        Err(e) => {
            if e.is_user_error() {
                log::info!("Command rejected: {}", e);
            } else {
                log::error!("Command failed: {}", e);
            }
            Some(Notice::from_error(&e))
        }
    };

    let stats = store.refresh_stats(date);
    let warning = store
        .take_persist_failure()
        .map(|e| Notice::error(format!("Changes kept for this session only: {e}")));

    Outcome { notice, warning, stats, export }
}

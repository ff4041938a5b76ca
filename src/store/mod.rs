pub mod backend;
pub mod snapshot;

use crate::core::catalog;
use crate::core::date_key::DateKey;
use crate::core::day::DaySections;
use crate::core::section::Section;
use crate::core::stats::{self, MonthSummary, WeekOverview};
use crate::core::task::{Identity, Task, TaskDraft};
use crate::core::view::{DayView, StatsView};
use crate::error::{DaybookError, Result};

pub use backend::{JsonFileBackend, MemoryBackend, Persistence};
pub use snapshot::StoreSnapshot;

/// Default upper bound on the backward streak scan, in days.
pub const DEFAULT_STREAK_LOOKBACK: u32 = 3650;

/// A serialized snapshot ready to be written out as a download.
#[derive(Debug, Clone)]
pub struct Export {
    pub file_name: String,
    pub contents: String,
}

pub fn export_file_name(date: DateKey) -> String {
    format!("task-planner-backup-{date}.json")
}

/// The single owner of all day data and reflections.
///
/// The snapshot is loaded once when the store is opened and written back
/// after every mutation. A failed write leaves the in-memory state in place;
/// the failure is kept until a caller collects it with
/// [`Store::take_persist_failure`].
///
/// If the backend could not be read at all, the session runs in memory only:
/// nothing is written back until an explicit [`Store::reset`], so the
/// unreadable data is never replaced.
pub struct Store {
    backend: Box<dyn Persistence>,
    snapshot: StoreSnapshot,
    streak_lookback: u32,
    persist_failure: Option<DaybookError>,
    load_failed: bool,
}

impl Store {
    pub fn open(backend: Box<dyn Persistence>) -> Self {
        let mut persist_failure = None;
        let snapshot = match backend.load() {
            Ok(Some(text)) => match StoreSnapshot::from_json(&text) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    log::warn!("Stored planner data is unreadable, starting empty: {}", e);
                    StoreSnapshot::default()
                }
            },
            Ok(None) => StoreSnapshot::default(),
            Err(e) => {
                log::error!("Failed to load planner data, saving disabled: {}", e);
                persist_failure = Some(DaybookError::Persistence(format!(
                    "stored data could not be read, changes will not be saved: {e}"
                )));
                StoreSnapshot::default()
            }
        };
        let load_failed = persist_failure.is_some();

        log::info!(
            "Loaded {} days, {} custom tasks, {} reflections",
            snapshot.tasks.len(),
            snapshot.custom_tasks.len(),
            snapshot.reflections.len()
        );

        Self {
            backend,
            snapshot,
            streak_lookback: DEFAULT_STREAK_LOOKBACK,
            persist_failure,
            load_failed,
        }
    }

    /// Cap the backward streak scan. Values below one day are raised to one.
    pub fn with_streak_lookback(mut self, days: u32) -> Self {
        self.streak_lookback = days.max(1);
        self
    }

    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.snapshot
    }

    // Days

    /// Return the day's sections, seeding them from the default catalog the
    /// first time the day is touched. An existing day is never replaced.
    pub fn ensure_day(&mut self, date: DateKey) -> &DaySections {
        if self.seed_day(date) {
            self.persist();
        }
        self.snapshot.tasks.entry(date).or_insert_with(catalog::seed_day)
    }

    pub fn get_day(&self, date: DateKey) -> Option<&DaySections> {
        self.snapshot.tasks.get(&date)
    }

    fn seed_day(&mut self, date: DateKey) -> bool {
        if self.snapshot.tasks.contains_key(&date) {
            return false;
        }
        log::debug!("Initializing default tasks for {}", date);
        self.snapshot.tasks.insert(date, catalog::seed_day());
        true
    }

    // Tasks

    /// Add a manual task to the section its category maps to.
    pub fn add_task(&mut self, date: DateKey, draft: TaskDraft) -> Result<Task> {
        let task = draft.into_task()?;
        self.seed_day(date);

        let section = task.section;
        self.snapshot
            .tasks
            .entry(date)
            .or_insert_with(catalog::seed_day)
            .section_mut(section)
            .push(task.clone());
        self.snapshot.custom_tasks.push(task.clone());

        log::info!("Added task \"{}\" to {} on {}", task.title, section, date);
        self.persist();
        Ok(task)
    }

    /// Flip a task's completion and adjust the completed-task counter.
    pub fn toggle_task(&mut self, date: DateKey, section: Section, identity: &Identity) -> Result<Task> {
        let task = self
            .snapshot
            .tasks
            .get_mut(&date)
            .and_then(|day| day.find_mut(section, identity))
            .ok_or_else(|| not_found(date, section, identity))?;

        task.completed = !task.completed;
        let toggled = task.clone();
        self.snapshot.stats.record_toggle(toggled.completed);

        if toggled.is_manual {
            if let Some(entry) = self
                .snapshot
                .custom_tasks
                .iter_mut()
                .find(|t| t.has_identity(identity))
            {
                entry.completed = toggled.completed;
            }
        }

        log::info!(
            "Task \"{}\" on {} marked {}",
            toggled.title,
            date,
            if toggled.completed { "done" } else { "not done" }
        );
        self.persist();
        Ok(toggled)
    }

    /// Remove a manual task from its day and from the manual-task registry.
    /// Default tasks are refused and stay where they are.
    pub fn delete_task(&mut self, date: DateKey, section: Section, identity: &Identity) -> Result<Task> {
        let day = self
            .snapshot
            .tasks
            .get_mut(&date)
            .ok_or_else(|| not_found(date, section, identity))?;
        let index = day
            .position(section, identity)
            .ok_or_else(|| not_found(date, section, identity))?;

        let tasks = day.section_mut(section);
        if !tasks[index].is_deletable() {
            return Err(DaybookError::Permission(tasks[index].title.clone()));
        }
        let removed = tasks.remove(index);

        if let Some(pos) = self
            .snapshot
            .custom_tasks
            .iter()
            .position(|t| t.has_identity(identity))
        {
            self.snapshot.custom_tasks.remove(pos);
        }

        log::info!("Deleted task \"{}\" from {} on {}", removed.title, section, date);
        self.persist();
        Ok(removed)
    }

    /// Every manual task ever added and not yet deleted, across all days.
    pub fn custom_tasks(&self) -> &[Task] {
        &self.snapshot.custom_tasks
    }

    // Reflections

    pub fn reflection(&self, date: DateKey) -> Option<&str> {
        self.snapshot.reflections.get(&date).map(String::as_str)
    }

    pub fn save_reflection(&mut self, date: DateKey, text: impl Into<String>) {
        self.snapshot.reflections.insert(date, text.into());
        log::info!("Saved reflection for {}", date);
        self.persist();
    }

    // Aggregates

    pub fn day_completion(&self, date: DateKey) -> u8 {
        stats::day_completion(&self.snapshot.tasks, date)
    }

    pub fn week_completion(&self, reference: DateKey) -> u8 {
        stats::week_completion(&self.snapshot.tasks, reference)
    }

    pub fn month_completion(&self, reference: DateKey) -> u8 {
        stats::month_completion(&self.snapshot.tasks, reference)
    }

    pub fn streak(&self, reference: DateKey) -> u32 {
        stats::streak(&self.snapshot.tasks, reference, self.streak_lookback)
    }

    pub fn week_overview(&self, reference: DateKey) -> WeekOverview {
        WeekOverview::build(&self.snapshot.tasks, reference)
    }

    pub fn month_summary(&self, reference: DateKey) -> MonthSummary {
        MonthSummary::build(
            &self.snapshot.tasks,
            reference,
            self.snapshot.stats.current_streak,
        )
    }

    /// Recompute the stored streak for `reference`, persist, and return the
    /// headline numbers. `total_completed` is reported as stored.
    pub fn refresh_stats(&mut self, reference: DateKey) -> StatsView {
        self.snapshot.stats.current_streak = self.streak(reference);
        self.persist();
        self.stats_view(reference)
    }

    pub fn stats_view(&self, reference: DateKey) -> StatsView {
        StatsView {
            today: self.day_completion(reference),
            week: self.week_completion(reference),
            month: self.month_completion(reference),
            current_streak: self.snapshot.stats.current_streak,
            total_completed: self.snapshot.stats.total_completed,
        }
    }

    /// Completed tasks actually present in storage. Diagnostic only: the
    /// stored counter is never overwritten with this value.
    pub fn recount_completed(&self) -> u64 {
        self.snapshot
            .tasks
            .values()
            .map(|day| day.completed() as u64)
            .sum()
    }

    pub fn day_view(&self, date: DateKey) -> DayView {
        DayView::build(date, self.get_day(date), self.reflection(date))
    }

    // Export and reset

    pub fn serialize(&self) -> Result<String> {
        self.snapshot.to_json()
    }

    pub fn export(&self, date: DateKey) -> Result<Export> {
        Ok(Export {
            file_name: export_file_name(date),
            contents: self.serialize()?,
        })
    }

    /// Drop all stored and in-memory data.
    pub fn reset(&mut self) -> Result<()> {
        self.backend.clear()?;
        self.snapshot = StoreSnapshot::default();
        self.persist_failure = None;
        self.load_failed = false;
        log::warn!("All planner data has been reset");
        Ok(())
    }

    pub fn take_persist_failure(&mut self) -> Option<DaybookError> {
        self.persist_failure.take()
    }

    /// One write attempt; a failure is logged and remembered, never retried.
    fn persist(&mut self) {
        if self.load_failed {
            log::debug!("Skipping save, stored data could not be read at startup");
            self.persist_failure = Some(DaybookError::Persistence(
                "stored data could not be read, changes are kept for this session only".into(),
            ));
            return;
        }
        let result = self
            .snapshot
            .to_json()
            .and_then(|json| self.backend.save(&json));
        if let Err(e) = result {
            log::error!("Failed to save planner data: {}", e);
            self.persist_failure = Some(e);
        }
    }
}

fn not_found(date: DateKey, section: Section, identity: &Identity) -> DaybookError {
    DaybookError::NotFound {
        date: date.to_string(),
        section,
        task: identity.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> DateKey {
        DateKey::from_ymd(2026, 2, 10).unwrap()
    }

    fn open() -> (Store, MemoryBackend) {
        let backend = MemoryBackend::new();
        (Store::open(Box::new(backend.clone())), backend)
    }

    fn title(t: &str) -> Identity {
        Identity::TitleKey(t.to_string())
    }

    #[test]
    fn ensure_day_seeds_once_and_persists() {
        let (mut store, backend) = open();
        assert!(store.get_day(day()).is_none());

        assert_eq!(store.ensure_day(day()).total(), 16);
        assert_eq!(backend.save_count(), 1);

        store.ensure_day(day());
        assert_eq!(backend.save_count(), 1);
    }

    #[test]
    fn ensure_day_keeps_recorded_state() {
        let (mut store, _) = open();
        store.ensure_day(day());
        store.toggle_task(day(), Section::Morning, &title("Healthy breakfast")).unwrap();
        let added = store.add_task(day(), TaskDraft::new("Walk", "personal")).unwrap();

        let before = store.get_day(day()).unwrap().clone();
        let after = store.ensure_day(day()).clone();
        assert_eq!(before, after);
        assert!(after.find(Section::Morning, &title("Healthy breakfast")).unwrap().completed);
        assert!(after.find(Section::Custom, &added.identity()).is_some());
    }

    #[test]
    fn add_task_routes_by_category() {
        let (mut store, _) = open();
        let work = store.add_task(day(), TaskDraft::new("Report", "work")).unwrap();
        let health = store.add_task(day(), TaskDraft::new("Stretch", "health")).unwrap();
        let personal = store.add_task(day(), TaskDraft::new("Groceries", "personal")).unwrap();

        let sections = store.get_day(day()).unwrap();
        assert!(sections.find(Section::Work, &work.identity()).is_some());
        assert!(sections.find(Section::Essential, &health.identity()).is_some());
        assert!(sections.find(Section::Custom, &personal.identity()).is_some());
        assert_eq!(store.custom_tasks().len(), 3);
    }

    #[test]
    fn add_task_without_title_changes_nothing() {
        let (mut store, backend) = open();
        let err = store.add_task(day(), TaskDraft::new("", "work")).unwrap_err();
        assert!(matches!(err, DaybookError::Validation(_)));
        assert!(store.get_day(day()).is_none());
        assert_eq!(backend.save_count(), 0);
    }

    #[test]
    fn toggle_twice_restores_counter_and_flag() {
        let (mut store, _) = open();
        store.ensure_day(day());
        let id = title("Lunch break");

        let on = store.toggle_task(day(), Section::Work, &id).unwrap();
        assert!(on.completed);
        assert_eq!(store.snapshot().stats.total_completed, 1);

        let off = store.toggle_task(day(), Section::Work, &id).unwrap();
        assert!(!off.completed);
        assert_eq!(store.snapshot().stats.total_completed, 0);
    }

    #[test]
    fn toggle_off_never_goes_negative() {
        let mut snap = StoreSnapshot::default();
        let mut seeded = catalog::seed_day();
        for task in seeded.tasks_mut() {
            task.completed = true;
        }
        snap.tasks.insert(day(), seeded);
        let backend = MemoryBackend::with_contents(snap.to_json().unwrap());
        let mut store = Store::open(Box::new(backend));
        assert_eq!(store.snapshot().stats.total_completed, 0);

        store.toggle_task(day(), Section::Work, &title("Lunch break")).unwrap();
        store.toggle_task(day(), Section::Work, &title("Afternoon work block")).unwrap();
        assert_eq!(store.snapshot().stats.total_completed, 0);
        assert_eq!(store.recount_completed(), 14);
    }

    #[test]
    fn toggle_missing_targets_is_not_found() {
        let (mut store, _) = open();
        let err = store.toggle_task(day(), Section::Work, &title("Lunch break")).unwrap_err();
        assert!(matches!(err, DaybookError::NotFound { .. }));

        store.ensure_day(day());
        let err = store.toggle_task(day(), Section::Morning, &title("Lunch break")).unwrap_err();
        assert!(matches!(err, DaybookError::NotFound { .. }));
        let err = store
            .toggle_task(day(), Section::Work, &Identity::Id("Lunch break".into()))
            .unwrap_err();
        assert!(matches!(err, DaybookError::NotFound { .. }));
    }

    #[test]
    fn delete_refuses_default_tasks() {
        let (mut store, backend) = open();
        store.ensure_day(day());
        let before = store.get_day(day()).unwrap().work.clone();
        let saves = backend.save_count();

        let err = store.delete_task(day(), Section::Work, &title("Lunch break")).unwrap_err();
        assert!(matches!(err, DaybookError::Permission(_)));
        assert_eq!(store.get_day(day()).unwrap().work, before);
        assert_eq!(backend.save_count(), saves);
    }

    #[test]
    fn delete_removes_manual_task_everywhere() {
        let (mut store, _) = open();
        let task = store.add_task(day(), TaskDraft::new("Report", "work")).unwrap();
        let removed = store.delete_task(day(), Section::Work, &task.identity()).unwrap();
        assert_eq!(removed.id, task.id);
        assert!(store.get_day(day()).unwrap().find(Section::Work, &task.identity()).is_none());
        assert!(store.custom_tasks().is_empty());

        let err = store.delete_task(day(), Section::Work, &task.identity()).unwrap_err();
        assert!(matches!(err, DaybookError::NotFound { .. }));
    }

    #[test]
    fn five_tasks_four_done_scenario() {
        let mut snap = StoreSnapshot::default();
        let mut sections = DaySections::default();
        for i in 0..5 {
            let mut t = TaskDraft::new(format!("Task {i}"), "personal").into_task().unwrap();
            t.completed = i < 4;
            sections.custom.push(t);
        }
        snap.tasks.insert(day(), sections);
        let mut store = Store::open(Box::new(MemoryBackend::with_contents(snap.to_json().unwrap())));

        assert_eq!(store.day_completion(day()), 80);
        let view = store.refresh_stats(day());
        assert_eq!(view.current_streak, 1);
        assert_eq!(store.snapshot().stats.current_streak, 1);
    }

    #[test]
    fn reflections_are_independent_of_tasks() {
        let (mut store, _) = open();
        assert_eq!(store.reflection(day()), None);
        store.save_reflection(day(), "Felt productive");
        assert_eq!(store.reflection(day()), Some("Felt productive"));
        assert!(store.get_day(day()).is_none());
        store.save_reflection(day(), "Rewritten");
        assert_eq!(store.day_view(day()).reflection, "Rewritten");
    }

    #[test]
    fn persist_failure_keeps_memory_authoritative() {
        let (mut store, backend) = open();
        backend.set_fail_saves(true);
        let task = store.add_task(day(), TaskDraft::new("Report", "work")).unwrap();
        assert!(matches!(store.take_persist_failure(), Some(DaybookError::Persistence(_))));
        assert!(store.take_persist_failure().is_none());
        assert!(store.get_day(day()).unwrap().find(Section::Work, &task.identity()).is_some());
        assert_eq!(backend.contents(), None);
    }

    #[test]
    fn corrupt_storage_loads_as_empty() {
        let backend = MemoryBackend::with_contents("{ definitely not json");
        let store = Store::open(Box::new(backend));
        assert_eq!(store.snapshot(), &StoreSnapshot::default());
    }

    #[test]
    fn serialize_then_load_roundtrips() {
        let (mut store, _) = open();
        store.ensure_day(day());
        store.toggle_task(day(), Section::Essential, &title("Quality sleep preparation")).unwrap();
        store.add_task(day(), TaskDraft::new("Journal", "spiritual").at("21:30").described("ten minutes")).unwrap();
        store.save_reflection(day(), "Calm");
        store.refresh_stats(day());

        let text = store.serialize().unwrap();
        let reopened = Store::open(Box::new(MemoryBackend::with_contents(text)));
        assert_eq!(reopened.snapshot(), store.snapshot());
    }

    #[test]
    fn days_do_not_share_task_state() {
        let (mut store, _) = open();
        let other = DateKey::from_ymd(2026, 2, 11).unwrap();
        store.ensure_day(day());
        store.ensure_day(other);

        store.toggle_task(day(), Section::Morning, &title("Healthy breakfast")).unwrap();
        assert!(store.get_day(day()).unwrap().find(Section::Morning, &title("Healthy breakfast")).unwrap().completed);
        assert!(!store.get_day(other).unwrap().find(Section::Morning, &title("Healthy breakfast")).unwrap().completed);
        assert_eq!(store.get_day(other).unwrap().completed(), 0);
    }

    #[test]
    fn unreadable_storage_is_reported_and_never_overwritten() {
        let backend = MemoryBackend::with_contents("{\"reflections\":{\"2026-02-09\":\"keep me\"}}");
        backend.set_fail_loads(true);
        let mut store = Store::open(Box::new(backend.clone()));
        assert!(matches!(store.take_persist_failure(), Some(DaybookError::Persistence(_))));

        store.add_task(day(), TaskDraft::new("Report", "work")).unwrap();
        store.refresh_stats(day());
        assert!(matches!(store.take_persist_failure(), Some(DaybookError::Persistence(_))));
        assert_eq!(backend.save_count(), 0);
        assert!(backend.contents().unwrap().contains("keep me"));
        // Memory still reflects the session
        assert_eq!(store.custom_tasks().len(), 1);
    }

    #[test]
    fn registry_follows_manual_toggles() {
        let (mut store, _) = open();
        let task = store.add_task(day(), TaskDraft::new("Report", "work")).unwrap();
        store.toggle_task(day(), Section::Work, &task.identity()).unwrap();
        assert!(store.custom_tasks()[0].completed);
        store.toggle_task(day(), Section::Work, &task.identity()).unwrap();
        assert!(!store.custom_tasks()[0].completed);
    }

    #[test]
    fn zero_lookback_is_raised_to_one_day() {
        let mut store = open().0.with_streak_lookback(0);
        store.ensure_day(day());
        let names: Vec<(Section, String)> = store
            .get_day(day())
            .unwrap()
            .sections()
            .flat_map(|(s, tasks)| tasks.iter().map(move |t| (s, t.title.clone())))
            .collect();
        for (section, name) in &names {
            store.toggle_task(day(), *section, &title(name)).unwrap();
        }
        assert_eq!(store.streak(day()), 1);
    }

    #[test]
    fn export_name_embeds_date_key() {
        let (store, _) = open();
        let export = store.export(day()).unwrap();
        assert_eq!(export.file_name, "task-planner-backup-2026-02-10.json");
        assert!(export.contents.contains("\"customTasks\""));
    }

    #[test]
    fn reset_clears_everything() {
        let (mut store, backend) = open();
        store.add_task(day(), TaskDraft::new("Report", "work")).unwrap();
        store.save_reflection(day(), "x");
        store.reset().unwrap();
        assert_eq!(store.snapshot(), &StoreSnapshot::default());
        assert_eq!(backend.contents(), None);
    }
}

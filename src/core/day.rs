use serde::{Deserialize, Serialize};

use super::section::Section;
use super::task::{Identity, Task};

/// The five ordered task lists of one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySections {
    #[serde(default)]
    pub essential: Vec<Task>,
    #[serde(default)]
    pub morning: Vec<Task>,
    #[serde(default)]
    pub work: Vec<Task>,
    #[serde(default)]
    pub evening: Vec<Task>,
    #[serde(default)]
    pub custom: Vec<Task>,
}

/// Per-section counters shown next to each section heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionBadge {
    pub completed: usize,
    pub total: usize,
    pub manual_count: usize,
}

impl SectionBadge {
    pub fn all_done(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

impl DaySections {
    pub fn section(&self, section: Section) -> &[Task] {
        match section {
            Section::Essential => &self.essential,
            Section::Morning => &self.morning,
            Section::Work => &self.work,
            Section::Evening => &self.evening,
            Section::Custom => &self.custom,
        }
    }

    pub fn section_mut(&mut self, section: Section) -> &mut Vec<Task> {
        match section {
            Section::Essential => &mut self.essential,
            Section::Morning => &mut self.morning,
            Section::Work => &mut self.work,
            Section::Evening => &mut self.evening,
            Section::Custom => &mut self.custom,
        }
    }

    pub fn sections(&self) -> impl Iterator<Item = (Section, &[Task])> {
        Section::ALL.into_iter().map(move |s| (s, self.section(s)))
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.sections().flat_map(|(_, tasks)| tasks.iter())
    }

    pub fn tasks_mut(&mut self) -> impl Iterator<Item = &mut Task> {
        self.essential
            .iter_mut()
            .chain(self.morning.iter_mut())
            .chain(self.work.iter_mut())
            .chain(self.evening.iter_mut())
            .chain(self.custom.iter_mut())
    }

    pub fn find(&self, section: Section, identity: &Identity) -> Option<&Task> {
        self.section(section).iter().find(|t| t.has_identity(identity))
    }

    pub fn find_mut(&mut self, section: Section, identity: &Identity) -> Option<&mut Task> {
        self.section_mut(section)
            .iter_mut()
            .find(|t| t.has_identity(identity))
    }

    pub fn position(&self, section: Section, identity: &Identity) -> Option<usize> {
        self.section(section).iter().position(|t| t.has_identity(identity))
    }

    pub fn total(&self) -> usize {
        self.tasks().count()
    }

    pub fn completed(&self) -> usize {
        self.tasks().filter(|t| t.completed).count()
    }

    /// Whether at least 80% of the day's tasks are done. A day without tasks
    /// never qualifies.
    pub fn meets_streak_threshold(&self) -> bool {
        let total = self.total();
        total > 0 && self.completed() * 5 >= total * 4
    }

    /// Completed share in `[0, 1]`, `0` for a day without tasks.
    pub fn completion_ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.completed() as f64 / total as f64
    }

    /// Rounded completion percentage in `[0, 100]`.
    pub fn completion_percentage(&self) -> u8 {
        (self.completion_ratio() * 100.0).round() as u8
    }

    pub fn badge(&self, section: Section) -> SectionBadge {
        let tasks = self.section(section);
        SectionBadge {
            completed: tasks.iter().filter(|t| t.completed).count(),
            total: tasks.len(),
            manual_count: tasks.iter().filter(|t| t.is_manual).count(),
        }
    }
}

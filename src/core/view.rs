use super::date_key::DateKey;
use super::day::{DaySections, SectionBadge};
use super::section::Section;
use super::task::{Task, sort_for_display};

/// Everything a front end needs to draw one day.
#[derive(Debug, Clone)]
pub struct DayView {
    pub date: DateKey,
    pub sections: Vec<SectionView>,
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
    pub reflection: String,
}

#[derive(Debug, Clone)]
pub struct SectionView {
    pub section: Section,
    pub tasks: Vec<Task>,
    pub badge: SectionBadge,
}

impl DayView {
    /// Build the view for a day. A day that was never initialized renders
    /// as five empty sections.
    pub fn build(date: DateKey, day: Option<&DaySections>, reflection: Option<&str>) -> Self {
        let empty = DaySections::default();
        let day = day.unwrap_or(&empty);

        let sections = Section::ALL
            .into_iter()
            .map(|section| SectionView {
                section,
                tasks: sort_for_display(day.section(section)),
                badge: day.badge(section),
            })
            .collect();

        Self {
            date,
            sections,
            completed: day.completed(),
            total: day.total(),
            percentage: day.completion_percentage(),
            reflection: reflection.unwrap_or_default().to_string(),
        }
    }

    pub fn section(&self, section: Section) -> Option<&SectionView> {
        self.sections.iter().find(|s| s.section == section)
    }
}

/// Headline numbers for the stats strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsView {
    pub today: u8,
    pub week: u8,
    pub month: u8,
    pub current_streak: u32,
    pub total_completed: u64,
}

use once_cell::sync::Lazy;

use super::day::DaySections;
use super::section::{Category, Section};
use super::task::Task;

type Entry = (&'static str, &'static str, Category);

fn essential() -> Vec<Entry> {
    vec![
        ("05:30", "Morning meditation & gratitude", Category::Spiritual),
        ("06:00", "Exercise or physical activity", Category::Health),
        ("22:00", "Plan tomorrow & reflection", Category::Personal),
        ("22:30", "Quality sleep preparation", Category::Health),
    ]
}

fn morning() -> Vec<Entry> {
    vec![
        ("06:30", "Healthy breakfast", Category::Health),
        ("07:00", "Review daily goals", Category::Personal),
        ("07:30", "Get ready for the day", Category::Personal),
    ]
}

fn work() -> Vec<Entry> {
    vec![
        ("09:00", "Check emails & prioritize tasks", Category::Work),
        ("10:00", "Focus on high-priority project", Category::Work),
        ("13:00", "Lunch break", Category::Personal),
        ("14:00", "Afternoon work block", Category::Work),
        ("17:00", "Wrap up and plan next day", Category::Work),
    ]
}

fn evening() -> Vec<Entry> {
    vec![
        ("18:00", "Dinner with family", Category::Family),
        ("19:00", "Personal learning time", Category::Study),
        ("20:00", "Hobby or relaxation", Category::Personal),
        ("21:00", "Family time", Category::Family),
    ]
}

fn build(section: Section, entries: Vec<Entry>) -> Vec<Task> {
    entries
        .into_iter()
        .map(|(time, title, category)| Task::default_entry(time, title, category, section))
        .collect()
}

/// Template every new day is seeded from. Never handed out mutably.
static TEMPLATE: Lazy<DaySections> = Lazy::new(|| DaySections {
    essential: build(Section::Essential, essential()),
    morning: build(Section::Morning, morning()),
    work: build(Section::Work, work()),
    evening: build(Section::Evening, evening()),
    custom: Vec::new(),
});

/// The fixed default tasks of one section. `Custom` has none.
pub fn default_tasks(section: Section) -> &'static [Task] {
    TEMPLATE.section(section)
}

/// A fresh, independent copy of the default catalog for a new day.
pub fn seed_day() -> DaySections {
    TEMPLATE.clone()
}

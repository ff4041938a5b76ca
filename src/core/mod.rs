pub mod catalog;
pub mod date_key;
pub mod day;
pub mod section;
pub mod stats;
pub mod task;
pub mod view;

pub use date_key::DateKey;
pub use day::{DaySections, SectionBadge};
pub use section::{Category, Section, section_for_category};
pub use stats::{DayMap, Stats};
pub use task::{Identity, Task, TaskDraft, sort_for_display};

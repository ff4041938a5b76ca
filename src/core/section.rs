use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DaybookError;

/// One of the five groupings a day's tasks are kept in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Essential,
    Morning,
    Work,
    Evening,
    Custom,
}

impl Section {
    /// Display order of the sections within a day.
    pub const ALL: [Section; 5] = [
        Self::Essential,
        Self::Morning,
        Self::Work,
        Self::Evening,
        Self::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Essential => "essential",
            Self::Morning => "morning",
            Self::Work => "work",
            Self::Evening => "evening",
            Self::Custom => "custom",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "essential" => Some(Self::Essential),
            "morning" => Some(Self::Morning),
            "work" => Some(Self::Work),
            "evening" => Some(Self::Evening),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Self::Essential => "Essential Daily Tasks",
            Self::Morning => "Morning Routine",
            Self::Work => "Work",
            Self::Evening => "Evening",
            Self::Custom => "My Tasks",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = DaybookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| DaybookError::Validation(format!("unknown section: {s:?}")))
    }
}

/// Life-category a task belongs to. Unrecognized names are kept verbatim
/// in `Other` so a stored snapshot never loses them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Personal,
    Work,
    Study,
    Health,
    Spiritual,
    Family,
    Other(String),
}

impl Category {
    pub const KNOWN: [Category; 6] = [
        Self::Personal,
        Self::Work,
        Self::Study,
        Self::Health,
        Self::Spiritual,
        Self::Family,
    ];

    /// Total over any input; blank text is treated as `Personal`.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "" | "personal" => Self::Personal,
            "work" => Self::Work,
            "study" => Self::Study,
            "health" => Self::Health,
            "spiritual" => Self::Spiritual,
            "family" => Self::Family,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Personal => "personal",
            Self::Work => "work",
            Self::Study => "study",
            Self::Health => "health",
            Self::Spiritual => "spiritual",
            Self::Family => "family",
            Self::Other(name) => name,
        }
    }

    /// Section a manually added task of this category is placed in.
    pub fn section(&self) -> Section {
        section_for_category(self)
    }
}

pub fn section_for_category(category: &Category) -> Section {
    match category {
        Category::Work => Section::Work,
        Category::Health | Category::Spiritual => Section::Essential,
        Category::Study | Category::Family => Section::Evening,
        Category::Personal | Category::Other(_) => Section::Custom,
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::core::date_key::DateKey;
use crate::core::stats::{DayMap, Stats};
use crate::core::task::Task;
use crate::error::Result;

/// Everything that is persisted, in the on-disk JSON shape.
///
/// Each top-level field defaults to its empty form when missing, and
/// top-level fields this version does not know about are carried through
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub tasks: DayMap,
    #[serde(default)]
    pub custom_tasks: Vec<Task>,
    #[serde(default)]
    pub reflections: BTreeMap<DateKey, String>,
    #[serde(default)]
    pub stats: Stats,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoreSnapshot {
    pub fn from_json(text: &str) -> Result<Self> {
        let mut snapshot: Self = serde_json::from_str(text)?;
        snapshot.normalize();
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn normalize(&mut self) {
        for day in self.tasks.values_mut() {
            day.tasks_mut().for_each(Task::normalize_flags);
        }
        self.custom_tasks.iter_mut().for_each(Task::normalize_flags);
    }
}

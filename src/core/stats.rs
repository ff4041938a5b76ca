use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::date_key::DateKey;
use super::day::DaySections;

/// All recorded days, keyed and ordered by date.
pub type DayMap = BTreeMap<DateKey, DaySections>;

/// Process-wide counters persisted alongside the task data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub total_completed: u64,
    pub current_streak: u32,
}

impl Stats {
    pub fn record_toggle(&mut self, now_completed: bool) {
        if now_completed {
            self.total_completed += 1;
        } else {
            self.total_completed = self.total_completed.saturating_sub(1);
        }
    }
}

/// Completion percentage of one day; `0` when the day has no entry.
pub fn day_completion(days: &DayMap, key: DateKey) -> u8 {
    days.get(&key).map_or(0, DaySections::completion_percentage)
}

/// Average daily completion from the Sunday opening the reference week
/// through the reference day.
pub fn week_completion(days: &DayMap, reference: DateKey) -> u8 {
    average_completion(days, reference.week_start(), reference)
}

/// Average daily completion from the first of the month through the
/// reference day.
pub fn month_completion(days: &DayMap, reference: DateKey) -> u8 {
    let end = reference.min(reference.month_end());
    average_completion(days, reference.month_start(), end)
}

fn average_completion(days: &DayMap, start: DateKey, end: DateKey) -> u8 {
    let mut sum = 0u32;
    let mut count = 0u32;
    let mut cursor = Some(start);
    while let Some(key) = cursor.filter(|k| *k <= end) {
        sum += u32::from(day_completion(days, key));
        count += 1;
        cursor = key.succ();
    }
    if count == 0 {
        return 0;
    }
    (f64::from(sum) / f64::from(count)).round() as u8
}

/// Consecutive days ending at `reference` that meet the 80% threshold.
///
/// The scan walks backward and stops at the first day that falls short, the
/// first day with no stored entry, or after `max_lookback` days.
pub fn streak(days: &DayMap, reference: DateKey, max_lookback: u32) -> u32 {
    let mut count = 0u32;
    let mut cursor = Some(reference);
    while let Some(key) = cursor {
        if count >= max_lookback {
            log::debug!("Streak scan hit lookback cap of {} days", max_lookback);
            break;
        }
        match days.get(&key) {
            Some(day) if day.meets_streak_threshold() => {
                count += 1;
                cursor = key.pred();
            }
            _ => break,
        }
    }
    count
}

/// Calendar-grid classification of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    Perfect,
    Partial,
    Empty,
}

pub fn day_status(days: &DayMap, key: DateKey) -> DayStatus {
    match day_completion(days, key) {
        100 => DayStatus::Perfect,
        0 => DayStatus::Empty,
        _ => DayStatus::Partial,
    }
}

/// Every day of the reference month with its status.
pub fn month_calendar(days: &DayMap, reference: DateKey) -> Vec<(DateKey, DayStatus)> {
    let end = reference.month_end();
    let mut out = Vec::new();
    let mut cursor = Some(reference.month_start());
    while let Some(key) = cursor.filter(|k| *k <= end) {
        out.push((key, day_status(days, key)));
        cursor = key.succ();
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub date: DateKey,
    pub percentage: u8,
    pub task_count: usize,
}

impl DaySummary {
    pub fn is_perfect(&self) -> bool {
        self.percentage == 100
    }
}

/// The seven Sunday-start days containing a reference date.
#[derive(Debug, Clone)]
pub struct WeekOverview {
    pub days: Vec<DaySummary>,
}

impl WeekOverview {
    pub fn build(days: &DayMap, reference: DateKey) -> Self {
        let mut out = Vec::with_capacity(7);
        let mut cursor = Some(reference.week_start());
        while let Some(key) = cursor.filter(|_| out.len() < 7) {
            out.push(DaySummary {
                date: key,
                percentage: day_completion(days, key),
                task_count: days.get(&key).map_or(0, DaySections::total),
            });
            cursor = key.succ();
        }
        Self { days: out }
    }
}

/// Month-to-date totals for the reference month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSummary {
    pub perfect_days: u32,
    pub average_completion: u8,
    pub total_tasks: usize,
    pub current_streak: u32,
}

impl MonthSummary {
    pub fn build(days: &DayMap, reference: DateKey, current_streak: u32) -> Self {
        let mut perfect_days = 0;
        let mut total_tasks = 0;
        let mut cursor = Some(reference.month_start());
        while let Some(key) = cursor.filter(|k| *k <= reference) {
            if day_completion(days, key) == 100 {
                perfect_days += 1;
            }
            total_tasks += days.get(&key).map_or(0, DaySections::total);
            cursor = key.succ();
        }
        Self {
            perfect_days,
            average_completion: month_completion(days, reference),
            total_tasks,
            current_streak,
        }
    }
}

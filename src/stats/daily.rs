use std::collections::HashMap;

use serde::Serialize;

use crate::schedule::interval::Interval;
use crate::schedule::partition::FullPartition;
use crate::schedule::time::MINUTES_PER_DAY;

/// Groups below this total are too small to count as the shortest activity.
pub const SHORTEST_MIN_MINUTES: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleTotal {
    pub title: String,
    pub minutes: u32,
    pub percent_of_day: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub scheduled_minutes: u32,
    pub free_minutes: u32,
    pub activity_count: usize,
    pub average_activity_minutes: u32,
    pub scheduled_percent: u32,
    pub free_percent: u32,
    pub per_title: Vec<TitleTotal>,
    pub longest: Option<TitleTotal>,
    pub shortest: Option<TitleTotal>,
}

impl StatsSummary {
    pub fn is_empty(&self) -> bool {
        self.activity_count == 0
    }
}

pub fn round_half_up(numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return 0;
    }
    (2 * numerator + denominator) / (2 * denominator)
}

pub fn percent_of_day(minutes: u32) -> u32 {
    round_half_up(minutes * 100, MINUTES_PER_DAY)
}

pub fn stats(partition: &FullPartition) -> StatsSummary {
    let scheduled_minutes: u32 = partition.activities().map(Interval::duration_minutes).sum();
    let free_minutes: u32 = partition.free_time().map(Interval::duration_minutes).sum();
    let activity_count = partition.activities().count();

    let groups = group_by_title(partition.activities());

    let shortest = groups
        .iter()
        .filter(|g| g.minutes >= SHORTEST_MIN_MINUTES)
        .min_by_key(|g| g.minutes)
        .cloned();

    let mut per_title = groups;
    per_title.sort_by(|a, b| b.minutes.cmp(&a.minutes));
    let longest = per_title.first().cloned();

    let scheduled_percent = percent_of_day(scheduled_minutes);

    StatsSummary {
        scheduled_minutes,
        free_minutes,
        activity_count,
        average_activity_minutes: round_half_up(scheduled_minutes, activity_count as u32),
        scheduled_percent,
        free_percent: 100 - scheduled_percent,
        per_title,
        longest,
        shortest,
    }
}

/// Totals per exact title, in order of first appearance.
fn group_by_title<'a>(activities: impl Iterator<Item = &'a Interval>) -> Vec<TitleTotal> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut totals: Vec<TitleTotal> = Vec::new();

    for activity in activities {
        let slot = *index.entry(activity.title.as_str()).or_insert_with(|| {
            totals.push(TitleTotal {
                title: activity.title.clone(),
                minutes: 0,
                percent_of_day: 0,
            });
            totals.len() - 1
        });
        totals[slot].minutes += activity.duration_minutes();
    }

    for total in &mut totals {
        total.percent_of_day = percent_of_day(total.minutes);
    }

    totals
}

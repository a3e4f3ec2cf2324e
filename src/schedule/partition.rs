use std::ops::Deref;

use crate::schedule::error::ScheduleError;
use crate::schedule::interval::Interval;
use crate::schedule::time::TimePoint;

/// A day tiled end to end: sorted, starting at midnight, ending at 24:00,
/// with no gaps and no overlaps. Only [`partition`] builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct FullPartition {
    segments: Vec<Interval>,
}

impl FullPartition {
    pub fn segments(&self) -> &[Interval] {
        &self.segments
    }

    pub fn activities(&self) -> impl Iterator<Item = &Interval> {
        self.segments.iter().filter(|s| !s.is_synthetic)
    }

    pub fn free_time(&self) -> impl Iterator<Item = &Interval> {
        self.segments.iter().filter(|s| s.is_synthetic)
    }

    pub fn into_segments(self) -> Vec<Interval> {
        self.segments
    }
}

impl Deref for FullPartition {
    type Target = [Interval];

    fn deref(&self) -> &Self::Target {
        &self.segments
    }
}

pub fn partition(raw: &[Interval]) -> Result<FullPartition, ScheduleError> {
    let mut sorted: Vec<&Interval> = raw.iter().filter(|i| !i.is_synthetic).collect();

    if let Some(bad) = sorted
        .iter()
        .find(|i| i.is_degenerate() || i.end > TimePoint::END_OF_DAY)
    {
        return Err(ScheduleError::DegenerateSegment {
            start: bad.start,
            end: bad.end,
        });
    }

    sorted.sort_by_key(|i| (i.start, i.end));

    if let Some(pair) = sorted.windows(2).find(|pair| pair[0].overlaps(pair[1])) {
        return Err(ScheduleError::Overlap {
            first: pair[0].describe(),
            second: pair[1].describe(),
        });
    }

    let mut segments = Vec::with_capacity(sorted.len() * 2 + 1);
    let mut cursor = TimePoint::MIDNIGHT;

    for interval in sorted {
        if cursor < interval.start {
            segments.push(Interval::free(cursor, interval.start));
        }
        segments.push(interval.clone());
        cursor = interval.end;
    }

    if cursor < TimePoint::END_OF_DAY {
        segments.push(Interval::free(cursor, TimePoint::END_OF_DAY));
    }

    tracing::debug!("Partitioned {} activities into {} segments", raw.len(), segments.len());

    Ok(FullPartition { segments })
}

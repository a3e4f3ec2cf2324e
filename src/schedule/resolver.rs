use crate::schedule::error::ScheduleError;
use crate::schedule::interval::Interval;
use crate::schedule::time::TimePoint;

/// The raw interval running at `now`. Gaps are not filled here: free time
/// means there is no current activity.
pub fn current_activity(raw: &[Interval], now: TimePoint) -> Result<Option<&Interval>, ScheduleError> {
    let mut matches = raw.iter().filter(|i| !i.is_synthetic && i.contains(now));

    let Some(found) = matches.next() else {
        return Ok(None);
    };

    if let Some(other) = matches.next() {
        tracing::error!("Two activities claim {}: {} and {}", now, found.describe(), other.describe());
        return Err(ScheduleError::Overlap {
            first: found.describe(),
            second: other.describe(),
        });
    }

    Ok(Some(found))
}

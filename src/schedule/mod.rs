pub mod clock;
pub mod day;
pub mod error;
pub mod interval;
pub mod partition;
pub mod resolver;
pub mod time;

pub use clock::{Clock, ClockReading, FixedClock, SystemClock};
pub use day::{DayOfWeek, DaySchedule};
pub use error::ScheduleError;
pub use interval::Interval;
pub use partition::{FullPartition, partition};
pub use resolver::current_activity;
pub use time::{TimePoint, format_duration, from_minutes, to_minutes};

pub mod schedule;
pub mod session;
pub mod stats;
pub mod storage;
pub mod sync;
pub mod ui;

pub use schedule::{DayOfWeek, DaySchedule, FullPartition, Interval, ScheduleError, TimePoint};
pub use session::{ScheduleEditSession, SessionError, SessionState};

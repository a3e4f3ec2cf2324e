pub mod daily;

pub use daily::{StatsSummary, TitleTotal, stats};

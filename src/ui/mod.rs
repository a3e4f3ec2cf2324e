pub mod wheel;

pub use wheel::{LayoutSegment, WheelConfig, layout};

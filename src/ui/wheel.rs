use serde::{Deserialize, Serialize};

use crate::schedule::error::ScheduleError;
use crate::schedule::interval::Interval;
use crate::schedule::partition::FullPartition;
use crate::schedule::time::MINUTES_PER_DAY;

const ANGLE_TOLERANCE: f64 = 1e-6;
const FULL_TURN: f64 = 360.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub origin_angle: f64,
    pub clockwise: bool,
    pub min_duration_for_label: u32,
    pub center_x: f64,
    pub center_y: f64,
    pub outer_radius: f64,
    pub label_radius: f64,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            origin_angle: -90.0,
            clockwise: true,
            min_duration_for_label: 30,
            center_x: 200.0,
            center_y: 200.0,
            outer_radius: 180.0,
            label_radius: 120.0,
        }
    }
}

impl WheelConfig {
    pub fn point_at(&self, angle: f64, radius: f64) -> Point {
        let rad = angle.to_radians();
        Point {
            x: self.center_x + radius * rad.cos(),
            y: self.center_y + radius * rad.sin(),
        }
    }

    fn closing_angle(&self) -> f64 {
        if self.clockwise {
            self.origin_angle + FULL_TURN
        } else {
            self.origin_angle - FULL_TURN
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSegment {
    pub interval: Interval,
    pub start_angle: f64,
    pub end_angle: f64,
    pub label_anchor: Point,
    pub show_label: bool,
    pub large_arc: bool,
}

impl LayoutSegment {
    pub fn sweep(&self) -> f64 {
        (self.end_angle - self.start_angle).abs()
    }

    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }
}

pub fn layout(partition: &FullPartition, config: &WheelConfig) -> Result<Vec<LayoutSegment>, ScheduleError> {
    layout_segments(partition.segments(), config)
}

/// Lays out any segment sequence. The sequence must cover the whole day;
/// a wheel that does not close exactly is reported as [`ScheduleError::AngleDrift`].
pub fn layout_segments(segments: &[Interval], config: &WheelConfig) -> Result<Vec<LayoutSegment>, ScheduleError> {
    let direction = if config.clockwise { 1.0 } else { -1.0 };
    let mut angle = config.origin_angle;
    let mut laid_out = Vec::with_capacity(segments.len());

    for segment in segments {
        if segment.is_degenerate() {
            return Err(ScheduleError::DegenerateSegment {
                start: segment.start,
                end: segment.end,
            });
        }

        let duration = segment.duration_minutes();
        let span = f64::from(duration) / f64::from(MINUTES_PER_DAY) * FULL_TURN;
        let end_angle = angle + direction * span;
        let label_anchor = config.point_at((angle + end_angle) / 2.0, config.label_radius);

        laid_out.push(LayoutSegment {
            interval: segment.clone(),
            start_angle: angle,
            end_angle,
            label_anchor,
            show_label: duration >= config.min_duration_for_label,
            large_arc: span > FULL_TURN / 2.0,
        });

        angle = end_angle;
    }

    let expected = config.closing_angle();
    if (angle - expected).abs() > ANGLE_TOLERANCE {
        tracing::error!("Wheel layout ended at {} instead of {}", angle, expected);
        return Err(ScheduleError::AngleDrift {
            expected,
            actual: angle,
        });
    }

    Ok(laid_out)
}

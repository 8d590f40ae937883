//! Mobility schedules for wireless stations.
//!
//! A schedule only declares where and when each station moves. Position
//! interpolation while the lab runs is done by the emulation runtime.

use super::types::{Position, TopologyError};
use serde::{Deserialize, Serialize};

/// Rectangular area the mobility model keeps stations inside
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for Area {
    fn default() -> Self {
        Self { max_x: 100.0, max_y: 100.0 }
    }
}

impl Area {
    pub fn contains(&self, pos: &Position) -> bool {
        (0.0..=self.max_x).contains(&pos.x) && (0.0..=self.max_y).contains(&pos.y)
    }
}

/// One station's movement window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobilityEntry {
    pub node: String,
    pub start_position: Position,
    pub end_position: Position,
    /// Seconds after mobility starts
    pub start_time: u32,
    pub end_time: u32,
    pub min_speed: f64,
    pub max_speed: f64,
}

impl MobilityEntry {
    pub fn validate(&self) -> Result<(), TopologyError> {
        if self.start_time >= self.end_time {
            return Err(TopologyError::InvalidMobility(format!(
                "'{}' starts at {}s but ends at {}s (start must be before end)",
                self.node, self.start_time, self.end_time
            )));
        }
        if !(self.min_speed >= 0.0) || !self.max_speed.is_finite() {
            return Err(TopologyError::InvalidMobility(format!(
                "'{}' has invalid speed bounds {}..{}",
                self.node, self.min_speed, self.max_speed
            )));
        }
        if self.min_speed > self.max_speed {
            return Err(TopologyError::InvalidMobility(format!(
                "'{}' min_speed {} exceeds max_speed {}",
                self.node, self.min_speed, self.max_speed
            )));
        }
        Ok(())
    }
}

/// Time-indexed mobility plan for all mobile stations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MobilitySchedule {
    /// Runtime mobility model name
    pub model: String,
    pub area: Area,
    pub start_time: u32,
    pub stop_time: u32,
    pub min_speed: f64,
    pub max_speed: f64,
    pub entries: Vec<MobilityEntry>,
}

impl MobilitySchedule {
    pub const DEFAULT_MODEL: &'static str = "RandomDirection";

    /// Build a schedule from validated entries.
    ///
    /// Global speed bounds cover every entry and the schedule stops one
    /// second after the last station finishes moving.
    pub fn new(area: Area, entries: Vec<MobilityEntry>) -> Result<Self, TopologyError> {
        if entries.is_empty() {
            return Err(TopologyError::InvalidMobility("schedule has no entries".to_string()));
        }
        for entry in &entries {
            entry.validate()?;
            for pos in [&entry.start_position, &entry.end_position] {
                if !area.contains(pos) {
                    log::warn!(
                        "Position {} of '{}' lies outside the {}x{} mobility area",
                        pos, entry.node, area.max_x, area.max_y
                    );
                }
            }
        }

        let min_speed = entries.iter().map(|e| e.min_speed).fold(f64::INFINITY, f64::min);
        let max_speed = entries.iter().map(|e| e.max_speed).fold(0.0, f64::max);
        let last_end = entries.iter().map(|e| e.end_time).max().unwrap_or(0);
        let stop_time = last_end.checked_add(1).ok_or_else(|| {
            TopologyError::InvalidMobility(format!(
                "end_time {} leaves no second to stop the schedule",
                last_end
            ))
        })?;

        Ok(Self {
            model: Self::DEFAULT_MODEL.to_string(),
            area,
            start_time: 0,
            stop_time,
            min_speed,
            max_speed,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(node: &str, start: u32, end: u32, min: f64, max: f64) -> MobilityEntry {
        MobilityEntry {
            node: node.to_string(),
            start_position: Position::new(10.0, 30.0, 0.0),
            end_position: Position::new(60.0, 50.0, 0.0),
            start_time: start,
            end_time: end,
            min_speed: min,
            max_speed: max,
        }
    }

    #[test]
    fn test_schedule_bounds() {
        let schedule = MobilitySchedule::new(
            Area::default(),
            vec![entry("UE1", 10, 20, 1.0, 5.0), entry("UE2", 30, 60, 5.0, 10.0)],
        )
        .unwrap();
        assert_eq!(schedule.stop_time, 61);
        assert_eq!(schedule.min_speed, 1.0);
        assert_eq!(schedule.max_speed, 10.0);
        assert_eq!(schedule.model, "RandomDirection");
        for e in &schedule.entries {
            assert!(e.start_time < e.end_time);
            assert!(e.min_speed <= e.max_speed);
        }
    }

    #[test]
    fn test_rejects_inverted_times() {
        let err = MobilitySchedule::new(Area::default(), vec![entry("UE1", 20, 20, 1.0, 5.0)]);
        assert!(matches!(err, Err(TopologyError::InvalidMobility(_))));
        let err = MobilitySchedule::new(Area::default(), vec![entry("UE1", 30, 10, 1.0, 5.0)]);
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_inverted_speeds() {
        let err = MobilitySchedule::new(Area::default(), vec![entry("UE1", 10, 20, 6.0, 5.0)]);
        assert!(matches!(err, Err(TopologyError::InvalidMobility(_))));
        let err = MobilitySchedule::new(Area::default(), vec![entry("UE1", 10, 20, -1.0, 5.0)]);
        assert!(err.is_err());
    }

    #[test]
    fn test_equal_speeds_allowed() {
        assert!(MobilitySchedule::new(Area::default(), vec![entry("UE1", 0, 1, 3.0, 3.0)]).is_ok());
    }

    #[test]
    fn test_latest_end_time_is_rejected() {
        let err = MobilitySchedule::new(Area::default(), vec![entry("UE1", 10, u32::MAX, 1.0, 2.0)]);
        assert!(matches!(err, Err(TopologyError::InvalidMobility(_))));

        let schedule =
            MobilitySchedule::new(Area::default(), vec![entry("UE1", 10, u32::MAX - 1, 1.0, 2.0)]).unwrap();
        assert_eq!(schedule.stop_time, u32::MAX);
    }

    #[test]
    fn test_empty_schedule_rejected() {
        assert!(MobilitySchedule::new(Area::default(), Vec::new()).is_err());
    }
}

use serde::Serialize;

use crate::models::{ClickPoint, Placement, SENSOR_LABELS};

/// Shown in place of the dashboard while the marker count is wrong.
pub const PLACEMENT_NOTICE: &str = "Please place the sensors.";

/// Collects floor-plan clicks and assigns them to sensor labels by arrival
/// order. Points are clamped to the image as they arrive.
#[derive(Debug, Clone)]
pub struct PlacementCollector {
    width: u32,
    height: u32,
    points: Vec<ClickPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementStatus {
    pub labels: Vec<String>,
    pub points: Vec<ClickPoint>,
    pub required: usize,
    /// Label the next click would be assigned to, if any remain.
    pub next_label: Option<String>,
    pub placements: Option<Vec<Placement>>,
    pub notice: Option<String>,
}

impl PlacementCollector {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            points: Vec::new(),
        }
    }

    /// Record a click, clamped to `[0, W-1] x [0, H-1]`. Returns the stored point.
    pub fn push(&mut self, x: f64, y: f64) -> ClickPoint {
        let point = ClickPoint {
            x: clamp_axis(x, self.width),
            y: clamp_axis(y, self.height),
        };
        self.points.push(point);
        point
    }

    pub fn undo(&mut self) -> Option<ClickPoint> {
        self.points.pop()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[ClickPoint] {
        &self.points
    }

    pub fn is_satisfied(&self) -> bool {
        self.points.len() == SENSOR_LABELS.len()
    }

    pub fn next_label(&self) -> Option<&'static str> {
        SENSOR_LABELS.get(self.points.len()).copied()
    }

    /// Zip clicks with the fixed label list. Only defined for exactly as many
    /// points as labels; extra points are not truncated away.
    pub fn placements(&self) -> Option<Vec<Placement>> {
        if !self.is_satisfied() {
            return None;
        }
        Some(
            self.points
                .iter()
                .zip(SENSOR_LABELS)
                .map(|(point, label)| Placement {
                    sensor: label.to_string(),
                    x: point.x,
                    y: point.y,
                })
                .collect(),
        )
    }

    pub fn status(&self) -> PlacementStatus {
        let placements = self.placements();
        PlacementStatus {
            labels: SENSOR_LABELS.iter().map(|s| s.to_string()).collect(),
            points: self.points.clone(),
            required: SENSOR_LABELS.len(),
            next_label: self.next_label().map(str::to_string),
            notice: placements
                .is_none()
                .then(|| PLACEMENT_NOTICE.to_string()),
            placements,
        }
    }
}

fn clamp_axis(value: f64, extent: u32) -> f64 {
    let max = extent.saturating_sub(1) as f64;
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector_with(points: &[(f64, f64)]) -> PlacementCollector {
        let mut collector = PlacementCollector::new(100, 80);
        for &(x, y) in points {
            collector.push(x, y);
        }
        collector
    }

    #[test]
    fn five_points_map_to_labels_in_click_order() {
        let collector = collector_with(&[
            (10.0, 10.0),
            (20.0, 20.0),
            (30.0, 30.0),
            (40.0, 40.0),
            (50.0, 50.0),
        ]);

        let placements = collector.placements().expect("five points placed");
        let sensors: Vec<&str> = placements.iter().map(|p| p.sensor.as_str()).collect();
        assert_eq!(sensors, SENSOR_LABELS.to_vec());
        assert_eq!((placements[3].x, placements[3].y), (40.0, 40.0));
    }

    #[test]
    fn only_exactly_five_points_are_satisfied() {
        for count in 0..8 {
            let points: Vec<(f64, f64)> = (0..count).map(|i| (i as f64, i as f64)).collect();
            let collector = collector_with(&points);
            assert_eq!(collector.placements().is_some(), count == 5, "count {count}");
        }
    }

    #[test]
    fn clicks_are_clamped_to_the_image() {
        let mut collector = PlacementCollector::new(100, 80);
        let point = collector.push(-5.0, 500.0);
        assert_eq!((point.x, point.y), (0.0, 79.0));

        let point = collector.push(250.0, f64::NAN);
        assert_eq!((point.x, point.y), (99.0, 0.0));
    }

    #[test]
    fn status_reports_notice_and_next_label() {
        let mut collector = collector_with(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0)]);
        let status = collector.status();
        assert_eq!(status.notice.as_deref(), Some(PLACEMENT_NOTICE));
        assert_eq!(status.next_label.as_deref(), Some("TruckLoading"));
        assert!(status.placements.is_none());

        collector.push(5.0, 5.0);
        let status = collector.status();
        assert!(status.notice.is_none());
        assert!(status.next_label.is_none());
        assert_eq!(status.placements.map(|p| p.len()), Some(5));
    }

    #[test]
    fn undo_and_clear_remove_points() {
        let mut collector = collector_with(&[(1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(collector.undo(), Some(ClickPoint { x: 2.0, y: 2.0 }));
        assert_eq!(collector.points().len(), 1);
        collector.clear();
        assert!(collector.points().is_empty());
        assert_eq!(collector.undo(), None);
    }
}

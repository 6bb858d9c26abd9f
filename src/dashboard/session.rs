//! One dashboard session: loaded data, marker placements, time window,
//! animation position and the latest rendered frame.

use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::animation::{Advance, AnimationState, AnimationStatus};
use crate::data::{FloorPlan, LoadedReadings};
use crate::models::TimeWindow;
use crate::overlay::{merge_readings, MergedData, ValueRange};
use crate::placement::{PlacementCollector, PlacementStatus, PLACEMENT_NOTICE};
use crate::render::{FrameJob, FrameRenderer, RenderConfig, RenderedFrame};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// What a Running step produced.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    Frame(RenderedFrame),
    Finished,
    Idle,
}

/// Result of [`DashboardSession::advance`]: work to do outside the lock.
#[derive(Debug, Clone)]
pub enum PendingStep {
    Render(FrameJob),
    Finished,
    Idle,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub session_id: String,
    pub status: AnimationStatus,
    pub current_index: usize,
    /// Timestamp of the frame currently on display.
    pub displayed_timestamp: Option<NaiveDateTime>,
    pub timestamp_count: usize,
    pub domain: Option<TimeWindow>,
    pub window: Option<TimeWindow>,
    pub value_range: Option<ValueRange>,
    pub placement: PlacementStatus,
    pub image_width: u32,
    pub image_height: u32,
}

pub struct DashboardSession {
    id: String,
    readings: LoadedReadings,
    floor_plan: FloorPlan,
    collector: PlacementCollector,
    merged: Option<MergedData>,
    timestamps: Vec<NaiveDateTime>,
    window: Option<TimeWindow>,
    animation: AnimationState,
    renderer: FrameRenderer,
    latest_frame: Option<RenderedFrame>,
}

impl DashboardSession {
    pub fn new(readings: LoadedReadings, floor_plan: FloorPlan, config: RenderConfig) -> Self {
        let renderer = FrameRenderer::new(floor_plan.image().clone(), config);
        let collector = PlacementCollector::new(floor_plan.width(), floor_plan.height());
        Self {
            id: Uuid::new_v4().to_string(),
            readings,
            floor_plan,
            collector,
            merged: None,
            timestamps: Vec::new(),
            window: None,
            animation: AnimationState::new(),
            renderer,
            latest_frame: None,
        }
    }

    pub fn floor_plan(&self) -> &FloorPlan {
        &self.floor_plan
    }

    pub fn readings(&self) -> &LoadedReadings {
        &self.readings
    }

    pub fn merged(&self) -> Option<&MergedData> {
        self.merged.as_ref()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn window(&self) -> Option<TimeWindow> {
        self.window
    }

    pub fn animation(&self) -> AnimationState {
        self.animation
    }

    pub fn latest_frame(&self) -> Option<&RenderedFrame> {
        self.latest_frame.as_ref()
    }

    pub fn set_render_config(&mut self, config: RenderConfig) {
        self.renderer.set_config(config);
    }

    pub fn place_sensor(&mut self, x: f64, y: f64) -> PlacementStatus {
        let label = self.collector.next_label();
        let point = self.collector.push(x, y);
        log_info!(
            "Placed point {} at ({:.0}, {:.0}) -> {}",
            self.collector.points().len(),
            point.x,
            point.y,
            label.unwrap_or("<unassigned>")
        );
        self.refresh_merge();
        self.collector.status()
    }

    pub fn undo_placement(&mut self) -> PlacementStatus {
        self.collector.undo();
        self.refresh_merge();
        self.collector.status()
    }

    pub fn clear_placements(&mut self) -> PlacementStatus {
        self.collector.clear();
        self.refresh_merge();
        self.collector.status()
    }

    /// Rebuild the join whenever placements change. Losing the five-point
    /// condition drops merged data and stops the animation.
    fn refresh_merge(&mut self) {
        match self.collector.placements() {
            Some(placements) => {
                let merged = merge_readings(&self.readings.readings, &placements);
                self.timestamps = merged.timestamps();
                self.window = TimeWindow::full(&self.timestamps);
                self.animation.clamp_to(self.timestamps.len());
                self.merged = Some(merged);
            }
            None => {
                if self.merged.is_some() {
                    log_warn!("{}", PLACEMENT_NOTICE);
                }
                self.merged = None;
                self.timestamps.clear();
                self.window = None;
                self.animation.stop();
            }
        }
    }

    /// Restrict which timestamps are shown; bounds are clamped into the domain.
    pub fn set_time_window(&mut self, start: NaiveDateTime, end: NaiveDateTime) -> Result<TimeWindow> {
        if self.merged.is_none() {
            bail!(PLACEMENT_NOTICE);
        }
        let window = TimeWindow::new(start, end)?.clamp_to(&self.timestamps);
        log_info!("Time window set to {} .. {}", window.start, window.end);
        self.window = Some(window);
        Ok(window)
    }

    pub fn toggle_animation(&mut self) -> Result<AnimationStatus> {
        if !self.animation.is_running() && self.merged.is_none() {
            bail!(PLACEMENT_NOTICE);
        }
        let status = self.animation.toggle();
        log_info!(
            "Animation {:?} at index {}",
            status,
            self.animation.current_index
        );
        Ok(status)
    }

    /// Move the animation one step and describe the frame to draw, if any.
    pub fn advance(&mut self) -> PendingStep {
        let (Some(merged), Some(window)) = (self.merged.as_ref(), self.window) else {
            self.animation.stop();
            return PendingStep::Idle;
        };

        match self.animation.advance(&self.timestamps, &window) {
            Advance::Frame { index, timestamp } => PendingStep::Render(FrameJob {
                index,
                timestamp,
                rows: merged.rows_at(timestamp),
                value_range: merged.value_range(),
                renderer: self.renderer.clone(),
            }),
            Advance::Finished => {
                log_info!("Animation reached the end of {} timestamps", self.timestamps.len());
                PendingStep::Finished
            }
            Advance::Idle => PendingStep::Idle,
        }
    }

    /// Undo the advance for a frame that was rendered but never shown, so a
    /// resumed animation starts from it. No-op if the index has moved on.
    pub fn rewind_to(&mut self, index: usize) {
        if self.animation.current_index == index + 1 {
            self.animation.current_index = index;
        }
    }

    /// Replace whatever frame was on display.
    pub fn present(&mut self, frame: RenderedFrame) {
        self.latest_frame = Some(frame);
    }

    /// Advance, render and present in one go on the calling thread.
    pub fn step(&mut self) -> Result<StepOutcome> {
        match self.advance() {
            PendingStep::Render(job) => {
                let frame = job.render()?;
                self.present(frame.clone());
                Ok(StepOutcome::Frame(frame))
            }
            PendingStep::Finished => Ok(StepOutcome::Finished),
            PendingStep::Idle => Ok(StepOutcome::Idle),
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            session_id: self.id.clone(),
            status: self.animation.status,
            current_index: self.animation.current_index,
            displayed_timestamp: self.latest_frame.as_ref().map(|f| f.timestamp),
            timestamp_count: self.timestamps.len(),
            domain: TimeWindow::full(&self.timestamps),
            window: self.window,
            value_range: self.merged.as_ref().and_then(|m| m.value_range()),
            placement: self.collector.status(),
            image_width: self.floor_plan.width(),
            image_height: self.floor_plan.height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::csv_loader::load_readings_from_reader;
    use image::{Rgba, RgbaImage};

    const CSV: &str = "\
Date,Time,AboveSuperSac,ControlRoom,Palletizer,TransferPoint,TruckLoading
10/31/2024,08:00,1,2,3,4,5
10/31/2024,08:01,2,3,4,5,6
10/31/2024,08:02,3,4,5,6,7
";

    fn session() -> DashboardSession {
        let readings = load_readings_from_reader(CSV.as_bytes()).unwrap();
        let plan = FloorPlan::from_image(RgbaImage::from_pixel(80, 60, Rgba([255, 255, 255, 255])));
        DashboardSession::new(readings, plan, RenderConfig::default())
    }

    fn place_all(session: &mut DashboardSession) {
        for i in 1..=5 {
            session.place_sensor(i as f64 * 10.0, i as f64 * 10.0);
        }
    }

    #[test]
    fn toggle_requires_five_placements() {
        let mut session = session();
        session.place_sensor(1.0, 1.0);
        let err = session.toggle_animation().unwrap_err();
        assert_eq!(err.to_string(), PLACEMENT_NOTICE);
        assert!(session.merged().is_none());
    }

    #[test]
    fn fifth_placement_builds_domain_and_full_window() {
        let mut session = session();
        place_all(&mut session);

        assert_eq!(session.timestamps().len(), 3);
        let window = session.window().unwrap();
        assert_eq!(window.start, session.timestamps()[0]);
        assert_eq!(window.end, session.timestamps()[2]);
    }

    #[test]
    fn undo_stops_a_running_animation() {
        let mut session = session();
        place_all(&mut session);
        session.toggle_animation().unwrap();
        session.step().unwrap();

        let status = session.undo_placement();
        assert!(status.notice.is_some());
        assert_eq!(session.animation().status, AnimationStatus::Idle);
        assert!(matches!(session.step().unwrap(), StepOutcome::Idle));
    }

    #[test]
    fn window_changes_frames_but_not_colour_scale() {
        let mut session = session();
        place_all(&mut session);
        let full_range = session.snapshot().value_range;

        let ts = session.timestamps().to_vec();
        session.set_time_window(ts[1], ts[1]).unwrap();
        assert_eq!(session.snapshot().value_range, full_range);

        session.toggle_animation().unwrap();
        let StepOutcome::Frame(frame) = session.step().unwrap() else {
            panic!("expected a frame");
        };
        assert_eq!(frame.timestamp, ts[1]);
        assert_eq!(frame.value_range, full_range);
        assert!(matches!(session.step().unwrap(), StepOutcome::Finished));
        assert_eq!(session.animation(), AnimationState::default());
    }

    #[test]
    fn inverted_window_is_rejected() {
        let mut session = session();
        place_all(&mut session);
        let ts = session.timestamps().to_vec();
        assert!(session.set_time_window(ts[2], ts[0]).is_err());
        assert_eq!(session.window(), TimeWindow::full(&ts));
    }

    #[test]
    fn snapshot_reports_the_displayed_frame() {
        let mut session = session();
        place_all(&mut session);
        assert!(session.snapshot().displayed_timestamp.is_none());

        session.toggle_animation().unwrap();
        let StepOutcome::Frame(frame) = session.step().unwrap() else {
            panic!("expected a frame");
        };
        let snapshot = session.snapshot();
        assert_eq!(snapshot.displayed_timestamp, Some(frame.timestamp));
        assert_eq!(frame.timestamp, session.timestamps()[0]);
        assert_eq!(snapshot.current_index, 1);
    }

    #[test]
    fn discarded_frame_is_shown_again_after_resume() {
        let mut session = session();
        place_all(&mut session);
        session.toggle_animation().unwrap();

        let PendingStep::Render(job) = session.advance() else {
            panic!("expected a frame job");
        };
        assert_eq!(session.animation().current_index, job.index + 1);

        session.toggle_animation().unwrap();
        session.rewind_to(job.index);
        assert_eq!(session.animation().current_index, job.index);

        session.toggle_animation().unwrap();
        let StepOutcome::Frame(frame) = session.step().unwrap() else {
            panic!("expected a frame");
        };
        assert_eq!(frame.timestamp, job.timestamp);
    }

    #[test]
    fn rewind_is_ignored_once_the_index_moved_on() {
        let mut session = session();
        place_all(&mut session);
        session.toggle_animation().unwrap();
        session.step().unwrap();
        session.step().unwrap();

        session.rewind_to(0);
        assert_eq!(session.animation().current_index, 2);
    }

    #[test]
    fn latest_frame_is_replaced_not_appended() {
        let mut session = session();
        place_all(&mut session);
        session.toggle_animation().unwrap();

        session.step().unwrap();
        let first = session.latest_frame().unwrap().timestamp;
        session.step().unwrap();
        let second = session.latest_frame().unwrap().timestamp;
        assert!(second > first);
    }
}

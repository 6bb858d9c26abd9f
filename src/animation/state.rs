use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::TimeWindow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum AnimationStatus {
    #[default]
    Idle,
    Running,
}

/// Result of one Running step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Draw the frame for `timestamp`; the index has already moved past it.
    Frame {
        index: usize,
        timestamp: NaiveDateTime,
    },
    /// The sequence ran out: back to Idle at index 0.
    Finished,
    /// Not running, nothing to do.
    Idle,
}

/// Play/pause flag plus position in the sorted timestamp sequence.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnimationState {
    pub status: AnimationStatus,
    pub current_index: usize,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.status == AnimationStatus::Running
    }

    pub fn start(&mut self) {
        self.status = AnimationStatus::Running;
    }

    /// Pause in place; the index is kept so a restart resumes.
    pub fn stop(&mut self) {
        self.status = AnimationStatus::Idle;
    }

    pub fn toggle(&mut self) -> AnimationStatus {
        match self.status {
            AnimationStatus::Idle => self.start(),
            AnimationStatus::Running => self.stop(),
        }
        self.status
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Keep the index valid for a sequence of `len` timestamps.
    pub fn clamp_to(&mut self, len: usize) {
        if self.current_index >= len {
            self.current_index = 0;
        }
    }

    /// One Running step over `timestamps`.
    ///
    /// Timestamps outside `window` are skipped in the same step without
    /// producing a frame. Reaching the end resets to Idle at index 0.
    pub fn advance(&mut self, timestamps: &[NaiveDateTime], window: &TimeWindow) -> Advance {
        if !self.is_running() {
            return Advance::Idle;
        }

        while let Some(&timestamp) = timestamps.get(self.current_index) {
            let index = self.current_index;
            self.current_index += 1;
            if window.contains(timestamp) {
                return Advance::Frame { index, timestamp };
            }
        }

        self.reset();
        Advance::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 31)
            .unwrap()
            .and_hms_opt(8, minute, 0)
            .unwrap()
    }

    fn domain(n: u32) -> Vec<NaiveDateTime> {
        (0..n).map(at).collect()
    }

    #[test]
    fn idle_state_does_not_advance() {
        let ts = domain(3);
        let mut state = AnimationState::new();
        assert_eq!(state.advance(&ts, &TimeWindow::full(&ts).unwrap()), Advance::Idle);
        assert_eq!(state.current_index, 0);
    }

    #[test]
    fn runs_every_timestamp_then_resets() {
        let ts = domain(3);
        let window = TimeWindow::full(&ts).unwrap();
        let mut state = AnimationState::new();
        state.start();

        for expected in 0..3 {
            assert_eq!(
                state.advance(&ts, &window),
                Advance::Frame {
                    index: expected,
                    timestamp: at(expected as u32)
                }
            );
            assert_eq!(state.current_index, expected + 1);
        }
        assert_eq!(state.advance(&ts, &window), Advance::Finished);
        assert_eq!(state, AnimationState::default());
    }

    #[test]
    fn skips_timestamps_outside_window() {
        let ts = domain(6);
        let window = TimeWindow::new(at(2), at(3)).unwrap();
        let mut state = AnimationState::new();
        state.start();

        assert_eq!(
            state.advance(&ts, &window),
            Advance::Frame { index: 2, timestamp: at(2) }
        );
        assert_eq!(
            state.advance(&ts, &window),
            Advance::Frame { index: 3, timestamp: at(3) }
        );
        // 4 and 5 are skipped in the same step that hits the end.
        assert_eq!(state.advance(&ts, &window), Advance::Finished);
        assert!(!state.is_running());
    }

    #[test]
    fn stop_keeps_position_for_resume() {
        let ts = domain(4);
        let window = TimeWindow::full(&ts).unwrap();
        let mut state = AnimationState::new();
        assert_eq!(state.toggle(), AnimationStatus::Running);
        state.advance(&ts, &window);
        state.advance(&ts, &window);
        assert_eq!(state.toggle(), AnimationStatus::Idle);
        assert_eq!(state.current_index, 2);

        state.toggle();
        assert_eq!(
            state.advance(&ts, &window),
            Advance::Frame { index: 2, timestamp: at(2) }
        );
    }

    #[test]
    fn empty_domain_finishes_immediately() {
        let mut state = AnimationState::new();
        state.start();
        let window = TimeWindow::new(at(0), at(1)).unwrap();
        assert_eq!(state.advance(&[], &window), Advance::Finished);
    }

    #[test]
    fn clamp_resets_out_of_range_index() {
        let mut state = AnimationState {
            status: AnimationStatus::Idle,
            current_index: 7,
        };
        state.clamp_to(3);
        assert_eq!(state.current_index, 0);
    }
}

use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tokio::{sync::Mutex, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::animation::AnimationStatus;
use crate::render::{RenderConfig, RenderedFrame};

use super::session::{DashboardSession, DashboardSnapshot, PendingStep};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

/// Where frames and state changes go. The webview host emits them as events;
/// tests record them.
pub trait FrameSink: Send + Sync {
    fn frame_rendered(&self, frame: &RenderedFrame);
    fn state_changed(&self, snapshot: &DashboardSnapshot);
}

struct Ticker {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

/// Owns the session and drives the Running state from a timer task, so the
/// command handlers never block on the frame delay.
#[derive(Clone)]
pub struct DashboardController {
    session: Arc<Mutex<DashboardSession>>,
    sink: Arc<dyn FrameSink>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    tick_interval: Arc<RwLock<Duration>>,
}

impl DashboardController {
    pub fn new(session: DashboardSession, sink: Arc<dyn FrameSink>, tick_interval: Duration) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            sink,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Arc::new(RwLock::new(tick_interval)),
        }
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn latest_frame(&self) -> Option<RenderedFrame> {
        self.session.lock().await.latest_frame().cloned()
    }

    pub async fn floor_plan_data_url(&self) -> Result<(u32, u32, String)> {
        let plan = self.session.lock().await.floor_plan().clone();
        let url = tokio::task::spawn_blocking(move || plan.to_data_url())
            .await
            .context("floor plan encoder join failed")??;
        let guard = self.session.lock().await;
        Ok((guard.floor_plan().width(), guard.floor_plan().height(), url))
    }

    /// Change the frame delay; a running animation picks it up at once.
    pub async fn set_frame_delay(&self, interval: Duration) {
        *self.tick_interval.write().unwrap() = interval;
        let running = self.session.lock().await.animation().is_running();
        if running {
            self.spawn_ticker().await;
        }
    }

    pub async fn set_render_config(&self, config: RenderConfig) {
        self.session.lock().await.set_render_config(config);
    }

    pub async fn place_sensor(&self, x: f64, y: f64) -> DashboardSnapshot {
        let snapshot = {
            let mut guard = self.session.lock().await;
            guard.place_sensor(x, y);
            guard.snapshot()
        };
        self.after_placement_change(snapshot).await
    }

    pub async fn undo_placement(&self) -> DashboardSnapshot {
        let snapshot = {
            let mut guard = self.session.lock().await;
            guard.undo_placement();
            guard.snapshot()
        };
        self.after_placement_change(snapshot).await
    }

    pub async fn clear_placements(&self) -> DashboardSnapshot {
        let snapshot = {
            let mut guard = self.session.lock().await;
            guard.clear_placements();
            guard.snapshot()
        };
        self.after_placement_change(snapshot).await
    }

    async fn after_placement_change(&self, snapshot: DashboardSnapshot) -> DashboardSnapshot {
        if snapshot.status == AnimationStatus::Idle {
            self.cancel_ticker().await;
        }
        self.sink.state_changed(&snapshot);
        snapshot
    }

    pub async fn set_time_window(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<DashboardSnapshot> {
        let snapshot = {
            let mut guard = self.session.lock().await;
            guard.set_time_window(start, end)?;
            guard.snapshot()
        };
        self.sink.state_changed(&snapshot);
        Ok(snapshot)
    }

    /// Idle -> Running spawns the ticker; Running -> Idle cancels it.
    pub async fn toggle_animation(&self) -> Result<DashboardSnapshot> {
        let (status, snapshot) = {
            let mut guard = self.session.lock().await;
            let status = guard.toggle_animation()?;
            (status, guard.snapshot())
        };

        match status {
            AnimationStatus::Running => self.spawn_ticker().await,
            AnimationStatus::Idle => self.cancel_ticker().await,
        }

        self.sink.state_changed(&snapshot);
        Ok(snapshot)
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(previous) = ticker_guard.take() {
            // Let the old ticker rewind or present its in-flight frame first.
            previous.cancel_token.cancel();
            if let Err(err) = previous.handle.await {
                log_error!("previous animation ticker failed: {err}");
            }
        }

        let session = self.session.clone();
        let sink = self.sink.clone();
        let tick_interval = *self.tick_interval.read().unwrap();
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = token.cancelled() => {
                        log_info!("animation ticker cancelled");
                        break;
                    }
                }

                let pending = session.lock().await.advance();
                match pending {
                    PendingStep::Render(job) => {
                        let index = job.index;
                        match tokio::task::spawn_blocking(move || job.render()).await {
                            Ok(Ok(frame)) => {
                                if token.is_cancelled() {
                                    session.lock().await.rewind_to(index);
                                    break;
                                }
                                let snapshot = {
                                    let mut guard = session.lock().await;
                                    guard.present(frame.clone());
                                    guard.snapshot()
                                };
                                sink.frame_rendered(&frame);
                                sink.state_changed(&snapshot);
                            }
                            Ok(Err(err)) => log_error!("frame render failed: {err:?}"),
                            Err(err) => log_error!("frame render worker join failed: {err}"),
                        }
                    }
                    PendingStep::Finished => {
                        let snapshot = session.lock().await.snapshot();
                        sink.state_changed(&snapshot);
                        break;
                    }
                    PendingStep::Idle => break,
                }
            }
        });

        *ticker_guard = Some(Ticker {
            handle,
            cancel_token,
        });
    }

    async fn cancel_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().await.take() {
            ticker.cancel_token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{csv_loader::load_readings_from_reader, FloorPlan};
    use image::{Rgba, RgbaImage};
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingSink {
        frames: StdMutex<Vec<NaiveDateTime>>,
        states: StdMutex<Vec<AnimationStatus>>,
    }

    impl FrameSink for RecordingSink {
        fn frame_rendered(&self, frame: &RenderedFrame) {
            self.frames.lock().unwrap().push(frame.timestamp);
        }

        fn state_changed(&self, snapshot: &DashboardSnapshot) {
            self.states.lock().unwrap().push(snapshot.status);
        }
    }

    fn controller(sink: Arc<RecordingSink>, delay_ms: u64) -> DashboardController {
        let csv = "Date,Time,AboveSuperSac,ControlRoom,Palletizer,TransferPoint,TruckLoading\n\
                   2024-10-31,08:00,1,2,3,4,5\n\
                   2024-10-31,08:01,2,3,4,5,6\n\
                   2024-10-31,08:02,3,4,5,6,7\n";
        let readings = load_readings_from_reader(csv.as_bytes()).unwrap();
        let plan = FloorPlan::from_image(RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 255])));
        let session = DashboardSession::new(readings, plan, RenderConfig::default());
        DashboardController::new(session, sink, Duration::from_millis(delay_ms))
    }

    async fn wait_for_idle(controller: &DashboardController) {
        time::timeout(Duration::from_secs(5), async {
            while controller.snapshot().await.status != AnimationStatus::Idle {
                time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("animation did not finish");
    }

    #[tokio::test]
    async fn ticker_plays_through_and_returns_to_idle() {
        let sink = Arc::new(RecordingSink::default());
        let controller = controller(sink.clone(), 5);
        for i in 0..5 {
            controller.place_sensor(10.0 + i as f64, 10.0).await;
        }

        let snapshot = controller.toggle_animation().await.unwrap();
        assert_eq!(snapshot.status, AnimationStatus::Running);
        wait_for_idle(&controller).await;

        assert_eq!(sink.frames.lock().unwrap().len(), 3);
        assert_eq!(controller.snapshot().await.current_index, 0);
        assert_eq!(sink.states.lock().unwrap().last(), Some(&AnimationStatus::Idle));
        assert!(controller.latest_frame().await.is_some());

        // One state update for the toggle plus one per rendered frame.
        let running = sink
            .states
            .lock()
            .unwrap()
            .iter()
            .filter(|s| **s == AnimationStatus::Running)
            .count();
        assert_eq!(running, 1 + 3);
    }

    #[tokio::test]
    async fn new_frame_delay_applies_to_a_running_animation() {
        let sink = Arc::new(RecordingSink::default());
        let controller = controller(sink.clone(), 60_000);
        for i in 0..5 {
            controller.place_sensor(i as f64, 0.0).await;
        }

        controller.toggle_animation().await.unwrap();
        controller.set_frame_delay(Duration::from_millis(5)).await;
        // With the old one-minute period this would time out.
        wait_for_idle(&controller).await;

        assert_eq!(sink.frames.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn toggle_without_placements_is_refused() {
        let sink = Arc::new(RecordingSink::default());
        let controller = controller(sink.clone(), 5);
        controller.place_sensor(1.0, 1.0).await;

        assert!(controller.toggle_animation().await.is_err());
        assert!(sink.frames.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggling_again_stops_the_ticker() {
        let sink = Arc::new(RecordingSink::default());
        let controller = controller(sink.clone(), 60_000);
        for i in 0..5 {
            controller.place_sensor(i as f64, 0.0).await;
        }

        controller.toggle_animation().await.unwrap();
        let stopped = controller.toggle_animation().await.unwrap();
        assert_eq!(stopped.status, AnimationStatus::Idle);

        time::sleep(Duration::from_millis(50)).await;
        // The first tick fires immediately, so at most one frame slipped out.
        assert!(sink.frames.lock().unwrap().len() <= 1);
        assert_eq!(controller.snapshot().await.status, AnimationStatus::Idle);
    }
}

use tauri::{AppHandle, Emitter, Runtime};

use crate::render::RenderedFrame;

use super::controller::FrameSink;
use super::session::DashboardSnapshot;

pub const FRAME_RENDERED: &str = "frame-rendered";
pub const STATE_CHANGED: &str = "animation-state-changed";

/// Forwards frames and state changes to the webview as Tauri events.
pub struct WebviewSink<R: Runtime> {
    app_handle: AppHandle<R>,
}

impl<R: Runtime> WebviewSink<R> {
    pub fn new(app_handle: AppHandle<R>) -> Self {
        Self { app_handle }
    }
}

impl<R: Runtime> FrameSink for WebviewSink<R> {
    fn frame_rendered(&self, frame: &RenderedFrame) {
        if let Err(err) = self.app_handle.emit(FRAME_RENDERED, frame) {
            log::warn!("failed to emit {FRAME_RENDERED}: {err}");
        }
    }

    fn state_changed(&self, snapshot: &DashboardSnapshot) {
        if let Err(err) = self.app_handle.emit(STATE_CHANGED, snapshot) {
            log::warn!("failed to emit {STATE_CHANGED}: {err}");
        }
    }
}

//! Frame composition: floor-plan backdrop, value-driven markers, numeric
//! labels and a colour bar keyed to the global value range.

use anyhow::Result;
use chrono::NaiveDateTime;
use image::{imageops, Rgba, RgbaImage};
use serde::Serialize;
use std::f64::consts::PI;
use std::sync::Arc;
use std::time::Instant;

use crate::data::floor_plan::png_data_url;
use crate::models::MergedRow;
use crate::overlay::ValueRange;

use super::colormap::viridis;
use super::glyphs::{draw_text, draw_text_centered, text_size};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_debug;

const LEGEND_WIDTH: u32 = 72;
const LEGEND_BAR_OFFSET: u32 = 12;
const LEGEND_BAR_WIDTH: u32 = 14;
const LEGEND_MARGIN: u32 = 8;
const MARKER_ALPHA: f64 = 0.8;
const NO_DATA_RADIUS: f64 = 6.0;
const NO_DATA_LABEL: &str = "--";

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const NO_DATA_GREY: Rgba<u8> = Rgba([140, 140, 140, 255]);

pub const LEGEND_LABEL: &str = "Concentration";

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    /// Marker area in square pixels per unit of value.
    pub marker_scale: f64,
    pub label_scale: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            marker_scale: 10.0,
            label_scale: 2,
        }
    }
}

/// How one sensor is drawn in a frame. `plot_y` is bottom-origin.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarkerSpec {
    pub sensor: String,
    pub value: f64,
    pub plot_x: f64,
    pub plot_y: f64,
    pub radius: f64,
    pub color: [u8; 4],
    pub label: String,
    pub no_data: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedFrame {
    pub timestamp: NaiveDateTime,
    pub title: String,
    pub legend_label: String,
    pub value_range: Option<ValueRange>,
    pub markers: Vec<MarkerSpec>,
    pub width: u32,
    pub height: u32,
    pub image_data_url: String,
}

#[derive(Debug, Clone)]
pub struct FrameRenderer {
    background: Arc<RgbaImage>,
    config: RenderConfig,
}

/// Everything needed to draw one frame, detached from the session lock.
#[derive(Debug, Clone)]
pub struct FrameJob {
    /// Position of `timestamp` in the session's timestamp sequence.
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub rows: Vec<MergedRow>,
    pub value_range: Option<ValueRange>,
    pub renderer: FrameRenderer,
}

impl FrameJob {
    pub fn render(self) -> Result<RenderedFrame> {
        self.renderer
            .render(self.timestamp, &self.rows, self.value_range)
    }
}

impl FrameRenderer {
    pub fn new(background: Arc<RgbaImage>, config: RenderConfig) -> Self {
        Self { background, config }
    }

    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config;
    }

    /// Marker layout for `rows` without rasterising anything.
    pub fn markers(&self, rows: &[MergedRow], range: Option<ValueRange>) -> Vec<MarkerSpec> {
        let height = self.background.height() as f64;
        rows.iter()
            .map(|row| {
                let plot_x = row.x;
                let plot_y = height - row.y;
                if !row.value.is_finite() {
                    return MarkerSpec {
                        sensor: row.sensor.clone(),
                        value: row.value,
                        plot_x,
                        plot_y,
                        radius: NO_DATA_RADIUS,
                        color: NO_DATA_GREY.0,
                        label: NO_DATA_LABEL.to_string(),
                        no_data: true,
                    };
                }
                let area = (row.value * self.config.marker_scale).max(0.0);
                let t = range.map(|r| r.normalize(row.value)).unwrap_or(0.0);
                let [r, g, b] = viridis(t);
                MarkerSpec {
                    sensor: row.sensor.clone(),
                    value: row.value,
                    plot_x,
                    plot_y,
                    radius: (area / PI).sqrt(),
                    color: [r, g, b, (MARKER_ALPHA * 255.0).round() as u8],
                    label: format!("{:.1}", row.value),
                    no_data: false,
                }
            })
            .collect()
    }

    pub fn render(
        &self,
        timestamp: NaiveDateTime,
        rows: &[MergedRow],
        range: Option<ValueRange>,
    ) -> Result<RenderedFrame> {
        let started = Instant::now();
        let markers = self.markers(rows, range);
        let canvas = self.rasterize(&markers, range);
        let image_data_url = png_data_url(&canvas)?;

        log_debug!(
            "Rendered frame {} ({} markers) in {}ms",
            timestamp,
            markers.len(),
            started.elapsed().as_millis()
        );

        Ok(RenderedFrame {
            timestamp,
            title: frame_title(timestamp),
            legend_label: LEGEND_LABEL.to_string(),
            value_range: range,
            markers,
            width: canvas.width(),
            height: canvas.height(),
            image_data_url,
        })
    }

    /// Draw backdrop, markers and legend into a fresh canvas.
    pub fn rasterize(&self, markers: &[MarkerSpec], range: Option<ValueRange>) -> RgbaImage {
        let (w, h) = self.background.dimensions();
        let mut canvas = RgbaImage::from_pixel(w + LEGEND_WIDTH, h, WHITE);
        imageops::overlay(&mut canvas, &*self.background, 0, 0);

        for marker in markers {
            // Back from bottom-origin plot space to image rows.
            let cx = marker.plot_x;
            let cy = h as f64 - marker.plot_y;
            if marker.no_data {
                draw_ring(&mut canvas, cx, cy, marker.radius, 2.0, NO_DATA_GREY);
            } else if marker.radius > 0.0 {
                draw_disc(&mut canvas, cx, cy, marker.radius, Rgba(marker.color));
            }
            draw_text_centered(&mut canvas, &marker.label, cx, cy, self.config.label_scale, WHITE);
        }

        self.draw_legend(&mut canvas, range);
        canvas
    }

    fn draw_legend(&self, canvas: &mut RgbaImage, range: Option<ValueRange>) {
        let w = self.background.width();
        let h = canvas.height();
        if h <= LEGEND_MARGIN * 2 + 1 {
            return;
        }
        let x0 = w + LEGEND_BAR_OFFSET;
        let top = LEGEND_MARGIN;
        let bottom = h - LEGEND_MARGIN - 1;
        let span = (bottom - top) as f64;

        for y in top..=bottom {
            let t = 1.0 - (y - top) as f64 / span;
            let [r, g, b] = viridis(t);
            for x in x0..x0 + LEGEND_BAR_WIDTH {
                let edge = x == x0 || x == x0 + LEGEND_BAR_WIDTH - 1 || y == top || y == bottom;
                canvas.put_pixel(x, y, if edge { BLACK } else { Rgba([r, g, b, 255]) });
            }
        }

        let Some(range) = range else {
            return;
        };
        let label_x = (x0 + LEGEND_BAR_WIDTH + 4) as i64;
        let scale = self.config.label_scale;
        let max_label = format!("{:.1}", range.max);
        let min_label = format!("{:.1}", range.min);
        let (_, text_h) = text_size(&min_label, scale);
        draw_text(canvas, &max_label, label_x, top as i64, scale, BLACK);
        draw_text(
            canvas,
            &min_label,
            label_x,
            bottom as i64 + 1 - text_h as i64,
            scale,
            BLACK,
        );
    }
}

pub fn frame_title(timestamp: NaiveDateTime) -> String {
    format!("Sensor Concentrations at {}", timestamp.format("%Y-%m-%d %H:%M"))
}

fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let alpha = src.0[3] as f64 / 255.0;
    for c in 0..3 {
        let mixed = src.0[c] as f64 * alpha + dst.0[c] as f64 * (1.0 - alpha);
        dst.0[c] = mixed.round() as u8;
    }
    dst.0[3] = 255;
}

fn for_each_in_radius(
    canvas: &mut RgbaImage,
    cx: f64,
    cy: f64,
    radius: f64,
    mut f: impl FnMut(&mut Rgba<u8>, f64),
) {
    let (w, h) = canvas.dimensions();
    let y_lo = (cy - radius).floor().max(0.0) as u32;
    let y_hi = (cy + radius).ceil().min(h as f64 - 1.0);
    let x_lo = (cx - radius).floor().max(0.0) as u32;
    let x_hi = (cx + radius).ceil().min(w as f64 - 1.0);
    if y_hi < 0.0 || x_hi < 0.0 {
        return;
    }
    for y in y_lo..=y_hi as u32 {
        for x in x_lo..=x_hi as u32 {
            let dist = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
            if dist <= radius {
                f(canvas.get_pixel_mut(x, y), dist);
            }
        }
    }
}

fn draw_disc(canvas: &mut RgbaImage, cx: f64, cy: f64, radius: f64, fill: Rgba<u8>) {
    let edge_from = radius - 1.0;
    for_each_in_radius(canvas, cx, cy, radius, |px, dist| {
        if radius >= 2.0 && dist > edge_from {
            *px = BLACK;
        } else {
            blend(px, fill);
        }
    });
}

fn draw_ring(canvas: &mut RgbaImage, cx: f64, cy: f64, radius: f64, thickness: f64, color: Rgba<u8>) {
    for_each_in_radius(canvas, cx, cy, radius, |px, dist| {
        if dist > radius - thickness {
            *px = color;
        }
    });
}

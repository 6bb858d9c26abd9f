//! 3x5 bitmap glyphs for the numeric labels drawn onto frames.

use image::{Rgba, RgbaImage};

const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

// One row per byte, most significant of the low three bits is the left column.
fn glyph(c: char) -> Option<[u8; 5]> {
    Some(match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        ' ' => [0; 5],
        _ => return None,
    })
}

/// Pixel size of `text` at `scale`, unknown characters included as blanks.
pub fn text_size(text: &str, scale: u32) -> (u32, u32) {
    let n = text.chars().count() as u32;
    if n == 0 {
        return (0, 0);
    }
    let width = (n * (GLYPH_W + 1) - 1) * scale;
    (width, GLYPH_H * scale)
}

/// Draw `text` with its top-left corner at `(x, y)`. Pixels falling outside
/// the canvas are skipped.
pub fn draw_text(canvas: &mut RgbaImage, text: &str, x: i64, y: i64, scale: u32, color: Rgba<u8>) {
    let scale = scale.max(1) as i64;
    let mut pen_x = x;
    for c in text.chars() {
        if let Some(rows) = glyph(c) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_W as i64 {
                    if bits & (0b100 >> col) == 0 {
                        continue;
                    }
                    let px = pen_x + col * scale;
                    let py = y + row as i64 * scale;
                    fill_block(canvas, px, py, scale, color);
                }
            }
        }
        pen_x += (GLYPH_W as i64 + 1) * scale;
    }
}

/// Draw `text` centred on `(cx, cy)`.
pub fn draw_text_centered(
    canvas: &mut RgbaImage,
    text: &str,
    cx: f64,
    cy: f64,
    scale: u32,
    color: Rgba<u8>,
) {
    let (w, h) = text_size(text, scale);
    let x = (cx - w as f64 / 2.0).round() as i64;
    let y = (cy - h as f64 / 2.0).round() as i64;
    draw_text(canvas, text, x, y, scale, color);
}

fn fill_block(canvas: &mut RgbaImage, x: i64, y: i64, size: i64, color: Rgba<u8>) {
    for dy in 0..size {
        for dx in 0..size {
            let (px, py) = (x + dx, y + dy);
            if px >= 0 && py >= 0 && (px as u32) < canvas.width() && (py as u32) < canvas.height() {
                canvas.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

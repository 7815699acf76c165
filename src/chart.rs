//! Histogram chart rendering.
//!
//! Draws a frequency bar chart (one bar per pixel value) with grid lines,
//! tick labels, a title and axis labels onto a plain RGB canvas.

pub mod glyphs;

use crate::histogram::{Histogram, BUCKETS};
use crate::settings::ChartSettings;
use glyphs::{draw_text, text_height, text_width};
use image::imageops;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

pub const TITLE: &str = "Linearized Height Map";
pub const X_LABEL: &str = "Pixel Value";
pub const Y_LABEL: &str = "Frequency";

const X_TICK_STEP: u32 = 50;
const Y_TICK_TARGET: u64 = 5;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([38, 38, 38]);
const GRID: Rgb<u8> = Rgb([222, 222, 222]);

/// Pixel rectangle of the plotting area inside the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotArea {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl PlotArea {
    pub fn layout(settings: &ChartSettings) -> Self {
        let s = settings.text_scale;
        let glyph_h = text_height(s);
        // Widest y tick label we expect: nine digits for a 100MP upload
        let tick_label_w = text_width("000000000", s);

        let left = glyph_h + 4 * s + tick_label_w + 3 * s + 8;
        let right = text_width("000", s) / 2 + 4 * s;
        let top = glyph_h * 2 + 8;
        let bottom = glyph_h * 3 + 6 * s + 8;

        Self {
            left: left as i32,
            top: top as i32,
            width: settings.width.saturating_sub(left + right).max(1),
            height: settings.height.saturating_sub(top + bottom).max(1),
        }
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height as i32
    }

    pub fn right(&self) -> i32 {
        self.left + self.width as i32
    }

    /// Horizontal position of the left edge of `value`'s bucket
    pub fn x_for(&self, value: u32) -> f32 {
        self.left as f32 + value as f32 * self.width as f32 / BUCKETS as f32
    }

    fn y_for(&self, count: u64, y_max: u64) -> f32 {
        self.bottom() as f32 - count as f32 / y_max as f32 * self.height as f32
    }
}

/// Smallest 1, 2 or 5 times a power of ten that splits `max` into at most five steps.
pub fn nice_step(max: u64) -> u64 {
    let target = max.div_ceil(Y_TICK_TARGET).max(1);
    let mut magnitude = 1u64;
    loop {
        for multiple in [1, 2, 5] {
            let step = multiple * magnitude;
            if step >= target {
                return step;
            }
        }
        magnitude = magnitude.saturating_mul(10);
    }
}

pub fn render_histogram(histogram: &Histogram, settings: &ChartSettings) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(settings.width, settings.height, BACKGROUND);
    let plot = PlotArea::layout(settings);
    let scale = settings.text_scale;

    let step = nice_step(histogram.max_count());
    let y_max = histogram.max_count().div_ceil(step).max(1) * step;

    draw_grid(&mut canvas, &plot, step, y_max);
    draw_bars(&mut canvas, &plot, histogram, y_max, Rgb(settings.bar_color));
    draw_hollow_rect_mut(
        &mut canvas,
        Rect::at(plot.left, plot.top).of_size(plot.width, plot.height),
        INK,
    );
    draw_ticks(&mut canvas, &plot, step, y_max, scale);
    draw_labels(&mut canvas, &plot, scale);

    canvas
}

fn draw_grid(canvas: &mut RgbImage, plot: &PlotArea, step: u64, y_max: u64) {
    let (top, bottom) = (plot.top as f32, plot.bottom() as f32);
    for value in (0..BUCKETS as u32).step_by(X_TICK_STEP as usize) {
        let x = plot.x_for(value);
        draw_line_segment_mut(canvas, (x, top), (x, bottom), GRID);
    }
    let (left, right) = (plot.left as f32, plot.right() as f32);
    for count in (0..=y_max).step_by(step as usize) {
        let y = plot.y_for(count, y_max);
        draw_line_segment_mut(canvas, (left, y), (right, y), GRID);
    }
}

fn draw_bars(canvas: &mut RgbImage, plot: &PlotArea, histogram: &Histogram, y_max: u64, color: Rgb<u8>) {
    for (value, &count) in histogram.counts().iter().enumerate() {
        if count == 0 {
            continue;
        }
        let left = plot.x_for(value as u32).floor() as i32;
        let right = plot.x_for(value as u32 + 1).floor() as i32;
        let width = (right - left).max(1) as u32;
        // Any non-zero bucket gets at least one visible row
        let height = ((count as f32 / y_max as f32) * plot.height as f32).ceil() as u32;
        let height = height.clamp(1, plot.height);
        draw_filled_rect_mut(
            canvas,
            Rect::at(left, plot.bottom() - height as i32).of_size(width, height),
            color,
        );
    }
}

fn draw_ticks(canvas: &mut RgbImage, plot: &PlotArea, step: u64, y_max: u64, scale: u32) {
    let tick = (2 * scale) as f32;
    let glyph_h = text_height(scale) as i32;
    let bottom = plot.bottom() as f32;

    for value in (0..BUCKETS as u32).step_by(X_TICK_STEP as usize) {
        let x = plot.x_for(value);
        draw_line_segment_mut(canvas, (x, bottom), (x, bottom + tick), INK);
        let label = value.to_string();
        let label_x = x as i32 - text_width(&label, scale) as i32 / 2;
        draw_text(canvas, label_x, plot.bottom() + 3 * scale as i32, &label, scale, INK);
    }

    let left = plot.left as f32;
    for count in (0..=y_max).step_by(step as usize) {
        let y = plot.y_for(count, y_max);
        draw_line_segment_mut(canvas, (left - tick, y), (left, y), INK);
        let label = count.to_string();
        let label_x = plot.left - 3 * scale as i32 - text_width(&label, scale) as i32;
        draw_text(canvas, label_x, y as i32 - glyph_h / 2, &label, scale, INK);
    }
}

fn draw_labels(canvas: &mut RgbImage, plot: &PlotArea, scale: u32) {
    let glyph_h = text_height(scale);
    let center_x = plot.left + plot.width as i32 / 2;

    let title_x = center_x - text_width(TITLE, scale) as i32 / 2;
    draw_text(canvas, title_x, plot.top - 2 * glyph_h as i32 + 4, TITLE, scale, INK);

    let x_label_x = center_x - text_width(X_LABEL, scale) as i32 / 2;
    let x_label_y = plot.bottom() + (3 * scale + glyph_h + 3 * scale) as i32 + glyph_h as i32;
    draw_text(canvas, x_label_x, x_label_y, X_LABEL, scale, INK);

    // Render horizontally then rotate so the label reads bottom to top
    let mut strip = RgbImage::from_pixel(text_width(Y_LABEL, scale), glyph_h, BACKGROUND);
    draw_text(&mut strip, 0, 0, Y_LABEL, scale, INK);
    let rotated = imageops::rotate270(&strip);
    let y_label_y = plot.top + plot.height as i32 / 2 - rotated.height() as i32 / 2;
    imageops::overlay(canvas, &rotated, 4, i64::from(y_label_y).max(0));
}

//! Panel rendering and composite assembly on top of the plotters backend.
//!
//! A composite is one PNG per field key: a `rows x columns` grid of panels,
//! one panel per sampled frame, each labeled with the dump time of its
//! frame. 1D fields become line panels, 2D fields a colored cell raster;
//! 3D fields contribute their `[.., .., 0]` slice.

#[cfg(test)]
#[path = "plot_test.rs"]
mod plot_test;

use crate::errors::*;
use crate::settings::{ImageSettings, RenderMode, SamplingSettings};
use crate::snapshot;
use ndarray::{ArrayD, ArrayView1, ArrayView2, Axis, Ix1, Ix2};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const TITLE_FONT: (&str, i32) = ("sans-serif", 40);
const CAPTION_FONT: (&str, i32) = ("sans-serif", 24);
const TICK_FONT: (&str, i32) = ("sans-serif", 12);

/// Geometry of a run's composites, shared by every field key.
///
/// Passing this around explicitly keeps the drawing code free of global
/// backend state; all resolution policy lives in the parameter file.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    pub rows: usize,
    pub columns: usize,
    pub width: u32,
    pub height: u32,
}

impl RenderContext {
    pub fn new(sampling: &SamplingSettings, image: &ImageSettings) -> RenderContext {
        RenderContext {
            rows: sampling.rows,
            columns: sampling.columns,
            width: image.width,
            height: image.height,
        }
    }

    /// Number of panels one composite holds.
    pub fn capacity(&self) -> usize {
        self.rows * self.columns
    }
}

/// Panel label: dump time in milliseconds with one decimal place.
pub fn time_caption(time: f64) -> String {
    format!("{:.1} ms", time * 1e3)
}

/// Output file name for a field key: path separators become underscores.
pub fn output_filename(key: &str) -> String {
    format!("{}.png", key.replace('/', "_"))
}

/// Draws one field's data into one grid cell and captions it with the dump
/// time. The array rank has to match the mode; nothing is guessed here.
pub fn render_panel<DB: DrawingBackend>(
    panel: &DrawingArea<DB, Shift>,
    key: &str,
    data: &ArrayD<f64>,
    time: f64,
    mode: RenderMode,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    if !mode.accepts_rank(data.ndim()) {
        bail!(ErrorKind::ShapeMismatch(key.to_string(), mode, data.ndim()));
    }

    match mode {
        RenderMode::Line => {
            let series = data
                .view()
                .into_dimensionality::<Ix1>()
                .map_err(|e| draw_err(e))?;
            draw_line_panel(panel, series, time)
        }
        RenderMode::Image => {
            let image = if data.ndim() == 2 {
                data.view()
            } else {
                // keep only the first trailing component of 3D data
                data.index_axis(Axis(2), 0)
            };
            let image = image
                .into_dimensionality::<Ix2>()
                .map_err(|e| draw_err(e))?;
            draw_image_panel(panel, image, time)
        }
    }
}

/// Lays out the panel grid for one field key, fills it frame by frame in
/// row-major order and saves the composite.
pub struct GridComposer<'a> {
    ctx: RenderContext,
    snapshot_dir: &'a Path,
    output_dir: &'a Path,
}

impl<'a> GridComposer<'a> {
    pub fn new(ctx: RenderContext, snapshot_dir: &'a Path, output_dir: &'a Path) -> GridComposer<'a> {
        GridComposer {
            ctx,
            snapshot_dir,
            output_dir,
        }
    }

    /// Renders the composite for `key` over the sampled `frames` and returns
    /// the path of the written PNG. A prior composite at the same path is
    /// overwritten.
    pub fn compose(&self, key: &str, frames: &[usize], mode: RenderMode) -> Result<PathBuf> {
        assert_eq!(
            frames.len(),
            self.ctx.capacity(),
            "frame sample does not fill the {}x{} grid",
            self.ctx.rows,
            self.ctx.columns
        );

        let out = self.output_dir.join(output_filename(key));

        {
            let root =
                BitMapBackend::new(&out, (self.ctx.width, self.ctx.height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            let titled = root.titled(key, TITLE_FONT).map_err(draw_err)?;
            let panels = titled.split_evenly((self.ctx.rows, self.ctx.columns));

            for (&frame, panel) in frames.iter().zip(panels.iter()) {
                let (time, data) = snapshot::extract(self.snapshot_dir, frame, key)?;
                render_panel(panel, key, &data, time, mode)?;
            }

            root.present().map_err(draw_err)?;
        }
        debug!("wrote composite '{}'", out.display());

        Ok(out)
    }
}

fn draw_line_panel<DB: DrawingBackend>(
    panel: &DrawingArea<DB, Shift>,
    series: ArrayView1<f64>,
    time: f64,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let n = series.len();
    let (lo, hi) = value_range(series.iter().cloned());

    let mut chart = ChartBuilder::on(panel)
        .caption(time_caption(time), CAPTION_FONT)
        .margin(8)
        .x_label_area_size(24)
        .y_label_area_size(48)
        .build_cartesian_2d(0.0..n.saturating_sub(1).max(1) as f64, lo..hi)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(4)
        .y_labels(3)
        .label_style(TICK_FONT)
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(LineSeries::new(
            series.iter().enumerate().map(|(i, &v)| (i as f64, v)),
            &BLUE,
        ))
        .map_err(draw_err)?;

    Ok(())
}

fn draw_image_panel<DB: DrawingBackend>(
    panel: &DrawingArea<DB, Shift>,
    image: ArrayView2<f64>,
    time: f64,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (nrows, ncols) = image.dim();
    let (lo, hi) = value_range(image.iter().cloned());
    let span = hi - lo;

    let mut chart = ChartBuilder::on(panel)
        .caption(time_caption(time), CAPTION_FONT)
        .margin(8)
        .x_label_area_size(24)
        .y_label_area_size(48)
        .build_cartesian_2d(0..ncols as i32, 0..nrows as i32)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(4)
        .y_labels(3)
        .label_style(TICK_FONT)
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(image.indexed_iter().map(|((row, col), &v)| {
            let t = (v - lo) / span;
            Rectangle::new(
                [
                    (col as i32, row as i32),
                    (col as i32 + 1, row as i32 + 1),
                ],
                heat_color(t).filled(),
            )
        }))
        .map_err(draw_err)?;

    Ok(())
}

/// Finite min/max of the data, widened to a non-empty interval so that a
/// constant field still gets a drawable axis.
fn value_range<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;

    for v in values {
        if v.is_finite() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }

    if !(lo.is_finite() && hi.is_finite() && hi > lo) {
        let mid = if lo.is_finite() { lo } else { 0.0 };
        lo = mid - 0.5;
        hi = mid + 0.5;
    }

    (lo, hi)
}

/// Maps a normalized value in [0, 1] onto a heat ramp (black over red and
/// yellow to white).
fn heat_color(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };

    let r = (255.0 * (3.0 * t).min(1.0)) as u8;
    let g = (255.0 * (3.0 * t - 1.0).clamp(0.0, 1.0)) as u8;
    let b = (255.0 * (3.0 * t - 2.0).clamp(0.0, 1.0)) as u8;

    RGBColor(r, g, b)
}

fn draw_err<E: std::fmt::Display>(e: E) -> Error {
    ErrorKind::Render(e.to_string()).into()
}

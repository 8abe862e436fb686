use crate::colormap::{self, Colormap, Normalize, LUT_SIZE};
use crate::error::HicError;
use crate::matrix::ContactMatrix;
use crate::table::BinTable;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

/// How matrix cells are resampled onto output pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Each pixel takes the colour of the cell it falls in
    Nearest,
    /// 4x4 spline16 filter over neighbouring cells
    Spline16,
}

/// Heatmap rendering configuration
#[derive(Debug, Clone)]
pub struct HeatmapStyle {
    /// Width and height of the square figure, in inches
    pub figure_inches: f64,
    pub dpi: u32,
    pub title: String,
    /// Axis label; `None` derives "<chr> position (kb)" from the bin table
    pub axis_label: Option<String>,
    pub colorbar_label: String,
    pub norm: Normalize,
    pub interpolation: Interpolation,
    /// Draw caption, axes, ticks and colorbar labels. Text needs system fonts.
    pub annotate: bool,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            figure_inches: 6.0,
            dpi: 300,
            title: "Hi-C map".to_string(),
            axis_label: None,
            colorbar_label: "Contact enrichment (log2 scale)".to_string(),
            norm: Normalize::default(),
            interpolation: Interpolation::Spline16,
            annotate: true,
        }
    }
}

impl HeatmapStyle {
    /// Output image side length in pixels
    pub fn pixel_size(&self) -> u32 {
        (self.figure_inches * self.dpi as f64).round().max(1.0) as u32
    }

    /// Convert a font size in points to pixels at the configured DPI
    fn font_px(&self, points: f64) -> i32 {
        (points * self.dpi as f64 / 72.0).round().max(1.0) as i32
    }
}

/// Physical span of a bin range, in kilobases
#[derive(Debug, Clone, PartialEq)]
pub struct GenomicExtent {
    pub start_kb: f64,
    pub end_kb: f64,
    pub chrom: Option<String>,
}

impl GenomicExtent {
    pub fn axis_label(&self) -> String {
        format!("{} position (kb)", self.chrom.as_deref().unwrap_or("Genomic"))
    }
}

/// Extent from the `from.coord` of `start_bin` to the `to.coord` of `end_bin`
pub fn genomic_extent(bins: &BinTable, start_bin: i64, end_bin: i64) -> Result<GenomicExtent, HicError> {
    let first = bins.get(start_bin).ok_or(HicError::BinNotFound(start_bin))?;
    let last = bins.get(end_bin).ok_or(HicError::BinNotFound(end_bin))?;
    Ok(GenomicExtent {
        start_kb: first.from_coord as f64 / 1000.0,
        end_kb: last.to_coord as f64 / 1000.0,
        chrom: first.chrom.clone(),
    })
}

/// spline16 kernel (radius 2)
fn spline16_weight(x: f64) -> f64 {
    let x = x.abs();
    if x < 1.0 {
        ((x - 9.0 / 5.0) * x - 1.0 / 5.0) * x + 1.0
    } else if x < 2.0 {
        let t = x - 1.0;
        ((-1.0 / 3.0 * t + 4.0 / 5.0) * t - 7.0 / 15.0) * t
    } else {
        0.0
    }
}

/// Nearest cell index for a pixel along one axis
fn nearest_cell(pixel_center: f64, pixels: u32, n: usize) -> usize {
    let idx = (pixel_center * n as f64 / pixels as f64).floor();
    (idx.max(0.0) as usize).min(n - 1)
}

/// Normalized value at fractional cell position (r, c), skipping NaN neighbours
fn sample_spline16(values: &[f64], n: usize, r: f64, c: f64) -> f64 {
    let r0 = r.floor() as isize;
    let c0 = c.floor() as isize;
    let mut acc = 0.0;
    let mut wsum = 0.0;
    for dr in -1..=2 {
        let rr = r0 + dr;
        if rr < 0 || rr >= n as isize {
            continue;
        }
        let wr = spline16_weight(r - rr as f64);
        if wr == 0.0 {
            continue;
        }
        for dc in -1..=2 {
            let cc = c0 + dc;
            if cc < 0 || cc >= n as isize {
                continue;
            }
            let v = values[rr as usize * n + cc as usize];
            if v.is_nan() {
                continue;
            }
            let w = wr * spline16_weight(c - cc as f64);
            acc += w * v;
            wsum += w;
        }
    }
    if wsum.abs() < 1e-12 {
        f64::NAN
    } else {
        (acc / wsum).clamp(0.0, 1.0)
    }
}

/// Compute pixel colours for a `width x height` raster of the matrix.
///
/// The result is row-major starting at the top pixel row. Matrix row 0 is
/// drawn at the bottom. `None` marks pixels over cells without data.
pub fn rasterize(
    matrix: &ContactMatrix,
    cmap: &Colormap,
    norm: &Normalize,
    interpolation: Interpolation,
    (width, height): (u32, u32),
) -> Vec<Option<RGBColor>> {
    let n = matrix.size();
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    if n == 0 || width == 0 || height == 0 {
        return pixels;
    }

    // normalize once; interpolation happens in [0, 1]
    let mut values = Vec::with_capacity(n * n);
    for i in 0..n {
        values.extend(matrix.row(i).iter().map(|&v| norm.apply(v)));
    }

    let scale_x = n as f64 / width as f64;
    let scale_y = n as f64 / height as f64;
    for py in 0..height {
        let y_center = height as f64 - py as f64 - 0.5;
        let ri = nearest_cell(y_center, height, n);
        for px in 0..width {
            let x_center = px as f64 + 0.5;
            let ci = nearest_cell(x_center, width, n);
            let nearest = values[ri * n + ci];
            if nearest.is_nan() {
                pixels.push(None);
                continue;
            }
            let x = match interpolation {
                Interpolation::Nearest => nearest,
                Interpolation::Spline16 => {
                    let v = sample_spline16(&values, n, y_center * scale_y - 0.5, x_center * scale_x - 0.5);
                    if v.is_nan() { nearest } else { v }
                }
            };
            pixels.push(cmap.color_at(x));
        }
    }
    pixels
}

/// Draw heatmap and colorbar onto `root`
pub fn draw_heatmap<DB>(
    root: &DrawingArea<DB, Shift>,
    matrix: &ContactMatrix,
    extent: &GenomicExtent,
    cmap: &Colormap,
    style: &HeatmapStyle,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (width, _) = root.dim_in_pixel();
    let margin = style.font_px(6.0);
    let title_px = style.font_px(12.0);
    let desc_px = style.font_px(10.0);
    let tick_px = style.font_px(8.0);
    let label_area = if style.annotate { style.font_px(34.0) } else { 0 };
    let caption_area = if style.annotate { (title_px as f64 * 1.6) as i32 } else { 0 };

    let colorbar_width = (width as f64 * 0.16) as i32;
    let (main, side) = root.split_horizontally(width as i32 - colorbar_width);

    let mut builder = ChartBuilder::on(&main);
    builder.margin(margin);
    if style.annotate {
        builder
            .caption(&style.title, ("sans-serif", title_px))
            .x_label_area_size(label_area)
            .y_label_area_size(label_area);
    }
    let mut chart = builder.build_cartesian_2d(
        extent.start_kb..extent.end_kb,
        extent.start_kb..extent.end_kb,
    )?;

    let area = chart.plotting_area().strip_coord_spec();
    let (pw, ph) = area.dim_in_pixel();
    let pixels = rasterize(matrix, cmap, &style.norm, style.interpolation, (pw, ph));
    for (k, pixel) in pixels.iter().enumerate() {
        if let Some(color) = pixel {
            let x = (k % pw as usize) as i32;
            let y = (k / pw as usize) as i32;
            area.draw_pixel((x, y), color)?;
        }
    }

    if style.annotate {
        let axis_label = style.axis_label.clone().unwrap_or_else(|| extent.axis_label());
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(axis_label.as_str())
            .y_desc(axis_label.as_str())
            .x_labels(6)
            .y_labels(6)
            .x_label_formatter(&|v: &f64| format!("{:.0}", v))
            .y_label_formatter(&|v: &f64| format!("{:.0}", v))
            .label_style(("sans-serif", tick_px))
            .axis_desc_style(("sans-serif", desc_px))
            .draw()?;
    }

    // colorbar spans the same vertical pixels as the heatmap
    let mut bar_builder = ChartBuilder::on(&side);
    bar_builder
        .margin_top(margin + caption_area)
        .margin_bottom(margin + label_area)
        .margin_right(margin);
    if style.annotate {
        bar_builder.y_label_area_size(style.font_px(30.0));
    }
    let (vmin, vmax) = (style.norm.vmin, style.norm.vmax);
    let mut bar = bar_builder.build_cartesian_2d(0.0..1.0, vmin..vmax)?;
    let step = (vmax - vmin) / LUT_SIZE as f64;
    bar.draw_series(cmap.lut().iter().enumerate().map(|(k, color)| {
        let lo = vmin + k as f64 * step;
        Rectangle::new([(0.0, lo), (1.0, lo + step)], color.filled())
    }))?;

    if style.annotate {
        bar.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_desc(style.colorbar_label.as_str())
            .y_labels(9)
            .y_label_formatter(&|v: &f64| format!("{:.0}", v))
            .label_style(("sans-serif", tick_px))
            .axis_desc_style(("sans-serif", desc_px))
            .draw()?;
    }

    Ok(())
}

/// Render the matrix as a PNG at `output`, creating the parent directory if needed
pub fn plot_and_save(
    matrix: &ContactMatrix,
    bins: &BinTable,
    start_bin: i64,
    end_bin: i64,
    output: &Path,
    style: &HeatmapStyle,
) -> Result<(), Box<dyn Error>> {
    let extent = genomic_extent(bins, start_bin, end_bin)?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let side = style.pixel_size();
    let root = BitMapBackend::new(output, (side, side)).into_drawing_area();
    root.fill(&WHITE)?;
    draw_heatmap(&root, matrix, &extent, colormap::paper_hic(), style)?;
    root.present()?;

    Ok(())
}

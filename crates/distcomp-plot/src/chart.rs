//! Drawing prepared plots as SVG charts with [`plotters`]

use std::{ops::Range, path::Path};

use distcomp::plot::{EcdfPlot, HistogramPlot};
use plotters::{
    coord::{cartesian::Cartesian2d, types::RangedCoordf64},
    prelude::*,
};

/// Errors that can occur while drawing a chart.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PlotError {
    #[display("failed to create drawing area: {_0}")]
    DrawingArea(#[error(not(source))] String),
    #[display("failed to configure chart: {_0}")]
    ChartConfig(#[error(not(source))] String),
    #[display("failed to draw chart elements: {_0}")]
    Drawing(#[error(not(source))] String),
    #[display("invalid data: {_0}")]
    InvalidData(#[error(not(source))] String),
}

type Result<T> = std::result::Result<T, PlotError>;

const CAPTION_FONT: (&str, u32) = ("sans-serif", 24);
const LABEL_FONT: (&str, u32) = ("sans-serif", 16);

/// Draws the ECDF of every series as a step line and writes the chart to `path`.
///
/// The y axis is the proportion of values at or below `x`, from 0 to 1.
pub fn draw_ecdf(plot: &EcdfPlot, path: &Path) -> Result<()> {
    let ecdfs = plot.ecdfs();
    let x_range = padded_range(
        ecdfs
            .iter()
            .flat_map(|(_, ecdf)| ecdf.sorted_values().iter().copied()),
    )
    .ok_or_else(|| PlotError::InvalidData(format!("'{}' has no values to plot", plot.title)))?;

    let root = SVGBackend::new(path, plot.figure_size.pixels()).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&plot.title, CAPTION_FONT)
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range.clone(), 0.0..1.0)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc(plot.x_label.as_str())
        .y_desc("proportion")
        .label_style(LABEL_FONT)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    for (idx, (name, ecdf)) in ecdfs.iter().enumerate() {
        let color = Palette99::pick(idx).mix(plot.opacity);
        // Horizontal run up to each jump, then the jump itself
        let mut points = vec![(x_range.start, 0.0)];
        let mut previous = 0.0;
        for (value, proportion) in ecdf.steps() {
            points.push((value, previous));
            points.push((value, proportion));
            previous = proportion;
        }
        points.push((x_range.end, previous));

        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(*name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    draw_legend(&mut chart)?;
    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}

/// Draws overlaid histograms of every series and writes the chart to `path`.
///
/// All series share the bins of the plot, and bar heights follow its
/// normalization.
pub fn draw_histogram(plot: &HistogramPlot, path: &Path) -> Result<()> {
    let histograms = plot.histograms();
    let heights = histograms
        .iter()
        .map(|(_, histogram)| histogram.normalized(plot.norm))
        .collect::<Vec<_>>();
    let x_range = histograms
        .iter()
        .find_map(|(_, histogram)| {
            let first = histogram.bins.first()?;
            let last = histogram.bins.last()?;
            Some(first.range.start..last.range.end)
        })
        .ok_or_else(|| PlotError::InvalidData(format!("'{}' has no bins", plot.title)))?;
    let y_max = heights
        .iter()
        .flatten()
        .copied()
        .fold(0.0, f64::max)
        .max(f64::MIN_POSITIVE)
        * 1.05;

    let root = SVGBackend::new(path, plot.figure_size.pixels()).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&plot.title, CAPTION_FONT)
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(plot.x_label.as_str())
        .y_desc(plot.y_label())
        .label_style(LABEL_FONT)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    for (idx, ((name, histogram), heights)) in histograms.iter().zip(&heights).enumerate() {
        let color = Palette99::pick(idx).mix(plot.opacity);
        let bars = histogram
            .bins
            .iter()
            .zip(heights)
            .map(move |(bin, &height)| {
                Rectangle::new(
                    [(bin.range.start, 0.0), (bin.range.end, height)],
                    color.filled(),
                )
            });
        chart
            .draw_series(bars)
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(*name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled()));
    }

    draw_legend(&mut chart)?;
    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}

fn draw_legend<'a, DB>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
) -> Result<()>
where
    DB: DrawingBackend + 'a,
{
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(LABEL_FONT)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))
}

/// Smallest and largest value, widened when they coincide.
fn padded_range<I>(values: I) -> Option<Range<f64>>
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })?;
    if max - min < f64::EPSILON {
        Some(min - 0.5..max + 0.5)
    } else {
        Some(min..max)
    }
}

//! ECDF and histogram plot preparation
//!
//! The comparator turns prepared data into renderer-independent plot
//! descriptions ([`EcdfPlot`], [`HistogramPlot`]). Drawing them is the job of
//! a [`PlotRenderer`], which keeps the core free of any graphics back end.
//!
//! With a treatment, each feature gets its own plot with one series per
//! treatment group. Without one, all features are overlaid in a single plot.

use std::{ops::RangeInclusive, str::FromStr};

use distcomp_stats::{
    StatsError,
    ecdf::Ecdf,
    histogram::{self, HistNorm, Histogram},
};
use serde::{Deserialize, Serialize};

use crate::{Error, comparator::Comparator, dispatch};

/// Opacity of overlaid series.
pub const OVERLAY_OPACITY: f64 = 0.75;

/// Figure dimensions in inches; renderers use 100 pixels per inch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigureSize {
    pub width: f64,
    pub height: f64,
}

impl FigureSize {
    pub const ECDF_DEFAULT: Self = Self::new(10.0, 4.0);
    pub const HISTOGRAM_DEFAULT: Self = Self::new(8.0, 4.0);

    pub const DPI: f64 = 100.0;

    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width and height in pixels, at least one pixel each.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn pixels(&self) -> (u32, u32) {
        let px = |inches: f64| (inches * Self::DPI).round().max(1.0) as u32;
        (px(self.width), px(self.height))
    }
}

/// Error parsing a `WIDTHxHEIGHT` figure size.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid figure size '{input}', expected WIDTHxHEIGHT in inches (e.g. 10x4)")]
pub struct ParseFigureSizeError {
    input: String,
}

impl FromStr for FigureSize {
    type Err = ParseFigureSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFigureSizeError {
            input: s.to_owned(),
        };
        let (width, height) = s.split_once(['x', 'X']).ok_or_else(err)?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v > 0.0)
        };
        match (parse(width), parse(height)) {
            (Some(width), Some(height)) => Ok(Self::new(width, height)),
            _ => Err(err()),
        }
    }
}

/// Render options shared by both plot kinds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotOptions {
    /// Overrides the plot kind's default figure size.
    pub figure_size: Option<FigureSize>,
    /// Overrides the default series opacity.
    pub opacity: Option<f64>,
    /// Overrides the generated plot titles.
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistogramOptions {
    /// Number of bins; Sturges' rule over all plotted values when `None`.
    pub bins: Option<usize>,
    pub norm: HistNorm,
    pub plot: PlotOptions,
}

/// A named sample drawn as one curve or bar series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcdfPlot {
    pub title: String,
    pub x_label: String,
    pub series: Vec<Series>,
    pub figure_size: FigureSize,
    pub opacity: f64,
}

impl EcdfPlot {
    /// The ECDF of every series, in series order.
    #[must_use]
    pub fn ecdfs(&self) -> Vec<(&str, Ecdf)> {
        self.series
            .iter()
            .map(|series| (series.name.as_str(), Ecdf::new(series.values.iter().copied())))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramPlot {
    pub title: String,
    pub x_label: String,
    pub series: Vec<Series>,
    pub bins: usize,
    /// Range shared by all series, so their bins line up.
    pub range: RangeInclusive<f64>,
    pub norm: HistNorm,
    pub figure_size: FigureSize,
    pub opacity: f64,
}

impl HistogramPlot {
    /// The histogram of every series over the shared range.
    #[must_use]
    pub fn histograms(&self) -> Vec<(&str, Histogram)> {
        self.series
            .iter()
            .map(|series| {
                let histogram =
                    Histogram::new(series.values.iter().copied(), self.bins, self.range.clone());
                (series.name.as_str(), histogram)
            })
            .collect()
    }

    /// Label of the y axis for the normalization in use.
    #[must_use]
    pub fn y_label(&self) -> String {
        self.norm.to_string()
    }
}

/// Error raised by a [`PlotRenderer`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("failed to render plot: {message}")]
pub struct RenderError {
    message: String,
}

impl RenderError {
    pub fn new<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
        }
    }
}

/// Draws prepared plots.
pub trait PlotRenderer {
    fn render_ecdf(&mut self, plot: &EcdfPlot) -> Result<(), RenderError>;
    fn render_histogram(&mut self, plot: &HistogramPlot) -> Result<(), RenderError>;
}

/// Series of one plot before render options are applied.
struct PlotData {
    title: String,
    x_label: String,
    series: Vec<Series>,
}

impl Comparator<'_> {
    /// Prepares one ECDF plot per feature, or one overlay without a treatment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::TreatmentGroupCount`](crate::config::ConfigError::TreatmentGroupCount)
    /// unless the treatment has exactly two values.
    pub fn ecdf_plots(&self, options: &PlotOptions) -> Result<Vec<EcdfPlot>, Error> {
        let plots = self.plot_data("plot_ecdf")?;
        let opacity = self.opacity(options, plots.len());
        Ok(plots
            .into_iter()
            .map(|plot| EcdfPlot {
                title: options.title.clone().unwrap_or(plot.title),
                x_label: plot.x_label,
                series: plot.series,
                figure_size: options.figure_size.unwrap_or(FigureSize::ECDF_DEFAULT),
                opacity,
            })
            .collect())
    }

    /// Prepares the ECDF plots and hands them to `renderer`.
    pub fn plot_ecdf<R>(&self, renderer: &mut R, options: &PlotOptions) -> Result<(), Error>
    where
        R: PlotRenderer + ?Sized,
    {
        for plot in self.ecdf_plots(options)? {
            renderer.render_ecdf(&plot)?;
        }
        Ok(())
    }

    /// Prepares one histogram per feature, or one overlay without a treatment.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::TreatmentGroupCount`](crate::config::ConfigError::TreatmentGroupCount)
    ///   unless the treatment has exactly two values
    /// - [`Error::Stats`] if a plot has no values at all
    pub fn histogram_plots(&self, options: &HistogramOptions) -> Result<Vec<HistogramPlot>, Error> {
        let plots = self.plot_data("plot_histogram")?;
        let opacity = self.opacity(&options.plot, plots.len());
        plots
            .into_iter()
            .map(|plot| -> Result<HistogramPlot, Error> {
                let values = || plot.series.iter().flat_map(|s| s.values.iter().copied());
                let range = histogram::value_range(values()).ok_or(StatsError::EmptySample {
                    sample: "plotted",
                })?;
                let bins = options
                    .bins
                    .unwrap_or_else(|| histogram::sturges_bin_count(values().count()));
                Ok(HistogramPlot {
                    title: options.plot.title.clone().unwrap_or(plot.title),
                    x_label: plot.x_label,
                    series: plot.series,
                    bins,
                    range,
                    norm: options.norm,
                    figure_size: options
                        .plot
                        .figure_size
                        .unwrap_or(FigureSize::HISTOGRAM_DEFAULT),
                    opacity,
                })
            })
            .collect()
    }

    /// Prepares the histograms and hands them to `renderer`.
    pub fn plot_histogram<R>(
        &self,
        renderer: &mut R,
        options: &HistogramOptions,
    ) -> Result<(), Error>
    where
        R: PlotRenderer + ?Sized,
    {
        for plot in self.histogram_plots(options)? {
            renderer.render_histogram(&plot)?;
        }
        Ok(())
    }

    fn opacity(&self, options: &PlotOptions, plot_count: usize) -> f64 {
        options.opacity.unwrap_or(if plot_count > 1 || !self.has_treatment() {
            OVERLAY_OPACITY
        } else {
            1.0
        })
    }

    fn plot_data(&self, operation: &'static str) -> Result<Vec<PlotData>, Error> {
        let prepared = self.prepare()?;
        let table = &prepared.table;
        if let Some(groups) = prepared.groups.as_ref().filter(|_| prepared.mode.is_grouped()) {
            let labels = groups.require_pair(operation)?;
            return prepared
                .features
                .iter()
                .map(|feature| -> Result<PlotData, Error> {
                    let samples = groups.split(table.numeric(feature)?);
                    Ok(PlotData {
                        title: format!("{feature} by {}", groups.column()),
                        x_label: feature.clone(),
                        series: labels
                            .iter()
                            .zip(samples)
                            .map(|(label, values)| Series {
                                name: (*label).to_owned(),
                                values,
                            })
                            .collect(),
                    })
                })
                .collect();
        }

        let series = prepared
            .features
            .iter()
            .map(|feature| -> Result<Series, Error> {
                Ok(Series {
                    name: feature.clone(),
                    values: dispatch::present(table.numeric(feature)?),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(vec![PlotData {
            title: prepared.features.join(" vs "),
            x_label: "value".to_owned(),
            series,
        }])
    }
}

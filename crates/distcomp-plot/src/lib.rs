//! SVG rendering of comparator plots.
//!
//! [`SvgRenderer`] implements [`PlotRenderer`] by writing every prepared
//! ECDF or histogram plot to its own SVG file in an output directory.
//!
//! # Examples
//!
//! ```no_run
//! use distcomp::{
//!     comparator::Comparator,
//!     config::ComparatorConfig,
//!     plot::PlotOptions,
//!     table::{Column, Table},
//! };
//! use distcomp_plot::SvgRenderer;
//!
//! let dataset = Table::new(vec![
//!     Column::numeric("a", [1.0, 2.0, 3.0]),
//!     Column::numeric("b", [2.0, 3.0, 4.0]),
//! ])?;
//! let comparator = Comparator::new(&dataset, ComparatorConfig::new(["a", "b"]))?;
//! let mut renderer = SvgRenderer::new("plots");
//! comparator.plot_ecdf(&mut renderer, &PlotOptions::default())?;
//! println!("wrote {:?}", renderer.written());
//! # Ok::<(), distcomp::Error>(())
//! ```

use std::path::{Path, PathBuf};

use distcomp::plot::{EcdfPlot, HistogramPlot, PlotRenderer, RenderError};

pub mod chart;

pub use self::chart::PlotError;

impl From<PlotError> for RenderError {
    fn from(error: PlotError) -> Self {
        RenderError::new(error.to_string())
    }
}

/// Writes plots as SVG files into a directory.
///
/// Files are named `<kind>-<nn>-<title>.svg`, numbered in rendering order.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    output_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl SvgRenderer {
    /// A renderer writing into `output_dir`, which must already exist.
    pub fn new<P>(output_dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            output_dir: output_dir.into(),
            written: vec![],
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Paths of the files written so far.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn next_path(&self, kind: &str, title: &str) -> PathBuf {
        let idx = self.written.len() + 1;
        self.output_dir
            .join(format!("{kind}-{idx:02}-{}.svg", slug(title)))
    }

    fn finish(&mut self, path: PathBuf) {
        tracing::info!(path = %path.display(), "wrote plot");
        self.written.push(path);
    }
}

impl PlotRenderer for SvgRenderer {
    fn render_ecdf(&mut self, plot: &EcdfPlot) -> Result<(), RenderError> {
        let path = self.next_path("ecdf", &plot.title);
        chart::draw_ecdf(plot, &path)?;
        self.finish(path);
        Ok(())
    }

    fn render_histogram(&mut self, plot: &HistogramPlot) -> Result<(), RenderError> {
        let path = self.next_path("hist", &plot.title);
        chart::draw_histogram(plot, &path)?;
        self.finish(path);
        Ok(())
    }
}

/// Lowercase ASCII alphanumerics, everything else collapsed into `-`.
fn slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("plot");
    }
    slug
}

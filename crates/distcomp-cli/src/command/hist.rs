use std::{fs, num::NonZeroUsize, path::PathBuf};

use anyhow::Context;
use distcomp::{
    HistNorm,
    comparator::Comparator,
    plot::{FigureSize, HistogramOptions, PlotOptions},
};
use distcomp_plot::SvgRenderer;

use crate::command::DatasetArg;

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub(crate) enum HistNormArg {
    Count,
    #[default]
    Percent,
    Probability,
    Density,
    ProbabilityDensity,
}

impl From<HistNormArg> for HistNorm {
    fn from(arg: HistNormArg) -> Self {
        match arg {
            HistNormArg::Count => HistNorm::Count,
            HistNormArg::Percent => HistNorm::Percent,
            HistNormArg::Probability => HistNorm::Probability,
            HistNormArg::Density => HistNorm::Density,
            HistNormArg::ProbabilityDensity => HistNorm::ProbabilityDensity,
        }
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct HistArg {
    #[command(flatten)]
    pub(crate) dataset: DatasetArg,
    /// Number of bins; Sturges' rule when omitted
    #[arg(long)]
    bins: Option<NonZeroUsize>,
    /// How bar heights are scaled
    #[arg(long, value_enum, default_value_t)]
    histnorm: HistNormArg,
    /// Directory the SVG files are written to
    #[arg(long, default_value = "plots")]
    output_dir: PathBuf,
    /// Figure size in inches, as WIDTHxHEIGHT [default: 8x4]
    #[arg(long)]
    figsize: Option<FigureSize>,
    /// Bar opacity between 0 and 1
    #[arg(long)]
    opacity: Option<f64>,
    /// Plot title, replacing the generated one
    #[arg(long)]
    title: Option<String>,
}

pub(crate) fn run(arg: &HistArg) -> anyhow::Result<()> {
    let HistArg {
        dataset,
        bins,
        histnorm,
        output_dir,
        figsize,
        opacity,
        title,
    } = arg;

    let (table, config) = dataset.load()?;
    let comparator = Comparator::new(&table, config)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;
    let mut renderer = SvgRenderer::new(output_dir);
    comparator.plot_histogram(
        &mut renderer,
        &HistogramOptions {
            bins: bins.map(NonZeroUsize::get),
            norm: (*histnorm).into(),
            plot: PlotOptions {
                figure_size: *figsize,
                opacity: *opacity,
                title: title.clone(),
            },
        },
    )?;

    for path in renderer.written() {
        println!("{}", path.display());
    }
    Ok(())
}

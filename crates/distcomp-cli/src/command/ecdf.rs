use std::{fs, path::PathBuf};

use anyhow::Context;
use distcomp::{
    comparator::Comparator,
    plot::{FigureSize, PlotOptions},
};
use distcomp_plot::SvgRenderer;

use crate::command::DatasetArg;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct EcdfArg {
    #[command(flatten)]
    pub(crate) dataset: DatasetArg,
    /// Directory the SVG files are written to
    #[arg(long, default_value = "plots")]
    output_dir: PathBuf,
    /// Figure size in inches, as WIDTHxHEIGHT [default: 10x4]
    #[arg(long)]
    figsize: Option<FigureSize>,
    /// Plot title, replacing the generated one
    #[arg(long)]
    title: Option<String>,
}

pub(crate) fn run(arg: &EcdfArg) -> anyhow::Result<()> {
    let EcdfArg {
        dataset,
        output_dir,
        figsize,
        title,
    } = arg;

    let (table, config) = dataset.load()?;
    let comparator = Comparator::new(&table, config)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;
    let mut renderer = SvgRenderer::new(output_dir);
    comparator.plot_ecdf(
        &mut renderer,
        &PlotOptions {
            figure_size: *figsize,
            opacity: None,
            title: title.clone(),
        },
    )?;

    for path in renderer.written() {
        println!("{}", path.display());
    }
    Ok(())
}

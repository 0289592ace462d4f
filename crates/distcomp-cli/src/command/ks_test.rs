use distcomp::{
    KsAlternative, KsMode,
    comparator::Comparator,
    ks_test::{DEFAULT_KS_THRESHOLD, KsTestOptions},
};

use crate::{command::DatasetArg, util};

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub(crate) enum AlternativeArg {
    #[default]
    TwoSided,
    Less,
    Greater,
}

impl From<AlternativeArg> for KsAlternative {
    fn from(arg: AlternativeArg) -> Self {
        match arg {
            AlternativeArg::TwoSided => KsAlternative::TwoSided,
            AlternativeArg::Less => KsAlternative::Less,
            AlternativeArg::Greater => KsAlternative::Greater,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub(crate) enum ModeArg {
    #[default]
    Auto,
    Exact,
    Asymp,
}

impl From<ModeArg> for KsMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Auto => KsMode::Auto,
            ModeArg::Exact => KsMode::Exact,
            ModeArg::Asymp => KsMode::Asymp,
        }
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct KsTestArg {
    #[command(flatten)]
    pub(crate) dataset: DatasetArg,
    /// Alternative hypothesis
    #[arg(long, value_enum, default_value_t)]
    alternative: AlternativeArg,
    /// How the p-value is computed
    #[arg(long, value_enum, default_value_t)]
    mode: ModeArg,
    /// p-values at or below this are reported as different distributions
    #[arg(long, default_value_t = DEFAULT_KS_THRESHOLD)]
    p_threshold: f64,
    /// Print the reports as JSON
    #[arg(long)]
    json: bool,
}

pub(crate) fn run(arg: &KsTestArg) -> anyhow::Result<()> {
    let KsTestArg {
        dataset,
        alternative,
        mode,
        p_threshold,
        json,
    } = arg;

    let (table, config) = dataset.load()?;
    let comparator = Comparator::new(&table, config)?;
    let reports = comparator.ks_test(&KsTestOptions {
        alternative: (*alternative).into(),
        mode: (*mode).into(),
        p_threshold: *p_threshold,
    })?;

    if *json {
        return util::print_json(&reports);
    }
    for report in &reports {
        util::print_report(report, report.verdict);
    }
    Ok(())
}

use distcomp::{
    comparator::Comparator,
    t_test::{DEFAULT_T_THRESHOLD, DEFAULT_TEST_GROUP, TTestOptions},
};

use crate::{command::DatasetArg, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TTestArg {
    #[command(flatten)]
    pub(crate) dataset: DatasetArg,
    /// Treatment value of the test group; the other value is control
    #[arg(long, default_value = DEFAULT_TEST_GROUP)]
    test_group: String,
    /// p-values at or below this are reported as different means
    #[arg(long, default_value_t = DEFAULT_T_THRESHOLD)]
    p_threshold: f64,
    /// Print the reports as JSON
    #[arg(long)]
    json: bool,
}

pub(crate) fn run(arg: &TTestArg) -> anyhow::Result<()> {
    let TTestArg {
        dataset,
        test_group,
        p_threshold,
        json,
    } = arg;

    let (table, config) = dataset.load()?;
    let comparator = Comparator::new(&table, config)?;
    let reports = comparator.t_test(&TTestOptions {
        test_group: test_group.clone(),
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

use distcomp::{comparator::Comparator, t_test::DEFAULT_TEST_GROUP};

use crate::{command::DatasetArg, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TableOneArg {
    #[command(flatten)]
    pub(crate) dataset: DatasetArg,
    /// Treatment value of the test group; all other rows are control
    #[arg(long, default_value = DEFAULT_TEST_GROUP)]
    test_group: String,
    /// Print the table as JSON
    #[arg(long)]
    json: bool,
}

pub(crate) fn run(arg: &TableOneArg) -> anyhow::Result<()> {
    let TableOneArg {
        dataset,
        test_group,
        json,
    } = arg;

    let (table, config) = dataset.load()?;
    let comparator = Comparator::new(&table, config)?;
    let balance = comparator.balance_table(test_group)?;

    if *json {
        return util::print_json(&balance);
    }
    println!("{balance}");
    Ok(())
}

use std::{
    fmt,
    fs::{self, File},
    io::{self, BufReader, Read, Write as _},
    path::Path,
};

use anyhow::Context;
use crossterm::style::{self, Stylize as _};
use distcomp::{
    config::ComparatorConfig,
    table::{Column, Table},
    verdict::Verdict,
};

/// Cell contents read as a missing value.
const MISSING_MARKERS: [&str; 4] = ["", "NA", "NaN", "null"];

/// Reads a CSV file with a header row into a [`Table`].
pub fn read_csv_file<P>(path: P) -> anyhow::Result<Table>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open data file: {}", path.display()))?;
    parse_csv(BufReader::new(file))
        .with_context(|| format!("Failed to read CSV data file: {}", path.display()))
}

/// Parses CSV with a header row.
///
/// A column is numeric when every non-missing cell parses as `f64`;
/// otherwise it is kept as text.
pub fn parse_csv<R>(reader: R) -> anyhow::Result<Table>
where
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(str::to_owned)
        .collect::<Vec<_>>();

    let mut cells: Vec<Vec<Option<String>>> = vec![vec![]; headers.len()];
    for (idx, record) in reader.records().enumerate() {
        // header is line 1
        let record = record.with_context(|| format!("Failed to read CSV line {}", idx + 2))?;
        for (column, value) in cells.iter_mut().zip(record.iter()) {
            column.push((!MISSING_MARKERS.contains(&value)).then(|| value.to_owned()));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| infer_column(name, values))
        .collect();
    Ok(Table::new(columns)?)
}

fn infer_column(name: String, values: Vec<Option<String>>) -> Column {
    let numeric = values
        .iter()
        .map(|v| v.as_deref().map(str::parse::<f64>).transpose().ok())
        .collect::<Option<Vec<_>>>();
    match numeric {
        Some(numeric) => Column::numeric_opt(name, numeric),
        None => Column::text_opt(name, values),
    }
}

/// Reads a comparator configuration from a JSON file.
pub fn read_config_file<P>(path: P) -> anyhow::Result<ComparatorConfig>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to open config file: {}", path.display()))?;
    let value = serde_json::from_str::<serde_json::Value>(&text)
        .with_context(|| format!("Failed to parse config JSON file: {}", path.display()))?;
    let config = ComparatorConfig::from_json_value(&value)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(config)
}

/// Writes `value` as pretty JSON to stdout.
pub fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("Failed to write JSON to stdout")?;
    writeln!(stdout).context("Failed to write newline after JSON to stdout")?;
    Ok(())
}

/// Prints a multi-line report, coloring its last line (the verdict).
pub fn print_report<T>(report: &T, verdict: Verdict)
where
    T: fmt::Display,
{
    let text = report.to_string();
    let (body, last) = match text.rsplit_once('\n') {
        Some((body, last)) => (Some(body), last),
        None => (None, text.as_str()),
    };
    if let Some(body) = body {
        println!("{body}");
    }
    match verdict {
        Verdict::SameDistribution => println!("{}", style::style(last).green()),
        Verdict::DifferentDistribution => println!("{}", style::style(last).red()),
    }
}

#[cfg(test)]
mod tests {
    use distcomp::table::ColumnData;

    use super::*;

    #[test]
    fn test_parse_csv_infers_column_types() {
        let csv = "x,grp,y\n1.5,test,2\nNA,control,\n3,test,NaN\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(
            table.numeric("x").unwrap(),
            [Some(1.5), None, Some(3.0)].as_slice()
        );
        assert_eq!(table.numeric("y").unwrap(), [Some(2.0), None, None].as_slice());
        assert_eq!(
            table.column("grp").unwrap().data,
            ColumnData::Text(vec![
                Some("test".to_owned()),
                Some("control".to_owned()),
                Some("test".to_owned()),
            ])
        );
    }

    #[test]
    fn test_parse_csv_mixed_column_is_text() {
        let csv = "id\n1\nb\nnull\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(
            table.column("id").unwrap().data,
            ColumnData::Text(vec![Some("1".to_owned()), Some("b".to_owned()), None])
        );
    }

    #[test]
    fn test_parse_csv_rejects_ragged_rows() {
        let csv = "a,b\n1,2\n3\n";
        assert!(parse_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_read_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"features": ["x"], "treatment": "grp", "outlier_bounds": [0.05, 0.95]}"#,
        )
        .unwrap();
        let config = read_config_file(&path).unwrap();
        assert_eq!(
            config,
            ComparatorConfig::new(["x"])
                .with_treatment("grp")
                .with_outlier_bounds(0.05, 0.95)
        );

        fs::write(&path, r#"{"features": "x"}"#).unwrap();
        let err = read_config_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("'features'"));
    }
}

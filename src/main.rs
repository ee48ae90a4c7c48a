use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use chrono::Local;
use chrono::NaiveDate;
use clap::Parser;
use csv::ReaderBuilder;
use csv::Trim;
use frontier_mc::portfolio::report::format_percent;
use frontier_mc::portfolio::risk_free_from_percent;
use frontier_mc::portfolio::risk_tolerance_from_percent;
use frontier_mc::portfolio::DateRange;
use frontier_mc::portfolio::FinalAllocation;
use frontier_mc::portfolio::Frequency;
use frontier_mc::portfolio::OptimizationRequest;
use frontier_mc::portfolio::OptimizerConfig;
use frontier_mc::portfolio::PortfolioEngine;
use frontier_mc::portfolio::PortfolioSample;
use frontier_mc::portfolio::PricePoint;
use frontier_mc::portfolio::PriceSeries;
use frontier_mc::portfolio::WeightScheme;
use frontier_mc::portfolio::DEFAULT_TRIALS;
use prettytable::format;
use prettytable::Cell;
use prettytable::Row;
use prettytable::Table;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Efficient-frontier allocation from local price exports.
#[derive(Parser, Debug)]
#[command(name = "frontier-mc", version, about, long_about = None)]
struct Cli {
  /// SYMBOL=path of a CSV export with `Date` and `Close` columns (repeatable)
  #[arg(short, long = "asset", value_parser = parse_asset, required = true)]
  assets: Vec<(String, PathBuf)>,

  /// Sampling frequency of the exports (d, w, m)
  #[arg(short, long, default_value = "d")]
  frequency: String,

  /// Annual risk-free rate in percent (default 4.35)
  #[arg(long)]
  risk_free: Option<f64>,

  /// Risk tolerance, 0 (min variance) to 100 (max Sharpe)
  #[arg(short = 't', long, default_value_t = 50.0)]
  risk_tolerance: f64,

  /// Total amount to invest in USD
  #[arg(long, default_value_t = 0.0)]
  amount: f64,

  /// Use the last N years of history (default 5)
  #[arg(short, long, conflicts_with_all = ["from", "to"])]
  years: Option<u32>,

  /// First date of a custom window (YYYY-MM-DD)
  #[arg(long)]
  from: Option<NaiveDate>,

  /// Last date of a custom window (YYYY-MM-DD)
  #[arg(long)]
  to: Option<NaiveDate>,

  /// Number of random portfolios
  #[arg(long, default_value_t = DEFAULT_TRIALS)]
  trials: usize,

  /// Seed for a reproducible run
  #[arg(long)]
  seed: Option<u64>,

  /// Draw weights from a flat Dirichlet instead of normalized uniforms
  #[arg(long)]
  dirichlet: bool,

  /// Abort when the optimization takes longer than this many milliseconds
  #[arg(long)]
  timeout_ms: Option<u64>,
}

fn parse_asset(s: &str) -> std::result::Result<(String, PathBuf), String> {
  let (symbol, path) = s
    .split_once('=')
    .ok_or_else(|| format!("expected SYMBOL=path, got `{s}`"))?;
  let symbol = symbol.trim().to_uppercase();
  if symbol.is_empty() {
    return Err(format!("missing symbol in `{s}`"));
  }
  Ok((symbol, PathBuf::from(path.trim())))
}

fn read_price_csv(symbol: &str, path: &Path) -> Result<PriceSeries> {
  let mut reader = ReaderBuilder::new()
    .trim(Trim::All)
    .flexible(true)
    .from_path(path)
    .with_context(|| format!("cannot open {}", path.display()))?;

  let headers = reader
    .headers()
    .with_context(|| format!("cannot read header of {}", path.display()))?
    .clone();
  let column = |name: &str| {
    headers
      .iter()
      .position(|c| c.eq_ignore_ascii_case(name))
      .with_context(|| format!("{} has no `{name}` column", path.display()))
  };
  let date_col = column("date")?;
  let close_col = column("close")?;

  let mut points = Vec::new();
  let mut dropped = 0usize;
  for record in reader.records() {
    let record = record.with_context(|| format!("malformed row in {}", path.display()))?;
    let Some(date) = record
      .get(date_col)
      .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    else {
      dropped += 1;
      continue;
    };
    let close = record.get(close_col).and_then(|c| c.parse::<f64>().ok());
    points.push(PricePoint::new(date, close));
  }

  if dropped > 0 {
    warn!(symbol, dropped, "rows without a valid date were ignored");
  }
  if points.is_empty() {
    bail!("{} contains no price rows", path.display());
  }
  Ok(PriceSeries::new(symbol, points))
}

fn date_range(cli: &Cli) -> Result<DateRange> {
  let range = match (cli.from, cli.to) {
    (Some(from), Some(to)) => DateRange::between(from, to)?,
    (None, None) => DateRange::last_years(cli.years.unwrap_or(5), Local::now().date_naive())?,
    (from, to) => DateRange {
      start: from,
      end: to,
    },
  };
  Ok(range)
}

fn metrics_row(label: &str, s: &PortfolioSample) -> Row {
  Row::new(vec![
    Cell::new(label),
    Cell::new(&format_percent(s.expected_return)),
    Cell::new(&format_percent(s.volatility)),
    Cell::new(&s.sharpe.map_or("n/a".to_string(), |x| format!("{x:.3}"))),
  ])
}

fn print_result(result: &FinalAllocation) {
  let mut assets = Table::new();
  assets.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
  assets.set_titles(Row::new(vec![
    Cell::new("Asset"),
    Cell::new("Return mu"),
    Cell::new("Risk sigma"),
  ]));
  for stats in &result.asset_stats {
    assets.add_row(Row::new(vec![
      Cell::new(&stats.symbol),
      Cell::new(&format_percent(stats.mu)),
      Cell::new(&format_percent(stats.sigma)),
    ]));
  }
  println!("{assets}");

  let chosen = PortfolioSample {
    weights: result.weights.clone(),
    expected_return: result.expected_return,
    volatility: result.volatility,
    sharpe: result.sharpe,
  };
  let mut portfolios = Table::new();
  portfolios.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
  portfolios.set_titles(Row::new(vec![
    Cell::new("Portfolio"),
    Cell::new("Return"),
    Cell::new("Risk"),
    Cell::new("Sharpe"),
  ]));
  portfolios.add_row(metrics_row("Min variance", &result.min_variance));
  portfolios.add_row(metrics_row("Max Sharpe", &result.max_sharpe));
  portfolios.add_row(metrics_row("Your choice", &chosen));
  println!("{portfolios}");

  print!("{}", result.report);
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let range = date_range(&cli)?;

  let prices = cli
    .assets
    .iter()
    .map(|(symbol, path)| read_price_csv(symbol, path))
    .collect::<Result<Vec<_>>>()?;
  info!(
    assets = prices.len(),
    start = ?range.start,
    end = ?range.end,
    "loaded price history"
  );

  let engine = PortfolioEngine::new(OptimizerConfig {
    trials: cli.trials,
    weight_scheme: if cli.dirichlet {
      WeightScheme::FlatDirichlet
    } else {
      WeightScheme::Uniform
    },
    seed: cli.seed,
    deadline: cli.timeout_ms.map(Duration::from_millis),
    ..OptimizerConfig::default()
  });
  let request = OptimizationRequest {
    prices,
    frequency: Frequency::from_str(&cli.frequency),
    risk_free: risk_free_from_percent(cli.risk_free),
    risk_tolerance: risk_tolerance_from_percent(cli.risk_tolerance),
    total_investment: cli.amount,
    range: Some(range),
  };

  let result = engine.optimize(&request)?;

  match (range.start, range.end) {
    (Some(start), Some(end)) => println!("Data from {start} to {end}"),
    (Some(start), None) => println!("Data from {start}"),
    (None, Some(end)) => println!("Data up to {end}"),
    (None, None) => {}
  }
  println!("{} aligned observations per asset\n", result.observations);
  print_result(&result);
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn parses_asset_argument() {
    let (symbol, path) = parse_asset("spy=data/spy.csv").unwrap();
    assert_eq!(symbol, "SPY");
    assert_eq!(path, PathBuf::from("data/spy.csv"));
    assert!(parse_asset("spy").is_err());
    assert!(parse_asset("=x.csv").is_err());
  }

  #[test]
  fn reads_stooq_export() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "Date,Open,High,Low,Close,Volume").unwrap();
    writeln!(file, "2024-01-02,1,1,1,100.5,10").unwrap();
    writeln!(file, "2024-01-03,1,1,1,,10").unwrap();
    writeln!(file, "garbage,1,1,1,99,10").unwrap();
    writeln!(file, "2024-01-04,1,1,1,101.0,10").unwrap();
    writeln!(file).unwrap();

    let series = read_price_csv("SPY", file.path()).unwrap();
    assert_eq!(series.symbol(), "SPY");
    assert_eq!(series.len(), 3);
    assert_eq!(series.points()[0].close, Some(100.5));
    assert_eq!(series.points()[1].close, None);
  }

  #[test]
  fn reads_quoted_export_with_lowercase_header() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "\"date\",\"Open\",\"High\",\"Low\",\"CLOSE\",\"Volume\"").unwrap();
    writeln!(file, "\"2024-01-02\",1,1,1,\"100.5\",10").unwrap();
    writeln!(file, "\"2024-01-03\", 1, 1, 1, \"n/a\", 10").unwrap();
    writeln!(file, " 2024-01-04 ,1,1,1, 101.25 ,\"1,000\"").unwrap();

    let series = read_price_csv("QQQ", file.path()).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.points()[0].close, Some(100.5));
    assert_eq!(series.points()[1].close, None);
    assert_eq!(series.points()[2].close, Some(101.25));
  }

  #[test]
  fn rejects_export_without_close_column() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "No data").unwrap();
    let err = read_price_csv("XXX", file.path()).unwrap_err();
    assert!(err.to_string().contains("no `date` column"));
  }
}

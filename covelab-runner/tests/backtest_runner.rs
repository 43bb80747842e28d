//! Integration tests for the runner: selection, skipping, memoization,
//! aggregation across tickers, config-driven runs and artifact export.

use chrono::{Duration, NaiveDate};
use covelab_core::data::PriceTable;
use covelab_core::domain::PricePoint;
use covelab_core::{DateRange, ParamError, StrategyParams};
use covelab_runner::export::{LEDGER_FILE, PORTFOLIO_FILE, SIGNALS_FILE, SUMMARY_FILE};
use covelab_runner::{
    run_backtest, save_artifacts, BacktestConfig, Backtester, RunError, Selection, SkipReason,
};

// ──────────────────────────────────────────────
// Fixture
// ──────────────────────────────────────────────

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn series(ticker: &str, start: &str, prices: &[f64]) -> Vec<PricePoint> {
    let base = date(start);
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| PricePoint::new(ticker, base + Duration::days(i as i64), p))
        .collect()
}

/// AAA buys at 15 on Jan 4 and marks up to 30 on Jan 5.
/// BBB is flat. CCC trades only in February. DDD starts after AAA ends.
fn table() -> PriceTable {
    let mut points = series("AAA", "2024-01-01", &[10.0, 10.0, 10.0, 15.0, 30.0]);
    points.extend(series("BBB", "2024-01-01", &[50.0; 5]));
    points.extend(series("CCC", "2024-02-01", &[40.0, 41.0, 42.0]));
    points.extend(series("DDD", "2024-01-08", &[20.0; 3]));
    PriceTable::from_points(points).unwrap()
}

fn params() -> StrategyParams {
    StrategyParams {
        short_window: 2,
        long_window: 3,
        starting_cash: 1000.0,
        num_shares: 10,
    }
}

fn january() -> DateRange {
    DateRange::new(Some(date("2024-01-01")), Some(date("2024-01-31")))
}

// ──────────────────────────────────────────────
// Selection and skipping
// ──────────────────────────────────────────────

#[test]
fn skips_unknown_and_out_of_range_tickers() {
    let table = table();
    let selection = Selection::from_tickers(["AAA", "BBB", "CCC", "ZZZ", "AAA"]);
    let run = run_backtest(&table, &params(), &january(), &selection).unwrap();

    assert_eq!(run.runs.keys().collect::<Vec<_>>(), vec!["AAA", "BBB"]);
    assert_eq!(run.skipped.len(), 2);
    assert_eq!(run.skipped[0].ticker, "CCC");
    assert_eq!(run.skipped[0].reason, SkipReason::NoObservationsInRange);
    assert_eq!(run.skipped[1].ticker, "ZZZ");
    assert_eq!(run.skipped[1].reason, SkipReason::UnknownTicker);

    assert_eq!(run.summary.ticker_count, 2);
    assert_eq!(run.summary.total_investment, 2000.0);
}

#[test]
fn portfolio_sums_tickers_by_date() {
    let table = table();
    let selection = Selection::from_tickers(["AAA", "BBB"]);
    let run = run_backtest(&table, &params(), &january(), &selection).unwrap();

    assert_eq!(run.portfolio.len(), 5);
    for point in &run.portfolio {
        let expected: f64 = run
            .ledgers()
            .filter(|row| row.date == point.date)
            .map(|row| row.total)
            .sum();
        assert_eq!(point.total, expected);
        assert_eq!(point.total, point.cash + point.holdings);
    }

    assert_eq!(run.summary.ending_total, Some(2150.0));
    let delta = run.summary.delta.unwrap();
    assert!((delta - 1.075).abs() < 1e-12);

    let aaa = run.ticker("AAA").unwrap();
    assert_eq!(aaa.trades.len(), 1);
    assert_eq!(aaa.ending_total(), Some(1150.0));
}

#[test]
fn misaligned_ranges_use_last_date_only() {
    let table = table();
    let selection = Selection::from_tickers(["AAA", "DDD"]);
    let run = run_backtest(&table, &params(), &DateRange::default(), &selection).unwrap();

    assert_eq!(run.portfolio.len(), 8);
    // Jan 10 only has DDD, so AAA's gain is not in the ending total.
    assert_eq!(run.summary.ending_total, Some(1000.0));
    assert_eq!(run.summary.delta, Some(0.5));
}

#[test]
fn empty_selection_runs_everything() {
    let table = table();
    let run = run_backtest(&table, &params(), &DateRange::default(), &Selection::All).unwrap();
    assert_eq!(run.summary.ticker_count, 4);
    assert!(run.skipped.is_empty());
}

#[test]
fn nothing_in_range_gives_empty_portfolio() {
    let table = table();
    let range = DateRange::new(Some(date("2030-01-01")), None);
    let run = run_backtest(&table, &params(), &range, &Selection::All).unwrap();
    assert!(run.portfolio.is_empty());
    assert_eq!(run.summary.ticker_count, 0);
    assert_eq!(run.summary.ending_total, None);
    assert_eq!(run.summary.delta, None);
    assert_eq!(run.skipped.len(), 4);
}

// ──────────────────────────────────────────────
// Invalid parameters
// ──────────────────────────────────────────────

#[test]
fn invalid_parameters_reject_the_run() {
    let table = table();
    let bad_cash = StrategyParams {
        starting_cash: 0.0,
        ..params()
    };
    let err = run_backtest(&table, &bad_cash, &january(), &Selection::All).unwrap_err();
    assert!(matches!(err, RunError::Param(ParamError::StartingCash(_))));

    let inverted = DateRange::new(Some(date("2024-02-01")), Some(date("2024-01-01")));
    let err = run_backtest(&table, &params(), &inverted, &Selection::All).unwrap_err();
    assert!(matches!(err, RunError::Param(ParamError::DateRange { .. })));
}

// ──────────────────────────────────────────────
// Memoization
// ──────────────────────────────────────────────

#[test]
fn memo_reuses_per_ticker_results() {
    let table = table();
    let mut backtester = Backtester::new(&table).with_memo();
    let selection = Selection::from_tickers(["AAA", "BBB"]);

    let first = backtester.run(&params(), &january(), &selection).unwrap();
    let memo = backtester.memo().unwrap();
    assert_eq!(memo.len(), 2);
    assert_eq!((memo.hits(), memo.misses()), (0, 2));

    let second = backtester.run(&params(), &january(), &selection).unwrap();
    let memo = backtester.memo().unwrap();
    assert_eq!((memo.hits(), memo.misses()), (2, 2));
    assert_eq!(first.portfolio, second.portfolio);
    assert_eq!(first.summary, second.summary);

    // A narrower portfolio still hits on the shared ticker.
    let only_aaa = Selection::from_tickers(["AAA"]);
    backtester.run(&params(), &january(), &only_aaa).unwrap();
    assert_eq!(backtester.memo().unwrap().hits(), 3);
}

#[test]
fn memo_misses_on_changed_parameters_or_range() {
    let table = table();
    let mut backtester = Backtester::new(&table).with_memo();
    let selection = Selection::from_tickers(["AAA"]);

    backtester.run(&params(), &january(), &selection).unwrap();
    let wider = StrategyParams {
        long_window: 4,
        ..params()
    };
    backtester.run(&wider, &january(), &selection).unwrap();
    let shorter = DateRange::new(Some(date("2024-01-02")), None);
    backtester.run(&params(), &shorter, &selection).unwrap();

    let memo = backtester.memo().unwrap();
    assert_eq!(memo.len(), 3);
    assert_eq!(memo.hits(), 0);
}

#[test]
fn memoized_run_matches_fresh_run() {
    let table = table();
    let mut backtester = Backtester::new(&table).with_memo();
    backtester
        .run(&params(), &DateRange::default(), &Selection::All)
        .unwrap();
    let cached = backtester
        .run(&params(), &DateRange::default(), &Selection::All)
        .unwrap();
    let fresh = run_backtest(&table, &params(), &DateRange::default(), &Selection::All).unwrap();

    assert_eq!(cached.portfolio, fresh.portfolio);
    for (ticker, run) in &fresh.runs {
        assert_eq!(cached.runs[ticker].as_ref(), run.as_ref());
    }
}

// ──────────────────────────────────────────────
// Files
// ──────────────────────────────────────────────

#[test]
fn artifacts_are_byte_identical_across_runs() {
    let table = table();
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();

    for dir in [a.path(), b.path()] {
        let run = run_backtest(&table, &params(), &DateRange::default(), &Selection::All).unwrap();
        let written = save_artifacts(&run, dir).unwrap();
        assert_eq!(written.len(), 4);
    }

    for name in [SIGNALS_FILE, PORTFOLIO_FILE, LEDGER_FILE, SUMMARY_FILE] {
        let left = std::fs::read(a.path().join(name)).unwrap();
        let right = std::fs::read(b.path().join(name)).unwrap();
        assert_eq!(left, right, "{name} differs between identical runs");
    }

    let signals = std::fs::read_to_string(a.path().join(SIGNALS_FILE)).unwrap();
    // header + 5 AAA + 5 BBB + 3 CCC + 3 DDD
    assert_eq!(signals.lines().count(), 17);
    assert!(signals.starts_with("ticker,date,short_ma,long_ma,signal,position\n"));

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(a.path().join(SUMMARY_FILE)).unwrap())
            .unwrap();
    assert_eq!(summary["schema_version"], 1);
    assert_eq!(summary["summary"]["ticker_count"], 4);
}

#[test]
fn config_file_with_sectors_drives_a_run() {
    let dir = tempfile::tempdir().unwrap();

    let prices = dir.path().join("prices.csv");
    std::fs::write(
        &prices,
        "Ticker,Date,Price\n\
         AAA,2024-01-01,10\n\
         AAA,2024-01-02,10\n\
         AAA,2024-01-03,10\n\
         AAA,2024-01-04,15\n\
         AAA,2024-01-05,30\n\
         BBB,2024-01-01,50\n\
         BBB,2024-01-02,\n\
         BBB,2024-01-03,50\n",
    )
    .unwrap();

    std::fs::write(
        dir.path().join("universe.toml"),
        "[sectors]\nTech = [\"AAA\"]\nEnergy = [\"BBB\", \"EEE\"]\n",
    )
    .unwrap();

    let config_path = dir.path().join("backtest.toml");
    let universe_path = dir.path().join("universe.toml");
    std::fs::write(
        &config_path,
        format!(
            "[backtest]\n\
             start_date = \"2024-01-01\"\n\
             starting_cash = 1000.0\n\
             num_shares = 10\n\
             short_window = 2\n\
             long_window = 3\n\
             \n\
             [portfolio]\n\
             tickers = [\"AAA\"]\n\
             sectors = [\"Tech\", \"Energy\"]\n\
             universe = {:?}\n",
            universe_path.display().to_string()
        ),
    )
    .unwrap();

    let table = PriceTable::from_csv_path(&prices).unwrap();
    assert_eq!(table.dropped_rows(), 1);

    let config = BacktestConfig::from_file(&config_path).unwrap();
    let selection = config.selection().unwrap();
    assert_eq!(
        selection,
        Selection::Tickers(vec!["AAA".into(), "BBB".into(), "EEE".into()])
    );

    let run = run_backtest(&table, &config.params(), &config.date_range(), &selection).unwrap();
    assert_eq!(run.summary.ticker_count, 2);
    assert_eq!(run.skipped.len(), 1);
    assert_eq!(run.skipped[0].ticker, "EEE");
    assert_eq!(run.ticker("BBB").unwrap().ledger.len(), 2);
}

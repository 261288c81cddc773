use crate::errors::{BacktestError, Result};
use crate::services::alignment::align;
use crate::services::benchmark::{benchmark_equity_curve, BenchmarkKind};
use crate::services::contribution::{accumulate_benchmark, accumulate_rotation};
use crate::services::metrics::{compare, ComparisonSummary, MetricsConfig};
use crate::services::returns::compute_returns;
use crate::services::rotation::{compound_rotation, select_holdings, RotationRules};
use crate::value_objects::equity_point::{EquityCurve, EquityRow};
use crate::value_objects::holding::{AllocationDecision, Holding};
use crate::value_objects::price_series::PriceSeries;
use crate::value_objects::return_series::ReturnSeries;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapitalMode {
    /// One lump sum compounded through the chosen asset.
    Compound,
    /// A fixed amount invested at every month-end close.
    Contribution { monthly_contribution: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSettings {
    pub initial_capital: f64,
    pub capital_mode: CapitalMode,
    pub rules: RotationRules,
    pub benchmark: BenchmarkKind,
    pub metrics: MetricsConfig,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            capital_mode: CapitalMode::Compound,
            rules: RotationRules::default(),
            benchmark: BenchmarkKind::equal_weight(),
            metrics: MetricsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResults {
    pub prices_a: PriceSeries,
    pub prices_b: PriceSeries,
    pub returns_a: ReturnSeries,
    pub returns_b: ReturnSeries,
    pub decisions: Vec<AllocationDecision>,
    pub rotation: EquityCurve,
    pub benchmark: EquityCurve,
    pub summary: ComparisonSummary,
}

impl BacktestResults {
    pub fn rows(&self) -> Vec<EquityRow> {
        self.decisions
            .iter()
            .zip(&self.returns_a.points)
            .zip(&self.returns_b.points)
            .zip(self.rotation.points.iter().zip(&self.benchmark.points))
            .map(|(((decision, ra), rb), (rot, bench))| EquityRow {
                month: decision.month,
                holding: decision.holding,
                signal_a: decision.signal_a,
                signal_b: decision.signal_b,
                return_a: ra.value,
                return_b: rb.value,
                rotation_return: rot.period_return,
                rotation_equity: rot.equity,
                benchmark_return: bench.period_return,
                benchmark_equity: bench.equity,
                contributed: rot.contributed,
            })
            .collect()
    }

    pub fn holdings(&self) -> Vec<Holding> {
        self.decisions.iter().map(|d| d.holding).collect()
    }
}

/// Aligns two monthly price series, derives returns, runs the rotation and
/// the benchmark under the same capital mode, and summarizes both.
pub fn run_backtest(
    prices_a: &PriceSeries,
    prices_b: &PriceSeries,
    settings: &BacktestSettings,
) -> Result<BacktestResults> {
    settings.benchmark.validate()?;
    let (prices_a, prices_b) = align(prices_a, prices_b)?;
    let returns_a = compute_returns(&prices_a)?;
    let returns_b = compute_returns(&prices_b)?;
    let decisions = select_holdings(&returns_a, &returns_b, &settings.rules)?;

    let (rotation, benchmark) = match settings.capital_mode {
        CapitalMode::Compound => (
            compound_rotation(
                "rotation",
                &returns_a,
                &returns_b,
                &decisions,
                settings.initial_capital,
            )?,
            benchmark_equity_curve(
                &returns_a,
                &returns_b,
                settings.benchmark,
                settings.initial_capital,
            )?,
        ),
        CapitalMode::Contribution {
            monthly_contribution,
        } => (
            accumulate_rotation(&prices_a, &prices_b, &decisions, monthly_contribution)?,
            accumulate_benchmark(&prices_a, &prices_b, settings.benchmark, monthly_contribution)?,
        ),
    };

    if rotation.len() != benchmark.len() {
        return Err(BacktestError::Alignment(format!(
            "rotation has {} months but benchmark has {}",
            rotation.len(),
            benchmark.len()
        )));
    }

    let holdings: Vec<Holding> = decisions.iter().map(|d| d.holding).collect();
    let summary = compare(&rotation, &benchmark, &holdings, settings.metrics);

    Ok(BacktestResults {
        prices_a,
        prices_b,
        returns_a,
        returns_b,
        decisions,
        rotation,
        benchmark,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::{run_backtest, BacktestSettings, CapitalMode};
    use crate::errors::BacktestError;
    use crate::services::benchmark::BenchmarkKind;
    use crate::services::metrics::recompute_summary;
    use crate::services::rotation::{RotationRules, SelectionRule, SignalTiming, TieBreak};
    use crate::value_objects::holding::Holding;
    use crate::value_objects::month::Month;
    use crate::value_objects::price_series::{PricePoint, PriceSeries};

    fn series(asset: &str, start: Month, prices: &[f64]) -> PriceSeries {
        let mut month = start;
        let mut points = Vec::new();
        for price in prices {
            points.push(PricePoint {
                month,
                price: *price,
            });
            month = month.next();
        }
        PriceSeries::new(asset, points).expect("series")
    }

    fn jan() -> Month {
        Month::new(2024, 1).expect("month")
    }

    fn concurrent() -> RotationRules {
        RotationRules {
            selection: SelectionRule::Momentum,
            signal: SignalTiming::Concurrent,
            tie_break: TieBreak::PreferA,
        }
    }

    #[test]
    fn compound_run_produces_aligned_rows() {
        let a = series("A", jan(), &[100.0, 110.0, 99.0]);
        let b = series("B", jan(), &[100.0, 105.0, 110.0]);
        let settings = BacktestSettings {
            initial_capital: 1.0,
            rules: concurrent(),
            benchmark: BenchmarkKind::HoldA,
            ..BacktestSettings::default()
        };
        let results = run_backtest(&a, &b, &settings).expect("backtest");
        let rows = results.rows();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].holding, Holding::AssetA);
        assert_eq!(rows[1].holding, Holding::AssetB);
        assert!((rows[1].rotation_equity - 1.10 * (110.0 / 105.0)).abs() < 1e-12);
        assert!((rows[1].benchmark_equity - 0.99).abs() < 1e-12);
        assert_eq!(results.summary.switches, 1);
        assert_eq!(results.summary.months_outperformed, 1);
    }

    #[test]
    fn summary_can_be_rebuilt_from_rows() {
        let a = series("A", jan(), &[100.0, 103.0, 101.0, 108.0, 104.0]);
        let b = series("B", jan(), &[50.0, 51.0, 53.0, 52.0, 55.0]);
        let settings = BacktestSettings::default();
        let results = run_backtest(&a, &b, &settings).expect("backtest");
        let rebuilt = recompute_summary(&results.rows(), settings.metrics);
        assert_eq!(rebuilt.months_in_a, results.summary.months_in_a);
        assert_eq!(rebuilt.switches, results.summary.switches);
        assert!(
            (rebuilt.rotation.final_equity - results.summary.rotation.final_equity).abs() < 1e-9
        );
        assert!((rebuilt.rotation.sharpe - results.summary.rotation.sharpe).abs() < 1e-9);
    }

    #[test]
    fn contribution_mode_tracks_paid_in_capital() {
        let a = series("A", jan(), &[10.0, 10.0, 20.0]);
        let b = series("B", jan(), &[10.0, 10.0, 10.0]);
        let settings = BacktestSettings {
            capital_mode: CapitalMode::Contribution {
                monthly_contribution: 100.0,
            },
            rules: concurrent(),
            ..BacktestSettings::default()
        };
        let results = run_backtest(&a, &b, &settings).expect("backtest");
        assert!((results.summary.rotation.contributed - 200.0).abs() < 1e-9);
        assert!((results.summary.benchmark.contributed - 200.0).abs() < 1e-9);
        assert!(results.summary.rotation.final_equity > 200.0);
    }

    #[test]
    fn only_overlapping_months_are_used() {
        let a = series("A", jan(), &[100.0, 101.0, 102.0, 103.0]);
        let b = series("B", Month::new(2024, 3).expect("month"), &[10.0, 11.0, 12.0]);
        let results = run_backtest(&a, &b, &BacktestSettings::default()).expect("backtest");
        assert_eq!(results.prices_a.len(), 2);
        assert_eq!(results.rows().len(), 1);
        assert_eq!(results.rows()[0].month.to_string(), "2024-04");
    }

    #[test]
    fn disjoint_histories_fail() {
        let a = series("A", jan(), &[100.0, 101.0]);
        let b = series("B", Month::new(2025, 1).expect("month"), &[10.0, 11.0]);
        let err = run_backtest(&a, &b, &BacktestSettings::default()).expect_err("disjoint");
        assert!(matches!(err, BacktestError::Alignment(_)));
    }

    #[test]
    fn months_missing_from_one_asset_are_not_bridged() {
        let a = series("A", jan(), &[100.0, 110.0, 120.0, 130.0]);
        let b = PriceSeries::new(
            "B",
            vec![
                PricePoint {
                    month: jan(),
                    price: 10.0,
                },
                PricePoint {
                    month: Month::new(2024, 4).expect("month"),
                    price: 20.0,
                },
            ],
        )
        .expect("series");
        let err = run_backtest(&a, &b, &BacktestSettings::default()).expect_err("gap");
        assert!(matches!(err, BacktestError::Alignment(_)));
    }

    #[test]
    fn a_single_shared_month_is_not_enough() {
        let a = series("A", jan(), &[100.0, 101.0]);
        let b = series("B", Month::new(2024, 2).expect("month"), &[10.0, 11.0]);
        let err = run_backtest(&a, &b, &BacktestSettings::default()).expect_err("short");
        assert!(matches!(err, BacktestError::InsufficientData { .. }));
    }
}

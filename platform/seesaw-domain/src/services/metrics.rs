use crate::value_objects::equity_point::{EquityCurve, EquityPoint, EquityRow};
use crate::value_objects::holding::Holding;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsConfig {
    /// Risk-free return per period (per month).
    pub risk_free_rate: f64,
    pub annualization_factor: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            annualization_factor: 12.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceStats {
    pub months: usize,
    pub final_equity: f64,
    pub contributed: f64,
    pub net_profit: f64,
    pub total_return: f64,
    pub cagr: f64,
    pub volatility: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub best_month: Option<f64>,
    pub worst_month: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub rotation: PerformanceStats,
    pub benchmark: PerformanceStats,
    pub excess_return: f64,
    pub months_in_a: usize,
    pub months_in_b: usize,
    pub months_in_cash: usize,
    pub switches: usize,
    pub months_outperformed: usize,
}

/// Running statistics over one equity curve.
///
/// Drawdown is measured on the time-weighted index built from
/// `period_return`, so periodic contributions do not read as gains.
#[derive(Debug)]
pub struct MetricsState {
    config: MetricsConfig,
    returns: Vec<f64>,
    index: f64,
    peak_index: f64,
    max_drawdown: f64,
    final_equity: f64,
    contributed: f64,
}

impl MetricsState {
    pub fn new(config: MetricsConfig, initial_capital: f64) -> Self {
        Self {
            config,
            returns: Vec::new(),
            index: 1.0,
            peak_index: 1.0,
            max_drawdown: 0.0,
            final_equity: initial_capital,
            contributed: initial_capital,
        }
    }

    pub fn record(&mut self, point: &EquityPoint) {
        self.index *= 1.0 + point.period_return;
        if self.index > self.peak_index {
            self.peak_index = self.index;
        } else if self.peak_index > 0.0 {
            let drawdown = ((self.peak_index - self.index) / self.peak_index).min(1.0);
            if drawdown > self.max_drawdown {
                self.max_drawdown = drawdown;
            }
        }
        self.returns.push(point.period_return);
        self.final_equity = point.equity;
        self.contributed = point.contributed;
    }

    pub fn summary(&self) -> PerformanceStats {
        let months = self.returns.len();
        let total_return = if self.contributed > 0.0 {
            self.final_equity / self.contributed - 1.0
        } else {
            0.0
        };

        PerformanceStats {
            months,
            final_equity: self.final_equity,
            contributed: self.contributed,
            net_profit: self.final_equity - self.contributed,
            total_return,
            cagr: self.cagr(),
            volatility: self.std_dev() * self.config.annualization_factor.sqrt(),
            sharpe: self.sharpe_ratio(),
            max_drawdown: self.max_drawdown,
            best_month: self.returns.iter().copied().reduce(f64::max),
            worst_month: self.returns.iter().copied().reduce(f64::min),
        }
    }

    fn cagr(&self) -> f64 {
        if self.returns.is_empty() {
            return 0.0;
        }
        if self.index <= 0.0 {
            return -1.0;
        }
        let years = self.returns.len() as f64 / self.config.annualization_factor;
        self.index.powf(1.0 / years) - 1.0
    }

    fn std_dev(&self) -> f64 {
        if self.returns.len() < 2 {
            return 0.0;
        }
        let mean = self.returns.iter().sum::<f64>() / self.returns.len() as f64;
        let var = self
            .returns
            .iter()
            .map(|ret| {
                let diff = ret - mean;
                diff * diff
            })
            .sum::<f64>()
            / (self.returns.len() as f64 - 1.0);
        var.sqrt()
    }

    fn sharpe_ratio(&self) -> f64 {
        if self.returns.len() < 2 {
            return 0.0;
        }
        let std = self.std_dev();
        if std == 0.0 || !std.is_finite() {
            return 0.0;
        }
        let excess_mean = self
            .returns
            .iter()
            .map(|ret| ret - self.config.risk_free_rate)
            .sum::<f64>()
            / self.returns.len() as f64;
        excess_mean / std * self.config.annualization_factor.sqrt()
    }
}

pub fn curve_stats(curve: &EquityCurve, config: MetricsConfig) -> PerformanceStats {
    let mut state = MetricsState::new(config, curve.initial_capital);
    for point in &curve.points {
        state.record(point);
    }
    state.summary()
}

pub fn compare(
    rotation: &EquityCurve,
    benchmark: &EquityCurve,
    holdings: &[Holding],
    config: MetricsConfig,
) -> ComparisonSummary {
    let rotation_stats = curve_stats(rotation, config);
    let benchmark_stats = curve_stats(benchmark, config);

    let count = |wanted: Holding| holdings.iter().filter(|h| **h == wanted).count();
    let switches = holdings.windows(2).filter(|pair| pair[0] != pair[1]).count();
    let months_outperformed = rotation
        .points
        .iter()
        .zip(&benchmark.points)
        .filter(|(r, b)| r.period_return > b.period_return)
        .count();

    ComparisonSummary {
        excess_return: rotation_stats.total_return - benchmark_stats.total_return,
        rotation: rotation_stats,
        benchmark: benchmark_stats,
        months_in_a: count(Holding::AssetA),
        months_in_b: count(Holding::AssetB),
        months_in_cash: count(Holding::Cash),
        switches,
        months_outperformed,
    }
}

/// Rebuilds the comparison from persisted `equity.csv` rows.
pub fn recompute_summary(rows: &[EquityRow], config: MetricsConfig) -> ComparisonSummary {
    let (rotation, benchmark) = curves_from_rows(rows);
    let holdings: Vec<Holding> = rows.iter().map(|row| row.holding).collect();
    compare(&rotation, &benchmark, &holdings, config)
}

pub fn curves_from_rows(rows: &[EquityRow]) -> (EquityCurve, EquityCurve) {
    let initial = rows.first().map(|row| row.contributed).unwrap_or(0.0);
    let mut rotation = EquityCurve::new("rotation", initial);
    let mut benchmark = EquityCurve::new("benchmark", initial);
    for row in rows {
        rotation.points.push(EquityPoint {
            month: row.month,
            equity: row.rotation_equity,
            contributed: row.contributed,
            period_return: row.rotation_return,
        });
        benchmark.points.push(EquityPoint {
            month: row.month,
            equity: row.benchmark_equity,
            contributed: row.contributed,
            period_return: row.benchmark_return,
        });
    }
    (rotation, benchmark)
}

#[cfg(test)]
mod tests {
    use super::{compare, curve_stats, MetricsConfig};
    use crate::value_objects::equity_point::{EquityCurve, EquityPoint};
    use crate::value_objects::holding::Holding;
    use crate::value_objects::month::Month;

    fn curve(initial: f64, returns: &[f64]) -> EquityCurve {
        let mut curve = EquityCurve::new("test", initial);
        let mut equity = initial;
        let mut month = Month::new(2024, 1).expect("month");
        for r in returns {
            equity *= 1.0 + r;
            curve.points.push(EquityPoint {
                month,
                equity,
                contributed: initial,
                period_return: *r,
            });
            month = month.next();
        }
        curve
    }

    #[test]
    fn computes_total_return_and_drawdown() {
        let stats = curve_stats(&curve(100.0, &[0.10, -0.20, 0.25]), MetricsConfig::default());
        assert_eq!(stats.months, 3);
        assert!((stats.final_equity - 110.0).abs() < 1e-9);
        assert!((stats.total_return - 0.10).abs() < 1e-9);
        assert!((stats.net_profit - 10.0).abs() < 1e-9);
        assert!((stats.max_drawdown - 0.20).abs() < 1e-9);
        assert_eq!(stats.best_month, Some(0.25));
        assert_eq!(stats.worst_month, Some(-0.20));
        assert!(stats.sharpe.is_finite());
    }

    #[test]
    fn twelve_months_cagr_equals_total_return() {
        let stats = curve_stats(&curve(1.0, &[0.01; 12]), MetricsConfig::default());
        assert!((stats.cagr - stats.total_return).abs() < 1e-12);
        assert_eq!(stats.sharpe, 0.0);
    }

    #[test]
    fn empty_curve_reports_initial_capital() {
        let stats = curve_stats(&EquityCurve::new("flat", 50.0), MetricsConfig::default());
        assert_eq!(stats.months, 0);
        assert_eq!(stats.final_equity, 50.0);
        assert_eq!(stats.total_return, 0.0);
        assert_eq!(stats.best_month, None);
    }

    #[test]
    fn comparison_counts_holdings_and_switches() {
        let rotation = curve(1.0, &[0.05, 0.02, 0.00, 0.03]);
        let benchmark = curve(1.0, &[0.01, 0.03, 0.00, 0.01]);
        let holdings = [Holding::AssetA, Holding::AssetB, Holding::Cash, Holding::Cash];
        let summary = compare(&rotation, &benchmark, &holdings, MetricsConfig::default());
        assert_eq!(summary.months_in_a, 1);
        assert_eq!(summary.months_in_b, 1);
        assert_eq!(summary.months_in_cash, 2);
        assert_eq!(summary.switches, 2);
        assert_eq!(summary.months_outperformed, 2);
        assert!(summary.excess_return > 0.0);
    }
}

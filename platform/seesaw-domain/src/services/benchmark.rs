use crate::errors::{BacktestError, Result};
use crate::services::alignment::ensure_aligned;
use crate::services::rotation::ensure_positive_capital;
use crate::value_objects::equity_point::{EquityCurve, EquityPoint};
use crate::value_objects::return_series::ReturnSeries;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BenchmarkKind {
    HoldA,
    HoldB,
    /// Static split bought once and never rebalanced.
    Blend { weight_a: f64 },
}

impl BenchmarkKind {
    pub fn equal_weight() -> Self {
        BenchmarkKind::Blend { weight_a: 0.5 }
    }

    pub fn weights(&self) -> (f64, f64) {
        match self {
            BenchmarkKind::HoldA => (1.0, 0.0),
            BenchmarkKind::HoldB => (0.0, 1.0),
            BenchmarkKind::Blend { weight_a } => (*weight_a, 1.0 - *weight_a),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let BenchmarkKind::Blend { weight_a } = self {
            if !weight_a.is_finite() || !(0.0..=1.0).contains(weight_a) {
                return Err(BacktestError::Config(format!(
                    "benchmark weight_a must be within [0, 1], got {weight_a}"
                )));
            }
        }
        Ok(())
    }

    pub fn label(&self) -> String {
        match self {
            BenchmarkKind::HoldA => "hold_a".to_string(),
            BenchmarkKind::HoldB => "hold_b".to_string(),
            BenchmarkKind::Blend { weight_a } => format!("blend_{weight_a:.2}"),
        }
    }
}

pub fn benchmark_equity_curve(
    a: &ReturnSeries,
    b: &ReturnSeries,
    kind: BenchmarkKind,
    initial_capital: f64,
) -> Result<EquityCurve> {
    ensure_aligned(a, b)?;
    kind.validate()?;
    ensure_positive_capital(initial_capital)?;

    let (weight_a, weight_b) = kind.weights();
    let mut sleeve_a = initial_capital * weight_a;
    let mut sleeve_b = initial_capital * weight_b;
    let mut previous = initial_capital;

    let mut curve = EquityCurve::new(kind.label(), initial_capital);
    for (ra, rb) in a.points.iter().zip(&b.points) {
        sleeve_a *= 1.0 + ra.value;
        sleeve_b *= 1.0 + rb.value;
        let equity = sleeve_a + sleeve_b;
        curve.points.push(EquityPoint {
            month: ra.month,
            equity,
            contributed: initial_capital,
            period_return: equity / previous - 1.0,
        });
        previous = equity;
    }
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::{benchmark_equity_curve, BenchmarkKind};
    use crate::value_objects::month::Month;
    use crate::value_objects::return_series::{ReturnPoint, ReturnSeries};

    fn returns(asset: &str, values: &[f64]) -> ReturnSeries {
        let mut month = Month::new(2024, 1).expect("month");
        let mut points = Vec::new();
        for value in values {
            points.push(ReturnPoint {
                month,
                value: *value,
            });
            month = month.next();
        }
        ReturnSeries {
            asset: asset.to_string(),
            points,
        }
    }

    #[test]
    fn hold_compounds_a_single_asset() {
        let a = returns("A", &[0.10, -0.10]);
        let b = returns("B", &[0.05, 0.05]);
        let curve = benchmark_equity_curve(&a, &b, BenchmarkKind::HoldA, 100.0).expect("curve");
        assert!((curve.final_equity() - 99.0).abs() < 1e-9);
        let curve = benchmark_equity_curve(&a, &b, BenchmarkKind::HoldB, 100.0).expect("curve");
        assert!((curve.final_equity() - 110.25).abs() < 1e-9);
    }

    #[test]
    fn blend_is_not_rebalanced() {
        let a = returns("A", &[1.0, 0.0]);
        let b = returns("B", &[0.0, 1.0]);
        let curve =
            benchmark_equity_curve(&a, &b, BenchmarkKind::equal_weight(), 100.0).expect("curve");
        // sleeves: A 50 -> 100 -> 100, B 50 -> 50 -> 100
        assert!((curve.points[0].equity - 150.0).abs() < 1e-9);
        assert!((curve.points[1].equity - 200.0).abs() < 1e-9);
        assert!((curve.points[1].period_return - (200.0 / 150.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn blend_weight_must_be_a_fraction() {
        let a = returns("A", &[0.1]);
        let b = returns("B", &[0.1]);
        let err = benchmark_equity_curve(&a, &b, BenchmarkKind::Blend { weight_a: 1.5 }, 1.0)
            .expect_err("weight");
        assert!(err.to_string().contains("weight_a"));
    }
}

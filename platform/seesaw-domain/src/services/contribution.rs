//! Periodic-investment accounting: a fixed amount is bought every month at
//! the month-end close and units accumulate, instead of compounding one lump
//! sum.

use crate::errors::{BacktestError, Result};
use crate::services::benchmark::BenchmarkKind;
use crate::services::rotation::ensure_positive_capital;
use crate::value_objects::equity_point::{EquityCurve, EquityPoint};
use crate::value_objects::holding::{AllocationDecision, Holding};
use crate::value_objects::month::Month;
use crate::value_objects::price_series::PriceSeries;

#[derive(Debug, Default)]
struct Book {
    units_a: f64,
    units_b: f64,
    cash: f64,
    contributed: f64,
}

impl Book {
    fn mark(&self, close_a: f64, close_b: f64) -> f64 {
        self.units_a * close_a + self.units_b * close_b + self.cash
    }
}

/// Closes of the months that carry a return (every month but the first).
fn return_month_closes(a: &PriceSeries, b: &PriceSeries) -> Result<Vec<(Month, f64, f64)>> {
    if a.len() != b.len() {
        return Err(BacktestError::Alignment(format!(
            "{} has {} prices but {} has {}",
            a.asset(),
            a.len(),
            b.asset(),
            b.len()
        )));
    }
    let mut out = Vec::with_capacity(a.len().saturating_sub(1));
    for (pa, pb) in a.points().iter().zip(b.points()).skip(1) {
        if pa.month != pb.month {
            return Err(BacktestError::Alignment(format!(
                "{} and {} disagree on month ({} vs {})",
                a.asset(),
                b.asset(),
                pa.month,
                pb.month
            )));
        }
        out.push((pa.month, pa.price, pb.price));
    }
    Ok(out)
}

fn accumulate<F>(
    label: String,
    closes: &[(Month, f64, f64)],
    contribution: f64,
    mut split: F,
) -> EquityCurve
where
    F: FnMut(usize) -> (f64, f64),
{
    let mut book = Book::default();
    let mut previous_equity = 0.0f64;
    let mut curve = EquityCurve::new(label, 0.0);

    for (idx, (month, close_a, close_b)) in closes.iter().copied().enumerate() {
        let before = book.mark(close_a, close_b);
        let period_return = if previous_equity > 0.0 {
            before / previous_equity - 1.0
        } else {
            0.0
        };

        let (weight_a, weight_b) = split(idx);
        book.units_a += contribution * weight_a / close_a;
        book.units_b += contribution * weight_b / close_b;
        book.cash += contribution * (1.0 - weight_a - weight_b);
        book.contributed += contribution;

        let equity = book.mark(close_a, close_b);
        curve.points.push(EquityPoint {
            month,
            equity,
            contributed: book.contributed,
            period_return,
        });
        previous_equity = equity;
    }
    curve
}

pub fn accumulate_rotation(
    prices_a: &PriceSeries,
    prices_b: &PriceSeries,
    decisions: &[AllocationDecision],
    contribution: f64,
) -> Result<EquityCurve> {
    ensure_positive_capital(contribution)?;
    let closes = return_month_closes(prices_a, prices_b)?;
    if closes.len() != decisions.len() {
        return Err(BacktestError::Alignment(format!(
            "{} allocation decisions for {} priced months",
            decisions.len(),
            closes.len()
        )));
    }
    if let Some((decision, (month, _, _))) = decisions
        .iter()
        .zip(&closes)
        .find(|(decision, (month, _, _))| decision.month != *month)
    {
        return Err(BacktestError::Alignment(format!(
            "decision for {} applied to prices of {}",
            decision.month, month
        )));
    }

    Ok(accumulate("rotation".to_string(), &closes, contribution, |idx| {
        match decisions[idx].holding {
            Holding::AssetA => (1.0, 0.0),
            Holding::AssetB => (0.0, 1.0),
            Holding::Cash => (0.0, 0.0),
        }
    }))
}

pub fn accumulate_benchmark(
    prices_a: &PriceSeries,
    prices_b: &PriceSeries,
    kind: BenchmarkKind,
    contribution: f64,
) -> Result<EquityCurve> {
    ensure_positive_capital(contribution)?;
    kind.validate()?;
    let closes = return_month_closes(prices_a, prices_b)?;
    let weights = kind.weights();
    Ok(accumulate(kind.label(), &closes, contribution, |_| weights))
}

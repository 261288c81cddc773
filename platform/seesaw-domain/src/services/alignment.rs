use crate::errors::{BacktestError, Result};
use crate::value_objects::price_series::{PricePoint, PriceSeries};
use crate::value_objects::return_series::ReturnSeries;
use std::collections::BTreeMap;

/// Inner join of two price series on month.
///
/// The joined months must be consecutive: a hole would turn the next
/// return into a multi-month return.
pub fn align(a: &PriceSeries, b: &PriceSeries) -> Result<(PriceSeries, PriceSeries)> {
    let b_by_month: BTreeMap<_, _> = b.points().iter().map(|p| (p.month, p.price)).collect();

    let mut left: Vec<PricePoint> = Vec::new();
    let mut right: Vec<PricePoint> = Vec::new();
    for point in a.points() {
        if let Some(price) = b_by_month.get(&point.month) {
            left.push(*point);
            right.push(PricePoint {
                month: point.month,
                price: *price,
            });
        }
    }

    if left.is_empty() {
        return Err(BacktestError::Alignment(format!(
            "no overlapping months between {} and {}",
            a.asset(),
            b.asset()
        )));
    }

    for pair in left.windows(2) {
        if pair[0].month.months_until(&pair[1].month) != 1 {
            return Err(BacktestError::Alignment(format!(
                "overlap of {} and {} has a gap between {} and {}",
                a.asset(),
                b.asset(),
                pair[0].month,
                pair[1].month
            )));
        }
    }

    Ok((
        PriceSeries::new(a.asset(), left)?,
        PriceSeries::new(b.asset(), right)?,
    ))
}

/// Fails unless both return series cover exactly the same months.
pub fn ensure_aligned(a: &ReturnSeries, b: &ReturnSeries) -> Result<()> {
    if a.len() != b.len() {
        return Err(BacktestError::Alignment(format!(
            "{} has {} monthly returns but {} has {}",
            a.asset,
            a.len(),
            b.asset,
            b.len()
        )));
    }
    for (idx, (pa, pb)) in a.points.iter().zip(&b.points).enumerate() {
        if pa.month != pb.month {
            return Err(BacktestError::Alignment(format!(
                "month mismatch at index {idx}: {} has {} but {} has {}",
                a.asset, pa.month, b.asset, pb.month
            )));
        }
    }
    Ok(())
}

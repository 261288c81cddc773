use crate::errors::{BacktestError, Result};
use crate::value_objects::price_series::PriceSeries;
use crate::value_objects::return_series::{ReturnPoint, ReturnSeries};

pub const MIN_OBSERVATIONS: usize = 2;

/// `return[i] = price[i] / price[i-1] - 1`, one value per consecutive pair.
pub fn compute_returns(series: &PriceSeries) -> Result<ReturnSeries> {
    if series.len() < MIN_OBSERVATIONS {
        return Err(BacktestError::InsufficientData {
            asset: series.asset().to_string(),
            required: MIN_OBSERVATIONS,
            actual: series.len(),
        });
    }

    let points = series
        .points()
        .windows(2)
        .map(|pair| ReturnPoint {
            month: pair[1].month,
            value: pair[1].price / pair[0].price - 1.0,
        })
        .collect();

    Ok(ReturnSeries {
        asset: series.asset().to_string(),
        points,
    })
}

use crate::errors::{BacktestError, Result};
use crate::value_objects::bar::MonthlyBar;
use crate::value_objects::month::Month;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub month: Month,
    pub price: f64,
}

/// Month-indexed prices of one asset.
///
/// Months are strictly increasing and every price is finite and positive.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    asset: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(asset: impl Into<String>, points: Vec<PricePoint>) -> Result<Self> {
        let asset = asset.into();
        for point in &points {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(BacktestError::InvalidData(format!(
                    "{asset}: price at {} must be finite and > 0, got {}",
                    point.month, point.price
                )));
            }
        }
        for pair in points.windows(2) {
            if pair[1].month <= pair[0].month {
                return Err(BacktestError::InvalidData(format!(
                    "{asset}: months must be strictly increasing ({} then {})",
                    pair[0].month, pair[1].month
                )));
            }
        }
        Ok(Self { asset, points })
    }

    pub fn from_monthly(asset: impl Into<String>, bars: &[MonthlyBar]) -> Result<Self> {
        let points = bars
            .iter()
            .map(|bar| PricePoint {
                month: bar.month,
                price: bar.close,
            })
            .collect();
        Self::new(asset, points)
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{PricePoint, PriceSeries};
    use crate::value_objects::month::Month;

    fn point(month: u32, price: f64) -> PricePoint {
        PricePoint {
            month: Month::new(2024, month).expect("month"),
            price,
        }
    }

    #[test]
    fn rejects_unordered_or_invalid_prices() {
        assert!(PriceSeries::new("A", vec![point(2, 1.0), point(1, 1.0)]).is_err());
        assert!(PriceSeries::new("A", vec![point(1, 1.0), point(1, 2.0)]).is_err());
        assert!(PriceSeries::new("A", vec![point(1, 0.0)]).is_err());
        assert!(PriceSeries::new("A", vec![point(1, f64::NAN)]).is_err());
    }
}

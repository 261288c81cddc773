use crate::errors::Result;
use crate::services::prices::DataQualityReport;
use crate::value_objects::bar::DailyBar;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuery {
    pub asset: String,
    pub path: PathBuf,
}

pub trait PriceDataRepository {
    /// Returns date-sorted, de-duplicated daily bars plus what was dropped.
    fn load_daily_prices(&self, query: &PriceQuery) -> Result<(Vec<DailyBar>, DataQualityReport)>;
}

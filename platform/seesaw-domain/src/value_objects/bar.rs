use crate::value_objects::month::Month;
use chrono::NaiveDate;

/// One row of a daily price export.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBar {
    pub month: Month,
    pub open: f64,
    pub close: f64,
    /// True when the month had no rows and was carried forward.
    pub filled: bool,
}

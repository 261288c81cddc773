use crate::errors::{BacktestError, Result};
use crate::value_objects::bar::{DailyBar, MonthlyBar};
use crate::value_objects::month::Month;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DataQualityReport {
    pub rows_read: usize,
    pub duplicates: usize,
    pub out_of_order: usize,
    pub invalid_close: usize,
    pub invalid_date: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub first_duplicate: Option<NaiveDate>,
    pub first_out_of_order: Option<NaiveDate>,
}

impl DataQualityReport {
    pub fn invalid_rows(&self) -> usize {
        self.invalid_close + self.invalid_date
    }

    pub fn has_issues(&self) -> bool {
        self.duplicates > 0 || self.out_of_order > 0 || self.invalid_rows() > 0
    }
}

/// How a calendar month without any rows is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Carry the previous close forward (the month earns 0).
    #[default]
    ForwardFill,
    Error,
}

/// Collapses date-sorted daily bars into calendar months: first open, last close.
pub fn resample_monthly(
    asset: &str,
    bars: &[DailyBar],
    gap_policy: GapPolicy,
) -> Result<Vec<MonthlyBar>> {
    let mut output: Vec<MonthlyBar> = Vec::new();
    let mut last_date: Option<NaiveDate> = None;

    for bar in bars {
        if let Some(prev) = last_date {
            if bar.date < prev {
                return Err(BacktestError::InvalidData(format!(
                    "{asset}: daily bars must be sorted by date ({prev} then {})",
                    bar.date
                )));
            }
        }
        last_date = Some(bar.date);

        let month = Month::from_date(bar.date);
        if let Some(current) = output.last_mut() {
            if current.month == month {
                current.close = bar.close;
                continue;
            }
        }

        if let Some((prev_month, carried)) = output.last().map(|b| (b.month, b.close)) {
            let mut missing = prev_month.next();
            while missing < month {
                if gap_policy == GapPolicy::Error {
                    return Err(BacktestError::MonthGap {
                        asset: asset.to_string(),
                        month: missing,
                    });
                }
                output.push(MonthlyBar {
                    month: missing,
                    open: carried,
                    close: carried,
                    filled: true,
                });
                missing = missing.next();
            }
        }

        output.push(MonthlyBar {
            month,
            open: bar
                .open
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(bar.close),
            close: bar.close,
            filled: false,
        });
    }

    Ok(output)
}

pub fn filled_months(bars: &[MonthlyBar]) -> usize {
    bars.iter().filter(|bar| bar.filled).count()
}

use crate::value_objects::holding::Holding;
use crate::value_objects::month::Month;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub month: Month,
    pub equity: f64,
    /// Capital paid in up to and including this month.
    pub contributed: f64,
    /// Time-weighted return earned during this month.
    pub period_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityCurve {
    pub label: String,
    pub initial_capital: f64,
    pub points: Vec<EquityPoint>,
}

impl EquityCurve {
    pub fn new(label: impl Into<String>, initial_capital: f64) -> Self {
        Self {
            label: label.into(),
            initial_capital,
            points: Vec::new(),
        }
    }

    pub fn final_equity(&self) -> f64 {
        self.points
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_capital)
    }

    pub fn contributed(&self) -> f64 {
        self.points
            .last()
            .map(|p| p.contributed)
            .unwrap_or(self.initial_capital)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One month of a finished run: the decision plus both curves side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityRow {
    pub month: Month,
    pub holding: Holding,
    pub signal_a: Option<f64>,
    pub signal_b: Option<f64>,
    pub return_a: f64,
    pub return_b: f64,
    pub rotation_return: f64,
    pub rotation_equity: f64,
    pub benchmark_return: f64,
    pub benchmark_equity: f64,
    pub contributed: f64,
}

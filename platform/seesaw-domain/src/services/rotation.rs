use crate::errors::{BacktestError, Result};
use crate::services::alignment::ensure_aligned;
use crate::value_objects::equity_point::{EquityCurve, EquityPoint};
use crate::value_objects::holding::{AllocationDecision, Holding};
use crate::value_objects::return_series::ReturnSeries;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    /// Hold the asset with the strictly higher return.
    #[default]
    Momentum,
    /// Hold the asset with the strictly lower return.
    Contrarian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalTiming {
    /// Month i is allocated from month i-1's returns.
    #[default]
    Lagged,
    /// Month i is allocated from its own returns (look-ahead when compounding).
    Concurrent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    #[default]
    PreferA,
    PreferB,
    Cash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RotationRules {
    pub selection: SelectionRule,
    pub signal: SignalTiming,
    pub tie_break: TieBreak,
}

impl RotationRules {
    pub fn choose(&self, signal_a: f64, signal_b: f64) -> Holding {
        let (a_wins, b_wins) = match self.selection {
            SelectionRule::Momentum => (signal_a > signal_b, signal_b > signal_a),
            SelectionRule::Contrarian => (signal_a < signal_b, signal_b < signal_a),
        };
        if a_wins {
            Holding::AssetA
        } else if b_wins {
            Holding::AssetB
        } else {
            self.tie_holding()
        }
    }

    /// Holding used on ties and for the lagged warm-up month.
    pub fn tie_holding(&self) -> Holding {
        match self.tie_break {
            TieBreak::PreferA => Holding::AssetA,
            TieBreak::PreferB => Holding::AssetB,
            TieBreak::Cash => Holding::Cash,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotationOutcome {
    pub decisions: Vec<AllocationDecision>,
    pub curve: EquityCurve,
}

pub fn select_holdings(
    a: &ReturnSeries,
    b: &ReturnSeries,
    rules: &RotationRules,
) -> Result<Vec<AllocationDecision>> {
    ensure_aligned(a, b)?;

    let mut decisions = Vec::with_capacity(a.len());
    for (idx, point) in a.points.iter().enumerate() {
        let signal = match rules.signal {
            SignalTiming::Concurrent => Some((a.points[idx].value, b.points[idx].value)),
            SignalTiming::Lagged => idx
                .checked_sub(1)
                .map(|prev| (a.points[prev].value, b.points[prev].value)),
        };
        let holding = match signal {
            Some((signal_a, signal_b)) => rules.choose(signal_a, signal_b),
            None => rules.tie_holding(),
        };
        decisions.push(AllocationDecision {
            month: point.month,
            holding,
            signal_a: signal.map(|(sa, _)| sa),
            signal_b: signal.map(|(_, sb)| sb),
        });
    }
    Ok(decisions)
}

pub fn holding_return(holding: Holding, return_a: f64, return_b: f64) -> f64 {
    match holding {
        Holding::AssetA => return_a,
        Holding::AssetB => return_b,
        Holding::Cash => 0.0,
    }
}

/// Compounds `initial_capital` through the held asset's return each month.
pub fn compound_rotation(
    label: &str,
    a: &ReturnSeries,
    b: &ReturnSeries,
    decisions: &[AllocationDecision],
    initial_capital: f64,
) -> Result<EquityCurve> {
    ensure_aligned(a, b)?;
    if decisions.len() != a.len() {
        return Err(BacktestError::Alignment(format!(
            "{} allocation decisions for {} months of returns",
            decisions.len(),
            a.len()
        )));
    }
    ensure_positive_capital(initial_capital)?;

    let mut curve = EquityCurve::new(label, initial_capital);
    let mut capital = initial_capital;
    for ((decision, ra), rb) in decisions.iter().zip(&a.points).zip(&b.points) {
        if decision.month != ra.month {
            return Err(BacktestError::Alignment(format!(
                "decision for {} applied to returns of {}",
                decision.month, ra.month
            )));
        }
        let period_return = holding_return(decision.holding, ra.value, rb.value);
        capital *= 1.0 + period_return;
        curve.points.push(EquityPoint {
            month: ra.month,
            equity: capital,
            contributed: initial_capital,
            period_return,
        });
    }
    Ok(curve)
}

pub fn run_rotation(
    a: &ReturnSeries,
    b: &ReturnSeries,
    rules: &RotationRules,
    initial_capital: f64,
) -> Result<RotationOutcome> {
    let decisions = select_holdings(a, b, rules)?;
    let curve = compound_rotation("rotation", a, b, &decisions, initial_capital)?;
    Ok(RotationOutcome { decisions, curve })
}

pub(crate) fn ensure_positive_capital(value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(BacktestError::InvalidData(format!(
            "capital must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

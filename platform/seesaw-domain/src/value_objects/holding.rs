use crate::value_objects::month::Month;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Holding {
    AssetA,
    AssetB,
    Cash,
}

impl Holding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Holding::AssetA => "A",
            Holding::AssetB => "B",
            Holding::Cash => "CASH",
        }
    }
}

impl fmt::Display for Holding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Holding {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "A" => Ok(Holding::AssetA),
            "B" => Ok(Holding::AssetB),
            "CASH" => Ok(Holding::Cash),
            other => Err(format!("invalid holding '{other}'")),
        }
    }
}

/// What the selector held during `month` and the returns it compared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationDecision {
    pub month: Month,
    pub holding: Holding,
    pub signal_a: Option<f64>,
    pub signal_b: Option<f64>,
}

use seesaw_domain::errors::{BacktestError, Result};
use seesaw_domain::services::prices::GapPolicy;
use seesaw_domain::services::rotation::{SelectionRule, SignalTiming, TieBreak};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CapitalModeKind {
    #[default]
    Compound,
    Contribution,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkKindConfig {
    HoldA,
    HoldB,
    #[default]
    Blend,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub run: RunConfig,
    pub assets: AssetsConfig,
    pub capital: Option<CapitalConfig>,
    pub strategy: StrategyConfig,
    pub benchmark: BenchmarkConfig,
    pub data: Option<DataConfig>,
    pub metrics: Option<MetricsConfig>,
    pub paths: PathsConfig,
    pub report: Option<ReportConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub run_id: String,
    pub initial_capital: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AssetsConfig {
    pub a: AssetConfig,
    pub b: AssetConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AssetConfig {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct CapitalConfig {
    #[serde(default)]
    pub mode: CapitalModeKind,
    pub monthly_contribution: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct StrategyConfig {
    #[serde(default)]
    pub selection: SelectionRule,
    #[serde(default)]
    pub signal: SignalTiming,
    #[serde(default)]
    pub tie_break: TieBreak,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct BenchmarkConfig {
    #[serde(default)]
    pub kind: BenchmarkKindConfig,
    pub weight_a: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    #[serde(default)]
    pub gap_policy: GapPolicy,
    pub max_duplicates: Option<usize>,
    pub max_out_of_order: Option<usize>,
    pub max_invalid_rows: Option<usize>,
    pub max_filled_months: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    pub risk_free_rate: Option<f64>,
    pub annualization_factor: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    pub out_dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    pub html: Option<bool>,
}

impl Config {
    pub fn gap_policy(&self) -> GapPolicy {
        self.data
            .as_ref()
            .map(|data| data.gap_policy)
            .unwrap_or_default()
    }

    pub fn html_enabled(&self) -> bool {
        self.report
            .as_ref()
            .and_then(|report| report.html)
            .unwrap_or(false)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let (config, _source) = load_config_with_source(path)?;
    Ok(config)
}

pub fn load_config_with_source(path: &Path) -> Result<(Config, String)> {
    let contents = fs::read_to_string(path).map_err(|err| {
        BacktestError::Io(format!("failed to read config {}: {}", path.display(), err))
    })?;
    let config = parse_config(&contents).map_err(|err| {
        BacktestError::Config(format!("failed to parse TOML {}: {}", path.display(), err))
    })?;
    Ok((config, contents))
}

pub fn parse_config(raw: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(raw)
}

pub fn to_toml_pretty(config: &Config) -> Result<String> {
    toml::to_string_pretty(config)
        .map_err(|err| BacktestError::Config(format!("failed to serialize config as TOML: {err}")))
}

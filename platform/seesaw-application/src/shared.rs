use crate::config::{AssetConfig, BenchmarkKindConfig, CapitalModeKind, Config};
use crate::meta::{engine_version, ENGINE_NAME};
use seesaw_domain::errors::{BacktestError, Result};
use seesaw_domain::repositories::price_data::{PriceDataRepository, PriceQuery};
use seesaw_domain::services::audit::AuditEvent;
use seesaw_domain::services::benchmark::BenchmarkKind;
use seesaw_domain::services::engine::{BacktestSettings, CapitalMode};
use seesaw_domain::services::metrics::{ComparisonSummary, MetricsConfig};
use seesaw_domain::services::prices::{filled_months, resample_monthly, DataQualityReport};
use seesaw_domain::services::rotation::RotationRules;
use seesaw_domain::value_objects::equity_point::EquityRow;
use seesaw_domain::value_objects::price_series::PriceSeries;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::time::Instant;

pub struct LoadedAsset {
    pub name: String,
    pub series: PriceSeries,
    pub report: DataQualityReport,
    /// Open of the first resampled month, before any overlap trimming.
    pub first_open: Option<f64>,
    pub filled_months: usize,
    pub load_ms: u64,
}

/// Loads one asset's daily rows and collapses them into a monthly close series.
pub fn load_monthly_series(
    config: &Config,
    asset: &AssetConfig,
    prices: &dyn PriceDataRepository,
) -> Result<LoadedAsset> {
    let stage_start = Instant::now();
    let (daily, report) = prices.load_daily_prices(&PriceQuery {
        asset: asset.name.clone(),
        path: PathBuf::from(&asset.path),
    })?;
    let monthly = resample_monthly(&asset.name, &daily, config.gap_policy())?;
    let series = PriceSeries::from_monthly(asset.name.clone(), &monthly)?;
    Ok(LoadedAsset {
        name: asset.name.clone(),
        series,
        report,
        first_open: monthly.first().map(|bar| bar.open),
        filled_months: filled_months(&monthly),
        load_ms: stage_start.elapsed().as_millis() as u64,
    })
}

pub fn data_quality_json(loaded: &LoadedAsset) -> serde_json::Value {
    let report = &loaded.report;
    serde_json::json!({
        "asset": loaded.name,
        "rows_read": report.rows_read,
        "duplicates": report.duplicates,
        "out_of_order": report.out_of_order,
        "invalid_close": report.invalid_close,
        "invalid_date": report.invalid_date,
        "first_date": report.first_date.map(|d| d.to_string()),
        "last_date": report.last_date.map(|d| d.to_string()),
        "first_duplicate": report.first_duplicate.map(|d| d.to_string()),
        "first_out_of_order": report.first_out_of_order.map(|d| d.to_string()),
        "months": loaded.series.len(),
        "first_month": loaded.series.points().first().map(|p| p.month.to_string()),
        "first_open": loaded.first_open,
        "filled_months": loaded.filled_months,
    })
}

pub fn build_metrics_config(config: &Config) -> Result<MetricsConfig> {
    let defaults = MetricsConfig::default();
    let risk_free_rate = config
        .metrics
        .as_ref()
        .and_then(|metrics| metrics.risk_free_rate)
        .unwrap_or(defaults.risk_free_rate);
    let annualization_factor = config
        .metrics
        .as_ref()
        .and_then(|metrics| metrics.annualization_factor)
        .unwrap_or(defaults.annualization_factor);

    if !risk_free_rate.is_finite() {
        return Err(BacktestError::Config(
            "metrics.risk_free_rate must be finite".to_string(),
        ));
    }
    if !annualization_factor.is_finite() || annualization_factor <= 0.0 {
        return Err(BacktestError::Config(
            "metrics.annualization_factor must be finite and > 0".to_string(),
        ));
    }
    Ok(MetricsConfig {
        risk_free_rate,
        annualization_factor,
    })
}

pub fn resolve_benchmark(config: &Config) -> Result<BenchmarkKind> {
    let kind = match config.benchmark.kind {
        BenchmarkKindConfig::HoldA => BenchmarkKind::HoldA,
        BenchmarkKindConfig::HoldB => BenchmarkKind::HoldB,
        BenchmarkKindConfig::Blend => BenchmarkKind::Blend {
            weight_a: config.benchmark.weight_a.unwrap_or(0.5),
        },
    };
    kind.validate()?;
    Ok(kind)
}

pub fn resolve_capital_mode(config: &Config) -> Result<CapitalMode> {
    let Some(capital) = config.capital.as_ref() else {
        return Ok(CapitalMode::Compound);
    };
    match capital.mode {
        CapitalModeKind::Compound => Ok(CapitalMode::Compound),
        CapitalModeKind::Contribution => {
            let monthly_contribution = capital.monthly_contribution.ok_or_else(|| {
                BacktestError::Config(
                    "capital.monthly_contribution is required when capital.mode = contribution"
                        .to_string(),
                )
            })?;
            if !monthly_contribution.is_finite() || monthly_contribution <= 0.0 {
                return Err(BacktestError::Config(
                    "capital.monthly_contribution must be finite and > 0".to_string(),
                ));
            }
            Ok(CapitalMode::Contribution {
                monthly_contribution,
            })
        }
    }
}

pub fn build_settings(config: &Config) -> Result<BacktestSettings> {
    let capital_mode = resolve_capital_mode(config)?;
    let initial_capital = config.run.initial_capital;
    if capital_mode == CapitalMode::Compound
        && (!initial_capital.is_finite() || initial_capital <= 0.0)
    {
        return Err(BacktestError::Config(
            "run.initial_capital must be finite and > 0".to_string(),
        ));
    }
    if config.assets.a.name.trim().is_empty() || config.assets.b.name.trim().is_empty() {
        return Err(BacktestError::Config(
            "assets.a.name and assets.b.name must not be empty".to_string(),
        ));
    }

    Ok(BacktestSettings {
        initial_capital,
        capital_mode,
        rules: RotationRules {
            selection: config.strategy.selection,
            signal: config.strategy.signal,
            tie_break: config.strategy.tie_break,
        },
        benchmark: resolve_benchmark(config)?,
        metrics: build_metrics_config(config)?,
    })
}

pub fn config_hash(config_toml: &str) -> String {
    let digest = Sha256::digest(config_toml.as_bytes());
    digest
        .iter()
        .take(8)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

pub fn summary_meta_json_from_rows(
    config: &Config,
    config_toml: Option<&str>,
    rows: &[EquityRow],
) -> Option<serde_json::Value> {
    let start = rows.first()?.month;
    let end = rows.last()?.month;
    Some(serde_json::json!({
        "engine": ENGINE_NAME,
        "engine_version": engine_version(),
        "run_id": config.run.run_id,
        "asset_a": config.assets.a.name,
        "asset_b": config.assets.b.name,
        "start": start.to_string(),
        "end": end.to_string(),
        "months": rows.len(),
        "config_hash": config_toml.map(config_hash),
    }))
}

pub fn config_snapshot_json(config: &Config, settings: &BacktestSettings) -> serde_json::Value {
    let (mode, monthly_contribution) = match settings.capital_mode {
        CapitalMode::Compound => ("compound", None),
        CapitalMode::Contribution {
            monthly_contribution,
        } => ("contribution", Some(monthly_contribution)),
    };
    let (weight_a, weight_b) = settings.benchmark.weights();
    serde_json::json!({
        "assets": {
            "a": { "name": config.assets.a.name, "path": config.assets.a.path },
            "b": { "name": config.assets.b.name, "path": config.assets.b.path },
        },
        "capital": {
            "mode": mode,
            "initial_capital": settings.initial_capital,
            "monthly_contribution": monthly_contribution,
        },
        "strategy": {
            "selection": settings.rules.selection,
            "signal": settings.rules.signal,
            "tie_break": settings.rules.tie_break,
        },
        "benchmark": {
            "kind": settings.benchmark.label(),
            "weight_a": weight_a,
            "weight_b": weight_b,
        },
        "data": {
            "gap_policy": config.gap_policy(),
        },
        "metrics": {
            "risk_free_rate": settings.metrics.risk_free_rate,
            "annualization_factor": settings.metrics.annualization_factor,
        },
    })
}

pub fn summary_event(
    run_id: &str,
    month: Option<String>,
    summary: &ComparisonSummary,
    meta: Option<&serde_json::Value>,
) -> AuditEvent {
    AuditEvent {
        run_id: run_id.to_string(),
        month,
        stage: "summary".to_string(),
        asset: None,
        action: "complete".to_string(),
        error: None,
        details: serde_json::json!({
            "meta": meta,
            "rotation_final_equity": summary.rotation.final_equity,
            "benchmark_final_equity": summary.benchmark.final_equity,
            "rotation_total_return": summary.rotation.total_return,
            "benchmark_total_return": summary.benchmark.total_return,
            "excess_return": summary.excess_return,
            "switches": summary.switches,
        }),
    }
}

pub fn allocation_events(run_id: &str, rows: &[EquityRow]) -> Vec<AuditEvent> {
    rows.iter()
        .map(|row| AuditEvent {
            run_id: run_id.to_string(),
            month: Some(row.month.to_string()),
            stage: "allocation".to_string(),
            asset: Some(row.holding.to_string()),
            action: "hold".to_string(),
            error: None,
            details: serde_json::json!({
                "signal_a": row.signal_a,
                "signal_b": row.signal_b,
                "rotation_return": row.rotation_return,
                "rotation_equity": row.rotation_equity,
                "benchmark_equity": row.benchmark_equity,
            }),
        })
        .collect()
}

pub fn timing_event(
    run_id: &str,
    asset: Option<&str>,
    action: &str,
    duration_ms: u64,
    details: serde_json::Value,
) -> AuditEvent {
    AuditEvent {
        run_id: run_id.to_string(),
        month: None,
        stage: "timing".to_string(),
        asset: asset.map(|s| s.to_string()),
        action: action.to_string(),
        error: None,
        details: serde_json::json!({
            "duration_ms": duration_ms,
            "details": details,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{build_settings, config_hash, resolve_benchmark};
    use crate::config::{parse_config, Config};
    use seesaw_domain::errors::BacktestError;
    use seesaw_domain::services::benchmark::BenchmarkKind;
    use seesaw_domain::services::engine::CapitalMode;

    fn config_with(extra: &str, initial_capital: f64) -> Config {
        let toml_str = format!(
            r#"
[run]
run_id = "test_run"
initial_capital = {initial_capital:?}

[assets.a]
name = "A"
path = "a.csv"

[assets.b]
name = "B"
path = "b.csv"

[strategy]

[paths]
out_dir = "runs/"

{extra}
"#
        );
        parse_config(&toml_str).expect("config should parse")
    }

    #[test]
    fn compound_requires_positive_initial_capital() {
        let err = build_settings(&config_with("[benchmark]", 0.0)).expect_err("capital");
        assert!(matches!(err, BacktestError::Config(_)));
    }

    #[test]
    fn contribution_mode_needs_an_amount() {
        let cfg = config_with("[benchmark]\n\n[capital]\nmode = \"contribution\"", 0.0);
        assert!(build_settings(&cfg).is_err());

        let cfg = config_with(
            "[benchmark]\n\n[capital]\nmode = \"contribution\"\nmonthly_contribution = 500.0",
            0.0,
        );
        let settings = build_settings(&cfg).expect("settings");
        assert_eq!(
            settings.capital_mode,
            CapitalMode::Contribution {
                monthly_contribution: 500.0
            }
        );
    }

    #[test]
    fn blend_weight_is_checked() {
        let cfg = config_with("[benchmark]\nkind = \"blend\"\nweight_a = 1.2", 100.0);
        assert!(resolve_benchmark(&cfg).is_err());
        let cfg = config_with("[benchmark]\nkind = \"hold_a\"", 100.0);
        assert_eq!(resolve_benchmark(&cfg).expect("kind"), BenchmarkKind::HoldA);
    }

    #[test]
    fn annualization_must_be_positive() {
        let cfg = config_with("[benchmark]\n\n[metrics]\nannualization_factor = 0.0", 100.0);
        assert!(build_settings(&cfg).is_err());
    }

    #[test]
    fn config_hash_is_short_and_stable() {
        let first = config_hash("a = 1");
        assert_eq!(first.len(), 16);
        assert_eq!(first, config_hash("a = 1"));
        assert_ne!(first, config_hash("a = 2"));
    }
}

use crate::config::Config;
use crate::shared::{data_quality_json, load_monthly_series, LoadedAsset};
use seesaw_domain::errors::{BacktestError, Result};
use seesaw_domain::repositories::price_data::PriceDataRepository;
use seesaw_domain::services::alignment::align;
use std::time::Instant;
use tracing::{info, info_span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLimits {
    pub max_duplicates: usize,
    pub max_out_of_order: usize,
    pub max_invalid_rows: usize,
    pub max_filled_months: usize,
}

impl DataLimits {
    pub fn from_config(config: &Config) -> Self {
        let data = config.data.as_ref();
        Self {
            max_duplicates: data.and_then(|d| d.max_duplicates).unwrap_or(0),
            max_out_of_order: data.and_then(|d| d.max_out_of_order).unwrap_or(0),
            max_invalid_rows: data.and_then(|d| d.max_invalid_rows).unwrap_or(0),
            max_filled_months: data.and_then(|d| d.max_filled_months).unwrap_or(0),
        }
    }

    fn violations(&self, asset: &LoadedAsset) -> Vec<String> {
        let mut out = Vec::new();
        let checks = [
            ("duplicates", asset.report.duplicates, self.max_duplicates),
            ("out_of_order", asset.report.out_of_order, self.max_out_of_order),
            ("invalid_rows", asset.report.invalid_rows(), self.max_invalid_rows),
            ("filled_months", asset.filled_months, self.max_filled_months),
        ];
        for (name, actual, limit) in checks {
            if actual > limit {
                out.push(format!("{}: {name} {actual} > {limit}", asset.name));
            }
        }
        out
    }
}

pub fn validate(
    config: &Config,
    strict: bool,
    prices: &dyn PriceDataRepository,
) -> Result<serde_json::Value> {
    let _span = info_span!(
        "validate",
        strict = strict,
        run_id = %config.run.run_id,
        asset_a = %config.assets.a.name,
        asset_b = %config.assets.b.name
    )
    .entered();

    let stage_start = Instant::now();
    let asset_a = load_monthly_series(config, &config.assets.a, prices)?;
    let asset_b = load_monthly_series(config, &config.assets.b, prices)?;
    metrics::histogram!("seesaw.validate.load_prices_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    let (aligned_a, _aligned_b) = align(&asset_a.series, &asset_b.series)?;
    let overlap_start = aligned_a.points().first().map(|p| p.month.to_string());
    let overlap_end = aligned_a.points().last().map(|p| p.month.to_string());

    let limits = DataLimits::from_config(config);
    let mut violations = limits.violations(&asset_a);
    violations.extend(limits.violations(&asset_b));
    if strict && !violations.is_empty() {
        return Err(BacktestError::InvalidData(format!(
            "strict validation failed: data quality limits exceeded ({})",
            violations.join(", ")
        )));
    }

    for asset in [&asset_a, &asset_b] {
        metrics::gauge!("seesaw.validate.duplicates", "asset" => asset.name.clone())
            .set(asset.report.duplicates as f64);
        metrics::gauge!("seesaw.validate.out_of_order", "asset" => asset.name.clone())
            .set(asset.report.out_of_order as f64);
        metrics::gauge!("seesaw.validate.invalid_rows", "asset" => asset.name.clone())
            .set(asset.report.invalid_rows() as f64);
        metrics::gauge!("seesaw.validate.filled_months", "asset" => asset.name.clone())
            .set(asset.filled_months as f64);
    }
    info!(
        overlap_months = aligned_a.len(),
        violations = violations.len(),
        "validation complete"
    );

    Ok(serde_json::json!({
        "assets": {
            "a": data_quality_json(&asset_a),
            "b": data_quality_json(&asset_b),
        },
        "overlap": {
            "months": aligned_a.len(),
            "start": overlap_start,
            "end": overlap_end,
        },
        "gap_policy": config.gap_policy(),
        "limits": {
            "max_duplicates": limits.max_duplicates,
            "max_out_of_order": limits.max_out_of_order,
            "max_invalid_rows": limits.max_invalid_rows,
            "max_filled_months": limits.max_filled_months,
        },
        "violations": violations,
        "strict": strict
    }))
}

use crate::config::{to_toml_pretty, AssetConfig, Config};
use crate::shared::{
    allocation_events, build_settings, config_snapshot_json, load_monthly_series,
    summary_event, summary_meta_json_from_rows, timing_event, LoadedAsset,
};
use seesaw_domain::errors::Result;
use seesaw_domain::repositories::artifacts::ArtifactWriter;
use seesaw_domain::repositories::price_data::PriceDataRepository;
use seesaw_domain::services::audit::AuditEvent;
use seesaw_domain::services::engine::{self, BacktestResults, BacktestSettings};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, info_span, warn};

pub struct BacktestRun {
    pub run_dir: PathBuf,
    pub results: BacktestResults,
}

pub fn run_backtest(
    config: &Config,
    config_toml: &str,
    out: Option<PathBuf>,
    prices: &dyn PriceDataRepository,
    artifacts: &dyn ArtifactWriter,
) -> Result<BacktestRun> {
    let _span = info_span!(
        "run_backtest",
        run_id = %config.run.run_id,
        asset_a = %config.assets.a.name,
        asset_b = %config.assets.b.name
    )
    .entered();

    let settings = build_settings(config)?;
    let mut audit_extras: Vec<AuditEvent> = Vec::new();

    let asset_a = load_asset(config, &config.assets.a, prices, &mut audit_extras)?;
    let asset_b = load_asset(config, &config.assets.b, prices, &mut audit_extras)?;

    let stage_start = Instant::now();
    let results = engine::run_backtest(&asset_a.series, &asset_b.series, &settings)?;
    let engine_ms = stage_start.elapsed().as_millis() as u64;
    metrics::histogram!("seesaw.backtest.engine_ms").record(engine_ms as f64);
    metrics::gauge!("seesaw.backtest.months").set(results.rows().len() as f64);
    metrics::gauge!("seesaw.backtest.switches").set(results.summary.switches as f64);
    audit_extras.push(timing_event(
        &config.run.run_id,
        None,
        "run_engine",
        engine_ms,
        serde_json::json!({
            "aligned_months": results.prices_a.len(),
            "selection": settings.rules.selection,
            "signal": settings.rules.signal,
            "tie_break": settings.rules.tie_break,
        }),
    ));

    info!(
        months = results.rotation.len(),
        rotation_final = results.summary.rotation.final_equity,
        benchmark_final = results.summary.benchmark.final_equity,
        "backtest complete"
    );

    let run_dir = write_outputs(
        config,
        config_toml,
        out,
        &results,
        &settings,
        artifacts,
        audit_extras,
    )?;
    Ok(BacktestRun { run_dir, results })
}

fn load_asset(
    config: &Config,
    asset: &AssetConfig,
    prices: &dyn PriceDataRepository,
    audit: &mut Vec<AuditEvent>,
) -> Result<LoadedAsset> {
    let loaded = load_monthly_series(config, asset, prices)?;
    metrics::histogram!("seesaw.backtest.load_prices_ms").record(loaded.load_ms as f64);
    warn_on_data_issues(&loaded);
    audit.push(timing_event(
        &config.run.run_id,
        Some(&loaded.name),
        "load_prices",
        loaded.load_ms,
        serde_json::json!({
            "rows": loaded.report.rows_read,
            "months": loaded.series.len(),
            "duplicates": loaded.report.duplicates,
            "out_of_order": loaded.report.out_of_order,
            "invalid_close": loaded.report.invalid_close,
            "invalid_date": loaded.report.invalid_date,
            "filled_months": loaded.filled_months,
        }),
    ));
    Ok(loaded)
}

fn warn_on_data_issues(asset: &LoadedAsset) {
    if asset.report.has_issues() {
        warn!(
            asset = %asset.name,
            duplicates = asset.report.duplicates,
            out_of_order = asset.report.out_of_order,
            invalid_rows = asset.report.invalid_rows(),
            "price file needed cleaning"
        );
    }
    if asset.filled_months > 0 {
        warn!(
            asset = %asset.name,
            filled_months = asset.filled_months,
            "forward-filled months with no price rows"
        );
    }
}

fn write_outputs(
    config: &Config,
    config_toml: &str,
    out: Option<PathBuf>,
    results: &BacktestResults,
    settings: &BacktestSettings,
    artifacts: &dyn ArtifactWriter,
    mut audit_extras: Vec<AuditEvent>,
) -> Result<PathBuf> {
    let base_dir = out.unwrap_or_else(|| PathBuf::from(&config.paths.out_dir));
    let run_dir = base_dir.join(&config.run.run_id);
    artifacts.ensure_dir(&run_dir)?;

    // No source text: snapshot a normalized rendering instead.
    let snapshot_toml = if config_toml.trim().is_empty() {
        to_toml_pretty(config)?
    } else {
        config_toml.to_string()
    };

    let rows = results.rows();
    artifacts.write_equity_csv(run_dir.join("equity.csv").as_path(), &rows)?;
    let meta = summary_meta_json_from_rows(config, Some(&snapshot_toml), &rows);
    let config_snapshot = config_snapshot_json(config, settings);
    artifacts.write_summary_json(
        run_dir.join("summary.json").as_path(),
        &results.summary,
        meta.as_ref(),
        Some(&config_snapshot),
    )?;

    let mut audit_events = allocation_events(&config.run.run_id, &rows);
    audit_events.append(&mut audit_extras);
    audit_events.push(summary_event(
        &config.run.run_id,
        rows.last().map(|row| row.month.to_string()),
        &results.summary,
        meta.as_ref(),
    ));
    artifacts.write_audit_jsonl(run_dir.join("logs.jsonl").as_path(), &audit_events)?;

    if config.html_enabled() {
        artifacts.write_summary_html(
            run_dir.join("summary.html").as_path(),
            &results.summary,
            meta.as_ref(),
        )?;
        artifacts.write_dashboard_html(
            run_dir.join("dashboard.html").as_path(),
            &results.summary,
            meta.as_ref(),
            &rows,
        )?;
    }

    artifacts.write_config_snapshot_toml(
        run_dir.join("config_snapshot.toml").as_path(),
        &snapshot_toml,
    )?;

    Ok(run_dir)
}

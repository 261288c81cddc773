use crate::config::{parse_config, Config};
use crate::shared::{
    allocation_events, build_settings, config_snapshot_json, summary_event,
    summary_meta_json_from_rows,
};
use seesaw_domain::errors::{BacktestError, Result};
use seesaw_domain::repositories::artifacts::{ArtifactReader, ArtifactWriter};
use seesaw_domain::services::audit::AuditEvent;
use seesaw_domain::services::metrics::{recompute_summary, ComparisonSummary, MetricsConfig};
use seesaw_domain::value_objects::equity_point::EquityRow;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info_span, warn};

pub struct GenerateReportResult {
    pub input_dir: PathBuf,
    pub run_id: String,
    pub summary: ComparisonSummary,
    pub wrote_html: bool,
}

pub fn generate_report(
    input_dir: &Path,
    reader: &dyn ArtifactReader,
    writer: &dyn ArtifactWriter,
) -> Result<GenerateReportResult> {
    let _span = info_span!("generate_report", input_dir = %input_dir.display()).entered();

    let stage_start = Instant::now();
    let equity_path = input_dir.join("equity.csv");
    let config_path = input_dir.join("config_snapshot.toml");

    if !reader.exists(&equity_path) {
        return Err(BacktestError::FileNotFound { path: equity_path });
    }
    let rows = reader.read_equity_csv(&equity_path)?;

    let config_toml = reader.read_config_snapshot_toml(&config_path)?;
    let config = match config_toml.as_deref().map(load_config_from_str) {
        Some(Ok(config)) => Some(config),
        Some(Err(err)) => {
            warn!(error = %err, "ignoring unreadable config snapshot");
            None
        }
        None => None,
    };

    let (run_id, meta, config_snapshot, metrics_config, wrote_html) = match &config {
        Some(config) => {
            let settings = build_settings(config)?;
            (
                config.run.run_id.clone(),
                summary_meta_json_from_rows(config, config_toml.as_deref(), &rows),
                Some(config_snapshot_json(config, &settings)),
                settings.metrics,
                config.html_enabled(),
            )
        }
        None => (
            "unknown".to_string(),
            None,
            None,
            MetricsConfig::default(),
            false,
        ),
    };

    let summary = recompute_summary(&rows, metrics_config);
    metrics::histogram!("seesaw.report.generate_ms")
        .record(stage_start.elapsed().as_millis() as f64);
    metrics::gauge!("seesaw.report.months").set(rows.len() as f64);

    writer.write_summary_json(
        input_dir.join("summary.json").as_path(),
        &summary,
        meta.as_ref(),
        config_snapshot.as_ref(),
    )?;

    if wrote_html {
        writer.write_summary_html(
            input_dir.join("summary.html").as_path(),
            &summary,
            meta.as_ref(),
        )?;
        writer.write_dashboard_html(
            input_dir.join("dashboard.html").as_path(),
            &summary,
            meta.as_ref(),
            &rows,
        )?;
    }

    let events = build_report_events(&run_id, &rows, &summary, meta.as_ref(), input_dir);
    writer.write_audit_jsonl(input_dir.join("logs.jsonl").as_path(), &events)?;

    Ok(GenerateReportResult {
        input_dir: input_dir.to_path_buf(),
        run_id,
        summary,
        wrote_html,
    })
}

fn load_config_from_str(raw: &str) -> Result<Config> {
    parse_config(raw).map_err(|err| {
        BacktestError::Config(format!("failed to parse config snapshot TOML: {err}"))
    })
}

fn build_report_events(
    run_id: &str,
    rows: &[EquityRow],
    summary: &ComparisonSummary,
    meta: Option<&serde_json::Value>,
    input_dir: &Path,
) -> Vec<AuditEvent> {
    let last_month = rows.last().map(|row| row.month.to_string());
    let mut events = allocation_events(run_id, rows);
    events.push(AuditEvent {
        run_id: run_id.to_string(),
        month: last_month.clone(),
        stage: "report".to_string(),
        asset: None,
        action: "recompute".to_string(),
        error: None,
        details: serde_json::json!({
            "input_dir": input_dir.display().to_string(),
            "months": rows.len(),
        }),
    });
    events.push(summary_event(run_id, last_month, summary, meta));
    events
}

use crate::reporting::{self, SummaryMeta};
use seesaw_domain::errors::{BacktestError, Result};
use seesaw_domain::repositories::artifacts::{ArtifactReader, ArtifactWriter};
use seesaw_domain::services::audit::AuditEvent;
use seesaw_domain::services::metrics::ComparisonSummary;
use seesaw_domain::value_objects::equity_point::EquityRow;
use std::fs;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemArtifactWriter;

impl FilesystemArtifactWriter {
    pub fn new() -> Self {
        Self
    }
}

fn record_write_metrics<T>(kind: &'static str, start: Instant, result: &Result<T>) {
    let result_label = if result.is_ok() { "ok" } else { "err" };
    metrics::counter!(
        "seesaw.infra.artifacts.write.calls_total",
        "kind" => kind,
        "result" => result_label
    )
    .increment(1);
    metrics::histogram!("seesaw.infra.artifacts.write_ms", "kind" => kind, "result" => result_label)
        .record(start.elapsed().as_millis() as f64);
}

fn record_read_metrics<T>(kind: &'static str, start: Instant, result: &Result<T>) {
    let result_label = if result.is_ok() { "ok" } else { "err" };
    metrics::counter!(
        "seesaw.infra.artifacts.read.calls_total",
        "kind" => kind,
        "result" => result_label
    )
    .increment(1);
    metrics::histogram!("seesaw.infra.artifacts.read_ms", "kind" => kind, "result" => result_label)
        .record(start.elapsed().as_millis() as f64);
}

fn timed_write<T>(kind: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let start = Instant::now();
    let result = f();
    record_write_metrics(kind, start, &result);
    result
}

fn timed_read<T>(kind: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let start = Instant::now();
    let result = f();
    record_read_metrics(kind, start, &result);
    result
}

impl ArtifactWriter for FilesystemArtifactWriter {
    fn ensure_dir(&self, path: &Path) -> Result<()> {
        timed_write("ensure_dir", || {
            fs::create_dir_all(path).map_err(|err| {
                BacktestError::Io(format!("failed to create dir {}: {}", path.display(), err))
            })
        })
    }

    fn write_equity_csv(&self, path: &Path, rows: &[EquityRow]) -> Result<()> {
        timed_write("equity_csv", || reporting::write_equity_csv(path, rows))
    }

    fn write_summary_json(
        &self,
        path: &Path,
        summary: &ComparisonSummary,
        meta: Option<&serde_json::Value>,
        config_snapshot: Option<&serde_json::Value>,
    ) -> Result<()> {
        timed_write("summary_json", || {
            reporting::write_summary_json(path, summary, meta, config_snapshot)
        })
    }

    fn write_summary_html(
        &self,
        path: &Path,
        summary: &ComparisonSummary,
        meta: Option<&serde_json::Value>,
    ) -> Result<()> {
        let parsed = meta.and_then(SummaryMeta::from_json);
        timed_write("summary_html", || {
            reporting::write_summary_html(path, summary, parsed.as_ref())
        })
    }

    fn write_dashboard_html(
        &self,
        path: &Path,
        summary: &ComparisonSummary,
        meta: Option<&serde_json::Value>,
        rows: &[EquityRow],
    ) -> Result<()> {
        let parsed = meta.and_then(SummaryMeta::from_json);
        timed_write("dashboard_html", || {
            reporting::write_dashboard_html(path, summary, parsed.as_ref(), rows)
        })
    }

    fn write_audit_jsonl(&self, path: &Path, events: &[AuditEvent]) -> Result<()> {
        timed_write("logs_jsonl", || reporting::write_audit_jsonl(path, events))
    }

    fn write_config_snapshot_toml(&self, path: &Path, contents: &str) -> Result<()> {
        timed_write("config_snapshot_toml", || {
            fs::write(path, contents).map_err(|err| {
                BacktestError::Io(format!(
                    "failed to write config snapshot {}: {}",
                    path.display(),
                    err
                ))
            })
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemArtifactReader;

impl FilesystemArtifactReader {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactReader for FilesystemArtifactReader {
    fn read_equity_csv(&self, path: &Path) -> Result<Vec<EquityRow>> {
        timed_read("equity_csv", || reporting::read_equity_csv(path))
    }

    fn read_config_snapshot_toml(&self, path: &Path) -> Result<Option<String>> {
        timed_read("config_snapshot_toml", || {
            if !path.exists() {
                return Ok(None);
            }
            fs::read_to_string(path).map(Some).map_err(|err| {
                BacktestError::Io(format!(
                    "failed to read config snapshot {}: {}",
                    path.display(),
                    err
                ))
            })
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::{FilesystemArtifactReader, FilesystemArtifactWriter};
    use seesaw_domain::repositories::artifacts::{ArtifactReader, ArtifactWriter};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_tmp_dir(prefix: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("seesaw_{prefix}_{}_{}", std::process::id(), now))
    }

    #[test]
    fn config_snapshot_round_trips_and_missing_is_none() {
        let dir = unique_tmp_dir("artifacts");
        let writer = FilesystemArtifactWriter::new();
        let reader = FilesystemArtifactReader::new();

        writer.ensure_dir(&dir.join("nested")).expect("ensure dir");
        let path = dir.join("nested").join("config_snapshot.toml");
        assert_eq!(reader.read_config_snapshot_toml(&path).expect("read"), None);

        writer
            .write_config_snapshot_toml(&path, "[run]\nrun_id = \"x\"\n")
            .expect("write snapshot");
        assert!(reader.exists(&path));
        assert_eq!(
            reader.read_config_snapshot_toml(&path).expect("read").as_deref(),
            Some("[run]\nrun_id = \"x\"\n")
        );
    }
}

use crate::errors::Result;
use crate::services::audit::AuditEvent;
use crate::services::metrics::ComparisonSummary;
use crate::value_objects::equity_point::EquityRow;
use std::path::Path;

pub trait ArtifactWriter {
    fn ensure_dir(&self, path: &Path) -> Result<()>;
    fn write_equity_csv(&self, path: &Path, rows: &[EquityRow]) -> Result<()>;
    fn write_summary_json(
        &self,
        path: &Path,
        summary: &ComparisonSummary,
        meta: Option<&serde_json::Value>,
        config_snapshot: Option<&serde_json::Value>,
    ) -> Result<()>;
    fn write_summary_html(
        &self,
        path: &Path,
        summary: &ComparisonSummary,
        meta: Option<&serde_json::Value>,
    ) -> Result<()>;
    fn write_dashboard_html(
        &self,
        path: &Path,
        summary: &ComparisonSummary,
        meta: Option<&serde_json::Value>,
        rows: &[EquityRow],
    ) -> Result<()>;
    fn write_audit_jsonl(&self, path: &Path, events: &[AuditEvent]) -> Result<()>;
    fn write_config_snapshot_toml(&self, path: &Path, contents: &str) -> Result<()>;
}

pub trait ArtifactReader {
    fn read_equity_csv(&self, path: &Path) -> Result<Vec<EquityRow>>;
    fn read_config_snapshot_toml(&self, path: &Path) -> Result<Option<String>>;
    fn exists(&self, path: &Path) -> bool;
}

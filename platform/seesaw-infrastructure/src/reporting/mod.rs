use seesaw_domain::errors::{BacktestError, Result};
use seesaw_domain::services::audit::AuditEvent;
use seesaw_domain::services::metrics::{ComparisonSummary, PerformanceStats};
use seesaw_domain::value_objects::equity_point::EquityRow;
use seesaw_domain::value_objects::holding::Holding;
use seesaw_domain::value_objects::month::Month;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

const EQUITY_COLUMNS: [&str; 11] = [
    "month",
    "holding",
    "signal_a",
    "signal_b",
    "return_a",
    "return_b",
    "rotation_return",
    "rotation_equity",
    "benchmark_return",
    "benchmark_equity",
    "contributed",
];

fn io_err(what: &str, path: &Path, err: impl std::fmt::Display) -> BacktestError {
    BacktestError::Io(format!("failed to {what} {}: {err}", path.display()))
}

fn write_file(path: &Path, what: &str, contents: &[u8]) -> Result<()> {
    let mut file = fs::File::create(path).map_err(|err| io_err("create", path, err))?;
    file.write_all(contents)
        .map_err(|err| io_err(&format!("write {what}"), path, err))
}

pub fn write_audit_jsonl(path: &Path, events: &[AuditEvent]) -> Result<()> {
    let mut buf = Vec::new();
    for event in events {
        let line = serde_json::to_string(event).map_err(|err| {
            BacktestError::Parse(format!("failed to serialize audit event: {err}"))
        })?;
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
    }
    write_file(path, "logs", &buf)
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn write_equity_csv(path: &Path, rows: &[EquityRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(|err| io_err("create equity csv", path, err))?;
    wtr.write_record(EQUITY_COLUMNS)
        .map_err(|err| io_err("write equity csv header", path, err))?;

    for row in rows {
        wtr.write_record([
            row.month.to_string(),
            row.holding.as_str().to_string(),
            optional(row.signal_a),
            optional(row.signal_b),
            row.return_a.to_string(),
            row.return_b.to_string(),
            row.rotation_return.to_string(),
            row.rotation_equity.to_string(),
            row.benchmark_return.to_string(),
            row.benchmark_equity.to_string(),
            row.contributed.to_string(),
        ])
        .map_err(|err| io_err("write equity row", path, err))?;
    }

    wtr.flush().map_err(|err| io_err("flush equity csv", path, err))
}

#[derive(Debug, Clone, serde::Deserialize)]
struct EquityRecord {
    month: String,
    holding: String,
    signal_a: Option<f64>,
    signal_b: Option<f64>,
    return_a: f64,
    return_b: f64,
    rotation_return: f64,
    rotation_equity: f64,
    benchmark_return: f64,
    benchmark_equity: f64,
    contributed: f64,
}

pub fn read_equity_csv(path: &Path) -> Result<Vec<EquityRow>> {
    let mut rdr = csv::Reader::from_path(path).map_err(|err| io_err("open equity csv", path, err))?;
    let mut rows = Vec::new();
    for result in rdr.deserialize::<EquityRecord>() {
        let record = result.map_err(|err| {
            BacktestError::Parse(format!("failed to parse equity record in {}: {err}", path.display()))
        })?;
        let month: Month = record.month.parse()?;
        let holding: Holding = record.holding.parse().map_err(BacktestError::Parse)?;
        rows.push(EquityRow {
            month,
            holding,
            signal_a: record.signal_a,
            signal_b: record.signal_b,
            return_a: record.return_a,
            return_b: record.return_b,
            rotation_return: record.rotation_return,
            rotation_equity: record.rotation_equity,
            benchmark_return: record.benchmark_return,
            benchmark_equity: record.benchmark_equity,
            contributed: record.contributed,
        });
    }
    Ok(rows)
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryMeta {
    pub run_id: String,
    pub asset_a: String,
    pub asset_b: String,
    pub start: String,
    pub end: String,
}

impl SummaryMeta {
    pub fn from_json(meta: &serde_json::Value) -> Option<Self> {
        Some(Self {
            run_id: meta.get("run_id")?.as_str()?.to_string(),
            asset_a: meta.get("asset_a")?.as_str()?.to_string(),
            asset_b: meta.get("asset_b")?.as_str()?.to_string(),
            start: meta.get("start")?.as_str()?.to_string(),
            end: meta.get("end")?.as_str()?.to_string(),
        })
    }

    fn unknown() -> Self {
        Self {
            run_id: "unknown".to_string(),
            asset_a: "A".to_string(),
            asset_b: "B".to_string(),
            start: "unknown".to_string(),
            end: "unknown".to_string(),
        }
    }
}

pub fn write_summary_json(
    path: &Path,
    summary: &ComparisonSummary,
    meta: Option<&serde_json::Value>,
    config_snapshot: Option<&serde_json::Value>,
) -> Result<()> {
    let json = serde_json::json!({
        "meta": meta,
        "config_snapshot": config_snapshot,
        "rotation": summary.rotation,
        "benchmark": summary.benchmark,
        "excess_return": summary.excess_return,
        "months_in_a": summary.months_in_a,
        "months_in_b": summary.months_in_b,
        "months_in_cash": summary.months_in_cash,
        "switches": summary.switches,
        "months_outperformed": summary.months_outperformed,
    });
    let json = serde_json::to_string_pretty(&json)
        .map_err(|err| BacktestError::Parse(format!("failed to serialize summary: {err}")))?;
    write_file(path, "summary", json.as_bytes())
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Dashboard row; `holding` uses the same label as `equity.csv`.
#[derive(Serialize)]
struct ChartRow {
    month: String,
    holding: &'static str,
    return_a: f64,
    return_b: f64,
    rotation_equity: f64,
    benchmark_equity: f64,
}

impl From<&EquityRow> for ChartRow {
    fn from(row: &EquityRow) -> Self {
        Self {
            month: row.month.to_string(),
            holding: row.holding.as_str(),
            return_a: row.return_a,
            return_b: row.return_b,
            rotation_equity: row.rotation_equity,
            benchmark_equity: row.benchmark_equity,
        }
    }
}

fn stats_rows(label: &str, stats: &PerformanceStats) -> String {
    format!(
        "<tr><th>{label}</th><td>{:.2}</td><td>{:.2}</td><td>{:.2}%</td><td>{:.2}%</td><td>{:.4}</td><td>{:.2}%</td></tr>",
        stats.final_equity,
        stats.contributed,
        stats.total_return * 100.0,
        stats.cagr * 100.0,
        stats.sharpe,
        stats.max_drawdown * 100.0,
    )
}

pub fn write_summary_html(
    path: &Path,
    summary: &ComparisonSummary,
    meta: Option<&SummaryMeta>,
) -> Result<()> {
    let fallback = SummaryMeta::unknown();
    let meta = meta.unwrap_or(&fallback);
    let rotation_row = stats_rows("rotation", &summary.rotation);
    let benchmark_row = stats_rows("benchmark", &summary.benchmark);

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Seesaw Summary</title>
  <style>
    body {{ font-family: ui-sans-serif, system-ui; padding: 24px; }}
    table {{ border-collapse: collapse; min-width: 640px; }}
    th, td {{ border: 1px solid #ddd; padding: 8px; }}
    th {{ background: #f6f6f6; text-align: left; }}
    code {{ background: #f2f2f2; padding: 2px 6px; border-radius: 4px; }}
  </style>
</head>
<body>
  <h1>Seesaw Summary</h1>
  <p><strong>run_id:</strong> <code>{run_id}</code></p>
  <p><strong>assets:</strong> <code>{asset_a}</code> / <code>{asset_b}</code></p>
  <p><strong>period:</strong> <code>{start}</code> to <code>{end}</code></p>
  <h2>Curves</h2>
  <table>
    <tr><th></th><th>final</th><th>contributed</th><th>total return</th><th>cagr</th><th>sharpe</th><th>max drawdown</th></tr>
    {rotation_row}
    {benchmark_row}
  </table>
  <h2>Rotation</h2>
  <table>
    <tr><th>excess_return</th><td>{excess:.2}%</td></tr>
    <tr><th>months_in_a</th><td>{months_in_a}</td></tr>
    <tr><th>months_in_b</th><td>{months_in_b}</td></tr>
    <tr><th>months_in_cash</th><td>{months_in_cash}</td></tr>
    <tr><th>switches</th><td>{switches}</td></tr>
    <tr><th>months_outperformed</th><td>{months_outperformed}</td></tr>
  </table>
</body>
</html>"#,
        run_id = escape_html(&meta.run_id),
        asset_a = escape_html(&meta.asset_a),
        asset_b = escape_html(&meta.asset_b),
        start = escape_html(&meta.start),
        end = escape_html(&meta.end),
        excess = summary.excess_return * 100.0,
        months_in_a = summary.months_in_a,
        months_in_b = summary.months_in_b,
        months_in_cash = summary.months_in_cash,
        switches = summary.switches,
        months_outperformed = summary.months_outperformed,
    );

    write_file(path, "html", html.as_bytes())
}

pub fn write_dashboard_html(
    path: &Path,
    summary: &ComparisonSummary,
    meta: Option<&SummaryMeta>,
    rows: &[EquityRow],
) -> Result<()> {
    let fallback = SummaryMeta::unknown();
    let meta = meta.unwrap_or(&fallback);
    let chart_rows: Vec<ChartRow> = rows.iter().map(ChartRow::from).collect();
    let rows_json = serde_json::to_string(&chart_rows)
        .map_err(|err| BacktestError::Parse(format!("failed to serialize equity rows: {err}")))?;

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Seesaw Dashboard</title>
  <style>
    body {{ font-family: ui-sans-serif, system-ui; padding: 24px; }}
    code {{ background: #f2f2f2; padding: 2px 6px; border-radius: 4px; }}
    .grid {{ display: grid; grid-template-columns: 3fr 2fr; gap: 16px; align-items: start; }}
    .card {{ border: 1px solid #ddd; border-radius: 10px; padding: 16px; background: #fff; }}
    canvas {{ width: 100%; height: 320px; border: 1px solid #eee; border-radius: 8px; }}
    table {{ border-collapse: collapse; width: 100%; }}
    th, td {{ border: 1px solid #eee; padding: 6px; font-size: 12px; }}
    th {{ background: #fafafa; text-align: left; }}
    .muted {{ color: #666; }}
    .rotation {{ color: #2b6cb0; }}
    .benchmark {{ color: #c05621; }}
  </style>
</head>
<body>
  <h1>Seesaw Dashboard</h1>
  <p class="muted">
    run_id: <code>{run_id}</code> | A: <code>{asset_a}</code> | B: <code>{asset_b}</code>
    | period: <code>{start}</code> to <code>{end}</code>
  </p>

  <div class="grid">
    <div class="card">
      <h2>Equity</h2>
      <canvas id="equity"></canvas>
      <p class="muted">
        <span class="rotation">rotation</span> final={rotation_final:.2} return={rotation_return:.2}%
        | <span class="benchmark">benchmark</span> final={benchmark_final:.2} return={benchmark_return:.2}%
        | switches={switches}
      </p>
    </div>
    <div class="card">
      <h2>Allocation</h2>
      <table id="allocation_table">
        <thead>
          <tr>
            <th>month</th>
            <th>holding</th>
            <th>return A</th>
            <th>return B</th>
            <th>rotation</th>
            <th>benchmark</th>
          </tr>
        </thead>
        <tbody></tbody>
      </table>
    </div>
  </div>

  <script>
    const rows = {rows_json};

    function drawLines(canvas, rows) {{
      const ctx = canvas.getContext('2d');
      const w = canvas.width = canvas.clientWidth * window.devicePixelRatio;
      const h = canvas.height = canvas.clientHeight * window.devicePixelRatio;
      ctx.clearRect(0, 0, w, h);

      if (!rows || rows.length < 2) {{
        ctx.fillStyle = '#666';
        ctx.fillText('not enough months to chart', 10, 20);
        return;
      }}

      const series = [
        {{ key: 'rotation_equity', color: '#2b6cb0' }},
        {{ key: 'benchmark_equity', color: '#c05621' }},
      ];
      const values = rows.flatMap(r => [r.rotation_equity, r.benchmark_equity]);
      const minV = Math.min(...values);
      const maxV = Math.max(...values);
      const pad = 20 * window.devicePixelRatio;
      const x0 = pad, y0 = pad, x1 = w - pad, y1 = h - pad;

      function x(i) {{
        return x0 + (i / (rows.length - 1)) * (x1 - x0);
      }}
      function y(v) {{
        if (maxV === minV) return (y0 + y1) / 2;
        const t = (v - minV) / (maxV - minV);
        return y1 - t * (y1 - y0);
      }}

      for (const s of series) {{
        ctx.strokeStyle = s.color;
        ctx.lineWidth = 2 * window.devicePixelRatio;
        ctx.beginPath();
        ctx.moveTo(x(0), y(rows[0][s.key]));
        for (let i = 1; i < rows.length; i++) {{
          ctx.lineTo(x(i), y(rows[i][s.key]));
        }}
        ctx.stroke();
      }}
    }}

    function pct(v) {{
      return (v * 100).toFixed(2) + '%';
    }}

    function renderAllocation(tableId, rows) {{
      const tbody = document.querySelector(`#${{tableId}} tbody`);
      tbody.innerHTML = '';
      for (const r of rows) {{
        const tr = document.createElement('tr');
        tr.innerHTML = `
          <td>${{r.month}}</td>
          <td>${{r.holding}}</td>
          <td>${{pct(r.return_a)}}</td>
          <td>${{pct(r.return_b)}}</td>
          <td>${{r.rotation_equity.toFixed(2)}}</td>
          <td>${{r.benchmark_equity.toFixed(2)}}</td>
        `;
        tbody.appendChild(tr);
      }}
    }}

    drawLines(document.getElementById('equity'), rows);
    renderAllocation('allocation_table', rows);
    window.addEventListener('resize', () => drawLines(document.getElementById('equity'), rows));
  </script>
</body>
</html>"#,
        run_id = escape_html(&meta.run_id),
        asset_a = escape_html(&meta.asset_a),
        asset_b = escape_html(&meta.asset_b),
        start = escape_html(&meta.start),
        end = escape_html(&meta.end),
        rotation_final = summary.rotation.final_equity,
        rotation_return = summary.rotation.total_return * 100.0,
        benchmark_final = summary.benchmark.final_equity,
        benchmark_return = summary.benchmark.total_return * 100.0,
        switches = summary.switches,
    );

    write_file(path, "html", html.as_bytes())
}

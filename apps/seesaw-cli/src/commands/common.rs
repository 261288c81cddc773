use seesaw_application::config::{BenchmarkKindConfig, CapitalModeKind, Config};
use seesaw_application::meta::ENGINE_NAME;
use seesaw_domain::services::metrics::ComparisonSummary;
use serde::Serialize;
use std::path::PathBuf;

pub(super) fn print_config_summary(command: &str, config: &Config, out: Option<&PathBuf>) {
    println!(
        "{ENGINE_NAME} cli: {command} (run_id={}, initial_capital={})",
        config.run.run_id, config.run.initial_capital
    );
    println!(
        "assets: a={} ({}), b={} ({}), out_dir={}",
        config.assets.a.name,
        config.assets.a.path,
        config.assets.b.name,
        config.assets.b.path,
        config.paths.out_dir
    );
    let capital = match config.capital.as_ref() {
        Some(capital) if capital.mode == CapitalModeKind::Contribution => format!(
            "contribution monthly={}",
            capital
                .monthly_contribution
                .map(|v| v.to_string())
                .unwrap_or_else(|| "missing".to_string())
        ),
        _ => "compound".to_string(),
    };
    let benchmark = match config.benchmark.kind {
        BenchmarkKindConfig::HoldA => "hold_a".to_string(),
        BenchmarkKindConfig::HoldB => "hold_b".to_string(),
        BenchmarkKindConfig::Blend => {
            format!("blend weight_a={}", config.benchmark.weight_a.unwrap_or(0.5))
        }
    };
    println!(
        "strategy: selection={}, signal={}, tie_break={}, capital={capital}, benchmark={benchmark}",
        label(&config.strategy.selection),
        label(&config.strategy.signal),
        label(&config.strategy.tie_break)
    );
    if let Some(out_dir) = out {
        println!("output dir: {}", out_dir.display());
    }
}

fn label<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

pub(super) fn print_comparison(config: &Config, summary: &ComparisonSummary) {
    let rows = [
        ("rotation", &summary.rotation),
        ("benchmark", &summary.benchmark),
    ];
    for (label, stats) in rows {
        println!(
            "{label}: final={:.2} contributed={:.2} total_return={:.2}% cagr={:.2}% max_drawdown={:.2}%",
            stats.final_equity,
            stats.contributed,
            stats.total_return * 100.0,
            stats.cagr * 100.0,
            stats.max_drawdown * 100.0
        );
    }
    println!("excess_return: {:.2}%", summary.excess_return * 100.0);
    println!(
        "months: {}={} {}={} cash={} switches={} outperformed={}",
        config.assets.a.name,
        summary.months_in_a,
        config.assets.b.name,
        summary.months_in_b,
        summary.months_in_cash,
        summary.switches,
        summary.months_outperformed
    );
}

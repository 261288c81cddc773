use seesaw_application::meta::ENGINE_NAME;
use seesaw_domain::errors::Result;
use std::path::PathBuf;

pub(super) fn run_backtest(config_path: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let (config, config_toml) =
        seesaw_application::config::load_config_with_source(&config_path)?;
    super::common::print_config_summary("backtest", &config, out.as_ref());

    let overall_start = std::time::Instant::now();
    let crate::infra::EngineDeps { prices, artifacts } = crate::infra::build_engine_deps();

    let run = seesaw_application::backtesting::run_backtest(
        &config,
        &config_toml,
        out,
        prices.as_ref(),
        artifacts.as_ref(),
    )?;

    super::common::print_comparison(&config, &run.results.summary);
    println!("run output: {}", run.run_dir.display());
    println!(
        "{ENGINE_NAME} cli: backtest total_ms={}",
        overall_start.elapsed().as_millis()
    );
    Ok(())
}

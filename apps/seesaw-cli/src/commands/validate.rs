use seesaw_domain::errors::{BacktestError, Result};
use std::path::PathBuf;

pub(super) fn run_validate(config_path: PathBuf, strict: bool, out: Option<PathBuf>) -> Result<()> {
    let config = seesaw_application::config::load_config(&config_path)?;
    super::common::print_config_summary("validate", &config, None);

    let crate::infra::ValidateDeps { prices } = crate::infra::build_validate_deps();
    let report = seesaw_application::validation::validate(&config, strict, prices.as_ref())?;

    let pretty = serde_json::to_string_pretty(&report)
        .map_err(|err| BacktestError::Parse(format!("failed to serialize report: {err}")))?;
    println!("{pretty}");

    if let Some(out_path) = out {
        std::fs::write(&out_path, pretty).map_err(|err| {
            BacktestError::Io(format!(
                "failed to write report {}: {}",
                out_path.display(),
                err
            ))
        })?;
    }

    Ok(())
}

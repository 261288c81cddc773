use seesaw_application::meta::ENGINE_NAME;
use seesaw_domain::errors::Result;
use std::path::PathBuf;

pub(super) fn run_report(input: PathBuf) -> Result<()> {
    let deps = crate::infra::build_reporting_deps();
    let result = seesaw_application::reporting::generate_report(
        input.as_path(),
        deps.reader.as_ref(),
        deps.writer.as_ref(),
    )?;
    println!(
        "{ENGINE_NAME} cli: report regenerated (run_id={}, months={}, switches={}, html={})",
        result.run_id, result.summary.rotation.months, result.summary.switches, result.wrote_html
    );
    println!("report output: {}", result.input_dir.display());
    Ok(())
}

//! `recmatch run` / `recmatch validate`: config-driven record matching.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use recmatch_engine::engine::load_collection;
use recmatch_engine::load::collection_to_json;
use recmatch_engine::{MatchError, PlanConfig, PlanInput, PlanResult};

use crate::exit_codes::{match_error_exit_code, EXIT_ERROR, EXIT_IO};
use crate::CliError;

fn engine_err(err: MatchError) -> CliError {
    CliError { code: match_error_exit_code(&err), message: err.to_string(), hint: None }
}

fn io_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_IO, message: msg.into(), hint: None }
}

fn read_plan(plan_path: &Path) -> Result<PlanConfig, CliError> {
    let plan_str = std::fs::read_to_string(plan_path)
        .map_err(|e| io_err(format!("cannot read plan {}: {e}", plan_path.display())))?;
    PlanConfig::from_toml(&plan_str).map_err(|e| {
        engine_err(e).with_hint(format!("check {}", plan_path.display()))
    })
}

/// Load every input, resolving paths relative to the plan file's directory.
fn load_inputs(config: &PlanConfig, base_dir: &Path) -> Result<PlanInput, CliError> {
    let mut collections = HashMap::new();
    for (name, input) in &config.inputs {
        let path = base_dir.join(&input.file);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| io_err(format!("input '{name}': cannot read {}: {e}", path.display())))?;
        let format = input.resolved_format().map_err(engine_err)?;
        let rows = load_collection(format, &text).map_err(|e| {
            let mut err = engine_err(e);
            err.message = format!("input '{name}' ({}): {}", path.display(), err.message);
            err
        })?;
        log::debug!("loaded input '{name}': {} records from {}", rows.len(), path.display());
        collections.insert(name.clone(), rows);
    }
    Ok(PlanInput { collections })
}

pub fn cmd_run(plan_path: PathBuf, json_output: bool, output_file: Option<PathBuf>) -> Result<(), CliError> {
    let config = read_plan(&plan_path)?;
    let base_dir = plan_path.parent().unwrap_or_else(|| Path::new("."));

    let input = load_inputs(&config, base_dir)?;
    let result = recmatch_engine::run(&config, &input).map_err(engine_err)?;

    let json_str = collection_to_json(&result.output)
        .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;

    // --output wins over [output].json; the latter is relative to the plan
    let target = output_file.or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));
    if let Some(ref path) = target {
        std::fs::write(path, &json_str)
            .map_err(|e| io_err(format!("cannot write output {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    print_summary(&result);
    Ok(())
}

pub fn cmd_validate(plan_path: PathBuf) -> Result<(), CliError> {
    let config = read_plan(&plan_path)?;
    eprintln!(
        "plan '{}' is valid: {} inputs, {} steps, output step '{}'",
        config.name,
        config.inputs.len(),
        config.steps.len(),
        config.output_step().unwrap_or_default(),
    );
    Ok(())
}

/// Human summary to stderr.
fn print_summary(result: &PlanResult) {
    for step in &result.steps {
        match step.right_records {
            Some(right) => eprintln!(
                "  {:<16} {:<14} {} x {} -> {}",
                step.id, step.op, step.left_records, right, step.output_records
            ),
            None => eprintln!(
                "  {:<16} {:<14} {} -> {}",
                step.id, step.op, step.left_records, step.output_records
            ),
        }
    }
    eprintln!(
        "plan '{}': {} steps, {} records from '{}'",
        result.meta.plan_name,
        result.steps.len(),
        result.output.len(),
        result.meta.output_step,
    );
}

use std::collections::HashMap;

use serde::Serialize;

use crate::combine::{
    create_new_by_match, match_and_add_keys, match_and_merge, unmatch_and_create_new,
    unmatch_and_merge,
};
use crate::config::{InputFormat, PlanConfig, StepConfig, StepOp};
use crate::error::MatchError;
use crate::filter::{keep_by_key_value, remove_by_key_value};
use crate::load::{collection_from_csv, collection_from_json};
use crate::model::Collection;
use crate::reshape::{dedupe_records, rename_keys, select_keys, strip_keys};

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Pre-loaded collections keyed by input name.
#[derive(Debug, Default)]
pub struct PlanInput {
    pub collections: HashMap<String, Collection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanMeta {
    pub plan_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub output_step: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSummary {
    pub id: String,
    pub op: String,
    pub left_records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_records: Option<usize>,
    pub output_records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanResult {
    pub meta: PlanMeta,
    pub steps: Vec<StepSummary>,
    pub output: Collection,
}

/// Parse input text in the given format.
pub fn load_collection(format: InputFormat, text: &str) -> Result<Collection, MatchError> {
    match format {
        InputFormat::Json => collection_from_json(text),
        InputFormat::Csv => collection_from_csv(text),
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run every step of `config` in order. Any error aborts the whole run.
pub fn run(config: &PlanConfig, input: &PlanInput) -> Result<PlanResult, MatchError> {
    config.validate()?;

    for name in config.inputs.keys() {
        if !input.collections.contains_key(name) {
            return Err(MatchError::UnknownReference(format!("input '{name}' has no data")));
        }
    }

    log::info!("running plan '{}' ({} steps)", config.name, config.steps.len());

    // Step outputs; inputs are read straight from `input`
    let mut produced: HashMap<&str, Collection> = HashMap::new();
    let mut summaries = Vec::with_capacity(config.steps.len());

    for step in &config.steps {
        let left = lookup(&produced, input, step, &step.left)?;
        let right = step
            .right
            .as_deref()
            .map(|name| lookup(&produced, input, step, name))
            .transpose()?;

        let out = run_step(step, left, right)?;

        log::debug!(
            "step '{}' ({}): {} -> {} records",
            step.id,
            step.op,
            left.len(),
            out.len()
        );
        summaries.push(StepSummary {
            id: step.id.clone(),
            op: step.op.to_string(),
            left_records: left.len(),
            right_records: right.map(|r| r.len()),
            output_records: out.len(),
        });
        produced.insert(step.id.as_str(), out);
    }

    // validate() guarantees at least one step and a defined output step
    let output_step = config.output_step().unwrap_or_default().to_string();
    let output = produced.remove(output_step.as_str()).unwrap_or_default();

    log::info!(
        "plan '{}' finished: output step '{output_step}' has {} records",
        config.name,
        output.len()
    );

    Ok(PlanResult {
        meta: PlanMeta {
            plan_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            output_step,
        },
        steps: summaries,
        output,
    })
}

fn lookup<'a>(
    produced: &'a HashMap<&str, Collection>,
    input: &'a PlanInput,
    step: &StepConfig,
    name: &str,
) -> Result<&'a Collection, MatchError> {
    produced
        .get(name)
        .or_else(|| input.collections.get(name))
        .ok_or_else(|| MatchError::UnknownReference(format!("step '{}': '{name}' has no data", step.id)))
}

fn run_step(
    step: &StepConfig,
    left: &Collection,
    right: Option<&Collection>,
) -> Result<Collection, MatchError> {
    let op = step.logical_operator()?;
    let right_of = || {
        right.ok_or_else(|| {
            MatchError::ConfigValidation(format!("step '{}': op '{}' requires 'right'", step.id, step.op))
        })
    };

    match step.op {
        StepOp::Keep => Ok(keep_by_key_value(left, &step.pairs, op)),
        StepOp::Remove => Ok(remove_by_key_value(left, &step.pairs, op)),
        StepOp::Merge => match_and_merge(left, right_of()?, step.fields.as_slice(), op),
        StepOp::AddKeys => match_and_add_keys(left, right_of()?, &step.rules, &step.merge, op),
        StepOp::MatchFilter => create_new_by_match(left, right_of()?, step.fields.as_slice(), op),
        StepOp::UnmatchMerge => unmatch_and_merge(left, right_of()?, step.fields.as_slice(), op),
        StepOp::UnmatchFilter => unmatch_and_create_new(left, right_of()?, step.fields.as_slice(), op),
        StepOp::RenameKeys => Ok(rename_keys(left, &step.renames)),
        StepOp::StripKeys => Ok(strip_keys(left, step.fields.as_slice())),
        StepOp::SelectKeys => Ok(select_keys(left, step.fields.as_slice())),
        StepOp::Dedupe => Ok(dedupe_records(left)),
    }
}

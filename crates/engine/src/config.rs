use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::MatchError;
use crate::matcher::validate_rules;
use crate::model::{KeyValue, LogicalOperator, MatchRule, MergeField, Rename};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PlanConfig {
    pub name: String,
    #[serde(default)]
    pub inputs: BTreeMap<String, InputConfig>,
    #[serde(default)]
    pub steps: Vec<StepConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub file: String,
    /// Inferred from the file extension when omitted.
    #[serde(default)]
    pub format: Option<InputFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputConfig {
    pub fn resolved_format(&self) -> Result<InputFormat, MatchError> {
        if let Some(format) = self.format {
            return Ok(format);
        }
        let ext = Path::new(&self.file)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(InputFormat::Json),
            Some("csv") => Ok(InputFormat::Csv),
            _ => Err(MatchError::ConfigValidation(format!(
                "cannot infer format of '{}'; set format = \"json\" or \"csv\"",
                self.file
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOp {
    Keep,
    Remove,
    Merge,
    AddKeys,
    MatchFilter,
    UnmatchMerge,
    UnmatchFilter,
    RenameKeys,
    StripKeys,
    SelectKeys,
    Dedupe,
}

impl StepOp {
    /// Ops that combine `left` with a second collection.
    pub fn needs_right(&self) -> bool {
        matches!(
            self,
            Self::Merge | Self::AddKeys | Self::MatchFilter | Self::UnmatchMerge | Self::UnmatchFilter
        )
    }

    /// Key/value filters default to OR, the matching ops to AND.
    pub fn default_operator(&self) -> LogicalOperator {
        match self {
            Self::Keep | Self::Remove => LogicalOperator::Or,
            _ => LogicalOperator::And,
        }
    }
}

impl std::fmt::Display for StepOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Keep => "keep",
            Self::Remove => "remove",
            Self::Merge => "merge",
            Self::AddKeys => "add_keys",
            Self::MatchFilter => "match_filter",
            Self::UnmatchMerge => "unmatch_merge",
            Self::UnmatchFilter => "unmatch_filter",
            Self::RenameKeys => "rename_keys",
            Self::StripKeys => "strip_keys",
            Self::SelectKeys => "select_keys",
            Self::Dedupe => "dedupe",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepConfig {
    pub id: String,
    pub op: StepOp,
    /// Input or earlier step this step reads. For filter ops this is the
    /// reference set; the filtered collection is `right`.
    #[serde(alias = "input")]
    pub left: String,
    #[serde(default)]
    pub right: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub pairs: Vec<KeyValue>,
    #[serde(default)]
    pub rules: Vec<MatchRule>,
    #[serde(default)]
    pub merge: Vec<MergeField>,
    #[serde(default)]
    pub renames: Vec<Rename>,
}

impl StepConfig {
    pub fn logical_operator(&self) -> Result<LogicalOperator, MatchError> {
        match &self.operator {
            Some(s) => s.parse().map_err(|e| match e {
                MatchError::InvalidArgument(msg) => {
                    MatchError::InvalidArgument(format!("step '{}': {msg}", self.id))
                }
                other => other,
            }),
            None => Ok(self.op.default_operator()),
        }
    }

    fn validate_params(&self) -> Result<(), MatchError> {
        let require = |ok: bool, param: &str| {
            if ok {
                Ok(())
            } else {
                Err(MatchError::ConfigValidation(format!(
                    "step '{}': op '{}' requires a non-empty '{param}'",
                    self.id, self.op
                )))
            }
        };

        match self.op {
            StepOp::Keep | StepOp::Remove => require(!self.pairs.is_empty(), "pairs"),
            StepOp::Merge
            | StepOp::MatchFilter
            | StepOp::UnmatchMerge
            | StepOp::UnmatchFilter
            | StepOp::StripKeys
            | StepOp::SelectKeys => require(!self.fields.is_empty(), "fields"),
            StepOp::AddKeys => {
                require(!self.rules.is_empty(), "rules")?;
                validate_rules(&self.rules).map_err(|e| match e {
                    MatchError::InvalidArgument(msg) => {
                        MatchError::InvalidArgument(format!("step '{}': {msg}", self.id))
                    }
                    other => other,
                })
            }
            StepOp::RenameKeys => require(!self.renames.is_empty(), "renames"),
            StepOp::Dedupe => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Step whose result is the plan output. Defaults to the last step.
    #[serde(default)]
    pub step: Option<String>,
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl PlanConfig {
    pub fn from_toml(input: &str) -> Result<Self, MatchError> {
        let config: PlanConfig =
            toml::from_str(input).map_err(|e| MatchError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Id of the step whose result the plan returns.
    pub fn output_step(&self) -> Option<&str> {
        self.output
            .step
            .as_deref()
            .or_else(|| self.steps.last().map(|s| s.id.as_str()))
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.inputs.is_empty() {
            return Err(MatchError::ConfigValidation("at least one input is required".into()));
        }
        if self.steps.is_empty() {
            return Err(MatchError::ConfigValidation("at least one step is required".into()));
        }

        for input in self.inputs.values() {
            input.resolved_format()?;
        }

        // Names visible to the step being checked: inputs + earlier steps
        let mut known: HashSet<&str> = self.inputs.keys().map(String::as_str).collect();

        for step in &self.steps {
            if step.id.is_empty() {
                return Err(MatchError::ConfigValidation("step id must not be empty".into()));
            }
            if known.contains(step.id.as_str()) {
                return Err(MatchError::ConfigValidation(format!(
                    "step id '{}' is already used by an input or an earlier step",
                    step.id
                )));
            }

            if !known.contains(step.left.as_str()) {
                return Err(MatchError::UnknownReference(format!(
                    "step '{}': left '{}' is not an input or an earlier step",
                    step.id, step.left
                )));
            }

            match (&step.right, step.op.needs_right()) {
                (Some(right), true) => {
                    if !known.contains(right.as_str()) {
                        return Err(MatchError::UnknownReference(format!(
                            "step '{}': right '{right}' is not an input or an earlier step",
                            step.id
                        )));
                    }
                }
                (None, true) => {
                    return Err(MatchError::ConfigValidation(format!(
                        "step '{}': op '{}' requires 'right'",
                        step.id, step.op
                    )));
                }
                (Some(_), false) => {
                    return Err(MatchError::ConfigValidation(format!(
                        "step '{}': op '{}' takes a single collection, remove 'right'",
                        step.id, step.op
                    )));
                }
                (None, false) => {}
            }

            step.logical_operator()?;
            step.validate_params()?;

            known.insert(step.id.as_str());
        }

        if let Some(ref out) = self.output.step {
            if !self.steps.iter().any(|s| &s.id == out) {
                return Err(MatchError::UnknownReference(format!(
                    "output step '{out}' is not defined"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

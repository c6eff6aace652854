use crate::error::MatchError;
use crate::model::{LogicalOperator, MatchRule, Record, SubstringRange, Value};

/// Evaluate one rule against a record pair.
///
/// Exact rules compare the raw lookups, so a field absent on both sides is
/// equal and absent vs. present is not. Substring rules require a string on
/// both sides.
pub fn rule_matches(left: &Record, right: &Record, rule: &MatchRule) -> Result<bool, MatchError> {
    let l = left.get(&rule.field);
    let r = right.get(&rule.field);

    match rule.substring {
        None => Ok(l == r),
        Some(range) => {
            let ls = string_operand(&rule.field, l)?;
            let rs = string_operand(&rule.field, r)?;
            Ok(char_slice(ls, range) == char_slice(rs, range))
        }
    }
}

/// Combine `rules` under `op`, short-circuiting in rule order.
pub fn records_match(
    left: &Record,
    right: &Record,
    rules: &[MatchRule],
    op: LogicalOperator,
) -> Result<bool, MatchError> {
    if rules.is_empty() {
        return Err(MatchError::InvalidArgument("at least one match rule is required".into()));
    }

    match op {
        LogicalOperator::And => {
            for rule in rules {
                if !rule_matches(left, right, rule)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        LogicalOperator::Or => {
            for rule in rules {
                if rule_matches(left, right, rule)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

/// Check a rule set before any record is visited.
pub fn validate_rules(rules: &[MatchRule]) -> Result<(), MatchError> {
    if rules.is_empty() {
        return Err(MatchError::InvalidArgument("at least one match rule is required".into()));
    }
    rules.iter().try_for_each(MatchRule::validate)
}

fn string_operand<'a>(field: &str, value: Option<&'a Value>) -> Result<&'a str, MatchError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(MatchError::TypeMismatch {
            field: field.to_string(),
            found: other.type_name(),
        }),
        None => Err(MatchError::TypeMismatch {
            field: field.to_string(),
            found: "absent",
        }),
    }
}

/// `[start, end)` in chars, clamped to the string length.
fn char_slice(s: &str, range: SubstringRange) -> &str {
    let byte_at = |n: usize| s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len());
    let start = byte_at(range.start);
    let end = byte_at(range.end).max(start);
    &s[start..end]
}

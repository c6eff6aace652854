//! Two-collection combinators built on the comparator.
//!
//! Every combinator validates its rules before visiting a record and returns
//! either a complete new collection or an error, never a partial result.
//! Pairwise combinators iterate left-major, right-minor.

use crate::error::MatchError;
use crate::matcher::{records_match, validate_rules};
use crate::model::{exact_rules, Collection, LogicalOperator, MatchRule, MergeField, Record};

/// Matched and unmatched target records from one pass over a reference set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub matched: Collection,
    pub unmatched: Collection,
}

/// Shallow union: `left`'s fields, overwritten and extended by `right`'s.
pub fn merge_records(left: &Record, right: &Record) -> Record {
    let mut merged = left.clone();
    for (k, v) in right {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

/// Copy of `left` with each merge field taken from `right`.
/// A source absent on `right` leaves the target absent.
fn add_keys(left: &Record, right: &Record, merge: &[MergeField]) -> Record {
    let mut merged = left.clone();
    for field in merge {
        match right.get(&field.source) {
            Some(v) => {
                merged.insert(field.target.clone(), v.clone());
            }
            None => {
                merged.shift_remove(&field.target);
            }
        }
    }
    merged
}

/// Emit `build(l, r)` for every pair whose match result equals `want`.
fn pairwise<F>(
    left: &[Record],
    right: &[Record],
    rules: &[MatchRule],
    op: LogicalOperator,
    want: bool,
    build: F,
) -> Result<Collection, MatchError>
where
    F: Fn(&Record, &Record) -> Record,
{
    validate_rules(rules)?;

    let mut out = Vec::new();
    for l in left {
        for r in right {
            if records_match(l, r, rules, op)? == want {
                out.push(build(l, r));
            }
        }
    }
    Ok(out)
}

/// Whether any reference record matches `target`.
fn exists_match(
    target: &Record,
    reference: &[Record],
    rules: &[MatchRule],
    op: LogicalOperator,
) -> Result<bool, MatchError> {
    for r in reference {
        if records_match(target, r, rules, op)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// One merged record per matching (left, right) pair; right overwrites left.
pub fn match_and_merge<S: AsRef<str>>(
    left: &[Record],
    right: &[Record],
    fields: &[S],
    op: LogicalOperator,
) -> Result<Collection, MatchError> {
    let out = pairwise(left, right, &exact_rules(fields), op, true, merge_records)?;
    log::debug!(
        "match_and_merge({op}): {}x{} pairs -> {} merged",
        left.len(),
        right.len(),
        out.len()
    );
    Ok(out)
}

/// One record per matching pair: a copy of left plus the renamed merge fields
/// from right. Rules may be exact or substring.
pub fn match_and_add_keys(
    left: &[Record],
    right: &[Record],
    rules: &[MatchRule],
    merge: &[MergeField],
    op: LogicalOperator,
) -> Result<Collection, MatchError> {
    let out = pairwise(left, right, rules, op, true, |l, r| add_keys(l, r, merge))?;
    log::debug!(
        "match_and_add_keys({op}): {}x{} pairs -> {} merged, {} merge fields",
        left.len(),
        right.len(),
        out.len(),
        merge.len()
    );
    Ok(out)
}

/// One merged record per *non*-matching (left, right) pair.
pub fn unmatch_and_merge<S: AsRef<str>>(
    left: &[Record],
    right: &[Record],
    fields: &[S],
    op: LogicalOperator,
) -> Result<Collection, MatchError> {
    let out = pairwise(left, right, &exact_rules(fields), op, false, merge_records)?;
    log::debug!(
        "unmatch_and_merge({op}): {}x{} pairs -> {} merged",
        left.len(),
        right.len(),
        out.len()
    );
    Ok(out)
}

/// Split `target` into records matched by some `reference` record and the rest.
pub fn partition_by_match<S: AsRef<str>>(
    reference: &[Record],
    target: &[Record],
    fields: &[S],
    op: LogicalOperator,
) -> Result<Partition, MatchError> {
    let rules = exact_rules(fields);
    validate_rules(&rules)?;

    let mut partition = Partition::default();
    for t in target {
        if exists_match(t, reference, &rules, op)? {
            partition.matched.push(t.clone());
        } else {
            partition.unmatched.push(t.clone());
        }
    }
    log::debug!(
        "partition_by_match({op}): {} target records -> {} matched, {} unmatched",
        target.len(),
        partition.matched.len(),
        partition.unmatched.len()
    );
    Ok(partition)
}

/// Target records matched by at least one reference record, in target order.
pub fn create_new_by_match<S: AsRef<str>>(
    reference: &[Record],
    target: &[Record],
    fields: &[S],
    op: LogicalOperator,
) -> Result<Collection, MatchError> {
    Ok(partition_by_match(reference, target, fields, op)?.matched)
}

/// Target records matched by no reference record, in target order.
pub fn unmatch_and_create_new<S: AsRef<str>>(
    reference: &[Record],
    target: &[Record],
    fields: &[S],
    op: LogicalOperator,
) -> Result<Collection, MatchError> {
    Ok(partition_by_match(reference, target, fields, op)?.unmatched)
}

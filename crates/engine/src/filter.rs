//! Key/value filters over a single collection.

use crate::model::{Collection, KeyValue, LogicalOperator, Record};

/// A pair matches when the field is present and strictly equal to the value.
fn pair_matches(record: &Record, pair: &KeyValue) -> bool {
    record.get(&pair.field) == Some(&pair.value)
}

/// Whether `record` is selected by `pairs` under `op`.
///
/// OR: at least one pair matches. AND: every pair matches.
pub fn record_selected(record: &Record, pairs: &[KeyValue], op: LogicalOperator) -> bool {
    match op {
        LogicalOperator::Or => pairs.iter().any(|p| pair_matches(record, p)),
        LogicalOperator::And => pairs.iter().all(|p| pair_matches(record, p)),
    }
}

/// Records selected by `pairs`, in input order.
pub fn keep_by_key_value(records: &[Record], pairs: &[KeyValue], op: LogicalOperator) -> Collection {
    let kept: Collection = records
        .iter()
        .filter(|r| record_selected(r, pairs, op))
        .cloned()
        .collect();
    log::debug!("keep_by_key_value({op}): {} of {} records kept", kept.len(), records.len());
    kept
}

/// Records *not* selected by `pairs`, in input order. Complement of `keep_by_key_value`.
pub fn remove_by_key_value(records: &[Record], pairs: &[KeyValue], op: LogicalOperator) -> Collection {
    let kept: Collection = records
        .iter()
        .filter(|r| !record_selected(r, pairs, op))
        .cloned()
        .collect();
    log::debug!("remove_by_key_value({op}): {} of {} records kept", kept.len(), records.len());
    kept
}

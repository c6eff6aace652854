//! Single-collection utilities. All return new collections; inputs are untouched.

use crate::model::{Collection, Record, Rename, Value};

/// Apply each rename to every record holding the `from` field. The value keeps
/// its position; a pre-existing `to` field is replaced.
pub fn rename_keys(records: &[Record], renames: &[Rename]) -> Collection {
    records.iter().map(|r| rename_record(r, renames)).collect()
}

fn rename_record(record: &Record, renames: &[Rename]) -> Record {
    let mut out = record.clone();
    for rename in renames {
        if rename.from == rename.to {
            continue;
        }
        let Some(mut idx) = out.get_index_of(&rename.from) else {
            continue;
        };
        let Some((_, value)) = out.shift_remove_index(idx) else {
            continue;
        };
        // an existing `to` is dropped; the value stays in `from`'s slot
        if let Some(existing) = out.get_index_of(&rename.to) {
            out.shift_remove_index(existing);
            if existing < idx {
                idx -= 1;
            }
        }
        out.shift_insert(idx, rename.to.clone(), value);
    }
    out
}

/// Drop the named fields from every record.
pub fn strip_keys<S: AsRef<str>>(records: &[Record], fields: &[S]) -> Collection {
    records
        .iter()
        .map(|r| {
            r.iter()
                .filter(|(k, _)| !fields.iter().any(|f| f.as_ref() == k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Record>()
        })
        .collect()
}

/// Reduce every record to the named fields it holds, in the record's own order.
pub fn select_keys<S: AsRef<str>>(records: &[Record], fields: &[S]) -> Collection {
    records
        .iter()
        .map(|r| {
            r.iter()
                .filter(|(k, _)| fields.iter().any(|f| f.as_ref() == k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Record>()
        })
        .collect()
}

/// `values` without any element strictly equal to one in `unwanted`.
pub fn remove_by_value(values: &[Value], unwanted: &[Value]) -> Vec<Value> {
    values.iter().filter(|v| !unwanted.contains(v)).cloned().collect()
}

/// First occurrence of each value, in order. `NaN` never equals a previous
/// occurrence, so every `NaN` is dropped.
pub fn dedupe_values(values: &[Value]) -> Vec<Value> {
    values
        .iter()
        .enumerate()
        .filter(|(i, v)| values.iter().position(|x| x == *v) == Some(*i))
        .map(|(_, v)| v.clone())
        .collect()
}

/// First occurrence of each structurally equal record, in order.
pub fn dedupe_records(records: &[Record]) -> Collection {
    let mut out: Collection = Vec::with_capacity(records.len());
    for r in records {
        if !out.contains(r) {
            out.push(r.clone());
        }
    }
    if out.len() < records.len() {
        log::debug!("dedupe_records: dropped {} duplicates", records.len() - out.len());
    }
    out
}

use std::collections::BTreeMap;

use crate::error::KeymatchError;
use crate::model::{ComparisonResult, Keyed};

/// Precondition for every comparison: equal key arity. Key field *names*
/// are not compared — collections keyed by differently named but
/// positionally corresponding fields are comparable.
pub fn comparable(left: &dyn Keyed, right: &dyn Keyed) -> Result<(), KeymatchError> {
    let (l, r) = (left.key_fields().len(), right.key_fields().len());
    if l != r {
        return Err(KeymatchError::KeyArityMismatch { left: l, right: r });
    }
    Ok(())
}

/// Keys present in both collections; the stored record comes from `right`.
/// An inner join projected onto the right side.
pub fn match_records(
    left: &dyn Keyed,
    right: &dyn Keyed,
) -> Result<ComparisonResult, KeymatchError> {
    comparable(left, right)?;
    let mut mapped = BTreeMap::new();
    for key in left.records().keys() {
        if let Some(record) = right.records().get(key) {
            mapped.insert(key.clone(), record.clone());
        }
    }
    Ok(ComparisonResult::from_mapped(mapped))
}

/// Keys present in `left` but absent from `right`, with `left`'s records.
/// A left anti-join.
pub fn diff_records(
    left: &dyn Keyed,
    right: &dyn Keyed,
) -> Result<ComparisonResult, KeymatchError> {
    comparable(left, right)?;
    let mut mapped = BTreeMap::new();
    for (key, record) in left.records() {
        if !right.records().contains_key(key) {
            mapped.insert(key.clone(), record.clone());
        }
    }
    Ok(ComparisonResult::from_mapped(mapped))
}

/// For each key present in both collections, `left`'s record overlaid with
/// only the named fields taken from `right`'s record. Named fields are
/// overwritten in place, or appended when `left` lacks them; everything
/// else is untouched. A named field absent from `right`'s matched record
/// is a hard error, not a silent skip.
pub fn merge_records(
    left: &dyn Keyed,
    right: &dyn Keyed,
    fields: &[String],
) -> Result<ComparisonResult, KeymatchError> {
    comparable(left, right)?;
    let mut mapped = BTreeMap::new();
    for (key, record) in left.records() {
        let Some(other) = right.records().get(key) else {
            continue;
        };
        let mut merged = record.clone();
        for field in fields {
            let value = other
                .get(field)
                .ok_or_else(|| KeymatchError::UnknownMergeField { field: field.clone() })?;
            merged.insert(field.clone(), value.clone());
        }
        mapped.insert(key.clone(), merged);
    }
    Ok(ComparisonResult::from_mapped(mapped))
}

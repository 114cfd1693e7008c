//! Delta Selector: pure key-set difference that makes repeated runs
//! incremental and idempotent. Storage-agnostic by design.

use std::collections::HashSet;

/// Retain the records whose key has not previously been committed. An
/// empty committed set (first run, or the store does not exist yet) passes
/// the whole batch through.
pub fn select_new<T, F>(batch: Vec<T>, committed: &HashSet<i64>, key: F) -> Vec<T>
where
    F: Fn(&T) -> i64,
{
    batch
        .into_iter()
        .filter(|record| !committed.contains(&key(record)))
        .collect()
}

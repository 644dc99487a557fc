use std::collections::BTreeMap;

use crate::entry::Entry;

/// Count votes per candidate. Genesis carries no ballot and is skipped.
pub fn tally(entries: &[Entry]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for ballot in entries.iter().filter_map(Entry::ballot) {
        *counts.entry(ballot.candidate().to_string()).or_insert(0) += 1;
    }
    counts
}

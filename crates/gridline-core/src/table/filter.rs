// ── Search filter ──

use std::sync::Arc;

use super::sort::{SortSpec, sort_records};
use crate::model::Record;

/// Whether any searchable field contains `term_lower`.
///
/// `term_lower` must already be lower-cased. The empty term matches
/// every record.
pub fn matches<T: Record>(record: &T, term_lower: &str, searchable: &[String]) -> bool {
    if term_lower.is_empty() {
        return true;
    }
    searchable.iter().any(|name| {
        record
            .field(name)
            .is_some_and(|v| v.to_string().to_lowercase().contains(term_lower))
    })
}

/// Filter by the settled term, then apply the optional sort.
pub fn filter_and_sort<T: Record>(
    data: &[Arc<T>],
    settled_term: &str,
    searchable: &[String],
    sort: Option<&SortSpec>,
) -> Vec<Arc<T>> {
    let term = settled_term.to_lowercase();
    let mut rows: Vec<Arc<T>> = data
        .iter()
        .filter(|r| matches(r.as_ref(), &term, searchable))
        .cloned()
        .collect();
    if let Some(spec) = sort {
        sort_records(&mut rows, spec);
    }
    rows
}

//! Query-matching predicate for work items
//!
//! A work item satisfies a query identifier when every constraint the
//! identifier carries is an exact match; attributes the identifier leaves
//! absent or empty are unconstrained. The rule set is fully conjunctive
//! and short-circuits in the order listed in [`matches`]; new rules are
//! added as further conjuncts.

use dicom_dictionary_std::tags;
use dicom_object::InMemDicomObject;

use crate::registry::{WorkItem, WorkItemRegistry};

/// Effective machine name of a dataset
///
/// The Code Value of the first item of the Scheduled Station Name Code
/// Sequence; `None` when the sequence is absent or empty.
pub fn scheduled_station_name(ds: &InMemDicomObject) -> Option<String> {
    let seq = ds
        .element(tags::SCHEDULED_STATION_NAME_CODE_SEQUENCE)
        .ok()?;
    let item = seq.value().items()?.first()?;
    let code_value = item.element(tags::CODE_VALUE).ok()?.to_str().ok()?;
    let code_value = code_value.trim();
    if code_value.is_empty() {
        None
    } else {
        Some(code_value.to_string())
    }
}

/// Procedure step state token of a dataset, `None` when absent or empty
pub fn procedure_step_state(ds: &InMemDicomObject) -> Option<String> {
    let state = ds.element(tags::PROCEDURE_STEP_STATE).ok()?.to_str().ok()?;
    let state = state.trim();
    if state.is_empty() {
        None
    } else {
        Some(state.to_string())
    }
}

fn station_name_matches(query: &InMemDicomObject, ups: &InMemDicomObject) -> bool {
    match scheduled_station_name(query) {
        Some(requested) => scheduled_station_name(ups).as_deref() == Some(requested.as_str()),
        None => true,
    }
}

fn step_state_matches(query: &InMemDicomObject, ups: &InMemDicomObject) -> bool {
    match procedure_step_state(query) {
        // Case-sensitive token equality
        Some(requested) => procedure_step_state(ups).as_deref() == Some(requested.as_str()),
        None => true,
    }
}

/// Whether a work-item dataset satisfies a query identifier
pub fn matches(query: &InMemDicomObject, ups: &InMemDicomObject) -> bool {
    if !station_name_matches(query, ups) {
        return false;
    }
    if !step_state_matches(query, ups) {
        return false;
    }
    // TODO: scheduled datetime range matching, and the Scheduled Workitem
    // Code Sequence code value (e.g. 121726 "RT Treatment with Internal
    // Verification") once requesters start constraining on them
    true
}

/// Matching work items, in registry snapshot order
///
/// Lazy over a snapshot of the live registry: the sequence is finite,
/// re-evaluates against the registry on every call, and is safe to
/// partially consume.
pub fn search<'a>(
    registry: &WorkItemRegistry,
    query: &'a InMemDicomObject,
) -> impl Iterator<Item = WorkItem> + 'a {
    registry
        .all()
        .into_iter()
        .filter(move |item| matches(query, item.dataset()))
}

/// Number of work items matching the query
///
/// Consistent with [`search`] (same predicate, same snapshot semantics)
/// but computed independently.
pub fn count(registry: &WorkItemRegistry, query: &InMemDicomObject) -> usize {
    search(registry, query).count()
}

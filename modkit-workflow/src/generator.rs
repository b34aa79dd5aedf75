//! Edge generation from transition rules.

use crate::TransitionRule;
use modkit_core::{IssueStatusId, NewWorkflowTransition, RoleId, TrackerId};
use std::collections::BTreeSet;

/// Edges described by `rule` over the status `universe`.
///
/// Self-loops are never produced, whatever the rule says. Duplicate keys in
/// the inputs collapse into one edge.
pub fn edges<S: Copy + Ord>(rule: &TransitionRule<S>, universe: &[S]) -> BTreeSet<(S, S)> {
    match rule {
        TransitionRule::AllPairs => cross(universe, universe),
        TransitionRule::Cross { from, to } => cross(from, to),
        TransitionRule::Single { from, to } => cross(&[*from], &[*to]),
    }
}

fn cross<S: Copy + Ord>(from: &[S], to: &[S]) -> BTreeSet<(S, S)> {
    from.iter()
        .flat_map(|s| to.iter().map(move |t| (*s, *t)))
        .filter(|(s, t)| s != t)
        .collect()
}

/// Transition records for one (tracker, role) pair, ordered by
/// (old status, new status).
pub fn generate(
    tracker: TrackerId,
    role: RoleId,
    rule: &TransitionRule<IssueStatusId>,
    statuses: &[IssueStatusId],
) -> Vec<NewWorkflowTransition> {
    edges(rule, statuses)
        .into_iter()
        .map(|(old_status_id, new_status_id)| NewWorkflowTransition {
            tracker_id: tracker,
            role_id: role,
            old_status_id,
            new_status_id,
        })
        .collect()
}

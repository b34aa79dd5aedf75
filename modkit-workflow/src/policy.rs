//! Declarative policy tables.
//!
//! A policy table lists `(tracker, role, rule)` records in terms of symbolic
//! keys. Evaluating it against a [`PolicyResolver`] maps the keys to stored
//! ids and expands every rule into transition records. Rules for the same
//! (tracker, role) pair are not merged: if two of them produce the same edge
//! the store's uniqueness check rejects the second copy.

use crate::{generate, TransitionRule};
use modkit_core::{ConfigError, IssueStatusId, NewWorkflowTransition, RoleId, TrackerId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One rule scoped to a tracker and a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionPolicy<T, R, S> {
    pub tracker: T,
    pub role: R,
    pub rule: TransitionRule<S>,
}

/// Maps the symbolic keys of a policy table to stored ids.
pub trait PolicyResolver<T, R, S> {
    fn tracker_id(&self, key: T) -> Option<TrackerId>;

    fn role_id(&self, key: R) -> Option<RoleId>;

    fn status_id(&self, key: S) -> Option<IssueStatusId>;

    /// Every status id, in position order. All-pairs rules range over this.
    fn status_universe(&self) -> Vec<IssueStatusId>;
}

/// Ordered list of transition policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTable<T, R, S> {
    policies: Vec<TransitionPolicy<T, R, S>>,
}

impl<T, R, S> Default for PolicyTable<T, R, S> {
    fn default() -> Self {
        Self {
            policies: Vec::new(),
        }
    }
}

impl<T, R, S> PolicyTable<T, R, S>
where
    T: Copy + PartialEq + fmt::Debug,
    R: Copy + PartialEq + fmt::Debug,
    S: Copy + PartialEq + fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule for `(tracker, role)`.
    pub fn rule(mut self, tracker: T, role: R, rule: TransitionRule<S>) -> Self {
        self.policies.push(TransitionPolicy { tracker, role, rule });
        self
    }

    /// Append the same rule for every tracker in `trackers`.
    pub fn rule_for_each(
        mut self,
        trackers: impl IntoIterator<Item = T>,
        role: R,
        rule: TransitionRule<S>,
    ) -> Self {
        for tracker in trackers {
            self.policies.push(TransitionPolicy {
                tracker,
                role,
                rule: rule.clone(),
            });
        }
        self
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransitionPolicy<T, R, S>> {
        self.policies.iter()
    }

    /// Policies declared for one (tracker, role) pair.
    pub fn for_pair(
        &self,
        tracker: T,
        role: R,
    ) -> impl Iterator<Item = &TransitionPolicy<T, R, S>> {
        self.policies
            .iter()
            .filter(move |p| p.tracker == tracker && p.role == role)
    }

    /// Structural check of every rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for policy in &self.policies {
            policy.rule.validate().map_err(|e| {
                ConfigError::invalid_rule(format!(
                    "{:?}/{:?}: {}",
                    policy.tracker,
                    policy.role,
                    rule_reason(e)
                ))
            })?;
        }
        Ok(())
    }

    /// Resolve and expand every policy, in table order.
    ///
    /// Fails with `InvalidRule` if a key has no stored counterpart. The
    /// table is validated first, so a malformed rule fails before any key
    /// is looked up.
    pub fn evaluate<P>(&self, resolver: &P) -> Result<Vec<NewWorkflowTransition>, ConfigError>
    where
        P: PolicyResolver<T, R, S>,
    {
        self.validate()?;
        let universe = resolver.status_universe();
        let mut transitions = Vec::new();

        for policy in &self.policies {
            let tracker = resolver.tracker_id(policy.tracker).ok_or_else(|| {
                ConfigError::invalid_rule(format!("unknown tracker {:?}", policy.tracker))
            })?;
            let role = resolver.role_id(policy.role).ok_or_else(|| {
                ConfigError::invalid_rule(format!("unknown role {:?}", policy.role))
            })?;
            let rule = policy.rule.resolve(|key| {
                resolver
                    .status_id(key)
                    .ok_or_else(|| ConfigError::invalid_rule(format!("unknown status {:?}", key)))
            })?;

            let generated = generate(tracker, role, &rule, &universe);
            tracing::debug!(
                tracker = ?policy.tracker,
                role = ?policy.role,
                shape = rule.shape(),
                edges = generated.len(),
                "expanded transition policy"
            );
            transitions.extend(generated);
        }

        Ok(transitions)
    }
}

fn rule_reason(err: ConfigError) -> String {
    match err {
        ConfigError::InvalidRule { reason } => reason,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit_core::EntityIdType;
    use std::collections::BTreeSet;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tr {
        Bug,
        Task,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Ro {
        Lead,
        Dev,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum St {
        Open,
        Doing,
        Done,
        Orphan,
    }

    struct Fixed;

    impl PolicyResolver<Tr, Ro, St> for Fixed {
        fn tracker_id(&self, key: Tr) -> Option<TrackerId> {
            Some(TrackerId::new(key as i64 + 1))
        }

        fn role_id(&self, key: Ro) -> Option<RoleId> {
            Some(RoleId::new(key as i64 + 1))
        }

        fn status_id(&self, key: St) -> Option<IssueStatusId> {
            match key {
                St::Orphan => None,
                other => Some(IssueStatusId::new(other as i64 + 1)),
            }
        }

        fn status_universe(&self) -> Vec<IssueStatusId> {
            (1..=3).map(IssueStatusId::new).collect()
        }
    }

    fn table() -> PolicyTable<Tr, Ro, St> {
        PolicyTable::new()
            .rule_for_each([Tr::Bug, Tr::Task], Ro::Lead, TransitionRule::all_pairs())
            .rule(Tr::Bug, Ro::Dev, TransitionRule::single(St::Open, St::Doing))
            .rule(
                Tr::Bug,
                Ro::Dev,
                TransitionRule::cross([St::Doing], [St::Open, St::Done]),
            )
    }

    #[test]
    fn test_evaluate_expands_in_table_order() {
        let transitions = table().evaluate(&Fixed).unwrap();
        // 6 + 6 all-pairs edges, then 1 + 2 for the developer.
        assert_eq!(transitions.len(), 15);
        assert_eq!(transitions[0].tracker_id, TrackerId::new(1));
        assert_eq!(transitions[6].tracker_id, TrackerId::new(2));
        assert_eq!(transitions[12].role_id, RoleId::new(2));
    }

    #[test]
    fn test_for_pair_filters() {
        let table = table();
        assert_eq!(table.for_pair(Tr::Bug, Ro::Dev).count(), 2);
        assert_eq!(table.for_pair(Tr::Task, Ro::Dev).count(), 0);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_unknown_status_key_fails() {
        let table = PolicyTable::new().rule(
            Tr::Task,
            Ro::Dev,
            TransitionRule::single(St::Open, St::Orphan),
        );
        let err = table.evaluate(&Fixed).unwrap_err();
        assert!(err.to_string().contains("unknown status Orphan"));
    }

    #[test]
    fn test_malformed_rule_reported_with_pair() {
        let table = PolicyTable::new().rule(
            Tr::Task,
            Ro::Dev,
            TransitionRule::cross(Vec::new(), [St::Done]),
        );
        let err = table.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Task/Dev"));
        assert!(msg.contains("empty from-set"));
    }

    #[test]
    fn test_overlapping_rules_are_not_merged() {
        let table = PolicyTable::new()
            .rule(Tr::Bug, Ro::Dev, TransitionRule::single(St::Open, St::Done))
            .rule(Tr::Bug, Ro::Dev, TransitionRule::cross([St::Open], [St::Done]));
        let transitions = table.evaluate(&Fixed).unwrap();
        assert_eq!(transitions.len(), 2);
        let unique: BTreeSet<_> = transitions.iter().copied().collect();
        assert_eq!(unique.len(), 1);
    }
}

//! Default workflow policies.

use crate::seed::{RoleKey, StatusKey, TrackerKey};
use modkit_workflow::{PolicyTable, TransitionRule};

pub type SeedPolicyTable = PolicyTable<TrackerKey, RoleKey, StatusKey>;

/// Transition policies applied by a default bootstrap.
pub fn default_policies() -> SeedPolicyTable {
    use StatusKey::*;

    PolicyTable::new()
        .rule_for_each(TrackerKey::ALL, RoleKey::Admin, TransitionRule::all_pairs())
        // Tickets
        .rule(
            TrackerKey::Ticket,
            RoleKey::Moderator,
            TransitionRule::cross(
                [New, InProgress, Duplicate, Invalid],
                [InProgress, Closed, Duplicate, Invalid],
            ),
        )
        .rule(
            TrackerKey::Ticket,
            RoleKey::Moderator,
            TransitionRule::single(Applied, InProgress),
        )
        .rule(
            TrackerKey::Ticket,
            RoleKey::Trainee,
            TransitionRule::single(New, InProgress),
        )
        .rule(
            TrackerKey::Ticket,
            RoleKey::Automation,
            TransitionRule::cross([Closed], [Applied, InProgress]),
        )
        // Incidents
        .rule(
            TrackerKey::Incident,
            RoleKey::Moderator,
            TransitionRule::single(New, InProgress),
        )
        .rule(
            TrackerKey::Incident,
            RoleKey::Moderator,
            TransitionRule::cross([InProgress], [New, Closed]),
        )
        .rule(
            TrackerKey::Incident,
            RoleKey::Moderator,
            TransitionRule::single(Closed, InProgress),
        )
        // Appeals
        .rule(
            TrackerKey::Appeal,
            RoleKey::Moderator,
            TransitionRule::single(New, InProgress),
        )
        .rule(
            TrackerKey::Appeal,
            RoleKey::Moderator,
            TransitionRule::cross([InProgress], [New, Invalid, Granted, Denied]),
        )
        .rule(
            TrackerKey::Appeal,
            RoleKey::Moderator,
            TransitionRule::cross([Invalid, Granted, Denied], [InProgress]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit_workflow::edges;

    fn edge_count(table: &SeedPolicyTable, tracker: TrackerKey, role: RoleKey) -> usize {
        table
            .for_pair(tracker, role)
            .map(|p| edges(&p.rule, &StatusKey::ALL).len())
            .sum()
    }

    #[test]
    fn test_default_table_is_valid() {
        assert!(default_policies().validate().is_ok());
    }

    #[test]
    fn test_edge_counts_per_pair() {
        let table = default_policies();
        assert_eq!(edge_count(&table, TrackerKey::Ticket, RoleKey::Admin), 72);
        // 4 x 4 minus the three shared statuses, plus Applied -> In progress
        assert_eq!(edge_count(&table, TrackerKey::Ticket, RoleKey::Moderator), 14);
        assert_eq!(edge_count(&table, TrackerKey::Ticket, RoleKey::Trainee), 1);
        assert_eq!(edge_count(&table, TrackerKey::Ticket, RoleKey::Automation), 2);
        assert_eq!(edge_count(&table, TrackerKey::Incident, RoleKey::Moderator), 4);
        assert_eq!(edge_count(&table, TrackerKey::Appeal, RoleKey::Moderator), 8);
        assert_eq!(edge_count(&table, TrackerKey::Appeal, RoleKey::Trainee), 0);
    }

    #[test]
    fn test_no_overlap_within_a_pair() {
        let table = default_policies();
        for tracker in TrackerKey::ALL {
            for role in RoleKey::ALL {
                let mut seen = std::collections::BTreeSet::new();
                for policy in table.for_pair(tracker, role) {
                    for edge in edges(&policy.rule, &StatusKey::ALL) {
                        assert!(seen.insert(edge), "{:?}/{:?} repeats {:?}", tracker, role, edge);
                    }
                }
            }
        }
    }
}

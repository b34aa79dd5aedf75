//! Empty-store check run before any bootstrap write.
//!
//! Recomputed on every call. The orchestrator evaluates it inside the
//! transaction that performs the writes, so the answer holds for the whole
//! run.

use modkit_core::{BuiltinRole, EntityKind, StoreResult};
use modkit_storage::StoreQueries;

/// Tables that must be empty, besides the given roles.
const GUARDED_TABLES: [EntityKind; 4] = [
    EntityKind::Tracker,
    EntityKind::IssueStatus,
    EntityKind::Enumeration,
    EntityKind::Query,
];

/// First table that shows configuration data is already present.
pub fn first_populated<Q>(store: &Q) -> StoreResult<Option<EntityKind>>
where
    Q: StoreQueries + ?Sized,
{
    if store.role_exists(BuiltinRole::Given)? {
        return Ok(Some(EntityKind::Role));
    }
    for kind in GUARDED_TABLES {
        if store.exists(kind)? {
            return Ok(Some(kind));
        }
    }
    Ok(None)
}

/// True only if no given role, tracker, status, priority or query exists.
pub fn is_empty<Q>(store: &Q) -> StoreResult<bool>
where
    Q: StoreQueries + ?Sized,
{
    Ok(first_populated(store)?.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit_core::{NewIssuePriority, NewRole};
    use modkit_storage::{EntityStore, InMemoryStore, Transaction, TransactionalStore};

    #[test]
    fn test_fresh_store_is_empty() {
        let store = InMemoryStore::new();
        assert!(is_empty(&store).unwrap());
        assert_eq!(first_populated(&store).unwrap(), None);
    }

    #[test]
    fn test_builtin_roles_do_not_count() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.create_role(NewRole::new("Non member", 1).with_builtin(BuiltinRole::NonMember))
            .unwrap();
        tx.create_role(NewRole::new("Anonymous", 2).with_builtin(BuiltinRole::Anonymous))
            .unwrap();
        tx.commit().unwrap();
        assert!(is_empty(&store).unwrap());
    }

    #[test]
    fn test_given_role_blocks() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.create_role(NewRole::new("Reporter", 1)).unwrap();
        tx.commit().unwrap();
        assert_eq!(first_populated(&store).unwrap(), Some(EntityKind::Role));
    }

    #[test]
    fn test_priority_blocks() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.create_priority(NewIssuePriority {
            name: "Normal".to_string(),
            position: 1,
            is_default: true,
        })
        .unwrap();
        assert!(!is_empty(&tx).unwrap());
        tx.commit().unwrap();
        assert_eq!(first_populated(&store).unwrap(), Some(EntityKind::Enumeration));
    }

    #[test]
    fn test_groups_alone_do_not_block() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.create_group("Admins").unwrap();
        tx.commit().unwrap();
        assert!(is_empty(&store).unwrap());
    }
}

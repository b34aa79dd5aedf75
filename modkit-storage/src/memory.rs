//! In-memory entity store with an atomic scope.
//!
//! A transaction holds the store's write lock for its whole lifetime and
//! works on a private copy of the tables. `commit` swaps the copy in;
//! dropping the transaction discards it. Holding the write lock serializes
//! transactions, so a check made inside one stays valid until it ends.

use crate::{EntityStore, StoreQueries, Tables, Transaction, TransactionalStore};
use modkit_core::{
    BuiltinRole, CustomField, EntityKind, Group, GroupId, GroupUser, IssuePriority, IssueStatus,
    Member, NewCustomField, NewIssuePriority, NewIssueStatus, NewMember, NewProject, NewQuery,
    NewRole, NewTracker, NewUser, NewWebhook, NewWorkflowTransition, Project, Query, Role,
    Setting, StoreError, StoreResult, Tracker, User, UserId, Webhook, WorkflowTransition,
};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Validating in-memory store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding previously saved tables.
    pub fn from_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Copy of the committed tables.
    pub fn tables(&self) -> StoreResult<Tables> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl StoreQueries for InMemoryStore {
    fn count(&self, kind: EntityKind) -> StoreResult<usize> {
        self.read()?.count(kind)
    }

    fn role_exists(&self, builtin: BuiltinRole) -> StoreResult<bool> {
        self.read()?.role_exists(builtin)
    }

    fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        StoreQueries::user(&*self.read()?, id)
    }

    fn roles(&self) -> StoreResult<Vec<Role>> {
        self.read()?.roles()
    }

    fn groups(&self) -> StoreResult<Vec<Group>> {
        self.read()?.groups()
    }

    fn group_users(&self) -> StoreResult<Vec<GroupUser>> {
        self.read()?.group_users()
    }

    fn statuses(&self) -> StoreResult<Vec<IssueStatus>> {
        self.read()?.statuses()
    }

    fn trackers(&self) -> StoreResult<Vec<Tracker>> {
        self.read()?.trackers()
    }

    fn transitions(&self) -> StoreResult<Vec<WorkflowTransition>> {
        self.read()?.transitions()
    }

    fn priorities(&self) -> StoreResult<Vec<IssuePriority>> {
        self.read()?.priorities()
    }

    fn queries(&self) -> StoreResult<Vec<Query>> {
        self.read()?.queries()
    }

    fn custom_fields(&self) -> StoreResult<Vec<CustomField>> {
        self.read()?.custom_fields()
    }

    fn users(&self) -> StoreResult<Vec<User>> {
        self.read()?.users()
    }

    fn projects(&self) -> StoreResult<Vec<Project>> {
        self.read()?.projects()
    }

    fn members(&self) -> StoreResult<Vec<Member>> {
        self.read()?.members()
    }

    fn webhooks(&self) -> StoreResult<Vec<Webhook>> {
        self.read()?.webhooks()
    }

    fn settings(&self) -> StoreResult<Vec<Setting>> {
        self.read()?.settings()
    }
}

impl TransactionalStore for InMemoryStore {
    type Tx<'a> = MemoryTransaction<'a>;

    fn begin(&self) -> StoreResult<Self::Tx<'_>> {
        let guard = self.write()?;
        let working = guard.clone();
        tracing::debug!("store transaction opened");
        Ok(MemoryTransaction {
            guard,
            working,
            writes: 0,
            committed: false,
        })
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

/// Open atomic scope over an [`InMemoryStore`].
pub struct MemoryTransaction<'a> {
    guard: RwLockWriteGuard<'a, Tables>,
    working: Tables,
    writes: usize,
    committed: bool,
}

impl MemoryTransaction<'_> {
    /// Number of records written in this scope so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn record<T>(&mut self, result: StoreResult<T>) -> StoreResult<T> {
        match &result {
            Ok(_) => self.writes += 1,
            Err(e) => tracing::debug!(error = %e, "store write rejected"),
        }
        result
    }
}

impl std::fmt::Debug for MemoryTransaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransaction")
            .field("writes", &self.writes)
            .field("committed", &self.committed)
            .finish()
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            tracing::debug!(discarded = self.writes, "store transaction rolled back");
        }
    }
}

impl Transaction for MemoryTransaction<'_> {
    fn commit(mut self) -> StoreResult<()> {
        *self.guard = std::mem::take(&mut self.working);
        self.committed = true;
        tracing::debug!(writes = self.writes, "store transaction committed");
        Ok(())
    }
}

impl StoreQueries for MemoryTransaction<'_> {
    fn count(&self, kind: EntityKind) -> StoreResult<usize> {
        self.working.count(kind)
    }

    fn role_exists(&self, builtin: BuiltinRole) -> StoreResult<bool> {
        self.working.role_exists(builtin)
    }

    fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        StoreQueries::user(&self.working, id)
    }

    fn roles(&self) -> StoreResult<Vec<Role>> {
        self.working.roles()
    }

    fn groups(&self) -> StoreResult<Vec<Group>> {
        self.working.groups()
    }

    fn group_users(&self) -> StoreResult<Vec<GroupUser>> {
        self.working.group_users()
    }

    fn statuses(&self) -> StoreResult<Vec<IssueStatus>> {
        self.working.statuses()
    }

    fn trackers(&self) -> StoreResult<Vec<Tracker>> {
        self.working.trackers()
    }

    fn transitions(&self) -> StoreResult<Vec<WorkflowTransition>> {
        self.working.transitions()
    }

    fn priorities(&self) -> StoreResult<Vec<IssuePriority>> {
        self.working.priorities()
    }

    fn queries(&self) -> StoreResult<Vec<Query>> {
        self.working.queries()
    }

    fn custom_fields(&self) -> StoreResult<Vec<CustomField>> {
        self.working.custom_fields()
    }

    fn users(&self) -> StoreResult<Vec<User>> {
        self.working.users()
    }

    fn projects(&self) -> StoreResult<Vec<Project>> {
        self.working.projects()
    }

    fn members(&self) -> StoreResult<Vec<Member>> {
        self.working.members()
    }

    fn webhooks(&self) -> StoreResult<Vec<Webhook>> {
        self.working.webhooks()
    }

    fn settings(&self) -> StoreResult<Vec<Setting>> {
        self.working.settings()
    }
}

impl EntityStore for MemoryTransaction<'_> {
    fn create_role(&mut self, role: NewRole) -> StoreResult<Role> {
        let result = self.working.insert_role(role);
        self.record(result)
    }

    fn create_group(&mut self, name: &str) -> StoreResult<Group> {
        let result = self.working.insert_group(name);
        self.record(result)
    }

    fn add_group_user(&mut self, group_id: GroupId, user_id: UserId) -> StoreResult<GroupUser> {
        let result = self.working.insert_group_user(group_id, user_id);
        self.record(result)
    }

    fn create_status(&mut self, status: NewIssueStatus) -> StoreResult<IssueStatus> {
        let result = self.working.insert_status(status);
        self.record(result)
    }

    fn create_tracker(&mut self, tracker: NewTracker) -> StoreResult<Tracker> {
        let result = self.working.insert_tracker(tracker);
        self.record(result)
    }

    fn create_transition(
        &mut self,
        transition: NewWorkflowTransition,
    ) -> StoreResult<WorkflowTransition> {
        let result = self.working.insert_transition(transition);
        self.record(result)
    }

    fn create_priority(&mut self, priority: NewIssuePriority) -> StoreResult<IssuePriority> {
        let result = self.working.insert_priority(priority);
        self.record(result)
    }

    fn create_query(&mut self, query: NewQuery) -> StoreResult<Query> {
        let result = self.working.insert_query(query);
        self.record(result)
    }

    fn create_custom_field(&mut self, field: NewCustomField) -> StoreResult<CustomField> {
        let result = self.working.insert_custom_field(field);
        self.record(result)
    }

    fn create_user(&mut self, user: NewUser) -> StoreResult<User> {
        let result = self.working.insert_user(user);
        self.record(result)
    }

    fn create_project(&mut self, project: NewProject) -> StoreResult<Project> {
        let result = self.working.insert_project(project);
        self.record(result)
    }

    fn create_member(&mut self, member: NewMember) -> StoreResult<Member> {
        let result = self.working.insert_member(member);
        self.record(result)
    }

    fn create_webhook(&mut self, webhook: NewWebhook) -> StoreResult<Webhook> {
        let result = self.working.insert_webhook(webhook);
        self.record(result)
    }

    fn set_setting(&mut self, setting: Setting) -> StoreResult<Setting> {
        let result = self.working.insert_setting(setting);
        self.record(result)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use modkit_core::{EntityIdType, MailNotification};
    use std::sync::Arc;
    use std::thread;

    fn new_user(login: &str) -> NewUser {
        NewUser {
            login: login.to_string(),
            firstname: "Test".to_string(),
            lastname: "User".to_string(),
            mail: format!("{}@example.com", login),
            admin: false,
            language: "en".to_string(),
            mail_notification: MailNotification::None,
        }
    }

    #[test]
    fn test_commit_makes_writes_visible() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.create_role(NewRole::new("Admin", 1)).unwrap();
        assert_eq!(tx.count(EntityKind::Role).unwrap(), 1);
        assert_eq!(tx.writes(), 1);
        tx.commit().unwrap();

        assert_eq!(store.count(EntityKind::Role).unwrap(), 1);
        assert!(store.role_exists(BuiltinRole::Given).unwrap());
    }

    #[test]
    fn test_drop_rolls_back() {
        let store = InMemoryStore::new();
        {
            let mut tx = store.begin().unwrap();
            tx.create_role(NewRole::new("Admin", 1)).unwrap();
            tx.create_group("Admins").unwrap();
        }
        assert!(!store.exists(EntityKind::Role).unwrap());
        assert!(!store.exists(EntityKind::Group).unwrap());
        assert_eq!(store.tables().unwrap(), Tables::new());
    }

    #[test]
    fn test_rollback_restores_sequences() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.create_user(new_user("alice")).unwrap();
        tx.rollback();

        let mut tx = store.begin().unwrap();
        let user = tx.create_user(new_user("bob")).unwrap();
        tx.commit().unwrap();
        assert_eq!(user.id.get(), 1);
    }

    #[test]
    fn test_failed_write_leaves_transaction_usable() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.create_user(new_user("alice")).unwrap();
        assert!(tx.create_user(new_user("alice")).is_err());
        assert_eq!(tx.writes(), 1);
        tx.commit().unwrap();
        assert_eq!(store.users().unwrap().len(), 1);
    }

    #[test]
    fn test_transactions_are_serialized() {
        let store = Arc::new(InMemoryStore::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let mut tx = store.begin().unwrap();
                    if tx.exists(EntityKind::Role).unwrap() {
                        return false;
                    }
                    tx.create_role(NewRole::new("Admin", 1)).unwrap();
                    tx.commit().unwrap();
                    true
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(store.count(EntityKind::Role).unwrap(), 1);
    }

    #[test]
    fn test_user_lookup() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().unwrap();
        let created = tx.create_user(new_user("operator")).unwrap();
        tx.commit().unwrap();

        let found = store.user(created.id).unwrap().unwrap();
        assert_eq!(found.login, "operator");
        assert!(store.user(UserId::new(42)).unwrap().is_none());
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Dropping a transaction restores the exact pre-transaction tables.
        #[test]
        fn prop_rollback_restores_state(
            committed in proptest::collection::btree_set("[A-Z][a-z]{2,8}", 0..5),
            discarded in proptest::collection::btree_set("[A-Z][a-z]{2,8}", 1..5),
        ) {
            let store = InMemoryStore::new();
            let mut tx = store.begin().unwrap();
            for name in &committed {
                tx.create_group(name).unwrap();
            }
            tx.commit().unwrap();
            let before = store.tables().unwrap();

            {
                let mut tx = store.begin().unwrap();
                for (position, name) in discarded.iter().enumerate() {
                    let _ = tx.create_status(NewIssueStatus {
                        name: name.clone(),
                        is_closed: false,
                        position: position as i32 + 1,
                    });
                    let _ = tx.create_group(&format!("{}-extra", name));
                }
            }

            prop_assert_eq!(store.tables().unwrap(), before);
        }
    }
}

//! Modkit Storage - Entity Store Traits and In-Memory Implementation
//!
//! Defines the entity store abstraction consumed by the bootstrap: typed
//! create-or-fail operations per record kind, read queries for the
//! precondition check, and an atomic scope (`begin` / `commit`, rollback on
//! drop). `InMemoryStore` is the validating implementation used by the CLI
//! and the test suites; `snapshot` persists it as JSON.

pub mod memory;
pub mod snapshot;
pub mod tables;
mod validate;

pub use memory::{InMemoryStore, MemoryTransaction};
pub use snapshot::SnapshotError;
pub use tables::Tables;
pub use validate::{IDENTIFIER_MAX_LENGTH, LOGIN_MAX_LENGTH};

use modkit_core::{
    BuiltinRole, CustomField, EntityKind, Group, GroupId, GroupUser, IssuePriority, IssueStatus,
    Member, NewCustomField, NewIssuePriority, NewIssueStatus, NewMember, NewProject, NewQuery,
    NewRole, NewTracker, NewUser, NewWebhook, NewWorkflowTransition, Project, Query, Role,
    Setting, StoreResult, Tracker, User, UserId, Webhook, WorkflowTransition,
};

// ============================================================================
// READ SIDE
// ============================================================================

/// Read queries over the store.
///
/// Every call recomputes from the current rows; nothing is cached.
pub trait StoreQueries {
    /// Number of rows of `kind`.
    fn count(&self, kind: EntityKind) -> StoreResult<usize>;

    /// Whether any row of `kind` exists.
    fn exists(&self, kind: EntityKind) -> StoreResult<bool> {
        Ok(self.count(kind)? > 0)
    }

    /// Whether a role of the given builtin kind exists.
    fn role_exists(&self, builtin: BuiltinRole) -> StoreResult<bool>;

    fn user(&self, id: UserId) -> StoreResult<Option<User>>;

    fn roles(&self) -> StoreResult<Vec<Role>>;
    fn groups(&self) -> StoreResult<Vec<Group>>;
    fn group_users(&self) -> StoreResult<Vec<GroupUser>>;
    fn statuses(&self) -> StoreResult<Vec<IssueStatus>>;
    fn trackers(&self) -> StoreResult<Vec<Tracker>>;
    fn transitions(&self) -> StoreResult<Vec<WorkflowTransition>>;
    fn priorities(&self) -> StoreResult<Vec<IssuePriority>>;
    fn queries(&self) -> StoreResult<Vec<Query>>;
    fn custom_fields(&self) -> StoreResult<Vec<CustomField>>;
    fn users(&self) -> StoreResult<Vec<User>>;
    fn projects(&self) -> StoreResult<Vec<Project>>;
    fn members(&self) -> StoreResult<Vec<Member>>;
    fn webhooks(&self) -> StoreResult<Vec<Webhook>>;
    fn settings(&self) -> StoreResult<Vec<Setting>>;
}

// ============================================================================
// WRITE SIDE
// ============================================================================

/// Create-or-fail operations. Each validates its own record and fails with
/// `StoreError::RecordInvalid` without writing anything on violation.
pub trait EntityStore: StoreQueries {
    // === Roles and groups ===

    fn create_role(&mut self, role: NewRole) -> StoreResult<Role>;

    fn create_group(&mut self, name: &str) -> StoreResult<Group>;

    /// Add an existing user to an existing group.
    fn add_group_user(&mut self, group_id: GroupId, user_id: UserId) -> StoreResult<GroupUser>;

    // === Statuses, trackers, workflow ===

    fn create_status(&mut self, status: NewIssueStatus) -> StoreResult<IssueStatus>;

    fn create_tracker(&mut self, tracker: NewTracker) -> StoreResult<Tracker>;

    fn create_transition(
        &mut self,
        transition: NewWorkflowTransition,
    ) -> StoreResult<WorkflowTransition>;

    /// Create a batch of transitions, stopping at the first failure.
    fn create_transitions(
        &mut self,
        transitions: &[NewWorkflowTransition],
    ) -> StoreResult<Vec<WorkflowTransition>> {
        transitions
            .iter()
            .map(|t| self.create_transition(*t))
            .collect()
    }

    // === Enumerations, queries, custom fields ===

    fn create_priority(&mut self, priority: NewIssuePriority) -> StoreResult<IssuePriority>;

    fn create_query(&mut self, query: NewQuery) -> StoreResult<Query>;

    fn create_custom_field(&mut self, field: NewCustomField) -> StoreResult<CustomField>;

    // === Users, projects, memberships ===

    fn create_user(&mut self, user: NewUser) -> StoreResult<User>;

    fn create_project(&mut self, project: NewProject) -> StoreResult<Project>;

    fn create_member(&mut self, member: NewMember) -> StoreResult<Member>;

    fn create_webhook(&mut self, webhook: NewWebhook) -> StoreResult<Webhook>;

    // === Settings ===

    fn set_setting(&mut self, setting: Setting) -> StoreResult<Setting>;
}

// ============================================================================
// ATOMIC SCOPE
// ============================================================================

/// An open atomic scope. Writes become visible only on `commit`; dropping
/// the transaction discards them.
pub trait Transaction: EntityStore {
    fn commit(self) -> StoreResult<()>;

    /// Discard every write made in this scope.
    fn rollback(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}

/// A store that can open atomic scopes.
///
/// Implementations must serialize scopes: while one is open no other scope
/// may observe or write the store.
pub trait TransactionalStore: StoreQueries {
    type Tx<'a>: Transaction
    where
        Self: 'a;

    fn begin(&self) -> StoreResult<Self::Tx<'_>>;
}

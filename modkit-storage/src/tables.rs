//! Table contents of the in-memory store.
//!
//! `Tables` owns every row and enforces the per-table constraints on insert.
//! It is plain data: the transactional behaviour lives in `memory.rs`, which
//! works on a copy and swaps it in on commit.

use crate::{validate, StoreQueries};
use chrono::Utc;
use modkit_core::{
    BuiltinRole, CustomField, CustomFieldId, EntityIdType, EntityKind, Group, GroupId, GroupUser,
    IssuePriority, IssueStatus, IssueStatusId, Member, MemberId, NewCustomField,
    NewIssuePriority, NewIssueStatus, NewMember, NewProject, NewQuery, NewRole, NewTracker,
    NewUser, NewWebhook, NewWorkflowTransition, Principal, PriorityId, Project, ProjectId, Query,
    QueryId, Role, RoleId, Setting, StoreError, StoreResult, Tracker, TrackerId, User, UserId,
    Visibility, Webhook, WebhookId, WorkflowTransition, WorkflowTransitionId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Last allocated value of each id sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Sequences {
    role: i64,
    principal: i64,
    status: i64,
    tracker: i64,
    transition: i64,
    priority: i64,
    query: i64,
    custom_field: i64,
    project: i64,
    member: i64,
    webhook: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Every row held by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tables {
    pub(crate) sequences: Sequences,
    pub(crate) roles: Vec<Role>,
    pub(crate) groups: Vec<Group>,
    pub(crate) group_users: Vec<GroupUser>,
    pub(crate) statuses: Vec<IssueStatus>,
    pub(crate) trackers: Vec<Tracker>,
    pub(crate) transitions: Vec<WorkflowTransition>,
    pub(crate) priorities: Vec<IssuePriority>,
    pub(crate) queries: Vec<Query>,
    pub(crate) custom_fields: Vec<CustomField>,
    pub(crate) users: Vec<User>,
    pub(crate) projects: Vec<Project>,
    pub(crate) members: Vec<Member>,
    pub(crate) webhooks: Vec<Webhook>,
    pub(crate) settings: Vec<Setting>,
}

fn not_found<I: EntityIdType>(id: I) -> StoreError {
    StoreError::NotFound {
        kind: I::KIND,
        id: id.get(),
    }
}

/// Reference check reported against the record being inserted.
fn missing_reference<I: EntityIdType>(kind: EntityKind, field: &str, id: I) -> StoreError {
    StoreError::invalid(kind, format!("{} {} does not exist ({})", field, id, not_found(id)))
}

fn has_duplicates<T: Eq + std::hash::Hash>(items: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().any(|item| !seen.insert(item))
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows of `kind`.
    pub fn row_count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Role => self.roles.len(),
            EntityKind::Group => self.groups.len(),
            EntityKind::IssueStatus => self.statuses.len(),
            EntityKind::Tracker => self.trackers.len(),
            EntityKind::WorkflowTransition => self.transitions.len(),
            EntityKind::Enumeration => self.priorities.len(),
            EntityKind::Query => self.queries.len(),
            EntityKind::CustomField => self.custom_fields.len(),
            EntityKind::User => self.users.len(),
            EntityKind::Project => self.projects.len(),
            EntityKind::Member => self.members.len(),
            EntityKind::Webhook => self.webhooks.len(),
            EntityKind::GroupUser => self.group_users.len(),
            EntityKind::Setting => self.settings.len(),
        }
    }

    // === Lookups ===

    fn role_known(&self, id: RoleId) -> bool {
        self.roles.iter().any(|r| r.id == id)
    }

    fn status_known(&self, id: IssueStatusId) -> bool {
        self.statuses.iter().any(|s| s.id == id)
    }

    fn tracker_known(&self, id: TrackerId) -> bool {
        self.trackers.iter().any(|t| t.id == id)
    }

    fn project_known(&self, id: ProjectId) -> bool {
        self.projects.iter().any(|p| p.id == id)
    }

    fn group_known(&self, id: GroupId) -> bool {
        self.groups.iter().any(|g| g.id == id)
    }

    pub(crate) fn find_user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn principal_known(&self, principal: Principal) -> bool {
        match principal {
            Principal::User(id) => self.find_user(id).is_some(),
            Principal::Group(id) => self.group_known(id),
        }
    }

    // === Roles and groups ===

    pub(crate) fn insert_role(&mut self, new: NewRole) -> StoreResult<Role> {
        let kind = EntityKind::Role;
        validate::require_name(kind, "name", &new.name)?;
        if self.roles.iter().any(|r| r.name == new.name) {
            return Err(StoreError::invalid(
                kind,
                format!("name {:?} has already been taken", new.name),
            ));
        }
        if let Some(p) = new.permissions.iter().find(|p| !p.settable_for(new.builtin)) {
            return Err(StoreError::invalid(
                kind,
                format!("permission {} is not settable on a {:?} role", p, new.builtin),
            ));
        }
        if has_duplicates(&new.permissions) {
            return Err(StoreError::invalid(kind, "permissions contain duplicates"));
        }

        let role = Role {
            id: RoleId::new(next(&mut self.sequences.role)),
            name: new.name,
            position: new.position,
            builtin: new.builtin,
            assignable: new.assignable,
            issues_visibility: new.issues_visibility,
            users_visibility: new.users_visibility,
            permissions: new.permissions,
        };
        self.roles.push(role.clone());
        Ok(role)
    }

    pub(crate) fn insert_group(&mut self, name: &str) -> StoreResult<Group> {
        let kind = EntityKind::Group;
        validate::require_name(kind, "name", name)?;
        if self.groups.iter().any(|g| g.name == name) {
            return Err(StoreError::invalid(
                kind,
                format!("name {:?} has already been taken", name),
            ));
        }
        let group = Group {
            id: GroupId::new(next(&mut self.sequences.principal)),
            name: name.to_string(),
        };
        self.groups.push(group.clone());
        Ok(group)
    }

    pub(crate) fn insert_group_user(
        &mut self,
        group_id: GroupId,
        user_id: UserId,
    ) -> StoreResult<GroupUser> {
        let kind = EntityKind::GroupUser;
        if !self.group_known(group_id) {
            return Err(missing_reference(kind, "group", group_id));
        }
        if self.find_user(user_id).is_none() {
            return Err(missing_reference(kind, "user", user_id));
        }
        let row = GroupUser { group_id, user_id };
        if self.group_users.contains(&row) {
            return Err(StoreError::invalid(
                kind,
                format!("user {} is already a member of group {}", user_id, group_id),
            ));
        }
        self.group_users.push(row);
        Ok(row)
    }

    // === Statuses, trackers, workflow ===

    pub(crate) fn insert_status(&mut self, new: NewIssueStatus) -> StoreResult<IssueStatus> {
        let kind = EntityKind::IssueStatus;
        validate::require_name(kind, "name", &new.name)?;
        if self.statuses.iter().any(|s| s.name == new.name) {
            return Err(StoreError::invalid(
                kind,
                format!("name {:?} has already been taken", new.name),
            ));
        }
        if self.statuses.iter().any(|s| s.position == new.position) {
            return Err(StoreError::invalid(
                kind,
                format!("position {} is already used", new.position),
            ));
        }
        let status = IssueStatus {
            id: IssueStatusId::new(next(&mut self.sequences.status)),
            name: new.name,
            is_closed: new.is_closed,
            position: new.position,
        };
        self.statuses.push(status.clone());
        Ok(status)
    }

    pub(crate) fn insert_tracker(&mut self, new: NewTracker) -> StoreResult<Tracker> {
        let kind = EntityKind::Tracker;
        validate::require_name(kind, "name", &new.name)?;
        if self.trackers.iter().any(|t| t.name == new.name) {
            return Err(StoreError::invalid(
                kind,
                format!("name {:?} has already been taken", new.name),
            ));
        }
        if !self.status_known(new.default_status_id) {
            return Err(missing_reference(kind, "default status", new.default_status_id));
        }
        if has_duplicates(&new.core_fields) {
            return Err(StoreError::invalid(kind, "core fields contain duplicates"));
        }
        let tracker = Tracker {
            id: TrackerId::new(next(&mut self.sequences.tracker)),
            name: new.name,
            default_status_id: new.default_status_id,
            is_in_roadmap: new.is_in_roadmap,
            position: new.position,
            core_fields: new.core_fields,
        };
        self.trackers.push(tracker.clone());
        Ok(tracker)
    }

    pub(crate) fn insert_transition(
        &mut self,
        new: NewWorkflowTransition,
    ) -> StoreResult<WorkflowTransition> {
        let kind = EntityKind::WorkflowTransition;
        if !self.tracker_known(new.tracker_id) {
            return Err(missing_reference(kind, "tracker", new.tracker_id));
        }
        if !self.role_known(new.role_id) {
            return Err(missing_reference(kind, "role", new.role_id));
        }
        for status in [new.old_status_id, new.new_status_id] {
            if !self.status_known(status) {
                return Err(missing_reference(kind, "status", status));
            }
        }
        if new.old_status_id == new.new_status_id {
            return Err(StoreError::invalid(
                kind,
                format!("old and new status are both {}", new.old_status_id),
            ));
        }
        if self.transitions.iter().any(|t| t.edge() == new) {
            return Err(StoreError::invalid(
                kind,
                format!(
                    "transition {} -> {} already exists for tracker {} and role {}",
                    new.old_status_id, new.new_status_id, new.tracker_id, new.role_id
                ),
            ));
        }
        let transition = WorkflowTransition {
            id: WorkflowTransitionId::new(next(&mut self.sequences.transition)),
            tracker_id: new.tracker_id,
            role_id: new.role_id,
            old_status_id: new.old_status_id,
            new_status_id: new.new_status_id,
        };
        self.transitions.push(transition);
        Ok(transition)
    }

    // === Enumerations ===

    pub(crate) fn insert_priority(&mut self, new: NewIssuePriority) -> StoreResult<IssuePriority> {
        let kind = EntityKind::Enumeration;
        validate::require_name(kind, "name", &new.name)?;
        if self.priorities.iter().any(|p| p.name == new.name) {
            return Err(StoreError::invalid(
                kind,
                format!("name {:?} has already been taken", new.name),
            ));
        }
        if new.is_default && self.priorities.iter().any(|p| p.is_default) {
            return Err(StoreError::invalid(kind, "another priority is already the default"));
        }
        let priority = IssuePriority {
            id: PriorityId::new(next(&mut self.sequences.priority)),
            name: new.name,
            position: new.position,
            is_default: new.is_default,
            active: true,
        };
        self.priorities.push(priority.clone());
        Ok(priority)
    }

    // === Queries ===

    pub(crate) fn insert_query(&mut self, new: NewQuery) -> StoreResult<Query> {
        let kind = EntityKind::Query;
        validate::require_name(kind, "name", &new.name)?;
        for (field, filter) in &new.filters {
            validate::require_name(kind, "filter field", field)?;
            if filter.operator.takes_values() && filter.values.iter().all(|v| v.trim().is_empty()) {
                return Err(StoreError::invalid(
                    kind,
                    format!("filter {} with operator {} needs a value", field, filter.operator),
                ));
            }
        }
        for criterion in &new.sort_criteria {
            validate::require_name(kind, "sort field", &criterion.field)?;
        }
        match new.visibility {
            Visibility::Roles if new.role_ids.is_empty() => {
                return Err(StoreError::invalid(
                    kind,
                    "roles visibility requires at least one role",
                ));
            }
            Visibility::Private | Visibility::Public if !new.role_ids.is_empty() => {
                return Err(StoreError::invalid(
                    kind,
                    format!(
                        "role ids are only allowed with roles visibility, not {}",
                        new.visibility
                    ),
                ));
            }
            _ => {}
        }
        if let Some(role) = new.role_ids.iter().find(|id| !self.role_known(**id)) {
            return Err(missing_reference(kind, "role", *role));
        }
        let query = Query {
            id: QueryId::new(next(&mut self.sequences.query)),
            kind: new.kind,
            name: new.name,
            filters: new.filters,
            sort_criteria: new.sort_criteria,
            visibility: new.visibility,
            role_ids: new.role_ids,
        };
        self.queries.push(query.clone());
        Ok(query)
    }

    // === Custom fields ===

    pub(crate) fn insert_custom_field(&mut self, new: NewCustomField) -> StoreResult<CustomField> {
        let kind = EntityKind::CustomField;
        validate::require_name(kind, "name", &new.name)?;
        if self.custom_fields.iter().any(|f| f.name == new.name) {
            return Err(StoreError::invalid(
                kind,
                format!("name {:?} has already been taken", new.name),
            ));
        }
        if new.field_format.requires_possible_values()
            && new.possible_values.iter().all(|v| v.trim().is_empty())
        {
            return Err(StoreError::invalid(
                kind,
                format!("possible values are required for {} fields", new.field_format),
            ));
        }
        if new.multiple && !new.field_format.allows_multiple() {
            return Err(StoreError::invalid(
                kind,
                format!("{} fields cannot hold multiple values", new.field_format),
            ));
        }
        if let Some(regexp) = &new.regexp {
            validate::field_regexp(regexp)?;
        }
        if let Some(tracker) = new.tracker_ids.iter().find(|id| !self.tracker_known(**id)) {
            return Err(missing_reference(kind, "tracker", *tracker));
        }
        let field = CustomField {
            id: CustomFieldId::new(next(&mut self.sequences.custom_field)),
            name: new.name,
            field_format: new.field_format,
            description: new.description,
            regexp: new.regexp,
            is_filter: new.is_filter,
            searchable: new.searchable,
            multiple: new.multiple,
            possible_values: new.possible_values,
            url_pattern: new.url_pattern,
            tracker_ids: new.tracker_ids,
        };
        self.custom_fields.push(field.clone());
        Ok(field)
    }

    // === Users, projects, memberships ===

    pub(crate) fn insert_user(&mut self, new: NewUser) -> StoreResult<User> {
        let kind = EntityKind::User;
        validate::login(&new.login)?;
        validate::mail(&new.mail)?;
        validate::require_name(kind, "firstname", &new.firstname)?;
        validate::require_name(kind, "lastname", &new.lastname)?;
        if self.users.iter().any(|u| u.login.eq_ignore_ascii_case(&new.login)) {
            return Err(StoreError::invalid(
                kind,
                format!("login {:?} has already been taken", new.login),
            ));
        }
        if self.users.iter().any(|u| u.mail.eq_ignore_ascii_case(&new.mail)) {
            return Err(StoreError::invalid(
                kind,
                format!("mail {:?} has already been taken", new.mail),
            ));
        }
        let user = User {
            id: UserId::new(next(&mut self.sequences.principal)),
            login: new.login,
            firstname: new.firstname,
            lastname: new.lastname,
            mail: new.mail,
            admin: new.admin,
            language: new.language,
            mail_notification: new.mail_notification,
            created_on: Utc::now(),
        };
        self.users.push(user.clone());
        Ok(user)
    }

    pub(crate) fn insert_project(&mut self, new: NewProject) -> StoreResult<Project> {
        let kind = EntityKind::Project;
        validate::require_name(kind, "name", &new.name)?;
        validate::project_identifier(&new.identifier)?;
        if self.projects.iter().any(|p| p.identifier == new.identifier) {
            return Err(StoreError::invalid(
                kind,
                format!("identifier {:?} has already been taken", new.identifier),
            ));
        }
        if let Some(field) = new
            .issue_custom_field_ids
            .iter()
            .find(|id| !self.custom_fields.iter().any(|f| f.id == **id))
        {
            return Err(missing_reference(kind, "custom field", *field));
        }
        if let Some(tracker) = new.tracker_ids.iter().find(|id| !self.tracker_known(**id)) {
            return Err(missing_reference(kind, "tracker", *tracker));
        }
        let project = Project {
            id: ProjectId::new(next(&mut self.sequences.project)),
            name: new.name,
            identifier: new.identifier,
            is_public: new.is_public,
            issue_custom_field_ids: new.issue_custom_field_ids,
            tracker_ids: new.tracker_ids,
            enabled_modules: new.enabled_modules,
            created_on: Utc::now(),
        };
        self.projects.push(project.clone());
        Ok(project)
    }

    pub(crate) fn insert_member(&mut self, new: NewMember) -> StoreResult<Member> {
        let kind = EntityKind::Member;
        if !self.project_known(new.project_id) {
            return Err(missing_reference(kind, "project", new.project_id));
        }
        if !self.principal_known(new.principal) {
            return Err(StoreError::invalid(
                kind,
                format!("principal {} does not exist", new.principal),
            ));
        }
        if new.role_ids.is_empty() {
            return Err(StoreError::invalid(kind, "at least one role is required"));
        }
        if let Some(role) = new.role_ids.iter().find(|id| !self.role_known(**id)) {
            return Err(missing_reference(kind, "role", *role));
        }
        if let Some(role) = new.editable_role_ids.iter().find(|id| !new.role_ids.contains(id)) {
            return Err(StoreError::invalid(
                kind,
                format!("editable role {} is not granted to the member", role),
            ));
        }
        if self
            .members
            .iter()
            .any(|m| m.project_id == new.project_id && m.principal == new.principal)
        {
            return Err(StoreError::invalid(
                kind,
                format!("{} is already a member of project {}", new.principal, new.project_id),
            ));
        }
        let member = Member {
            id: MemberId::new(next(&mut self.sequences.member)),
            project_id: new.project_id,
            principal: new.principal,
            role_ids: new.role_ids,
            editable_role_ids: new.editable_role_ids,
            created_on: Utc::now(),
        };
        self.members.push(member.clone());
        Ok(member)
    }

    pub(crate) fn insert_webhook(&mut self, new: NewWebhook) -> StoreResult<Webhook> {
        let kind = EntityKind::Webhook;
        validate::webhook_url(&new.url)?;
        if !self.project_known(new.project_id) {
            return Err(missing_reference(kind, "project", new.project_id));
        }
        let webhook = Webhook {
            id: WebhookId::new(next(&mut self.sequences.webhook)),
            url: new.url,
            project_id: new.project_id,
            active: true,
        };
        self.webhooks.push(webhook.clone());
        Ok(webhook)
    }

    // === Settings ===

    pub(crate) fn insert_setting(&mut self, setting: Setting) -> StoreResult<Setting> {
        if self.settings.iter().any(|s| s.name == setting.name) {
            return Err(StoreError::invalid(
                EntityKind::Setting,
                format!("setting {} is already set", setting.name),
            ));
        }
        self.settings.push(setting.clone());
        Ok(setting)
    }
}

impl StoreQueries for Tables {
    fn count(&self, kind: EntityKind) -> StoreResult<usize> {
        Ok(self.row_count(kind))
    }

    fn role_exists(&self, builtin: BuiltinRole) -> StoreResult<bool> {
        Ok(self.roles.iter().any(|r| r.builtin == builtin))
    }

    fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.find_user(id).cloned())
    }

    fn roles(&self) -> StoreResult<Vec<Role>> {
        Ok(self.roles.clone())
    }

    fn groups(&self) -> StoreResult<Vec<Group>> {
        Ok(self.groups.clone())
    }

    fn group_users(&self) -> StoreResult<Vec<GroupUser>> {
        Ok(self.group_users.clone())
    }

    fn statuses(&self) -> StoreResult<Vec<IssueStatus>> {
        Ok(self.statuses.clone())
    }

    fn trackers(&self) -> StoreResult<Vec<Tracker>> {
        Ok(self.trackers.clone())
    }

    fn transitions(&self) -> StoreResult<Vec<WorkflowTransition>> {
        Ok(self.transitions.clone())
    }

    fn priorities(&self) -> StoreResult<Vec<IssuePriority>> {
        Ok(self.priorities.clone())
    }

    fn queries(&self) -> StoreResult<Vec<Query>> {
        Ok(self.queries.clone())
    }

    fn custom_fields(&self) -> StoreResult<Vec<CustomField>> {
        Ok(self.custom_fields.clone())
    }

    fn users(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.clone())
    }

    fn projects(&self) -> StoreResult<Vec<Project>> {
        Ok(self.projects.clone())
    }

    fn members(&self) -> StoreResult<Vec<Member>> {
        Ok(self.members.clone())
    }

    fn webhooks(&self) -> StoreResult<Vec<Webhook>> {
        Ok(self.webhooks.clone())
    }

    fn settings(&self) -> StoreResult<Vec<Setting>> {
        Ok(self.settings.clone())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use modkit_core::{
        CoreField, FieldFormat, FilterOperator, MailNotification, Permission, QueryFilter,
        QueryKind, SettingName, SettingValue,
    };
    use std::collections::BTreeMap;

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

    fn new_status(name: &str, position: i32) -> NewIssueStatus {
        NewIssueStatus {
            name: name.to_string(),
            is_closed: false,
            position,
        }
    }

    fn seeded() -> (Tables, TrackerId, RoleId, IssueStatusId, IssueStatusId) {
        let mut tables = Tables::new();
        let open = tables.insert_status(new_status("New", 1)).unwrap();
        let done = tables.insert_status(new_status("Closed", 2)).unwrap();
        let tracker = tables
            .insert_tracker(NewTracker {
                name: "Ticket".to_string(),
                default_status_id: open.id,
                is_in_roadmap: false,
                position: 1,
                core_fields: vec![CoreField::Description],
            })
            .unwrap();
        let role = tables.insert_role(NewRole::new("Moderator", 1)).unwrap();
        (tables, tracker.id, role.id, open.id, done.id)
    }

    #[test]
    fn test_sequences_start_at_one() {
        let (tables, tracker, role, open, done) = seeded();
        assert_eq!(tracker.get(), 1);
        assert_eq!(role.get(), 1);
        assert_eq!(open.get(), 1);
        assert_eq!(done.get(), 2);
        assert_eq!(tables.row_count(EntityKind::IssueStatus), 2);
    }

    #[test]
    fn test_users_and_groups_share_principal_ids() {
        let mut tables = Tables::new();
        let user = tables.insert_user(new_user("admin")).unwrap();
        let group = tables.insert_group("Admins").unwrap();
        assert_eq!(user.id.get(), 1);
        assert_eq!(group.id.get(), 2);
    }

    #[test]
    fn test_role_rejects_member_only_permission_on_builtin() {
        let mut tables = Tables::new();
        let role = NewRole::new("Anonymous", 5)
            .with_builtin(BuiltinRole::Anonymous)
            .with_permissions([Permission::ManageMembers]);
        let err = tables.insert_role(role).unwrap_err();
        assert!(matches!(err, StoreError::RecordInvalid { kind: EntityKind::Role, .. }));
    }

    #[test]
    fn test_status_position_must_be_unique() {
        let mut tables = Tables::new();
        tables.insert_status(new_status("New", 1)).unwrap();
        assert!(tables.insert_status(new_status("Other", 1)).is_err());
    }

    #[test]
    fn test_tracker_requires_existing_default_status() {
        let mut tables = Tables::new();
        let err = tables
            .insert_tracker(NewTracker {
                name: "Ticket".to_string(),
                default_status_id: IssueStatusId::new(99),
                is_in_roadmap: false,
                position: 1,
                core_fields: Vec::new(),
            })
            .unwrap_err();
        assert!(err.to_string().contains("default status 99 does not exist"));
    }

    #[test]
    fn test_transition_rejects_self_loop_and_duplicate() {
        let (mut tables, tracker, role, open, done) = seeded();
        let edge = NewWorkflowTransition {
            tracker_id: tracker,
            role_id: role,
            old_status_id: open,
            new_status_id: done,
        };
        tables.insert_transition(edge).unwrap();
        assert!(tables.insert_transition(edge).is_err());

        let self_loop = NewWorkflowTransition {
            new_status_id: open,
            ..edge
        };
        assert!(tables.insert_transition(self_loop).is_err());
        assert_eq!(tables.row_count(EntityKind::WorkflowTransition), 1);
    }

    #[test]
    fn test_single_default_priority() {
        let mut tables = Tables::new();
        let normal = NewIssuePriority {
            name: "Normal".to_string(),
            position: 1,
            is_default: true,
        };
        tables.insert_priority(normal).unwrap();
        let high = NewIssuePriority {
            name: "High".to_string(),
            position: 2,
            is_default: true,
        };
        assert!(tables.insert_priority(high).is_err());
    }

    #[test]
    fn test_query_roles_visibility_requires_roles() {
        let mut tables = Tables::new();
        let query = NewQuery {
            kind: QueryKind::Issue,
            name: "Team".to_string(),
            filters: BTreeMap::from([(
                "status_id".to_string(),
                QueryFilter::new(FilterOperator::Open, [""]),
            )]),
            sort_criteria: Vec::new(),
            visibility: Visibility::Roles,
            role_ids: Vec::new(),
        };
        assert!(tables.insert_query(query).is_err());
    }

    #[test]
    fn test_query_equals_filter_needs_value() {
        let mut tables = Tables::new();
        let query = NewQuery {
            kind: QueryKind::Issue,
            name: "Broken".to_string(),
            filters: BTreeMap::from([(
                "assigned_to_id".to_string(),
                QueryFilter::new(FilterOperator::Equals, [""]),
            )]),
            sort_criteria: Vec::new(),
            visibility: Visibility::Public,
            role_ids: Vec::new(),
        };
        let err = tables.insert_query(query).unwrap_err();
        assert!(err.to_string().contains("needs a value"));
    }

    #[test]
    fn test_list_field_requires_possible_values() {
        let mut tables = Tables::new();
        let field = NewCustomField::new("Add to lists", FieldFormat::List);
        assert!(tables.insert_custom_field(field).is_err());
    }

    #[test]
    fn test_custom_field_regexp_must_compile() {
        let mut tables = Tables::new();
        let mut field = NewCustomField::new("DID", FieldFormat::String);
        field.regexp = Some("did:(".to_string());
        assert!(tables.insert_custom_field(field).is_err());
    }

    #[test]
    fn test_duplicate_login_case_insensitive() {
        let mut tables = Tables::new();
        tables.insert_user(new_user("modbot")).unwrap();
        let mut dup = new_user("ModBot");
        dup.mail = "other@example.com".to_string();
        let err = tables.insert_user(dup).unwrap_err();
        assert!(err.to_string().contains("has already been taken"));
    }

    #[test]
    fn test_member_editable_roles_must_be_granted() {
        let (mut tables, _, role, _, _) = seeded();
        let other = tables.insert_role(NewRole::new("Trainee", 2)).unwrap();
        let group = tables.insert_group("Moderators").unwrap();
        let project = tables
            .insert_project(NewProject {
                name: "Tickets".to_string(),
                identifier: "tickets".to_string(),
                is_public: false,
                issue_custom_field_ids: Vec::new(),
                tracker_ids: Vec::new(),
                enabled_modules: Vec::new(),
            })
            .unwrap();
        let member = NewMember {
            project_id: project.id,
            principal: group.id.into(),
            role_ids: vec![role],
            editable_role_ids: vec![other.id],
        };
        assert!(tables.insert_member(member).is_err());

        let ok = NewMember::single_role(project.id, group.id, role);
        tables.insert_member(ok.clone()).unwrap();
        assert!(tables.insert_member(ok).is_err());
    }

    #[test]
    fn test_group_user_requires_existing_user() {
        let mut tables = Tables::new();
        let group = tables.insert_group("Admins").unwrap();
        let err = tables.insert_group_user(group.id, UserId::new(1)).unwrap_err();
        assert!(matches!(err, StoreError::RecordInvalid { kind: EntityKind::GroupUser, .. }));
    }

    #[test]
    fn test_setting_written_once() {
        let mut tables = Tables::new();
        let title = Setting::new(SettingName::AppTitle, SettingValue::Text("Modkit".to_string()));
        tables.insert_setting(title.clone()).unwrap();
        assert!(tables.insert_setting(title).is_err());
    }
}

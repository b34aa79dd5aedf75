//! Tracker configuration records
//!
//! Each table has an input shape (`NewX`) handed to the store and a stored
//! shape (`X`) carrying the id the store allocated.

use crate::{
    BuiltinRole, CoreField, CustomFieldId, FieldFormat, FilterOperator, GroupId,
    IssueStatusId, IssuesVisibility, MailNotification, MemberId, Permission, Principal,
    PriorityId, ProjectId, ProjectModule, QueryId, QueryKind, RoleId, SettingName, SettingValue,
    SortDirection, Timestamp, TrackerId, UserId, UsersVisibility, Visibility, WebhookId,
    WorkflowTransitionId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// ROLES AND GROUPS
// ============================================================================

/// Role to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRole {
    pub name: String,
    pub position: i32,
    pub builtin: BuiltinRole,
    pub assignable: bool,
    pub issues_visibility: IssuesVisibility,
    pub users_visibility: UsersVisibility,
    pub permissions: Vec<Permission>,
}

impl NewRole {
    /// A given (non-builtin) role with the hosting application's defaults.
    pub fn new(name: impl Into<String>, position: i32) -> Self {
        Self {
            name: name.into(),
            position,
            builtin: BuiltinRole::Given,
            assignable: true,
            issues_visibility: IssuesVisibility::Default,
            users_visibility: UsersVisibility::All,
            permissions: Vec::new(),
        }
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions = permissions.into_iter().collect();
        self
    }

    pub fn with_visibility(mut self, issues: IssuesVisibility, users: UsersVisibility) -> Self {
        self.issues_visibility = issues;
        self.users_visibility = users;
        self
    }

    pub fn with_builtin(mut self, builtin: BuiltinRole) -> Self {
        self.builtin = builtin;
        self
    }
}

/// Stored role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub position: i32,
    pub builtin: BuiltinRole,
    pub assignable: bool,
    pub issues_visibility: IssuesVisibility,
    pub users_visibility: UsersVisibility,
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Stored group. Groups are principals and share the user id sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

/// Group membership of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupUser {
    pub group_id: GroupId,
    pub user_id: UserId,
}

// ============================================================================
// STATUSES, TRACKERS, WORKFLOW
// ============================================================================

/// Issue status to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssueStatus {
    pub name: String,
    pub is_closed: bool,
    pub position: i32,
}

/// Stored issue status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStatus {
    pub id: IssueStatusId,
    pub name: String,
    pub is_closed: bool,
    pub position: i32,
}

/// Tracker to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTracker {
    pub name: String,
    pub default_status_id: IssueStatusId,
    pub is_in_roadmap: bool,
    pub position: i32,
    pub core_fields: Vec<CoreField>,
}

/// Stored tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracker {
    pub id: TrackerId,
    pub name: String,
    pub default_status_id: IssueStatusId,
    pub is_in_roadmap: bool,
    pub position: i32,
    pub core_fields: Vec<CoreField>,
}

/// Directed edge of a per-(tracker, role) status graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NewWorkflowTransition {
    pub tracker_id: TrackerId,
    pub role_id: RoleId,
    pub old_status_id: IssueStatusId,
    pub new_status_id: IssueStatusId,
}

/// Stored workflow transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTransition {
    pub id: WorkflowTransitionId,
    pub tracker_id: TrackerId,
    pub role_id: RoleId,
    pub old_status_id: IssueStatusId,
    pub new_status_id: IssueStatusId,
}

impl WorkflowTransition {
    /// Identity of the edge without the store-allocated id.
    pub fn edge(&self) -> NewWorkflowTransition {
        NewWorkflowTransition {
            tracker_id: self.tracker_id,
            role_id: self.role_id,
            old_status_id: self.old_status_id,
            new_status_id: self.new_status_id,
        }
    }
}

// ============================================================================
// ENUMERATIONS
// ============================================================================

/// Issue priority to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssuePriority {
    pub name: String,
    pub position: i32,
    pub is_default: bool,
}

/// Stored issue priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePriority {
    pub id: PriorityId,
    pub name: String,
    pub position: i32,
    pub is_default: bool,
    pub active: bool,
}

// ============================================================================
// QUERIES
// ============================================================================

/// One filter clause of a saved query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    pub operator: FilterOperator,
    pub values: Vec<String>,
}

impl QueryFilter {
    pub fn new(
        operator: FilterOperator,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            operator,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordering clause of a saved query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriterion {
    pub field: String,
    pub direction: SortDirection,
}

/// Saved query to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuery {
    pub kind: QueryKind,
    pub name: String,
    pub filters: BTreeMap<String, QueryFilter>,
    pub sort_criteria: Vec<SortCriterion>,
    pub visibility: Visibility,
    /// Roles allowed to see the query; required iff visibility is `roles`.
    pub role_ids: Vec<RoleId>,
}

/// Stored saved query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub id: QueryId,
    pub kind: QueryKind,
    pub name: String,
    pub filters: BTreeMap<String, QueryFilter>,
    pub sort_criteria: Vec<SortCriterion>,
    pub visibility: Visibility,
    pub role_ids: Vec<RoleId>,
}

// ============================================================================
// CUSTOM FIELDS
// ============================================================================

/// Issue custom field to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomField {
    pub name: String,
    pub field_format: FieldFormat,
    pub description: Option<String>,
    pub regexp: Option<String>,
    pub is_filter: bool,
    pub searchable: bool,
    pub multiple: bool,
    pub possible_values: Vec<String>,
    pub url_pattern: Option<String>,
    /// Trackers the field is enabled on.
    pub tracker_ids: Vec<TrackerId>,
}

impl NewCustomField {
    pub fn new(name: impl Into<String>, field_format: FieldFormat) -> Self {
        Self {
            name: name.into(),
            field_format,
            description: None,
            regexp: None,
            is_filter: false,
            searchable: false,
            multiple: false,
            possible_values: Vec::new(),
            url_pattern: None,
            tracker_ids: Vec::new(),
        }
    }
}

/// Stored custom field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: CustomFieldId,
    pub name: String,
    pub field_format: FieldFormat,
    pub description: Option<String>,
    pub regexp: Option<String>,
    pub is_filter: bool,
    pub searchable: bool,
    pub multiple: bool,
    pub possible_values: Vec<String>,
    pub url_pattern: Option<String>,
    pub tracker_ids: Vec<TrackerId>,
}

// ============================================================================
// USERS AND PROJECTS
// ============================================================================

/// User account to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub login: String,
    pub firstname: String,
    pub lastname: String,
    pub mail: String,
    pub admin: bool,
    pub language: String,
    pub mail_notification: MailNotification,
}

/// Stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub firstname: String,
    pub lastname: String,
    pub mail: String,
    pub admin: bool,
    pub language: String,
    pub mail_notification: MailNotification,
    pub created_on: Timestamp,
}

/// Project to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub identifier: String,
    pub is_public: bool,
    pub issue_custom_field_ids: Vec<CustomFieldId>,
    pub tracker_ids: Vec<TrackerId>,
    pub enabled_modules: Vec<ProjectModule>,
}

/// Stored project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub identifier: String,
    pub is_public: bool,
    pub issue_custom_field_ids: Vec<CustomFieldId>,
    pub tracker_ids: Vec<TrackerId>,
    pub enabled_modules: Vec<ProjectModule>,
    pub created_on: Timestamp,
}

/// Project membership to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub project_id: ProjectId,
    pub principal: Principal,
    pub role_ids: Vec<RoleId>,
    /// Roles the principal may hand out; must be a subset of `role_ids`.
    pub editable_role_ids: Vec<RoleId>,
}

impl NewMember {
    /// Membership granting exactly one role, editable by the holder.
    pub fn single_role(
        project_id: ProjectId,
        principal: impl Into<Principal>,
        role_id: RoleId,
    ) -> Self {
        Self {
            project_id,
            principal: principal.into(),
            role_ids: vec![role_id],
            editable_role_ids: vec![role_id],
        }
    }
}

/// Stored project membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub project_id: ProjectId,
    pub principal: Principal,
    pub role_ids: Vec<RoleId>,
    pub editable_role_ids: Vec<RoleId>,
    pub created_on: Timestamp,
}

/// Outbound webhook target to be registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWebhook {
    pub url: String,
    pub project_id: ProjectId,
}

/// Stored webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: WebhookId,
    pub url: String,
    pub project_id: ProjectId,
    pub active: bool,
}

// ============================================================================
// SETTINGS
// ============================================================================

/// Global setting row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub name: SettingName,
    pub value: SettingValue,
}

impl Setting {
    pub fn new(name: SettingName, value: SettingValue) -> Self {
        Self { name, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityIdType;

    #[test]
    fn test_new_role_defaults() {
        let role = NewRole::new("Moderator", 2).with_permissions([Permission::ViewIssues]);
        assert_eq!(role.builtin, BuiltinRole::Given);
        assert_eq!(role.issues_visibility, IssuesVisibility::Default);
        assert_eq!(role.permissions, vec![Permission::ViewIssues]);
    }

    #[test]
    fn test_single_role_member_is_editable() {
        let member = NewMember::single_role(ProjectId::new(1), GroupId::new(3), RoleId::new(2));
        assert_eq!(member.role_ids, member.editable_role_ids);
        assert_eq!(member.principal, Principal::Group(GroupId::new(3)));
    }

    #[test]
    fn test_transition_edge_drops_id() {
        let stored = WorkflowTransition {
            id: WorkflowTransitionId::new(9),
            tracker_id: TrackerId::new(1),
            role_id: RoleId::new(2),
            old_status_id: IssueStatusId::new(3),
            new_status_id: IssueStatusId::new(4),
        };
        let edge = stored.edge();
        assert_eq!(edge.old_status_id, IssueStatusId::new(3));
        assert_eq!(edge.new_status_id, IssueStatusId::new(4));
    }

    #[test]
    fn test_query_filter_serializes_operator_symbol() {
        let filter = QueryFilter::new(FilterOperator::Open, [""]);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["operator"], "o");
        assert_eq!(json["values"][0], "");
    }
}

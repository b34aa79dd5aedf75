//! Seed data.
//!
//! The literal configuration created by bootstrap, expressed as keyed
//! constants. Names that are shown to users carry a label key so they can
//! be resolved per locale; everything else is fixed.

use modkit_core::{
    AutomationAccount, BuiltinRole, CoreField, FieldFormat, FilterOperator, IssueStatusId,
    IssuesVisibility, MailNotification, NewCustomField, NewIssuePriority, NewIssueStatus, NewRole,
    NewTracker, NewUser, Permission, ProjectModule, QueryFilter, QueryKind, Setting, SettingName,
    SettingValue, SortCriterion, SortDirection, TrackerId, UsersVisibility,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// ROLES AND GROUPS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoleKey {
    Admin,
    Moderator,
    Trainee,
    Automation,
}

const MODERATOR_PERMISSIONS: &[Permission] = &[
    Permission::ViewIssues,
    Permission::AddIssues,
    Permission::EditIssues,
    Permission::ViewPrivateNotes,
    Permission::SetNotesPrivate,
    Permission::ManageIssueRelations,
    Permission::ManageSubtasks,
    Permission::AddIssueNotes,
    Permission::SaveQueries,
    Permission::ViewGantt,
    Permission::ViewCalendar,
    Permission::LogTime,
    Permission::ViewTimeEntries,
    Permission::ViewNews,
    Permission::CommentNews,
    Permission::ViewDocuments,
    Permission::ViewWikiPages,
    Permission::ViewWikiEdits,
    Permission::EditWikiPages,
    Permission::DeleteWikiPages,
    Permission::ViewMessages,
    Permission::AddMessages,
    Permission::ViewFiles,
    Permission::ManageFiles,
    Permission::BrowseRepository,
    Permission::ViewChangesets,
    Permission::CommitAccess,
    Permission::ManageRelatedIssues,
];

const TRAINEE_PERMISSIONS: &[Permission] = &[
    Permission::ViewIssues,
    Permission::AddIssues,
    Permission::AddIssueNotes,
    Permission::SaveQueries,
    Permission::ViewGantt,
    Permission::ViewCalendar,
    Permission::LogTime,
    Permission::ViewTimeEntries,
    Permission::ViewNews,
    Permission::CommentNews,
    Permission::ViewDocuments,
    Permission::ViewWikiPages,
    Permission::ViewWikiEdits,
    Permission::ViewMessages,
    Permission::AddMessages,
    Permission::ViewFiles,
    Permission::BrowseRepository,
    Permission::ViewChangesets,
];

const AUTOMATION_PERMISSIONS: &[Permission] = &[
    Permission::ViewIssues,
    Permission::AddIssues,
    Permission::EditIssues,
    Permission::ViewPrivateNotes,
    Permission::SetNotesPrivate,
    Permission::ManageIssueRelations,
    Permission::ManageSubtasks,
    Permission::AddIssueNotes,
    Permission::SaveQueries,
    Permission::ViewMessages,
    Permission::AddMessages,
    Permission::ViewFiles,
    Permission::ManageFiles,
    Permission::ManageRelatedIssues,
];

impl RoleKey {
    pub const ALL: [RoleKey; 4] = [
        RoleKey::Admin,
        RoleKey::Moderator,
        RoleKey::Trainee,
        RoleKey::Automation,
    ];

    pub fn label_key(self) -> &'static str {
        match self {
            RoleKey::Admin => "default_role_admin",
            RoleKey::Moderator => "default_role_moderator",
            RoleKey::Trainee => "default_role_trainee",
            RoleKey::Automation => "default_role_automation",
        }
    }

    pub fn default_name(self) -> &'static str {
        match self {
            RoleKey::Admin => "Admin",
            RoleKey::Moderator => "Moderator",
            RoleKey::Trainee => "Trainee",
            RoleKey::Automation => "Automation",
        }
    }

    pub fn position(self) -> i32 {
        self as i32 + 1
    }

    /// Admin holds every permission settable on a given role.
    pub fn permissions(self) -> Vec<Permission> {
        match self {
            RoleKey::Admin => Permission::settable(BuiltinRole::Given),
            RoleKey::Moderator => MODERATOR_PERMISSIONS.to_vec(),
            RoleKey::Trainee => TRAINEE_PERMISSIONS.to_vec(),
            RoleKey::Automation => AUTOMATION_PERMISSIONS.to_vec(),
        }
    }

    pub fn new_role(self, name: String) -> NewRole {
        let role = NewRole::new(name, self.position()).with_permissions(self.permissions());
        match self {
            RoleKey::Admin => role.with_visibility(IssuesVisibility::All, UsersVisibility::All),
            _ => role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    Admins,
    Moderators,
    Trainees,
}

impl GroupKey {
    pub const ALL: [GroupKey; 3] = [GroupKey::Admins, GroupKey::Moderators, GroupKey::Trainees];

    pub fn name(self) -> &'static str {
        match self {
            GroupKey::Admins => "Admins",
            GroupKey::Moderators => "Moderators",
            GroupKey::Trainees => "Trainees",
        }
    }

    /// Role the group holds in the seed project.
    pub fn role(self) -> RoleKey {
        match self {
            GroupKey::Admins => RoleKey::Admin,
            GroupKey::Moderators => RoleKey::Moderator,
            GroupKey::Trainees => RoleKey::Trainee,
        }
    }
}

// ============================================================================
// STATUSES AND TRACKERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatusKey {
    New,
    InProgress,
    Closed,
    Rejected,
    Duplicate,
    Applied,
    Granted,
    Denied,
    Invalid,
}

impl StatusKey {
    /// In position order.
    pub const ALL: [StatusKey; 9] = [
        StatusKey::New,
        StatusKey::InProgress,
        StatusKey::Closed,
        StatusKey::Rejected,
        StatusKey::Duplicate,
        StatusKey::Applied,
        StatusKey::Granted,
        StatusKey::Denied,
        StatusKey::Invalid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatusKey::New => "New",
            StatusKey::InProgress => "In progress",
            StatusKey::Closed => "Closed",
            StatusKey::Rejected => "Rejected",
            StatusKey::Duplicate => "Duplicate",
            StatusKey::Applied => "Applied",
            StatusKey::Granted => "Granted",
            StatusKey::Denied => "Denied",
            StatusKey::Invalid => "Invalid",
        }
    }

    /// `Closed` counts as open; automation moves it on to `Applied`.
    pub fn is_closed(self) -> bool {
        !matches!(self, StatusKey::New | StatusKey::InProgress | StatusKey::Closed)
    }

    pub fn position(self) -> i32 {
        self as i32 + 1
    }

    pub fn new_status(self) -> NewIssueStatus {
        NewIssueStatus {
            name: self.name().to_string(),
            is_closed: self.is_closed(),
            position: self.position(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrackerKey {
    Ticket,
    Incident,
    Appeal,
}

impl TrackerKey {
    pub const ALL: [TrackerKey; 3] = [TrackerKey::Ticket, TrackerKey::Incident, TrackerKey::Appeal];

    pub fn name(self) -> &'static str {
        match self {
            TrackerKey::Ticket => "Ticket",
            TrackerKey::Incident => "Incident",
            TrackerKey::Appeal => "Appeal",
        }
    }

    pub fn position(self) -> i32 {
        self as i32 + 1
    }

    pub fn core_fields(self) -> Vec<CoreField> {
        let mut fields = vec![
            CoreField::AssignedTo,
            CoreField::ParentIssue,
            CoreField::Description,
            CoreField::Priority,
        ];
        if self == TrackerKey::Incident {
            fields.push(CoreField::StartDate);
        }
        fields
    }

    pub fn new_tracker(self, default_status_id: IssueStatusId) -> NewTracker {
        NewTracker {
            name: self.name().to_string(),
            default_status_id,
            is_in_roadmap: false,
            position: self.position(),
            core_fields: self.core_fields(),
        }
    }
}

// ============================================================================
// ENUMERATIONS AND QUERIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriorityKey {
    Low,
    Normal,
    High,
    Urgent,
}

impl PriorityKey {
    pub const ALL: [PriorityKey; 4] = [
        PriorityKey::Low,
        PriorityKey::Normal,
        PriorityKey::High,
        PriorityKey::Urgent,
    ];

    pub fn label_key(self) -> &'static str {
        match self {
            PriorityKey::Low => "default_priority_low",
            PriorityKey::Normal => "default_priority_normal",
            PriorityKey::High => "default_priority_high",
            PriorityKey::Urgent => "default_priority_urgent",
        }
    }

    pub fn new_priority(self, name: String) -> NewIssuePriority {
        NewIssuePriority {
            name,
            position: self as i32 + 1,
            is_default: self == PriorityKey::Normal,
        }
    }
}

/// A saved query before its display name is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySeed {
    pub label_key: &'static str,
    pub kind: QueryKind,
    pub filters: BTreeMap<String, QueryFilter>,
    pub sort_criteria: Vec<SortCriterion>,
}

fn desc(field: &str) -> SortCriterion {
    SortCriterion {
        field: field.to_string(),
        direction: SortDirection::Desc,
    }
}

fn equals(value: &str) -> QueryFilter {
    QueryFilter::new(FilterOperator::Equals, [value])
}

/// Open issues in active projects matching `field = me`.
fn my_open_issues(label_key: &'static str, field: &str, sort: Vec<SortCriterion>) -> QuerySeed {
    QuerySeed {
        label_key,
        kind: QueryKind::Issue,
        filters: BTreeMap::from([
            ("status_id".to_string(), QueryFilter::new(FilterOperator::Open, [""])),
            (field.to_string(), equals("me")),
            ("project.status".to_string(), equals("1")),
        ]),
        sort_criteria: sort,
    }
}

fn active_projects(label_key: &'static str, id_value: &str) -> QuerySeed {
    QuerySeed {
        label_key,
        kind: QueryKind::Project,
        filters: BTreeMap::from([
            ("status".to_string(), equals("1")),
            ("id".to_string(), equals(id_value)),
        ]),
        sort_criteria: Vec::new(),
    }
}

/// Public queries, issue queries first.
pub fn queries() -> Vec<QuerySeed> {
    vec![
        my_open_issues(
            "label_assigned_to_me_issues",
            "assigned_to_id",
            vec![desc("priority"), desc("updated_on")],
        ),
        my_open_issues("label_reported_issues", "author_id", vec![desc("updated_on")]),
        my_open_issues("label_updated_issues", "updated_by", vec![desc("updated_on")]),
        my_open_issues("label_watched_issues", "watcher_id", vec![desc("updated_on")]),
        active_projects("label_my_projects", "mine"),
        active_projects("label_my_bookmarks", "bookmarks"),
    ]
}

// ============================================================================
// CUSTOM FIELDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CustomFieldKey {
    Did,
    Handle,
    DisplayName,
    AddToLists,
}

impl CustomFieldKey {
    pub const ALL: [CustomFieldKey; 4] = [
        CustomFieldKey::Did,
        CustomFieldKey::Handle,
        CustomFieldKey::DisplayName,
        CustomFieldKey::AddToLists,
    ];

    /// Trackers the field is enabled on.
    pub fn trackers(self) -> &'static [TrackerKey] {
        match self {
            CustomFieldKey::AddToLists => &[TrackerKey::Ticket],
            _ => &[TrackerKey::Ticket, TrackerKey::Appeal],
        }
    }

    pub fn new_field(self, tracker_ids: Vec<TrackerId>) -> NewCustomField {
        let mut field = match self {
            CustomFieldKey::Did => {
                let mut field = NewCustomField::new("DID", FieldFormat::String);
                field.description = Some("DID of the subject account".to_string());
                field.regexp = Some("did:.*".to_string());
                field.url_pattern = Some("https://bsky.app/profile/%value%".to_string());
                field.searchable = true;
                field
            }
            CustomFieldKey::Handle => {
                let mut field = NewCustomField::new("Handle", FieldFormat::String);
                field.searchable = true;
                field
            }
            CustomFieldKey::DisplayName => {
                let mut field = NewCustomField::new("Display name", FieldFormat::String);
                field.searchable = true;
                field
            }
            CustomFieldKey::AddToLists => {
                let mut field = NewCustomField::new("Add to lists", FieldFormat::List);
                field.multiple = true;
                field.possible_values = vec!["dummy".to_string()];
                field
            }
        };
        field.is_filter = true;
        field.tracker_ids = tracker_ids;
        field
    }
}

// ============================================================================
// SETTINGS AND ACCOUNTS
// ============================================================================

/// Modules enabled on new projects.
pub const DEFAULT_PROJECT_MODULES: [ProjectModule; 4] = [
    ProjectModule::IssueTracking,
    ProjectModule::News,
    ProjectModule::Wiki,
    ProjectModule::Webhooks,
];

/// Global settings written once trackers exist.
pub fn settings(app_title: &str, tracker_ids: &[TrackerId]) -> Vec<Setting> {
    vec![
        Setting::new(
            SettingName::DefaultProjectsTrackerIds,
            SettingValue::List(tracker_ids.iter().map(|id| id.to_string()).collect()),
        ),
        Setting::new(SettingName::AppTitle, SettingValue::Text(app_title.to_string())),
        Setting::new(SettingName::LoginRequired, SettingValue::flag(true)),
        Setting::new(SettingName::LostPassword, SettingValue::flag(false)),
        Setting::new(SettingName::Autologin, SettingValue::Integer(28)),
        Setting::new(SettingName::IssueGroupAssignment, SettingValue::flag(true)),
        Setting::new(SettingName::RestApiEnabled, SettingValue::flag(true)),
        Setting::new(SettingName::AttachmentMaxSize, SettingValue::Integer(51200)),
        Setting::new(SettingName::EnabledScm, SettingValue::List(Vec::new())),
        Setting::new(
            SettingName::DefaultProjectsModules,
            SettingValue::List(
                DEFAULT_PROJECT_MODULES
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            ),
        ),
    ]
}

/// Automation account; an administrator that never receives mail.
pub fn automation_user(account: &AutomationAccount) -> NewUser {
    NewUser {
        login: account.login.clone(),
        firstname: account.firstname.clone(),
        lastname: account.lastname.clone(),
        mail: account.mail.clone(),
        admin: true,
        language: account.language.clone(),
        mail_notification: MailNotification::None,
    }
}

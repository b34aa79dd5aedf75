//! Modkit Core - Record Types
//!
//! Typed ids, enums, record shapes, the permission vocabulary, the error
//! taxonomy, seed configuration and display labels shared by every other
//! crate in the workspace. No storage or orchestration logic lives here.

pub mod config;
pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod labels;
pub mod permissions;

pub use config::{AutomationAccount, BootstrapOptions, ProjectConfig, SeedConfig};
pub use entities::{
    CustomField, Group, GroupUser, IssuePriority, IssueStatus, Member, NewCustomField,
    NewIssuePriority, NewIssueStatus, NewMember, NewProject, NewQuery, NewRole, NewTracker,
    NewUser, NewWebhook, NewWorkflowTransition, Project, Query, QueryFilter, Role, Setting,
    SortCriterion, Tracker, User, Webhook, WorkflowTransition,
};
pub use enums::{
    BuiltinRole, CoreField, EntityKind, EnumParseError, FieldFormat, FilterOperator,
    IssuesVisibility, MailNotification, ProjectModule, QueryKind, SettingName, SettingValue,
    SortDirection, UsersVisibility, Visibility,
};
pub use error::{ConfigError, ModkitError, ModkitResult, StoreError, StoreResult};
pub use identity::{
    CustomFieldId, EntityIdType, GroupId, IssueStatusId, MemberId, PriorityId, Principal,
    ProjectId, QueryId, RoleId, Timestamp, TrackerId, UserId, WebhookId, WorkflowTransitionId,
};
pub use labels::{BuiltinLabels, LabelResolver, Locale, DEFAULT_LOCALE};
pub use permissions::Permission;

//! Enum types for tracker records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when a stored string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for EnumParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for EnumParseError {}

/// Declares a closed vocabulary whose variants map 1:1 to their stored string.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $label:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stored string representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::enums::EnumParseError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err($crate::enums::EnumParseError {
                        kind: $label,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use string_enum;

// ============================================================================
// TABLE DISCRIMINATOR
// ============================================================================

/// Table discriminator used in errors and store queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Role,
    Group,
    IssueStatus,
    Tracker,
    WorkflowTransition,
    Enumeration,
    Query,
    CustomField,
    User,
    Project,
    Member,
    Webhook,
    GroupUser,
    Setting,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ============================================================================
// ROLES
// ============================================================================

/// Builtin marker of a role. Only `Given` roles are created by bootstrap;
/// the other two stand for the implicit non-member and anonymous roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinRole {
    Given,
    NonMember,
    Anonymous,
}

impl BuiltinRole {
    /// Database code used by the hosting application (0, 1, 2).
    pub fn code(&self) -> i32 {
        match self {
            BuiltinRole::Given => 0,
            BuiltinRole::NonMember => 1,
            BuiltinRole::Anonymous => 2,
        }
    }
}

string_enum! {
    /// Which issues a role can see.
    IssuesVisibility as "issues visibility" {
        All => "all",
        Default => "default",
        Own => "own",
    }
}

string_enum! {
    /// Which users a role can see.
    UsersVisibility as "users visibility" {
        All => "all",
        MembersOfVisibleProjects => "members_of_visible_projects",
    }
}

// ============================================================================
// TRACKERS
// ============================================================================

string_enum! {
    /// Standard issue attributes a tracker may enable.
    CoreField as "core field" {
        AssignedTo => "assigned_to_id",
        Category => "category_id",
        FixedVersion => "fixed_version_id",
        ParentIssue => "parent_issue_id",
        StartDate => "start_date",
        DueDate => "due_date",
        EstimatedHours => "estimated_hours",
        DoneRatio => "done_ratio",
        Description => "description",
        Priority => "priority_id",
    }
}

// ============================================================================
// QUERIES
// ============================================================================

/// Which listing a saved query applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Issue,
    Project,
}

string_enum! {
    /// Who can see a saved query.
    Visibility as "query visibility" {
        Private => "private",
        Roles => "roles",
        Public => "public",
    }
}

impl Visibility {
    /// Numeric code stored by the hosting application.
    pub fn code(&self) -> i32 {
        match self {
            Visibility::Private => 0,
            Visibility::Roles => 1,
            Visibility::Public => 2,
        }
    }
}

string_enum! {
    /// Filter operators understood by saved queries.
    FilterOperator as "filter operator" {
        Equals => "=",
        NotEquals => "!",
        Open => "o",
        Closed => "c",
        Any => "*",
        None => "!*",
        Contains => "~",
        NotContains => "!~",
        GreaterOrEqual => ">=",
        LessOrEqual => "<=",
    }
}

impl FilterOperator {
    /// Whether the operator compares against its values. `o`, `c`, `*` and
    /// `!*` ignore them (the hosting application stores `[""]`).
    pub fn takes_values(&self) -> bool {
        !matches!(
            self,
            FilterOperator::Open
                | FilterOperator::Closed
                | FilterOperator::Any
                | FilterOperator::None
        )
    }
}

string_enum! {
    SortDirection as "sort direction" {
        Asc => "asc",
        Desc => "desc",
    }
}

// ============================================================================
// CUSTOM FIELDS
// ============================================================================

string_enum! {
    /// Storage/rendering format of a custom field.
    FieldFormat as "field format" {
        String => "string",
        Text => "text",
        Int => "int",
        Float => "float",
        Date => "date",
        Bool => "bool",
        List => "list",
        Link => "link",
        User => "user",
        Version => "version",
    }
}

impl FieldFormat {
    /// Formats whose values come from an explicit `possible_values` list.
    pub fn requires_possible_values(&self) -> bool {
        matches!(self, FieldFormat::List)
    }

    /// Formats that may hold several values at once.
    pub fn allows_multiple(&self) -> bool {
        matches!(self, FieldFormat::List | FieldFormat::User | FieldFormat::Version)
    }
}

// ============================================================================
// USERS
// ============================================================================

string_enum! {
    /// Email notification preference of a user.
    MailNotification as "mail notification" {
        All => "all",
        Selected => "selected",
        OnlyMyEvents => "only_my_events",
        OnlyAssigned => "only_assigned",
        OnlyOwner => "only_owner",
        None => "none",
    }
}

// ============================================================================
// PROJECTS
// ============================================================================

string_enum! {
    /// Project modules that can be enabled per project.
    ProjectModule as "project module" {
        IssueTracking => "issue_tracking",
        TimeTracking => "time_tracking",
        News => "news",
        Documents => "documents",
        Files => "files",
        Wiki => "wiki",
        Repository => "repository",
        Boards => "boards",
        Calendar => "calendar",
        Gantt => "gantt",
        Webhooks => "webhooks",
    }
}

// ============================================================================
// SETTINGS
// ============================================================================

string_enum! {
    /// Global settings written during bootstrap.
    SettingName as "setting" {
        AppTitle => "app_title",
        LoginRequired => "login_required",
        LostPassword => "lost_password",
        Autologin => "autologin",
        IssueGroupAssignment => "issue_group_assignment",
        RestApiEnabled => "rest_api_enabled",
        AttachmentMaxSize => "attachment_max_size",
        EnabledScm => "enabled_scm",
        DefaultProjectsModules => "default_projects_modules",
        DefaultProjectsTrackerIds => "default_projects_tracker_ids",
    }
}

/// Value of a global setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SettingValue {
    Text(String),
    Integer(i64),
    List(Vec<String>),
}

impl SettingValue {
    /// Boolean settings are stored as 0/1 integers.
    pub fn flag(on: bool) -> Self {
        SettingValue::Integer(i64::from(on))
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! Modkit Bootstrap - Default Tracker Configuration
//!
//! Populates an empty entity store with the complete starting configuration
//! of a moderation tracker: roles and permissions, groups, statuses,
//! trackers, the per-role workflow graph, priorities, saved queries, custom
//! fields, the automation account and the seed project with its
//! memberships and webhook. Either all of it is written or none of it.

pub mod cli;
pub mod logging;
pub mod orchestrator;
pub mod precondition;
pub mod seed;
pub mod workflow_table;

pub use orchestrator::{bootstrap, BootstrapReport, Bootstrapper};
pub use precondition::{first_populated, is_empty};
pub use seed::{CustomFieldKey, GroupKey, PriorityKey, RoleKey, StatusKey, TrackerKey};
pub use workflow_table::{default_policies, SeedPolicyTable};

//! Bootstrap orchestration.
//!
//! Sequences the creation of every seed record inside one store
//! transaction. The precondition is checked inside that transaction before
//! the first write; any failure afterwards drops the transaction, which
//! discards everything written so far.

use crate::precondition;
use crate::seed::{self, CustomFieldKey, GroupKey, PriorityKey, RoleKey, StatusKey, TrackerKey};
use crate::workflow_table::{default_policies, SeedPolicyTable};
use modkit_core::{
    BootstrapOptions, BuiltinLabels, CustomFieldId, EntityIdType, GroupId, IssueStatusId,
    LabelResolver, Locale, ModkitError, ModkitResult, NewMember, NewProject, NewQuery, NewWebhook,
    ProjectId, RoleId, SeedConfig, TrackerId, UserId, Visibility, WebhookId,
};
use modkit_storage::{EntityStore, Transaction, TransactionalStore};
use modkit_workflow::PolicyResolver;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a successful bootstrap created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapReport {
    pub locale: Locale,
    pub workflow: bool,
    pub roles: usize,
    pub groups: usize,
    pub statuses: usize,
    pub trackers: usize,
    pub settings: usize,
    pub transitions: usize,
    pub priorities: usize,
    pub queries: usize,
    pub custom_fields: usize,
    pub users: usize,
    pub members: usize,
    pub project_id: Option<ProjectId>,
    pub webhook_id: Option<WebhookId>,
}

/// Ids allocated so far, keyed by seed key.
#[derive(Debug, Default)]
struct SeededIds {
    roles: BTreeMap<RoleKey, RoleId>,
    groups: BTreeMap<GroupKey, GroupId>,
    statuses: BTreeMap<StatusKey, IssueStatusId>,
    trackers: BTreeMap<TrackerKey, TrackerId>,
    custom_fields: Vec<CustomFieldId>,
}

impl SeededIds {
    fn trackers_for(&self, keys: &[TrackerKey]) -> Vec<TrackerId> {
        keys.iter().filter_map(|k| self.trackers.get(k).copied()).collect()
    }
}

impl PolicyResolver<TrackerKey, RoleKey, StatusKey> for SeededIds {
    fn tracker_id(&self, key: TrackerKey) -> Option<TrackerId> {
        self.trackers.get(&key).copied()
    }

    fn role_id(&self, key: RoleKey) -> Option<RoleId> {
        self.roles.get(&key).copied()
    }

    fn status_id(&self, key: StatusKey) -> Option<IssueStatusId> {
        self.statuses.get(&key).copied()
    }

    fn status_universe(&self) -> Vec<IssueStatusId> {
        StatusKey::ALL
            .iter()
            .filter_map(|k| self.statuses.get(k).copied())
            .collect()
    }
}

/// Runs the bootstrap against a transactional store.
pub struct Bootstrapper<'s, S, L = BuiltinLabels> {
    store: &'s S,
    labels: L,
    config: SeedConfig,
    policies: SeedPolicyTable,
}

impl<'s, S: TransactionalStore> Bootstrapper<'s, S, BuiltinLabels> {
    /// Bootstrapper with builtin labels, default configuration and the
    /// default workflow policies.
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            labels: BuiltinLabels::new(),
            config: SeedConfig::default(),
            policies: default_policies(),
        }
    }
}

impl<'s, S: TransactionalStore, L: LabelResolver> Bootstrapper<'s, S, L> {
    pub fn with_labels<M: LabelResolver>(self, labels: M) -> Bootstrapper<'s, S, M> {
        Bootstrapper {
            store: self.store,
            labels,
            config: self.config,
            policies: self.policies,
        }
    }

    pub fn with_config(mut self, config: SeedConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_policies(mut self, policies: SeedPolicyTable) -> Self {
        self.policies = policies;
        self
    }

    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    /// Populate an empty store.
    ///
    /// Fails with `AlreadyBootstrapped` without writing if configuration
    /// data exists, with `InvalidConfiguration` before any write if the
    /// config or a transition rule is malformed, and with `Store` if any
    /// record is rejected, in which case nothing is kept.
    pub fn bootstrap(
        &self,
        locale: &str,
        options: BootstrapOptions,
    ) -> ModkitResult<BootstrapReport> {
        let span = tracing::info_span!("bootstrap", locale, workflow = options.workflow);
        let _enter = span.enter();

        self.config.validate()?;
        if options.workflow {
            self.policies.validate()?;
        }

        let mut tx = self.store.begin()?;
        if let Some(kind) = precondition::first_populated(&tx)? {
            tracing::info!(%kind, "configuration data already present");
            return Err(ModkitError::AlreadyBootstrapped);
        }

        let locale = self.labels.select_locale(locale);
        match self.seed(&mut tx, locale, options) {
            Ok(report) => {
                tx.commit()?;
                tracing::info!(
                    roles = report.roles,
                    trackers = report.trackers,
                    statuses = report.statuses,
                    transitions = report.transitions,
                    members = report.members,
                    "bootstrap complete"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(error = %e, "bootstrap failed, rolling back");
                Err(e)
            }
        }
    }

    fn label(&self, key: &str, locale: &Locale, default: &str) -> String {
        self.labels.resolve(key, locale, Some(default))
    }

    fn seed<T: EntityStore>(
        &self,
        tx: &mut T,
        locale: Locale,
        options: BootstrapOptions,
    ) -> ModkitResult<BootstrapReport> {
        let mut ids = SeededIds::default();
        let mut report = BootstrapReport {
            locale: locale.clone(),
            workflow: options.workflow,
            ..BootstrapReport::default()
        };

        // Roles and groups
        for key in RoleKey::ALL {
            let name = self.label(key.label_key(), &locale, key.default_name());
            let role = tx.create_role(key.new_role(name))?;
            ids.roles.insert(key, role.id);
        }
        report.roles = ids.roles.len();

        for key in GroupKey::ALL {
            let group = tx.create_group(key.name())?;
            ids.groups.insert(key, group.id);
        }
        report.groups = ids.groups.len();

        // Statuses and trackers
        for key in StatusKey::ALL {
            let status = tx.create_status(key.new_status())?;
            ids.statuses.insert(key, status.id);
        }
        report.statuses = ids.statuses.len();

        let default_status = ids.statuses[&StatusKey::New];
        for key in TrackerKey::ALL {
            let tracker = tx.create_tracker(key.new_tracker(default_status))?;
            ids.trackers.insert(key, tracker.id);
        }
        report.trackers = ids.trackers.len();

        // Settings
        let tracker_ids = ids.trackers_for(&TrackerKey::ALL);
        for setting in seed::settings(&self.config.app_title, &tracker_ids) {
            tx.set_setting(setting)?;
            report.settings += 1;
        }

        // Workflow
        if options.workflow {
            let transitions = self.policies.evaluate(&ids)?;
            report.transitions = tx.create_transitions(&transitions)?.len();
        } else {
            tracing::debug!("workflow generation skipped");
        }

        // Enumerations, queries, custom fields
        for key in PriorityKey::ALL {
            let name = self.labels.resolve(key.label_key(), &locale, None);
            tx.create_priority(key.new_priority(name))?;
            report.priorities += 1;
        }

        for query in seed::queries() {
            tx.create_query(NewQuery {
                kind: query.kind,
                name: self.labels.resolve(query.label_key, &locale, None),
                filters: query.filters,
                sort_criteria: query.sort_criteria,
                visibility: Visibility::Public,
                role_ids: Vec::new(),
            })?;
            report.queries += 1;
        }

        for key in CustomFieldKey::ALL {
            let field = tx.create_custom_field(key.new_field(ids.trackers_for(key.trackers())))?;
            ids.custom_fields.push(field.id);
        }
        report.custom_fields = ids.custom_fields.len();

        // Automation account and seed project
        let automation = tx.create_user(seed::automation_user(&self.config.automation))?;
        report.users = 1;

        let project = tx.create_project(NewProject {
            name: self.config.project.name.clone(),
            identifier: self.config.project.identifier.clone(),
            is_public: self.config.project.is_public,
            issue_custom_field_ids: ids.custom_fields.clone(),
            tracker_ids,
            enabled_modules: seed::DEFAULT_PROJECT_MODULES.to_vec(),
        })?;
        report.project_id = Some(project.id);

        // Memberships: one role per principal, editable by its holder
        for key in GroupKey::ALL {
            let member =
                NewMember::single_role(project.id, ids.groups[&key], ids.roles[&key.role()]);
            tx.create_member(member)?;
            report.members += 1;
        }
        tx.create_member(NewMember::single_role(
            project.id,
            automation.id,
            ids.roles[&RoleKey::Automation],
        ))?;
        report.members += 1;

        let webhook = tx.create_webhook(NewWebhook {
            url: self.config.webhook_url.clone(),
            project_id: project.id,
        })?;
        report.webhook_id = Some(webhook.id);

        // Operator
        let operator = UserId::new(self.config.operator_user_id);
        tx.add_group_user(ids.groups[&GroupKey::Admins], operator)?;
        tracing::debug!(%operator, "operator added to admin group");

        Ok(report)
    }
}

/// Bootstrap `store` with builtin labels, the default configuration and the
/// default workflow policies.
pub fn bootstrap<S: TransactionalStore>(
    store: &S,
    locale: &str,
    options: BootstrapOptions,
) -> ModkitResult<BootstrapReport> {
    Bootstrapper::new(store).bootstrap(locale, options)
}

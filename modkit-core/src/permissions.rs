//! Permission vocabulary for roles.
//!
//! The set is closed: a role can only hold symbols listed here. Member-only
//! permissions make no sense for the builtin non-member/anonymous roles and
//! are rejected by the store when attached to them.

use crate::enums::string_enum;
use crate::BuiltinRole;

string_enum! {
    /// A permission symbol grantable to a role.
    Permission as "permission" {
        // Project
        AddProject => "add_project",
        EditProject => "edit_project",
        CloseProject => "close_project",
        DeleteProject => "delete_project",
        SelectProjectPublicity => "select_project_publicity",
        SelectProjectModules => "select_project_modules",
        ManageMembers => "manage_members",
        ManageVersions => "manage_versions",
        AddSubprojects => "add_subprojects",
        ManagePublicQueries => "manage_public_queries",
        SaveQueries => "save_queries",
        // Boards
        ViewMessages => "view_messages",
        AddMessages => "add_messages",
        EditMessages => "edit_messages",
        EditOwnMessages => "edit_own_messages",
        DeleteMessages => "delete_messages",
        DeleteOwnMessages => "delete_own_messages",
        ViewMessageWatchers => "view_message_watchers",
        AddMessageWatchers => "add_message_watchers",
        DeleteMessageWatchers => "delete_message_watchers",
        ManageBoards => "manage_boards",
        // Calendar / gantt
        ViewCalendar => "view_calendar",
        ViewGantt => "view_gantt",
        // Documents
        ViewDocuments => "view_documents",
        AddDocuments => "add_documents",
        EditDocuments => "edit_documents",
        DeleteDocuments => "delete_documents",
        // Files
        ViewFiles => "view_files",
        ManageFiles => "manage_files",
        // Issue tracking
        ViewIssues => "view_issues",
        AddIssues => "add_issues",
        EditIssues => "edit_issues",
        EditOwnIssues => "edit_own_issues",
        CopyIssues => "copy_issues",
        ManageIssueRelations => "manage_issue_relations",
        ManageSubtasks => "manage_subtasks",
        SetIssuesPrivate => "set_issues_private",
        SetOwnIssuesPrivate => "set_own_issues_private",
        AddIssueNotes => "add_issue_notes",
        EditIssueNotes => "edit_issue_notes",
        EditOwnIssueNotes => "edit_own_issue_notes",
        ViewPrivateNotes => "view_private_notes",
        SetNotesPrivate => "set_notes_private",
        DeleteIssues => "delete_issues",
        ViewIssueWatchers => "view_issue_watchers",
        AddIssueWatchers => "add_issue_watchers",
        DeleteIssueWatchers => "delete_issue_watchers",
        ImportIssues => "import_issues",
        ManageCategories => "manage_categories",
        // News
        ViewNews => "view_news",
        ManageNews => "manage_news",
        CommentNews => "comment_news",
        // Repository
        ViewChangesets => "view_changesets",
        BrowseRepository => "browse_repository",
        CommitAccess => "commit_access",
        ManageRelatedIssues => "manage_related_issues",
        ManageRepository => "manage_repository",
        // Time tracking
        ViewTimeEntries => "view_time_entries",
        LogTime => "log_time",
        EditTimeEntries => "edit_time_entries",
        EditOwnTimeEntries => "edit_own_time_entries",
        ManageProjectActivities => "manage_project_activities",
        LogTimeForOtherUsers => "log_time_for_other_users",
        ImportTimeEntries => "import_time_entries",
        // Wiki
        ViewWikiPages => "view_wiki_pages",
        ViewWikiEdits => "view_wiki_edits",
        ExportWikiPages => "export_wiki_pages",
        EditWikiPages => "edit_wiki_pages",
        RenameWikiPages => "rename_wiki_pages",
        DeleteWikiPages => "delete_wiki_pages",
        DeleteWikiPagesAttachments => "delete_wiki_pages_attachments",
        ViewWikiPageWatchers => "view_wiki_page_watchers",
        AddWikiPageWatchers => "add_wiki_page_watchers",
        DeleteWikiPageWatchers => "delete_wiki_page_watchers",
        ProtectWikiPages => "protect_wiki_pages",
        ManageWiki => "manage_wiki",
    }
}

impl Permission {
    /// Permissions that only make sense for project members.
    pub fn member_only(&self) -> bool {
        matches!(
            self,
            Permission::AddProject
                | Permission::EditProject
                | Permission::CloseProject
                | Permission::DeleteProject
                | Permission::SelectProjectPublicity
                | Permission::SelectProjectModules
                | Permission::ManageMembers
                | Permission::ManageVersions
                | Permission::AddSubprojects
                | Permission::ManagePublicQueries
                | Permission::ManageBoards
                | Permission::ManageCategories
                | Permission::ManageRepository
                | Permission::CommitAccess
                | Permission::ManageProjectActivities
                | Permission::LogTimeForOtherUsers
                | Permission::ProtectWikiPages
                | Permission::ManageWiki
        )
    }

    /// Whether a role of the given builtin kind may hold this permission.
    pub fn settable_for(&self, builtin: BuiltinRole) -> bool {
        match builtin {
            BuiltinRole::Given => true,
            BuiltinRole::NonMember | BuiltinRole::Anonymous => !self.member_only(),
        }
    }

    /// Full vocabulary settable on a role of the given kind.
    pub fn settable(builtin: BuiltinRole) -> Vec<Permission> {
        Permission::ALL
            .iter()
            .copied()
            .filter(|p| p.settable_for(builtin))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_given_role_can_hold_everything() {
        assert_eq!(Permission::settable(BuiltinRole::Given).len(), Permission::ALL.len());
    }

    #[test]
    fn test_anonymous_role_excludes_member_only() {
        let settable = Permission::settable(BuiltinRole::Anonymous);
        assert!(settable.contains(&Permission::ViewIssues));
        assert!(!settable.contains(&Permission::ManageMembers));
        assert!(!settable.contains(&Permission::CommitAccess));
    }

    #[test]
    fn test_parse_unknown_permission() {
        assert!("view_issues".parse::<Permission>().is_ok());
        assert!("launch_rockets".parse::<Permission>().is_err());
    }
}

//! Identity types for tracker records.
//!
//! Every table gets its own integer id newtype so a `RoleId` can never be
//! passed where a `TrackerId` is expected. Ids are allocated by the store
//! from per-table sequences starting at 1; users and groups share the
//! principal sequence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::EntityKind;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Common behaviour of the typed id newtypes.
pub trait EntityIdType: Copy + Eq + Ord + fmt::Debug + fmt::Display {
    /// Table this id belongs to.
    const KIND: EntityKind;

    /// Wrap a raw sequence value.
    fn new(raw: i64) -> Self;

    /// Raw sequence value.
    fn get(self) -> i64;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl EntityIdType for $name {
            const KIND: EntityKind = EntityKind::$kind;

            fn new(raw: i64) -> Self {
                Self(raw)
            }

            fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Role identifier.
    RoleId => Role
);
entity_id!(
    /// Group identifier, drawn from the principal sequence.
    GroupId => Group
);
entity_id!(
    /// User identifier, drawn from the principal sequence.
    UserId => User
);
entity_id!(IssueStatusId => IssueStatus);
entity_id!(TrackerId => Tracker);
entity_id!(WorkflowTransitionId => WorkflowTransition);
entity_id!(
    /// Issue priority (enumeration) identifier.
    PriorityId => Enumeration
);
entity_id!(QueryId => Query);
entity_id!(CustomFieldId => CustomField);
entity_id!(ProjectId => Project);
entity_id!(MemberId => Member);
entity_id!(WebhookId => Webhook);

/// A user or a group. Both can hold project memberships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Principal {
    User(UserId),
    Group(GroupId),
}

impl From<UserId> for Principal {
    fn from(id: UserId) -> Self {
        Principal::User(id)
    }
}

impl From<GroupId> for Principal {
    fn from(id: GroupId) -> Self {
        Principal::Group(id)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::User(id) => write!(f, "user#{}", id),
            Principal::Group(id) => write!(f, "group#{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip_raw() {
        let id = RoleId::new(7);
        assert_eq!(id.get(), 7);
        assert_eq!(id.to_string(), "7");
        assert_eq!(RoleId::KIND, EntityKind::Role);
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&TrackerId::new(3)).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn test_principal_display() {
        assert_eq!(Principal::from(UserId::new(1)).to_string(), "user#1");
        assert_eq!(Principal::from(GroupId::new(5)).to_string(), "group#5");
    }
}

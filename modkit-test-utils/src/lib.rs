//! Modkit Test Utilities
//!
//! Shared test infrastructure for the Modkit workspace:
//! - Proptest generators for rules and seed inputs
//! - Store fixtures (empty, with the operator account, hand-seeded)
//! - Assertions over bootstrap outcomes and store contents

pub use modkit_core::{
    EntityIdType, EntityKind, IssueStatusId, MailNotification, ModkitError, ModkitResult,
    NewUser, StoreError, UserId,
};
pub use modkit_storage::{
    EntityStore, InMemoryStore, StoreQueries, Tables, Transaction, TransactionalStore,
};
pub use modkit_workflow::TransitionRule;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies.

    use super::*;
    use proptest::prelude::*;

    /// A status universe of `1..=max` distinct ids, in ascending order.
    pub fn arb_status_universe(max: usize) -> impl Strategy<Value = Vec<IssueStatusId>> {
        (0..=max).prop_map(|n| (1..=n as i64).map(IssueStatusId::new).collect())
    }

    /// Any rule shape over status ids `1..=9`, including degenerate ones.
    pub fn arb_rule() -> impl Strategy<Value = TransitionRule<IssueStatusId>> {
        let id = (1i64..=9).prop_map(IssueStatusId::new);
        prop_oneof![
            Just(TransitionRule::AllPairs),
            (
                proptest::collection::vec(id.clone(), 0..6),
                proptest::collection::vec(id.clone(), 0..6)
            )
                .prop_map(|(from, to)| TransitionRule::Cross { from, to }),
            (id.clone(), id).prop_map(|(from, to)| TransitionRule::Single { from, to }),
        ]
    }

    /// Rules that pass `TransitionRule::validate`.
    pub fn arb_valid_rule() -> impl Strategy<Value = TransitionRule<IssueStatusId>> {
        arb_rule().prop_filter("structurally valid", |rule| rule.validate().is_ok())
    }

    /// Locale codes, supported or not.
    pub fn arb_locale() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("en".to_string()),
            Just("de".to_string()),
            Just("fr".to_string()),
            Just("DE".to_string()),
            "[a-z]{2}",
            Just(String::new()),
        ]
    }

    /// Valid user logins.
    pub fn arb_login() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{2,15}"
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built stores for common scenarios.

    use super::*;

    /// The account that exists before bootstrap in a real installation.
    pub fn operator_user() -> NewUser {
        NewUser {
            login: "admin".to_string(),
            firstname: "Redmine".to_string(),
            lastname: "Admin".to_string(),
            mail: "admin@example.net".to_string(),
            admin: true,
            language: "en".to_string(),
            mail_notification: MailNotification::All,
        }
    }

    /// A plain user with a unique login-derived mail.
    pub fn user(login: &str) -> NewUser {
        NewUser {
            login: login.to_string(),
            firstname: "Test".to_string(),
            lastname: "User".to_string(),
            mail: format!("{}@example.org", login),
            admin: false,
            language: "en".to_string(),
            mail_notification: MailNotification::OnlyMyEvents,
        }
    }

    /// Store holding only the operator account, id 1.
    pub fn store_with_operator() -> InMemoryStore {
        store_with_users(&[operator_user()])
    }

    /// Store holding the given users, committed in order.
    pub fn store_with_users(users: &[NewUser]) -> InMemoryStore {
        let store = InMemoryStore::new();
        let mut tx = store.begin().expect("begin");
        for user in users {
            tx.create_user(user.clone()).expect("create user");
        }
        tx.commit().expect("commit");
        store
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over bootstrap outcomes.

    use super::*;

    /// Assert that a result is `AlreadyBootstrapped`.
    #[track_caller]
    pub fn assert_already_bootstrapped<T: std::fmt::Debug>(result: &ModkitResult<T>) {
        match result {
            Err(ModkitError::AlreadyBootstrapped) => {}
            other => panic!("Expected AlreadyBootstrapped, got: {:?}", other),
        }
    }

    /// Assert that a result is a store `RecordInvalid` for `kind`.
    #[track_caller]
    pub fn assert_record_invalid<T: std::fmt::Debug>(result: &ModkitResult<T>, kind: EntityKind) {
        match result {
            Err(ModkitError::Store(StoreError::RecordInvalid { kind: k, .. })) => {
                assert_eq!(*k, kind, "Wrong kind in RecordInvalid error");
            }
            other => panic!("Expected RecordInvalid for {:?}, got: {:?}", kind, other),
        }
    }

    /// Assert that a result is `InvalidConfiguration`.
    #[track_caller]
    pub fn assert_invalid_configuration<T: std::fmt::Debug>(result: &ModkitResult<T>) {
        match result {
            Err(ModkitError::InvalidConfiguration(_)) => {}
            other => panic!("Expected InvalidConfiguration, got: {:?}", other),
        }
    }

    /// Assert that the committed tables equal `expected`.
    #[track_caller]
    pub fn assert_unchanged(store: &InMemoryStore, expected: &Tables) {
        let actual = store.tables().expect("read tables");
        assert!(actual == *expected, "Store contents changed");
    }

    /// Assert that `store` holds exactly `count` rows of `kind`.
    #[track_caller]
    pub fn assert_count<Q: StoreQueries>(store: &Q, kind: EntityKind, count: usize) {
        let actual = store.count(kind).expect("count");
        assert_eq!(actual, count, "Unexpected number of {} rows", kind);
    }

    /// Assert that no workflow transition is a self-loop or a duplicate.
    #[track_caller]
    pub fn assert_transitions_well_formed<Q: StoreQueries>(store: &Q) {
        let transitions = store.transitions().expect("transitions");
        let mut seen = std::collections::BTreeSet::new();
        for t in &transitions {
            assert_ne!(t.old_status_id, t.new_status_id, "Self-loop: {:?}", t);
            assert!(seen.insert(t.edge()), "Duplicate transition: {:?}", t);
        }
    }
}

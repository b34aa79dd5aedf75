//! Modkit Workflow - Transition Rule Evaluation
//!
//! Expands compact rules (all pairs, from-set x to-set, single edge) into
//! per-(tracker, role) workflow transition records. Rules are data: the
//! default table lives with the seed data in `modkit-bootstrap`.

pub mod generator;
pub mod policy;
pub mod rule;

pub use generator::{edges, generate};
pub use policy::{PolicyResolver, PolicyTable, TransitionPolicy};
pub use rule::TransitionRule;

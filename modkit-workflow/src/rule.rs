//! Transition rule shapes.

use modkit_core::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One declarative rule producing a set of status-to-status edges.
///
/// `S` is the status key: a symbolic seed key while the rule is declared,
/// an `IssueStatusId` once resolved against the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TransitionRule<S> {
    /// Every ordered pair of distinct statuses in the universe.
    AllPairs,
    /// Every `(s, t)` with `s` in `from` and `t` in `to`, except `s == t`.
    Cross { from: Vec<S>, to: Vec<S> },
    /// Exactly one edge.
    Single { from: S, to: S },
}

impl<S> TransitionRule<S> {
    pub fn all_pairs() -> Self {
        TransitionRule::AllPairs
    }

    pub fn cross(from: impl IntoIterator<Item = S>, to: impl IntoIterator<Item = S>) -> Self {
        TransitionRule::Cross {
            from: from.into_iter().collect(),
            to: to.into_iter().collect(),
        }
    }

    pub fn single(from: S, to: S) -> Self {
        TransitionRule::Single { from, to }
    }
}

impl<S: Copy + PartialEq + fmt::Debug> TransitionRule<S> {
    /// Reject rules that are structurally unable to produce an edge.
    ///
    /// A `Cross` with an empty side and a `Single` from a status to itself
    /// are configuration mistakes rather than empty rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            TransitionRule::AllPairs => Ok(()),
            TransitionRule::Cross { from, .. } if from.is_empty() => {
                Err(ConfigError::invalid_rule("cross rule has an empty from-set"))
            }
            TransitionRule::Cross { to, .. } if to.is_empty() => {
                Err(ConfigError::invalid_rule("cross rule has an empty to-set"))
            }
            TransitionRule::Cross { .. } => Ok(()),
            TransitionRule::Single { from, to } if from == to => Err(ConfigError::invalid_rule(
                format!("single rule {:?} -> {:?} is a self-loop", from, to),
            )),
            TransitionRule::Single { .. } => Ok(()),
        }
    }

    /// Map every status key through `lookup`, failing on the first key it
    /// cannot resolve.
    pub fn resolve<T, E, F>(&self, mut lookup: F) -> Result<TransitionRule<T>, E>
    where
        F: FnMut(S) -> Result<T, E>,
    {
        Ok(match self {
            TransitionRule::AllPairs => TransitionRule::AllPairs,
            TransitionRule::Cross { from, to } => TransitionRule::Cross {
                from: from.iter().map(|s| lookup(*s)).collect::<Result<_, _>>()?,
                to: to.iter().map(|s| lookup(*s)).collect::<Result<_, _>>()?,
            },
            TransitionRule::Single { from, to } => TransitionRule::Single {
                from: lookup(*from)?,
                to: lookup(*to)?,
            },
        })
    }

    /// Short label for logs.
    pub fn shape(&self) -> &'static str {
        match self {
            TransitionRule::AllPairs => "all_pairs",
            TransitionRule::Cross { .. } => "cross",
            TransitionRule::Single { .. } => "single",
        }
    }
}

//! # State Guard
//!
//! A minimal finite state machine: a current state plus a table of legal
//! transitions. [`StateGuard::try_go_state`] is a synchronous check-and-commit,
//! so calling it before the first `.await` of an operation is enough to keep
//! two callers from passing the guard in the same direction.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Guards transitions between a closed set of states.
#[derive(Debug, Clone)]
pub struct StateGuard<S> {
    current: S,
    transitions: HashMap<S, Vec<S>>,
}

impl<S> StateGuard<S>
where
    S: Copy + Eq + Hash + Debug,
{
    /// Creates a guard in `initial`.
    ///
    /// `transitions` maps each state to the states reachable from it. A state
    /// missing from the table has no outgoing transitions. Self-transitions are
    /// only legal if listed explicitly.
    pub fn new(initial: S, transitions: impl IntoIterator<Item = (S, Vec<S>)>) -> Self {
        Self {
            current: initial,
            transitions: transitions.into_iter().collect(),
        }
    }

    pub fn current(&self) -> S {
        self.current
    }

    /// Returns true if `target` is reachable from the current state.
    pub fn can_go(&self, target: S) -> bool {
        self.transitions
            .get(&self.current)
            .is_some_and(|targets| targets.contains(&target))
    }

    /// Commits `target` if it is reachable from the current state.
    ///
    /// Returns `false` and leaves the state untouched otherwise.
    pub fn try_go_state(&mut self, target: S) -> bool {
        if !self.can_go(target) {
            return false;
        }
        self.current = target;
        true
    }
}

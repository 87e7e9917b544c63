//! Lazily expanded game tree
//!
//! Nodes start unexpanded. [`GameTree::expand`] materializes one more layer
//! below the current frontier; [`GameTree::expand_fully`] repeats that until
//! every leaf is terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{GameState, RuleError};
use crate::moves::{legal_moves, Move};

/// An edge of the game tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Move(Move),
    /// The team on duty had no legal move
    Skip,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move(mv) => write!(f, "{mv}"),
            Action::Skip => f.write_str("skip"),
        }
    }
}

/// Every action available in `state` with its resulting state
///
/// Empty when no team can move. A single skip when only the team on duty is
/// stuck. Otherwise one child per legal move, penguins in team order and
/// destinations direction by direction.
pub fn generate_children(state: &GameState) -> Vec<(Action, GameState)> {
    if state.is_game_over() {
        return Vec::new();
    }
    let moves = legal_moves(state);
    if moves.is_empty() {
        return state
            .skip_turn()
            .map(|next| vec![(Action::Skip, next)])
            .unwrap_or_default();
    }
    moves
        .into_iter()
        .filter_map(|mv| state.relocate(mv).ok().map(|next| (Action::Move(mv), next)))
        .collect()
}

/// Apply a sequence of actions, each of which must be a child of the state
/// it is applied to
pub fn query(state: &GameState, actions: &[Action]) -> Result<GameState, RuleError> {
    let mut current = state.clone();
    for (index, action) in actions.iter().enumerate() {
        current = generate_children(&current)
            .into_iter()
            .find(|(candidate, _)| candidate == action)
            .map(|(_, next)| next)
            .ok_or(RuleError::IllegalAction(index))?;
    }
    Ok(current)
}

#[derive(Clone, Debug)]
pub struct GameTree {
    state: GameState,
    children: Option<Vec<(Action, GameTree)>>,
}

impl GameTree {
    /// Unexpanded root
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            children: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Materialized children, or None if this node is still on the frontier
    pub fn children(&self) -> Option<&[(Action, GameTree)]> {
        self.children.as_deref()
    }

    pub fn child(&self, action: Action) -> Option<&GameTree> {
        self.children
            .iter()
            .flatten()
            .find(|(candidate, _)| *candidate == action)
            .map(|(_, child)| child)
    }

    pub fn is_expanded(&self) -> bool {
        self.children.is_some()
    }

    /// Some node below (or at) this one has not been expanded
    pub fn has_frontier(&self) -> bool {
        match &self.children {
            None => true,
            Some(children) => children.iter().any(|(_, child)| child.has_frontier()),
        }
    }

    /// Expand every frontier node by one layer, returning the number of new nodes
    pub fn expand(&mut self) -> usize {
        if let Some(children) = self.children.as_mut() {
            return children.iter_mut().map(|(_, child)| child.expand()).sum();
        }
        let children: Vec<_> = generate_children(&self.state)
            .into_iter()
            .map(|(action, state)| (action, GameTree::new(state)))
            .collect();
        let added = children.len();
        self.children = Some(children);
        added
    }

    /// Expand until every leaf is terminal
    pub fn expand_fully(&mut self) {
        while self.has_frontier() {
            self.expand();
        }
    }

    /// Materialized nodes, root included
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(|(_, child)| child.node_count())
            .sum::<usize>()
    }

    /// Longest materialized path in edges
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .flatten()
            .map(|(_, child)| 1 + child.depth())
            .max()
            .unwrap_or(0)
    }

    /// Fold over every materialized state, preorder
    pub fn fold_states<T, F>(&self, init: T, mut f: F) -> T
    where
        F: FnMut(T, &GameState) -> T,
    {
        self.fold_inner(init, &mut f)
    }

    fn fold_inner<T, F>(&self, acc: T, f: &mut F) -> T
    where
        F: FnMut(T, &GameState) -> T,
    {
        let acc = f(acc, &self.state);
        self.children
            .iter()
            .flatten()
            .fold(acc, |acc, (_, child)| child.fold_inner(acc, f))
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! Arena of live goal nodes.
//!
//! Nodes are owned by the arena and keyed by [`GoalId`]. A parent owns its
//! children through an ordered id list; a child points back through a
//! non-owning parent id. Removing a node removes its whole subtree.

use std::collections::BTreeMap;

use quarry_types::{GoalId, Lane};

use crate::callbacks::Callbacks;
use crate::goal::{Goal, GoalFuture};

/// One live goal.
pub(crate) struct GoalNode {
    pub(crate) id: GoalId,
    pub(crate) parent: Option<GoalId>,
    pub(crate) children: Vec<GoalId>,
    pub(crate) depth: usize,
    pub(crate) quiet: bool,
    pub(crate) lane: Lane,
    pub(crate) started: bool,
    pub(crate) pending: Option<GoalFuture>,
    pub(crate) cancel_hook_ran: bool,
    pub(crate) callbacks: Callbacks,
    pub(crate) goal: Box<dyn Goal>,
}

impl GoalNode {
    pub(crate) fn new(
        id: GoalId,
        parent: Option<GoalId>,
        depth: usize,
        quiet: bool,
        lane: Lane,
        goal: Box<dyn Goal>,
        callbacks: Callbacks,
    ) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            depth,
            quiet,
            lane,
            started: false,
            pending: None,
            cancel_hook_ran: false,
            callbacks,
            goal,
        }
    }
}

#[derive(Default)]
pub(crate) struct GoalArena {
    nodes: BTreeMap<GoalId, GoalNode>,
}

impl GoalArena {
    pub(crate) fn insert(&mut self, node: GoalNode) {
        self.nodes.insert(node.id, node);
    }

    pub(crate) fn get(&self, id: GoalId) -> Option<&GoalNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: GoalId) -> Option<&mut GoalNode> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn contains(&self, id: GoalId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Remove `id` and every descendant, detaching `id` from its parent.
    /// Returns the removed node and the number of descendants discarded.
    pub(crate) fn remove_subtree(&mut self, id: GoalId) -> Option<(GoalNode, usize)> {
        let node = self.nodes.remove(&id)?;
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }
        let mut discarded = 0_usize;
        let mut stack = node.children.clone();
        while let Some(child) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&child) {
                discarded = discarded.saturating_add(1);
                stack.extend(removed.children);
            }
        }
        Some((node, discarded))
    }

    /// Ids of `root` and its descendants, depth-first, children in order.
    pub(crate) fn walk(&self, root: GoalId) -> Vec<GoalId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                order.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::context::GoalContext;
    use crate::goal::Step;

    struct Idle;

    impl Goal for Idle {
        fn label(&self) -> String {
            String::from("idle")
        }

        fn step(&mut self, _ctx: &mut GoalContext<'_>) -> Step {
            Step::Pending
        }
    }

    fn node(id: u64, parent: Option<u64>, depth: usize) -> GoalNode {
        GoalNode::new(
            GoalId::new(id),
            parent.map(GoalId::new),
            depth,
            false,
            Lane::Normal,
            Box::new(Idle),
            Callbacks::default(),
        )
    }

    fn tree() -> GoalArena {
        let mut arena = GoalArena::default();
        let mut root = node(1, None, 0);
        root.children = vec![GoalId::new(2), GoalId::new(3)];
        let mut left = node(2, Some(1), 1);
        left.children = vec![GoalId::new(4)];
        arena.insert(root);
        arena.insert(left);
        arena.insert(node(3, Some(1), 1));
        arena.insert(node(4, Some(2), 2));
        arena
    }

    #[test]
    fn walk_is_depth_first_in_child_order() {
        let arena = tree();
        let order: Vec<u64> = arena
            .walk(GoalId::new(1))
            .into_iter()
            .map(GoalId::into_inner)
            .collect();
        assert_eq!(order, vec![1, 2, 4, 3]);
    }

    #[test]
    fn remove_subtree_detaches_and_discards() {
        let mut arena = tree();
        let (removed, discarded) = arena.remove_subtree(GoalId::new(2)).unwrap();
        assert_eq!(removed.id, GoalId::new(2));
        assert_eq!(discarded, 1);
        assert!(!arena.contains(GoalId::new(4)));
        assert_eq!(
            arena.get(GoalId::new(1)).unwrap().children,
            vec![GoalId::new(3)]
        );
        assert_eq!(arena.len(), 2);
    }
}

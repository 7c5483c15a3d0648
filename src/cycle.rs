//! Defines a [`Ring`], the ordered collection that holds the windows of a
//! monitor, the monitors of the manager, and the layouts of a monitor.
//!
//! The [`Ring`] is a circular doubly-linked list rooted at a sentinel node.
//! The nodes live in an arena and are addressed by index, so a node keeps its
//! slot for as long as it is linked no matter how the rest of the [`Ring`]
//! changes. The sentinel never carries data and is skipped by every traversal.
//!
//! One element is focused whenever the [`Ring`] is non-empty. Reordering
//! ([`Ring::move_focus`], [`Ring::move_focus_for`], [`Ring::swap_front_for`])
//! swaps the *contents* of two slots and leaves the links alone. When the
//! focused slot takes part in a swap, focus moves to the other slot, which is
//! where the previously focused item now lives.
//!
//! To get an item from the [`Ring`], a [`Selector`] is used. This can retrieve
//! the focused item, the item at a given position, the item with a given ID,
//! or an item fulfilling a predicate.

use crate::core::{Identify, Idx, Xid};
use std::{fmt, iter::FromIterator};

/// Index of a slot in the arena of a [`Ring`]
type NodeId = usize;

/// The sentinel is always the first slot of the arena
const ROOT: NodeId = 0;

// ============================= Selector =============================

/// Used to select the first item matching the given [`Selector`]
#[derive(Clone, Copy)]
pub(crate) enum Selector<'a, T> {
    /// Focused element in the target collection
    Focused,
    /// Element at the given position, counting from the front (0-based)
    Index(Idx),
    /// Element with this ID
    Ident(Xid),
    /// First element satisfying this condition
    Condition(&'a dyn Fn(&T) -> bool),
}

impl<T> From<Xid> for Selector<'_, T> {
    fn from(id: Xid) -> Self {
        Self::Ident(id)
    }
}

impl<T> fmt::Debug for Selector<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Focused => f.debug_struct("Selector::Focused").finish(),
            Self::Index(i) => f.debug_struct("Selector::Index").field("index", i).finish(),
            Self::Ident(i) => f.debug_struct("Selector::Ident").field("id", i).finish(),
            Self::Condition(func) => f
                .debug_struct("Selector::Condition")
                .field("condition", &stringify!(func))
                .finish(),
        }
    }
}

// =============================== Ring ===============================

/// A slot in the arena
#[derive(Debug, Clone)]
struct Node<T> {
    /// `None` for the sentinel and for free slots
    data: Option<T>,
    prev: NodeId,
    next: NodeId,
}

impl<T> Node<T> {
    const fn unlinked(data: Option<T>) -> Self {
        Self { data, prev: ROOT, next: ROOT }
    }
}

/// Focus-tracking circular list of `T`
#[derive(Debug, Clone)]
pub(crate) struct Ring<T> {
    /// Arena of slots; `nodes[ROOT]` is the sentinel
    nodes:   Vec<Node<T>>,
    /// Slots that were unlinked and can be reused
    free:    Vec<NodeId>,
    /// Slot of the focused element, `None` iff the ring is empty
    focused: Option<NodeId>,
    /// Number of linked elements
    count:   usize,
}

impl<T> Default for Ring<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Ring<T> {
    /// Create an empty [`Ring`]
    pub(crate) fn new() -> Self {
        Self {
            nodes:   vec![Node::unlinked(None)],
            free:    vec![],
            focused: None,
            count:   0,
        }
    }

    /// Return the number of elements
    pub(crate) const fn len(&self) -> usize {
        self.count
    }

    /// Check whether the [`Ring`] is empty
    pub(crate) const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Try to retrieve the focused element
    pub(crate) fn focused(&self) -> Option<&T> {
        self.focused.and_then(|n| self.nodes[n].data.as_ref())
    }

    /// Try to retrieve the focused element as mutable
    pub(crate) fn focused_mut(&mut self) -> Option<&mut T> {
        match self.focused {
            Some(n) => self.nodes[n].data.as_mut(),
            None => None,
        }
    }

    /// Iterate over the elements from front to back
    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.node_ids().filter_map(move |n| self.nodes[n].data.as_ref())
    }

    /// Iterate mutably over the elements from front to back
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        let order = self.node_ids().collect::<Vec<_>>();
        let mut slots = self
            .nodes
            .iter_mut()
            .map(|node| node.data.as_mut())
            .collect::<Vec<_>>();

        order.into_iter().filter_map(move |n| slots[n].take())
    }

    /// Append an item at the back. The first item of an empty [`Ring`] is
    /// focused
    pub(crate) fn insert(&mut self, item: T) {
        let back = self.nodes[ROOT].prev;
        self.insert_after(item, back);
    }

    /// Insert an item directly after the focused element. Equivalent to
    /// [`Ring::insert`] when the [`Ring`] is empty
    pub(crate) fn insert_after_focus(&mut self, item: T) {
        let after = self.focused.unwrap_or(self.nodes[ROOT].prev);
        self.insert_after(item, after);
    }

    /// Move focus `n` steps forward (positive) or backward (negative),
    /// wrapping around the ends
    pub(crate) fn focus(&mut self, n: isize) {
        if let Some(mut node) = self.focused {
            for _ in 0..n.unsigned_abs() {
                node = self.step_over_root(node, n > 0);
            }
            self.focused = Some(node);
        }
    }

    /// Look at the element `n` steps away from the focused one without moving
    /// focus.
    ///
    /// Landing on the sentinel costs an extra step, and so does landing on
    /// the focused element, so the walk visits only the *other* elements.
    /// `select(0)` is always `None`. On a single element ring the walk ends
    /// on the sentinel, which yields `None` too.
    pub(crate) fn select(&self, n: isize) -> Option<&T> {
        let focused = self.focused?;
        if n == 0 {
            return None;
        }

        let forward = n > 0;
        let mut node = focused;

        for _ in 0..n.unsigned_abs() {
            node = self.step(node, forward);
            if node == ROOT {
                node = self.step(node, forward);
            }
            if node == focused {
                node = self.step(node, forward);
            }
        }

        self.nodes[node].data.as_ref()
    }

    /// Swap the focused element with its neighbour `n` times, forward for a
    /// positive `n` and backward for a negative one. Focus follows the
    /// element, so the rest of the order shifts around it
    pub(crate) fn move_focus(&mut self, n: isize) {
        for _ in 0..n.unsigned_abs() {
            if let Some(node) = self.focused {
                let with = self.step_over_root(node, n > 0);
                self.swap(node, with);
            }
        }
    }

    /// Walk the links without skipping the sentinel
    fn step(&self, node: NodeId, forward: bool) -> NodeId {
        if forward {
            self.nodes[node].next
        } else {
            self.nodes[node].prev
        }
    }

    /// Walk the links, stepping over the sentinel
    fn step_over_root(&self, node: NodeId, forward: bool) -> NodeId {
        match self.step(node, forward) {
            ROOT => self.step(ROOT, forward),
            next => next,
        }
    }

    /// Slots of every element, front to back
    fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        let first = Some(self.nodes[ROOT].next).filter(|&n| n != ROOT);
        std::iter::successors(first, move |&n| {
            Some(self.nodes[n].next).filter(|&next| next != ROOT)
        })
    }

    /// Place the item in a free slot and link it after `after`
    fn insert_after(&mut self, item: T, after: NodeId) {
        let node = match self.free.pop() {
            Some(node) => {
                self.nodes[node] = Node::unlinked(Some(item));
                node
            },
            None => {
                self.nodes.push(Node::unlinked(Some(item)));
                self.nodes.len() - 1
            },
        };

        let next = self.nodes[after].next;
        self.nodes[after].next = node;
        self.nodes[node].prev = after;
        self.nodes[node].next = next;
        self.nodes[next].prev = node;
        self.count += 1;

        if self.focused.is_none() {
            self.focused = Some(node);
        }
    }

    /// Unlink a slot and return its contents.
    ///
    /// A focused front element hands focus to its successor, any other
    /// focused element to its predecessor.
    fn remove_node(&mut self, node: NodeId) -> Option<T> {
        let Node { prev, next, .. } = self.nodes[node];

        if self.focused == Some(node) {
            let heir = if prev == ROOT { next } else { prev };
            self.focused = (heir != ROOT).then(|| heir);
        }

        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.count -= 1;
        self.free.push(node);

        let Node { data, .. } = std::mem::replace(&mut self.nodes[node], Node::unlinked(None));
        data
    }

    /// Exchange the contents of two slots. If `node` was focused, focus
    /// moves to `with`
    fn swap(&mut self, node: NodeId, with: NodeId) {
        if self.focused == Some(node) {
            self.focused = Some(with);
        }

        let data = self.nodes[node].data.take();
        self.nodes[node].data = self.nodes[with].data.take();
        self.nodes[with].data = data;
    }
}

impl<T: Identify> Ring<T> {
    /// Find the slot of the first element matching a [`Selector`]
    fn node_for(&self, sel: &Selector<T>) -> Option<NodeId> {
        match sel {
            Selector::Focused => self.focused,
            Selector::Index(idx) => self.node_ids().nth(*idx),
            Selector::Ident(id) => self.node_ids().find(|&n| {
                self.nodes[n]
                    .data
                    .as_ref()
                    .map_or(false, |data| data.id() == *id)
            }),
            Selector::Condition(f) => self
                .node_ids()
                .find(|&n| self.nodes[n].data.as_ref().map_or(false, |data| f(data))),
        }
    }

    /// Retrieve an element matching a [`Selector`]
    pub(crate) fn get_for(&self, sel: &Selector<T>) -> Option<&T> {
        self.node_for(sel).and_then(|n| self.nodes[n].data.as_ref())
    }

    /// Retrieve an element matching a [`Selector`], return as mutable
    pub(crate) fn get_for_mut(&mut self, sel: &Selector<T>) -> Option<&mut T> {
        match self.node_for(sel) {
            Some(n) => self.nodes[n].data.as_mut(),
            None => None,
        }
    }

    /// Retrieve the 0-based position of the element matching a [`Selector`]
    pub(crate) fn index_for(&self, sel: &Selector<T>) -> Option<Idx> {
        let node = self.node_for(sel)?;
        self.node_ids().position(|n| n == node)
    }

    /// Check whether an element with this ID is in the [`Ring`]
    pub(crate) fn contains(&self, id: Xid) -> bool {
        self.node_for(&Selector::Ident(id)).is_some()
    }

    /// Remove the first element matching the [`Selector`]
    pub(crate) fn remove_for(&mut self, sel: &Selector<T>) -> Option<T> {
        let node = self.node_for(sel)?;
        self.remove_node(node)
    }

    /// Focus the first element matching the [`Selector`]
    pub(crate) fn focus_for(&mut self, sel: &Selector<T>) -> Option<&T> {
        let node = self.node_for(sel)?;
        self.focused = Some(node);
        self.nodes[node].data.as_ref()
    }

    /// Swap the focused element with the first element matching the
    /// [`Selector`]. Focus follows the focused element to its new slot
    pub(crate) fn move_focus_for(&mut self, sel: &Selector<T>) {
        if let (Some(focused), Some(node)) = (self.focused, self.node_for(sel)) {
            self.swap(focused, node);
        }
    }

    /// Swap the element matching the [`Selector`] with the front element. If
    /// the matched element was focused, focus moves to the front
    pub(crate) fn swap_front_for(&mut self, sel: &Selector<T>) {
        if let Some(node) = self.node_for(sel) {
            let front = self.nodes[ROOT].next;
            self.swap(node, front);
        }
    }
}

impl<T> FromIterator<T> for Ring<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut ring = Self::new();
        for item in iter {
            ring.insert(item);
        }
        ring
    }
}

impl<T: fmt::Display> fmt::Display for Ring<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "<nil>");
        }

        for (i, n) in self.node_ids().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }

            if let Some(data) = &self.nodes[n].data {
                if self.focused == Some(n) {
                    write!(f, "<{}>", data)?;
                } else {
                    write!(f, "-{}-", data)?;
                }
            }
        }

        Ok(())
    }
}

//! # Quadtree (2D spatial index)
//!
//! A mutable region quadtree over particle positions, used as the collision
//! broad phase. Rebuilding it every sub-step is cheap enough that the solver
//! can afford to throw it away; it also supports an incremental refresh.
//!
//! ## Layout
//!
//! - All nodes live in one `Vec<QuadNode>` arena and refer to each other by
//!   index. Node `0` is always the root.
//! - A branch owns 4 **contiguous** children, so child `q` of a branch is
//!   `first_child + q`. No per-node child array is needed.
//! - A leaf holds its entries as an intrusive singly-linked list threaded
//!   through [`QuadObject::next`]. Entries are stored in a [`FreeList`], so
//!   removing one does not shift the others.
//! - Child groups released by [`QuadTree::cleanup`] are chained on a
//!   free-node list and reused by later splits.
//!
//! ## Quadrants
//!
//! A point goes left if `x < center.x` and up if `y < center.y`, otherwise
//! right/down, so every point of a node maps to exactly one child:
//!
//! - `0`: x < cx, y < cy
//! - `1`: x ≥ cx, y < cy
//! - `2`: x < cx, y ≥ cy
//! - `3`: x ≥ cx, y ≥ cy
//!
//! Cells are half-open (`min <= p < max`), matching the tie rule.
//!
//! ## Queries
//!
//! [`QuadTree::query`] is generic over [`QueryBounds`], implemented by exactly
//! two shapes: a rectangular region ([`QuadCell`]) and a unit-radius circular
//! [`Probe`]. Both use strict boundaries towards the outside of the shape
//! (see `DESIGN.md`).

use crate::simulation::free_list::FreeList;
use crate::simulation::states::{NVec2, CONTACT_DISTANCE};

/// Occupancy at which a leaf is split before the next insert.
pub const MAX_OBJECTS: usize = 8;

/// Leaves at this depth never split.
pub const MAX_DEPTH: u32 = 4;

/// Axis-aligned rectangle stored as center + half extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadCell {
    pub center: NVec2,
    pub half_size: NVec2,
}

impl QuadCell {
    pub fn new(center: NVec2, half_size: NVec2) -> Self {
        Self { center, half_size }
    }

    /// Cell covering `[0, size.x) x [0, size.y)`.
    pub fn from_size(size: NVec2) -> Self {
        Self::new(size * 0.5, size * 0.5)
    }

    pub fn from_min_max(min: NVec2, max: NVec2) -> Self {
        Self::new((min + max) * 0.5, (max - min) * 0.5)
    }

    pub fn min(&self) -> NVec2 {
        self.center - self.half_size
    }

    pub fn max(&self) -> NVec2 {
        self.center + self.half_size
    }

    /// Half-open containment: `min <= p < max` on both axes.
    pub fn contains_point(&self, p: &NVec2) -> bool {
        let min = self.min();
        let max = self.max();
        p.x >= min.x && p.x < max.x && p.y >= min.y && p.y < max.y
    }

    /// Which child quadrant `p` falls into. Ties go to the greater side.
    pub fn quadrant(&self, p: &NVec2) -> usize {
        let mut q = 0;
        if p.x >= self.center.x {
            q |= 1;
        }
        if p.y >= self.center.y {
            q |= 2;
        }
        q
    }

    /// The cell of child quadrant `q`.
    pub fn child(&self, q: usize) -> QuadCell {
        let half = self.half_size * 0.5;
        let dx = if q & 1 == 0 { -half.x } else { half.x };
        let dy = if q & 2 == 0 { -half.y } else { half.y };
        QuadCell::new(self.center + NVec2::new(dx, dy), half)
    }
}

/// Circular query shape of radius [`CONTACT_DISTANCE`] around `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub center: NVec2,
}

impl Probe {
    pub fn new(center: NVec2) -> Self {
        Self { center }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::QuadCell {}
    impl Sealed for super::Probe {}
}

/// Shapes the quadtree can be queried with.
///
/// Sealed: the only implementors are [`QuadCell`] and [`Probe`].
pub trait QueryBounds: sealed::Sealed {
    /// Does the shape contain an indexed point?
    fn contains(&self, point: &NVec2) -> bool;

    /// Can the shape contain any point of `cell`? Used for pruning.
    fn intersects(&self, cell: &QuadCell) -> bool;
}

impl QueryBounds for QuadCell {
    fn contains(&self, point: &NVec2) -> bool {
        self.contains_point(point)
    }

    fn intersects(&self, cell: &QuadCell) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (cell.min(), cell.max());
        a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
    }
}

impl QueryBounds for Probe {
    fn contains(&self, point: &NVec2) -> bool {
        (*point - self.center).norm_squared() < CONTACT_DISTANCE * CONTACT_DISTANCE
    }

    fn intersects(&self, cell: &QuadCell) -> bool {
        let min = cell.min();
        let max = cell.max();
        let nearest = NVec2::new(
            self.center.x.clamp(min.x, max.x),
            self.center.y.clamp(min.y, max.y),
        );
        (nearest - self.center).norm_squared() < CONTACT_DISTANCE * CONTACT_DISTANCE
    }
}

/// One indexed point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadObject {
    pub position: NVec2, // position when indexed (or last refreshed)
    pub id: usize, // owner's id, e.g. particle index
    pub next: Option<usize>, // next entry in the same leaf
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Holds `count` entries, linked from `head`.
    Leaf { count: usize, head: Option<usize> },
    /// Children are `first_child..first_child + 4`.
    Branch { first_child: usize },
    /// First node of a released child group, chained to the next free group.
    Free { next: Option<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadNode {
    pub area: QuadCell,
    pub depth: u32,
    pub state: NodeState,
}

impl QuadNode {
    fn leaf(area: QuadCell, depth: u32) -> Self {
        Self {
            area,
            depth,
            state: NodeState::Leaf { count: 0, head: None },
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.state, NodeState::Leaf { .. })
    }

    pub fn is_branch(&self) -> bool {
        matches!(self.state, NodeState::Branch { .. })
    }

    /// Entry count for a leaf, `None` otherwise.
    pub fn count(&self) -> Option<usize> {
        match self.state {
            NodeState::Leaf { count, .. } => Some(count),
            _ => None,
        }
    }
}

pub struct QuadTree {
    pub objects: FreeList<QuadObject>,
    pub nodes: Vec<QuadNode>,
    root_bounds: QuadCell,
    max_objects: usize,
    max_depth: u32,
    free_node: Option<usize>,
}

impl QuadTree {
    /// Empty tree over `bounds` with the default split limits.
    pub fn new(bounds: QuadCell) -> Self {
        Self::with_limits(bounds, MAX_OBJECTS, MAX_DEPTH)
    }

    /// Empty tree over `[0, size.x) x [0, size.y)`.
    pub fn with_size(size: NVec2) -> Self {
        Self::new(QuadCell::from_size(size))
    }

    /// Empty tree with custom split limits. `max_objects` is raised to 1.
    pub fn with_limits(bounds: QuadCell, max_objects: usize, max_depth: u32) -> Self {
        // a full tree of this depth; deeper limits just grow on demand
        let full_tree = (4usize.pow(max_depth.min(6) + 1) - 1) / 3;
        let mut nodes = Vec::with_capacity(full_tree);
        nodes.push(QuadNode::leaf(bounds, 0));

        Self {
            objects: FreeList::new(),
            nodes,
            root_bounds: bounds,
            max_objects: max_objects.max(1),
            max_depth,
            free_node: None,
        }
    }

    pub fn root_bounds(&self) -> QuadCell {
        self.root_bounds
    }

    pub fn max_objects(&self) -> usize {
        self.max_objects
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Drop every entry and collapse to a single empty root.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.nodes.clear();
        self.nodes.push(QuadNode::leaf(self.root_bounds, 0));
        self.free_node = None;
    }

    /// Index `position` under `id` and return the entry handle.
    ///
    /// Positions outside the root cell end up in the nearest edge leaf; they
    /// are stored but region queries may not find them.
    pub fn insert(&mut self, position: NVec2, id: usize) -> usize {
        let handle = self.objects.insert(QuadObject {
            position,
            id,
            next: None,
        });
        self.link(handle);
        handle
    }

    /// All ids whose indexed position satisfies `bounds.contains`.
    pub fn query<B: QueryBounds>(&self, bounds: &B) -> Vec<usize> {
        let mut result = Vec::new();
        self.query_into(bounds, &mut result);
        result
    }

    /// Like [`QuadTree::query`], appending into `out` (which is not cleared).
    pub fn query_into<B: QueryBounds>(&self, bounds: &B, out: &mut Vec<usize>) {
        self.query_node(bounds, 0, out);
    }

    /// Refresh the stored position of every entry.
    ///
    /// `position_of(id)` returns the owner's current position, or `None` if it
    /// should no longer be indexed. Entries that left their leaf are re-inserted
    /// from the root; entries that left the root cell (or got `None`) are
    /// removed. Returns the ids of the removed entries.
    pub fn update_leafs<F>(&mut self, position_of: F) -> Vec<usize>
    where
        F: Fn(usize) -> Option<NVec2>,
    {
        let mut moved = Vec::new();
        let mut evicted = Vec::new();

        for node_idx in 0..self.nodes.len() {
            let NodeState::Leaf { head, .. } = self.nodes[node_idx].state else {
                continue;
            };
            let area = self.nodes[node_idx].area;

            let mut kept_head = None;
            let mut kept = 0;
            let mut cursor = head;
            while let Some(handle) = cursor {
                let obj = &mut self.objects[handle];
                cursor = obj.next;
                match position_of(obj.id) {
                    Some(position) => {
                        obj.position = position;
                        if area.contains_point(&position) {
                            obj.next = kept_head;
                            kept_head = Some(handle);
                            kept += 1;
                        } else {
                            obj.next = None;
                            moved.push(handle);
                        }
                    }
                    None => {
                        evicted.push(obj.id);
                        self.objects.erase(handle);
                    }
                }
            }
            self.nodes[node_idx].state = NodeState::Leaf {
                count: kept,
                head: kept_head,
            };
        }

        for handle in moved {
            let obj = self.objects[handle];
            if self.root_bounds.contains_point(&obj.position) {
                self.link(handle);
            } else {
                evicted.push(obj.id);
                self.objects.erase(handle);
            }
        }

        evicted
    }

    /// Collapse every branch whose children are all empty leaves.
    ///
    /// Runs bottom-up, so whole empty subtrees fold in one call. Released
    /// child groups go onto the free-node list.
    pub fn cleanup(&mut self) {
        self.cleanup_node(0);
    }

    /// Node indices of all reachable leaves, depth-first.
    pub fn leaves(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![0];
        while let Some(idx) = stack.pop() {
            match self.nodes[idx].state {
                NodeState::Leaf { .. } => out.push(idx),
                NodeState::Branch { first_child } => {
                    stack.extend((first_child..first_child + 4).rev());
                }
                NodeState::Free { .. } => {}
            }
        }
        out
    }

    /// Entries of leaf `node_idx`. Empty for anything but a leaf.
    pub fn bucket(&self, node_idx: usize) -> Bucket<'_> {
        let head = match self.nodes.get(node_idx).map(|n| n.state) {
            Some(NodeState::Leaf { head, .. }) => head,
            _ => None,
        };
        Bucket {
            objects: &self.objects,
            cursor: head,
        }
    }

    /// Reachable nodes (branches and leaves). The arena may hold more.
    pub fn live_node_count(&self) -> usize {
        let leaves = self.leaves().len();
        // each split turns one leaf into four: leaves = 3 * branches + 1
        leaves + (leaves - 1) / 3
    }

    /// Largest leaf occupancy.
    pub fn max_bucket(&self) -> usize {
        self.leaves()
            .into_iter()
            .filter_map(|idx| self.nodes[idx].count())
            .max()
            .unwrap_or(0)
    }

    /// Number of released child groups waiting for reuse.
    pub fn free_group_count(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.free_node;
        while let Some(group) = cursor {
            count += 1;
            cursor = match self.nodes[group].state {
                NodeState::Free { next } => next,
                _ => None,
            };
        }
        count
    }

    // helpers ==============================================================================

    /// Link an existing entry into the leaf its position belongs to,
    /// splitting full leaves on the way.
    fn link(&mut self, handle: usize) {
        let position = self.objects[handle].position;

        let mut node_idx = 0;
        loop {
            let node = self.nodes[node_idx];
            match node.state {
                NodeState::Branch { first_child } => {
                    node_idx = first_child + node.area.quadrant(&position);
                }
                NodeState::Leaf { count, .. }
                    if count >= self.max_objects && node.depth < self.max_depth =>
                {
                    self.split(node_idx);
                }
                _ => break,
            }
        }

        if let NodeState::Leaf { count, head } = self.nodes[node_idx].state {
            self.objects[handle].next = head;
            self.nodes[node_idx].state = NodeState::Leaf {
                count: count + 1,
                head: Some(handle),
            };
        }
    }

    /// Turn leaf `node_idx` into a branch and push its entries down.
    fn split(&mut self, node_idx: usize) {
        let QuadNode { area, depth, state } = self.nodes[node_idx];
        let NodeState::Leaf { head, .. } = state else {
            return;
        };

        let children = [0, 1, 2, 3].map(|q| QuadNode::leaf(area.child(q), depth + 1));
        let first_child = match self.free_node {
            Some(group) => {
                self.free_node = match self.nodes[group].state {
                    NodeState::Free { next } => next,
                    _ => None,
                };
                self.nodes[group..group + 4].copy_from_slice(&children);
                group
            }
            None => {
                let group = self.nodes.len();
                self.nodes.extend_from_slice(&children);
                group
            }
        };

        let mut cursor = head;
        while let Some(handle) = cursor {
            let obj = self.objects[handle];
            cursor = obj.next;
            let child_idx = first_child + area.quadrant(&obj.position);
            if let NodeState::Leaf { count, head } = self.nodes[child_idx].state {
                self.objects[handle].next = head;
                self.nodes[child_idx].state = NodeState::Leaf {
                    count: count + 1,
                    head: Some(handle),
                };
            }
        }

        self.nodes[node_idx].state = NodeState::Branch { first_child };
    }

    fn query_node<B: QueryBounds>(&self, bounds: &B, node_idx: usize, out: &mut Vec<usize>) {
        let node = &self.nodes[node_idx];
        if !bounds.intersects(&node.area) {
            return;
        }

        match node.state {
            NodeState::Branch { first_child } => {
                for child in first_child..first_child + 4 {
                    self.query_node(bounds, child, out);
                }
            }
            NodeState::Leaf { head, .. } => {
                let mut cursor = head;
                while let Some(handle) = cursor {
                    let obj = &self.objects[handle];
                    if bounds.contains(&obj.position) {
                        out.push(obj.id);
                    }
                    cursor = obj.next;
                }
            }
            NodeState::Free { .. } => {}
        }
    }

    /// Returns true if `node_idx` is an empty leaf afterwards.
    fn cleanup_node(&mut self, node_idx: usize) -> bool {
        match self.nodes[node_idx].state {
            NodeState::Leaf { count, .. } => count == 0,
            NodeState::Free { .. } => false,
            NodeState::Branch { first_child } => {
                let mut all_empty = true;
                for child in first_child..first_child + 4 {
                    // no short-circuit: every child subtree gets folded
                    all_empty &= self.cleanup_node(child);
                }
                if all_empty {
                    self.nodes[first_child].state = NodeState::Free { next: self.free_node };
                    self.free_node = Some(first_child);
                    self.nodes[node_idx].state = NodeState::Leaf { count: 0, head: None };
                }
                all_empty
            }
        }
    }
}

/// Iterator over the entries of one leaf.
pub struct Bucket<'a> {
    objects: &'a FreeList<QuadObject>,
    cursor: Option<usize>,
}

impl<'a> Iterator for Bucket<'a> {
    type Item = &'a QuadObject;

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor?;
        let obj = &self.objects[handle];
        self.cursor = obj.next;
        Some(obj)
    }
}

use std::collections::HashMap;

use glam::Vec2;
use tracing::trace;

use crate::geometry::pixel_key;
use crate::types::{Direction, EntityKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Set of entity kinds allowed to leave a node along one edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KindSet(u8);

impl KindSet {
    pub fn all() -> Self {
        Self(
            EntityKind::ALL
                .iter()
                .fold(0u8, |mask, kind| mask | kind.bit()),
        )
    }

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn insert(&mut self, kind: EntityKind) {
        self.0 |= kind.bit();
    }

    pub fn remove(&mut self, kind: EntityKind) {
        self.0 &= !kind.bit();
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub position: Vec2,
    neighbors: [Option<NodeId>; 4],
    portal: Option<NodeId>,
    access: [KindSet; 4],
}

impl Node {
    fn new(position: Vec2) -> Self {
        Self {
            position,
            neighbors: [None; 4],
            portal: None,
            access: [KindSet::all(); 4],
        }
    }

    pub fn neighbor(&self, direction: Direction) -> Option<NodeId> {
        direction.index().and_then(|index| self.neighbors[index])
    }

    pub fn portal(&self) -> Option<NodeId> {
        self.portal
    }

    pub fn access(&self, direction: Direction) -> KindSet {
        direction
            .index()
            .map(|index| self.access[index])
            .unwrap_or_else(KindSet::empty)
    }
}

/// Navigation graph for one level. Entities refer to nodes by `NodeId`, so
/// access changes made by the owner are seen by everyone immediately.
#[derive(Clone, Debug, Default)]
pub struct NavGraph {
    nodes: Vec<Node>,
    lookup: HashMap<(i32, i32), NodeId>,
}

impl NavGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, position: Vec2) -> NodeId {
        let key = pixel_key(position);
        if let Some(id) = self.lookup.get(&key) {
            return *id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(position));
        self.lookup.insert(key, id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn position(&self, id: NodeId) -> Vec2 {
        self.nodes[id.0].position
    }

    pub fn node_at(&self, position: Vec2) -> Option<NodeId> {
        self.lookup.get(&pixel_key(position)).copied()
    }

    pub fn neighbor(&self, id: NodeId, direction: Direction) -> Option<NodeId> {
        self.nodes[id.0].neighbor(direction)
    }

    pub fn portal(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].portal
    }

    pub fn link(&mut self, from: NodeId, direction: Direction, to: NodeId) {
        let (Some(forward), Some(backward)) = (direction.index(), direction.reverse().index())
        else {
            return;
        };
        self.nodes[from.0].neighbors[forward] = Some(to);
        self.nodes[to.0].neighbors[backward] = Some(from);
    }

    pub fn link_portals(&mut self, a: NodeId, b: NodeId) {
        self.nodes[a.0].portal = Some(b);
        self.nodes[b.0].portal = Some(a);
    }

    pub fn deny_access(&mut self, id: NodeId, direction: Direction, kind: EntityKind) {
        if let Some(index) = direction.index() {
            self.nodes[id.0].access[index].remove(kind);
            trace!(node = id.0, ?direction, ?kind, "access denied");
        }
    }

    pub fn allow_access(&mut self, id: NodeId, direction: Direction, kind: EntityKind) {
        if let Some(index) = direction.index() {
            self.nodes[id.0].access[index].insert(kind);
            trace!(node = id.0, ?direction, ?kind, "access allowed");
        }
    }

    /// A direction is traversable only when a neighbor exists there and the
    /// kind is currently allowed through.
    pub fn is_valid(&self, id: NodeId, direction: Direction, kind: EntityKind) -> bool {
        let node = &self.nodes[id.0];
        node.neighbor(direction).is_some() && node.access(direction).contains(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Species;

    fn corridor() -> (NavGraph, NodeId, NodeId) {
        let mut graph = NavGraph::new();
        let a = graph.add_node(Vec2::new(0.0, 0.0));
        let b = graph.add_node(Vec2::new(16.0, 0.0));
        graph.link(a, Direction::Right, b);
        (graph, a, b)
    }

    #[test]
    fn links_are_symmetric() {
        let (graph, a, b) = corridor();
        assert_eq!(graph.neighbor(a, Direction::Right), Some(b));
        assert_eq!(graph.neighbor(b, Direction::Left), Some(a));
        assert_eq!(graph.neighbor(a, Direction::Left), None);
    }

    #[test]
    fn missing_neighbor_is_never_valid() {
        let (graph, a, _) = corridor();
        for kind in EntityKind::ALL {
            for direction in [Direction::Up, Direction::Down, Direction::Left, Direction::Stop] {
                assert!(!graph.is_valid(a, direction, kind));
            }
            assert!(graph.is_valid(a, Direction::Right, kind));
        }
    }

    #[test]
    fn deny_and_allow_are_idempotent() {
        let (mut graph, a, _) = corridor();
        let kind = EntityKind::Ghost(Species::Flank);
        graph.deny_access(a, Direction::Right, kind);
        graph.deny_access(a, Direction::Right, kind);
        assert!(!graph.is_valid(a, Direction::Right, kind));
        assert!(graph.is_valid(a, Direction::Right, EntityKind::Pacman));

        graph.allow_access(a, Direction::Right, kind);
        graph.allow_access(a, Direction::Right, kind);
        assert!(graph.is_valid(a, Direction::Right, kind));
        assert_eq!(graph.node(a).access(Direction::Right), KindSet::all());
    }

    #[test]
    fn access_sets_are_independent_per_node() {
        let (mut graph, a, b) = corridor();
        graph.deny_access(a, Direction::Right, EntityKind::Pacman);
        assert!(graph.node(b).access(Direction::Left).contains(EntityKind::Pacman));
        assert!(graph.node(b).access(Direction::Right).contains(EntityKind::Pacman));
    }

    #[test]
    fn add_node_reuses_existing_position() {
        let (mut graph, a, _) = corridor();
        assert_eq!(graph.add_node(Vec2::new(0.0, 0.0)), a);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.node_at(Vec2::new(16.0, 0.0)), Some(NodeId(1)));
    }

    #[test]
    fn portals_link_both_ways() {
        let (mut graph, a, _) = corridor();
        let far = graph.add_node(Vec2::new(432.0, 0.0));
        graph.link_portals(a, far);
        assert_eq!(graph.portal(a), Some(far));
        assert_eq!(graph.portal(far), Some(a));
    }
}

use glam::Vec2;

use crate::constants::{scaled_speed, BASE_SPEED, ENTITY_COLLIDE_RADIUS};
use crate::geometry::{overshot, TileGeometry};
use crate::graph::{NavGraph, NodeId};
use crate::rng::Rng;
use crate::types::{Direction, EntityKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectionPolicy {
    Random,
    GoalSeeking,
    PlayerInput,
}

pub struct MoveContext<'a> {
    pub graph: &'a NavGraph,
    pub geometry: &'a TileGeometry,
    pub dt: f32,
    pub intent: Direction,
}

/// A body travelling along graph edges with sub-tile interpolation.
#[derive(Clone, Debug)]
pub struct Mover {
    pub kind: EntityKind,
    pub position: Vec2,
    pub node: NodeId,
    pub target: NodeId,
    pub start_node: NodeId,
    pub direction: Direction,
    pub speed: f32,
    pub policy: DirectionPolicy,
    pub goal: Vec2,
    pub portal_disabled: bool,
    pub collide_radius: f32,
    pub visible: bool,
}

impl Mover {
    pub fn new(
        kind: EntityKind,
        node: NodeId,
        policy: DirectionPolicy,
        graph: &NavGraph,
        geometry: &TileGeometry,
    ) -> Self {
        let mut mover = Self {
            kind,
            position: graph.position(node),
            node,
            target: node,
            start_node: node,
            direction: Direction::Stop,
            speed: 0.0,
            policy,
            goal: Vec2::ZERO,
            portal_disabled: false,
            collide_radius: ENTITY_COLLIDE_RADIUS,
            visible: true,
        };
        mover.set_speed(BASE_SPEED, geometry);
        mover
    }

    pub fn set_start_node(&mut self, node: NodeId, graph: &NavGraph) {
        self.node = node;
        self.start_node = node;
        self.target = node;
        self.position = graph.position(node);
    }

    pub fn set_between_nodes(&mut self, direction: Direction, graph: &NavGraph) {
        let Some(next) = graph.neighbor(self.node, direction) else {
            return;
        };
        self.target = next;
        self.position = (graph.position(self.node) + graph.position(next)) * 0.5;
    }

    pub fn set_speed(&mut self, speed: f32, geometry: &TileGeometry) {
        self.speed = scaled_speed(speed, geometry.width());
    }

    pub fn reset(&mut self, base_speed: f32, graph: &NavGraph, geometry: &TileGeometry) {
        self.set_start_node(self.start_node, graph);
        self.direction = Direction::Stop;
        self.set_speed(base_speed, geometry);
        self.visible = true;
    }

    pub fn overshot_target(&self, graph: &NavGraph) -> bool {
        overshot(
            graph.position(self.node),
            graph.position(self.target),
            self.position,
        )
    }

    /// Swaps node and target and negates the direction; applying it twice is
    /// a no-op.
    pub fn reverse_direction(&mut self) {
        self.direction = self.direction.reverse();
        std::mem::swap(&mut self.node, &mut self.target);
    }

    pub fn update(&mut self, rng: &mut Rng, ctx: &MoveContext<'_>) {
        self.position += self.direction.unit_vector() * self.speed * ctx.dt;

        if !self.overshot_target(ctx.graph) {
            if self.policy == DirectionPolicy::PlayerInput
                && ctx.intent.is_reverse_of(self.direction)
            {
                self.reverse_direction();
            }
            return;
        }

        self.node = self.target;
        if !self.portal_disabled {
            if let Some(portal) = ctx.graph.portal(self.node) {
                self.node = portal;
            }
        }
        let choice = match self.policy {
            DirectionPolicy::PlayerInput => self.input_direction(ctx.graph, ctx.intent),
            DirectionPolicy::Random => {
                let directions =
                    valid_directions(ctx.graph, self.node, self.kind, self.direction);
                random_direction(&directions, rng)
            }
            DirectionPolicy::GoalSeeking => {
                let directions =
                    valid_directions(ctx.graph, self.node, self.kind, self.direction);
                goal_direction(
                    &directions,
                    ctx.graph.position(self.node),
                    self.goal,
                    ctx.geometry.width(),
                )
            }
        };
        self.retarget(ctx.graph, choice);
        self.position = ctx.graph.position(self.node);
    }

    fn input_direction(&self, graph: &NavGraph, intent: Direction) -> Direction {
        if graph.is_valid(self.node, intent, self.kind) {
            intent
        } else {
            self.direction
        }
    }

    fn new_target(&self, graph: &NavGraph, direction: Direction) -> NodeId {
        if graph.is_valid(self.node, direction, self.kind) {
            graph.neighbor(self.node, direction).unwrap_or(self.node)
        } else {
            self.node
        }
    }

    fn retarget(&mut self, graph: &NavGraph, choice: Direction) {
        let target = self.new_target(graph, choice);
        if target != self.node {
            self.target = target;
            self.direction = choice;
            return;
        }
        self.target = self.new_target(graph, self.direction);
        if self.target == self.node {
            self.direction = Direction::Stop;
        }
    }
}

/// Directions leaving `node` that `kind` may take, excluding the reverse of
/// `current` unless nothing else is left (dead end).
pub fn valid_directions(
    graph: &NavGraph,
    node: NodeId,
    kind: EntityKind,
    current: Direction,
) -> Vec<Direction> {
    let directions: Vec<Direction> = Direction::CARDINALS
        .into_iter()
        .filter(|direction| graph.is_valid(node, *direction, kind))
        .filter(|direction| !direction.is_reverse_of(current))
        .collect();
    if directions.is_empty() {
        return vec![current.reverse()];
    }
    directions
}

pub fn random_direction(directions: &[Direction], rng: &mut Rng) -> Direction {
    rng.pick(directions).unwrap_or(Direction::Stop)
}

/// Picks the candidate whose one-tile projection from `origin` lands closest
/// to `goal`. The first minimum wins, so candidates listed in cardinal order
/// tie-break up, down, left, right.
pub fn goal_direction(directions: &[Direction], origin: Vec2, goal: Vec2, tile: f32) -> Direction {
    let mut best = Direction::Stop;
    let mut best_distance = f32::INFINITY;
    for direction in directions {
        let projected = origin + direction.unit_vector() * tile;
        let distance = (projected - goal).length_squared();
        if distance < best_distance {
            best = *direction;
            best_distance = distance;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Species;

    const GHOST: EntityKind = EntityKind::Ghost(Species::Direct);

    fn geometry() -> TileGeometry {
        TileGeometry::new(16.0, 16.0).expect("valid geometry")
    }

    // (0,0) - (16,0) - (32,0), with (16,-16) above and (16,16) below the middle.
    fn cross() -> (NavGraph, [NodeId; 5]) {
        let mut graph = NavGraph::new();
        let left = graph.add_node(Vec2::new(0.0, 0.0));
        let mid = graph.add_node(Vec2::new(16.0, 0.0));
        let right = graph.add_node(Vec2::new(32.0, 0.0));
        let up = graph.add_node(Vec2::new(16.0, -16.0));
        let down = graph.add_node(Vec2::new(16.0, 16.0));
        graph.link(left, Direction::Right, mid);
        graph.link(mid, Direction::Right, right);
        graph.link(mid, Direction::Up, up);
        graph.link(mid, Direction::Down, down);
        (graph, [left, mid, right, up, down])
    }

    fn ctx<'a>(
        graph: &'a NavGraph,
        geometry: &'a TileGeometry,
        dt: f32,
        intent: Direction,
    ) -> MoveContext<'a> {
        MoveContext {
            graph,
            geometry,
            dt,
            intent,
        }
    }

    #[test]
    fn overshoot_moves_to_target_and_retargets() {
        let (graph, [left, mid, ..]) = cross();
        let geometry = geometry();
        let mut rng = Rng::new(1);
        let mut mover = Mover::new(GHOST, left, DirectionPolicy::GoalSeeking, &graph, &geometry);
        mover.target = mid;
        mover.direction = Direction::Right;
        mover.speed = 100.0;
        mover.goal = Vec2::new(16.0, 100.0);

        mover.update(&mut rng, &ctx(&graph, &geometry, 0.2, Direction::Stop));

        assert_eq!(mover.node, mid);
        assert_eq!(mover.direction, Direction::Down);
        assert_eq!(mover.target, graph.neighbor(mid, Direction::Down).expect("down"));
        assert_eq!(mover.position, Vec2::new(16.0, 0.0));
    }

    #[test]
    fn reverse_direction_is_self_inverse() {
        let (graph, [left, mid, ..]) = cross();
        let geometry = geometry();
        let mut mover = Mover::new(GHOST, left, DirectionPolicy::Random, &graph, &geometry);
        mover.target = mid;
        mover.direction = Direction::Right;

        mover.reverse_direction();
        assert_eq!((mover.node, mover.target, mover.direction), (mid, left, Direction::Left));
        mover.reverse_direction();
        assert_eq!((mover.node, mover.target, mover.direction), (left, mid, Direction::Right));
    }

    #[test]
    fn valid_directions_exclude_reverse_unless_dead_end() {
        let (graph, [left, mid, ..]) = cross();
        let directions = valid_directions(&graph, mid, GHOST, Direction::Right);
        assert_eq!(
            directions,
            vec![Direction::Up, Direction::Down, Direction::Right]
        );

        let dead_end = valid_directions(&graph, left, GHOST, Direction::Left);
        assert_eq!(dead_end, vec![Direction::Right]);
    }

    #[test]
    fn valid_directions_respect_access_sets() {
        let (mut graph, [_, mid, ..]) = cross();
        graph.deny_access(mid, Direction::Up, GHOST);
        let directions = valid_directions(&graph, mid, GHOST, Direction::Right);
        assert_eq!(directions, vec![Direction::Down, Direction::Right]);
        let player = valid_directions(&graph, mid, EntityKind::Pacman, Direction::Right);
        assert_eq!(player.len(), 3);
    }

    #[test]
    fn goal_seeking_ties_break_in_priority_order() {
        let origin = Vec2::new(16.0, 0.0);
        // Goal straight ahead on the diagonal: up and left are equidistant.
        let goal = Vec2::new(0.0, -16.0);
        let choice = goal_direction(
            &[Direction::Left, Direction::Up],
            origin,
            goal,
            16.0,
        );
        assert_eq!(choice, Direction::Left);
        let choice = goal_direction(
            &[Direction::Up, Direction::Left],
            origin,
            goal,
            16.0,
        );
        assert_eq!(choice, Direction::Up);

        let goal = origin;
        let all = Direction::CARDINALS;
        assert_eq!(goal_direction(&all, origin, goal, 16.0), Direction::Up);
    }

    #[test]
    fn random_policy_only_picks_valid_directions() {
        let (graph, [left, mid, ..]) = cross();
        let geometry = geometry();
        let mut rng = Rng::new(9);
        for _ in 0..40 {
            let mut mover = Mover::new(GHOST, left, DirectionPolicy::Random, &graph, &geometry);
            mover.target = mid;
            mover.direction = Direction::Right;
            mover.update(&mut rng, &ctx(&graph, &geometry, 1.0, Direction::Stop));
            assert_eq!(mover.node, mid);
            assert_ne!(mover.direction, Direction::Left);
            assert_ne!(mover.direction, Direction::Stop);
        }
    }

    #[test]
    fn player_reverses_mid_segment() {
        let (graph, [left, mid, ..]) = cross();
        let geometry = geometry();
        let mut rng = Rng::new(1);
        let mut mover = Mover::new(
            EntityKind::Pacman,
            left,
            DirectionPolicy::PlayerInput,
            &graph,
            &geometry,
        );
        mover.target = mid;
        mover.direction = Direction::Right;
        mover.update(&mut rng, &ctx(&graph, &geometry, 0.05, Direction::Left));

        assert_eq!(mover.direction, Direction::Left);
        assert_eq!(mover.node, mid);
        assert_eq!(mover.target, left);
    }

    #[test]
    fn player_keeps_direction_on_invalid_intent_then_stops_at_wall() {
        let (graph, [_, mid, right, ..]) = cross();
        let geometry = geometry();
        let mut rng = Rng::new(1);
        let mut mover = Mover::new(
            EntityKind::Pacman,
            mid,
            DirectionPolicy::PlayerInput,
            &graph,
            &geometry,
        );
        mover.target = right;
        mover.direction = Direction::Right;

        mover.update(&mut rng, &ctx(&graph, &geometry, 1.0, Direction::Up));
        assert_eq!(mover.node, right);
        assert_eq!(mover.target, right);
        assert_eq!(mover.direction, Direction::Stop);
        assert_eq!(mover.position, Vec2::new(32.0, 0.0));

        mover.update(&mut rng, &ctx(&graph, &geometry, 0.01, Direction::Left));
        assert_eq!(mover.direction, Direction::Left);
        assert_eq!(mover.target, mid);
    }

    #[test]
    fn portal_warps_unless_disabled() {
        let (mut graph, [left, mid, right, ..]) = cross();
        graph.link_portals(left, right);
        let geometry = geometry();
        let mut rng = Rng::new(1);

        let mut mover = Mover::new(GHOST, mid, DirectionPolicy::GoalSeeking, &graph, &geometry);
        mover.target = left;
        mover.direction = Direction::Left;
        mover.goal = Vec2::new(100.0, 0.0);
        mover.update(&mut rng, &ctx(&graph, &geometry, 1.0, Direction::Stop));
        assert_eq!(mover.node, right);
        assert_eq!(mover.position, Vec2::new(32.0, 0.0));

        let mut blocked = Mover::new(GHOST, mid, DirectionPolicy::GoalSeeking, &graph, &geometry);
        blocked.portal_disabled = true;
        blocked.target = left;
        blocked.direction = Direction::Left;
        blocked.update(&mut rng, &ctx(&graph, &geometry, 1.0, Direction::Stop));
        assert_eq!(blocked.node, left);
        assert_eq!(blocked.direction, Direction::Right);
    }

    #[test]
    fn set_between_nodes_parks_at_midpoint() {
        let (graph, [left, mid, ..]) = cross();
        let geometry = geometry();
        let mut mover = Mover::new(EntityKind::Fruit, left, DirectionPolicy::Random, &graph, &geometry);
        mover.set_between_nodes(Direction::Right, &graph);
        assert_eq!(mover.target, mid);
        assert_eq!(mover.position, Vec2::new(8.0, 0.0));
        mover.set_between_nodes(Direction::Up, &graph);
        assert_eq!(mover.position, Vec2::new(8.0, 0.0));
    }
}

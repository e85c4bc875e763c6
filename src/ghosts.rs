use tracing::debug;

use crate::config::RulesConfig;
use crate::geometry::TileGeometry;
use crate::graph::{NavGraph, NodeId};
use crate::modes::{ModeChange, ModeController};
use crate::movement::{DirectionPolicy, MoveContext, Mover};
use crate::pursuit::{goal_for_mode, PursuitContext};
use crate::rng::Rng;
use crate::types::{EntityKind, GhostMode, GhostView, Species};
use crate::world::LevelWorld;

#[derive(Clone, Debug)]
pub struct Ghost {
    pub species: Species,
    pub mover: Mover,
    pub mode: ModeController,
    pub points: u32,
    pub spawn_node: NodeId,
}

impl Ghost {
    pub fn new(species: Species, world: &LevelWorld, rules: &RulesConfig) -> Self {
        let mut mover = Mover::new(
            EntityKind::Ghost(species),
            world.ghost_start(species),
            DirectionPolicy::GoalSeeking,
            &world.graph,
            &world.geometry,
        );
        mover.set_speed(rules.base_speed, &world.geometry);
        mover.collide_radius = rules.collide_radius;
        Self {
            species,
            mover,
            mode: ModeController::new(rules),
            points: rules.capture_base_points,
            spawn_node: world.spawn_node,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.mover.kind
    }

    /// Advances the mode timers, refreshes the goal for the resulting mode,
    /// then moves. Returns the override that ended this tick, if any.
    pub fn update(
        &mut self,
        rng: &mut Rng,
        pursuit: &PursuitContext,
        ctx: &MoveContext<'_>,
        rules: &RulesConfig,
    ) -> Option<ModeChange> {
        let change = self
            .mode
            .update(ctx.dt, self.mover.node == self.spawn_node);
        if change.is_some() {
            self.normal_mode(rules, ctx.geometry);
        }
        if let Some(goal) = goal_for_mode(
            self.species,
            self.mode.current(),
            self.mover.position,
            pursuit,
            ctx.geometry,
            rules,
        ) {
            self.mover.goal = goal;
        }
        self.mover.update(rng, ctx);
        change
    }

    pub fn start_freight(&mut self, rules: &RulesConfig, geometry: &TileGeometry) -> bool {
        if !self.mode.set_freight() {
            return false;
        }
        self.mover.set_speed(rules.freight_speed, geometry);
        self.mover.policy = DirectionPolicy::Random;
        true
    }

    pub fn start_spawn(&mut self, graph: &NavGraph, rules: &RulesConfig, geometry: &TileGeometry) -> bool {
        if !self.mode.set_spawn() {
            return false;
        }
        self.mover.set_speed(rules.spawn_speed, geometry);
        self.mover.policy = DirectionPolicy::GoalSeeking;
        self.mover.goal = graph.position(self.spawn_node);
        true
    }

    fn normal_mode(&mut self, rules: &RulesConfig, geometry: &TileGeometry) {
        self.mover.set_speed(rules.base_speed, geometry);
        self.mover.policy = DirectionPolicy::GoalSeeking;
    }

    pub fn reset(&mut self, graph: &NavGraph, geometry: &TileGeometry, rules: &RulesConfig) {
        self.mover.reset(rules.base_speed, graph, geometry);
        self.mover.policy = DirectionPolicy::GoalSeeking;
        self.mode.reset(rules);
        self.points = rules.capture_base_points;
    }

    pub fn view(&self) -> GhostView {
        GhostView {
            species: self.species,
            x: self.mover.position.x,
            y: self.mover.position.y,
            dir: self.mover.direction,
            mode: self.mode.current(),
            visible: self.mover.visible,
            points: self.points,
        }
    }
}

/// The four adversaries, lead (direct species) first.
#[derive(Clone, Debug)]
pub struct GhostGroup {
    ghosts: Vec<Ghost>,
}

impl GhostGroup {
    pub fn new(world: &LevelWorld, rules: &RulesConfig) -> Self {
        Self {
            ghosts: Species::ALL
                .iter()
                .map(|species| Ghost::new(*species, world, rules))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ghost> {
        self.ghosts.iter()
    }

    pub fn len(&self) -> usize {
        self.ghosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ghosts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Ghost> {
        self.ghosts.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Ghost> {
        self.ghosts.get_mut(index)
    }

    pub fn by_species(&self, species: Species) -> Option<&Ghost> {
        self.ghosts.iter().find(|ghost| ghost.species == species)
    }

    pub fn by_species_mut(&mut self, species: Species) -> Option<&mut Ghost> {
        self.ghosts.iter_mut().find(|ghost| ghost.species == species)
    }

    fn lead_position(&self) -> Option<glam::Vec2> {
        self.by_species(Species::Direct)
            .map(|ghost| ghost.mover.position)
    }

    /// Updates ghosts in order; later ghosts see the lead's position after it
    /// has moved this tick.
    pub fn update(
        &mut self,
        rng: &mut Rng,
        player: &Mover,
        ctx: &MoveContext<'_>,
        rules: &RulesConfig,
    ) -> Vec<(Species, ModeChange)> {
        let mut changes = Vec::new();
        for idx in 0..self.ghosts.len() {
            let pursuit = PursuitContext {
                player_position: player.position,
                player_direction: player.direction,
                lead_position: self.lead_position(),
            };
            if let Some(change) = self.ghosts[idx].update(rng, &pursuit, ctx, rules) {
                debug!(species = self.ghosts[idx].species.label(), ?change, "override ended");
                changes.push((self.ghosts[idx].species, change));
            }
        }
        changes
    }

    /// Every ghost that can enters (or refreshes) freight. Capture values drop
    /// back to the base only when this opens a new window.
    pub fn start_freight(&mut self, rules: &RulesConfig, geometry: &TileGeometry) {
        let window_open = self
            .ghosts
            .iter()
            .any(|ghost| ghost.mode.current() == GhostMode::Freight);
        for ghost in &mut self.ghosts {
            ghost.start_freight(rules, geometry);
        }
        if !window_open {
            self.reset_points(rules.capture_base_points);
        }
    }

    pub fn update_points(&mut self) {
        for ghost in &mut self.ghosts {
            ghost.points = ghost.points.saturating_mul(2);
        }
    }

    pub fn reset_points(&mut self, base: u32) {
        for ghost in &mut self.ghosts {
            ghost.points = base;
        }
    }

    pub fn hide(&mut self) {
        for ghost in &mut self.ghosts {
            ghost.mover.visible = false;
        }
    }

    pub fn show(&mut self) {
        for ghost in &mut self.ghosts {
            ghost.mover.visible = true;
        }
    }

    pub fn reset(&mut self, graph: &NavGraph, geometry: &TileGeometry, rules: &RulesConfig) {
        for ghost in &mut self.ghosts {
            ghost.reset(graph, geometry, rules);
        }
    }

    pub fn modes(&self) -> Vec<GhostMode> {
        self.ghosts.iter().map(|ghost| ghost.mode.current()).collect()
    }
}

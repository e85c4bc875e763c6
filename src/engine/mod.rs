use tracing::{debug, info};

use crate::collision::collides;
use crate::config::RulesConfig;
use crate::error::CoreResult;
use crate::geometry::TileGeometry;
use crate::ghosts::GhostGroup;
use crate::movement::{DirectionPolicy, MoveContext, Mover};
use crate::pause::Pause;
use crate::rng::Rng;
use crate::types::{Direction, EntityKind, EntityView, GhostMode, RuntimeEvent, Snapshot, Species};
use crate::world::{LevelWorld, LAYOUTS};

mod fruit;

pub use self::fruit::Fruit;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PendingAction {
    ShowEntities,
    ResetLevel,
    RestartGame,
    NextLevel,
}

#[derive(Clone, Debug)]
pub struct GameEngineOptions {
    pub seed: u32,
    pub level: u32,
    pub rules: RulesConfig,
}

impl Default for GameEngineOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            level: 0,
            rules: RulesConfig::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GameEngine {
    pub rules: RulesConfig,
    pub world: LevelWorld,

    templates: Vec<LevelWorld>,
    start_level: u32,
    rng: Rng,
    pacman: Mover,
    alive: bool,
    ghosts: GhostGroup,
    fruit: Option<Fruit>,
    pause: Pause<PendingAction>,
    events: Vec<RuntimeEvent>,

    score: u32,
    lives: u32,
    tick_counter: u64,
    elapsed_secs: f32,
}

impl GameEngine {
    pub fn new(options: GameEngineOptions) -> CoreResult<Self> {
        let rules = options.rules;
        let geometry = TileGeometry::new(rules.tile_width, rules.tile_height)?;
        let templates = (0..LAYOUTS.len() as u32)
            .map(|level| LevelWorld::load(level, geometry))
            .collect::<CoreResult<Vec<_>>>()?;
        let world = fresh_world(&templates, options.level);
        let pacman = spawn_player(&world, &rules);
        let ghosts = GhostGroup::new(&world, &rules);

        let mut engine = Self {
            lives: rules.starting_lives,
            rules,
            world,
            templates,
            start_level: options.level,
            rng: Rng::new(options.seed),
            pacman,
            alive: true,
            ghosts,
            fruit: None,
            pause: Pause::new(true),
            events: Vec::new(),
            score: 0,
            tick_counter: 0,
            elapsed_secs: 0.0,
        };
        engine.announce_level();
        Ok(engine)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.world.level
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    pub fn player(&self) -> &Mover {
        &self.pacman
    }

    pub fn ghosts(&self) -> &GhostGroup {
        &self.ghosts
    }

    pub fn fruit(&self) -> Option<&Fruit> {
        self.fruit.as_ref()
    }

    pub fn toggle_pause(&mut self) {
        if !self.alive {
            return;
        }
        self.pause.toggle();
        debug!(paused = self.pause.is_paused(), "pause toggled");
    }

    pub fn step(&mut self, dt: f32, intent: Direction) {
        let dt = if dt.is_finite() {
            dt.min(self.rules.max_step_secs).max(0.0)
        } else {
            0.0
        };
        self.tick_counter += 1;
        self.elapsed_secs += dt;

        if !self.pause.is_paused() {
            self.update_ghosts(dt);
            self.update_player(dt, intent);
            self.resolve_contacts(dt);
        }

        if let Some(action) = self.pause.update(dt) {
            self.apply(action);
        }
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let snapshot = Snapshot {
            tick: self.tick_counter,
            elapsed_secs: self.elapsed_secs,
            level: self.world.level,
            score: self.score,
            lives: self.lives,
            paused: self.pause.is_paused(),
            pellets_remaining: self.world.pellets.len(),
            player: EntityView {
                x: self.pacman.position.x,
                y: self.pacman.position.y,
                dir: self.pacman.direction,
                visible: self.pacman.visible,
            },
            ghosts: self.ghosts.iter().map(|ghost| ghost.view()).collect(),
            fruit: self.fruit.as_ref().map(Fruit::view),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    fn update_ghosts(&mut self, dt: f32) {
        let before = self.ghosts.modes();
        let ctx = MoveContext {
            graph: &self.world.graph,
            geometry: &self.world.geometry,
            dt,
            intent: Direction::Stop,
        };
        let changes = self
            .ghosts
            .update(&mut self.rng, &self.pacman, &ctx, &self.rules);
        // Whatever override ended, the pen entrance closes behind the ghost.
        for (species, _) in changes {
            self.world.deny_home(EntityKind::Ghost(species));
        }
        self.record_mode_changes(&before);
    }

    fn update_player(&mut self, dt: f32, intent: Direction) {
        if !self.alive {
            return;
        }
        let ctx = MoveContext {
            graph: &self.world.graph,
            geometry: &self.world.geometry,
            dt,
            intent,
        };
        self.pacman.update(&mut self.rng, &ctx);
    }

    fn resolve_contacts(&mut self, dt: f32) {
        self.check_pellets();
        // A cleared level already owns the freeze.
        if self.pause.is_armed() {
            return;
        }
        self.check_ghosts();
        self.check_fruit(dt);
    }

    fn check_pellets(&mut self) {
        let Some(pellet) = self.world.pellets.eat_touching(&self.pacman) else {
            return;
        };
        self.score += pellet.points;
        self.events.push(RuntimeEvent::PelletEaten {
            points: pellet.points,
            power: pellet.power,
        });

        let eaten = self.world.pellets.eaten();
        if eaten == self.rules.flank_release_pellets {
            self.release(Species::Flank);
        }
        if eaten == self.rules.shy_release_pellets {
            self.release(Species::Shy);
        }
        if self.fruit.is_none() && self.rules.fruit_pellet_thresholds.contains(&eaten) {
            let fruit = Fruit::new(&self.world, &self.rules);
            debug!(eaten, points = fruit.points, "fruit spawned");
            self.events.push(RuntimeEvent::FruitSpawned {
                points: fruit.points,
            });
            self.fruit = Some(fruit);
        }

        if pellet.power {
            let before = self.ghosts.modes();
            self.ghosts.start_freight(&self.rules, &self.world.geometry);
            self.record_mode_changes(&before);
        }

        if self.world.pellets.is_empty() {
            info!(level = self.world.level, score = self.score, "level cleared");
            self.events.push(RuntimeEvent::LevelCleared {
                level: self.world.level,
            });
            self.hide_entities();
            self.pause
                .arm(self.rules.level_clear_freeze_secs, PendingAction::NextLevel);
        }
    }

    fn release(&mut self, species: Species) {
        if self.world.release_ghost(species) {
            debug!(species = species.label(), "ghost released from pen");
            self.events.push(RuntimeEvent::GhostReleased { species });
        }
    }

    fn check_ghosts(&mut self) {
        if !self.alive {
            return;
        }
        for idx in 0..self.ghosts.len() {
            let Some(ghost) = self.ghosts.get(idx) else {
                continue;
            };
            if !collides(&self.pacman, &ghost.mover) {
                continue;
            }
            match ghost.mode.current() {
                GhostMode::Freight => self.capture(idx),
                GhostMode::Scatter | GhostMode::Chase => {
                    self.kill_player();
                    // The death reset must stay armed.
                    return;
                }
                // Returning ghosts are intangible.
                GhostMode::Spawn => {}
            }
        }
    }

    fn capture(&mut self, idx: usize) {
        let before = self.ghosts.modes();
        let graph = &self.world.graph;
        let Some(ghost) = self.ghosts.get_mut(idx) else {
            return;
        };
        let species = ghost.species;
        let points = ghost.points;
        ghost.mover.visible = false;
        ghost.start_spawn(graph, &self.rules, &self.world.geometry);

        self.score += points;
        self.ghosts.update_points();
        self.pacman.visible = false;
        self.world.allow_home(EntityKind::Ghost(species));
        debug!(species = species.label(), points, "ghost captured");
        self.events
            .push(RuntimeEvent::GhostCaptured { species, points });
        self.record_mode_changes(&before);
        self.pause
            .arm(self.rules.capture_freeze_secs, PendingAction::ShowEntities);
    }

    fn kill_player(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.alive = false;
        self.pacman.direction = Direction::Stop;
        self.ghosts.hide();
        debug!(lives_left = self.lives, "player died");
        self.events.push(RuntimeEvent::PlayerDied {
            lives_left: self.lives,
        });
        if self.lives == 0 {
            info!(score = self.score, level = self.world.level, "game over");
            self.events.push(RuntimeEvent::GameOver { score: self.score });
            self.pause
                .arm(self.rules.death_freeze_secs, PendingAction::RestartGame);
        } else {
            self.pause
                .arm(self.rules.death_freeze_secs, PendingAction::ResetLevel);
        }
    }

    fn check_fruit(&mut self, dt: f32) {
        let Some(fruit) = self.fruit.as_mut() else {
            return;
        };
        fruit.update(dt);
        if collides(&self.pacman, &fruit.mover) {
            let points = fruit.points;
            self.score += points;
            self.events.push(RuntimeEvent::FruitEaten { points });
            self.fruit = None;
        } else if fruit.is_expired() {
            self.events.push(RuntimeEvent::FruitExpired);
            self.fruit = None;
        }
    }

    fn apply(&mut self, action: PendingAction) {
        debug!(?action, "freeze elapsed");
        match action {
            PendingAction::ShowEntities => self.show_entities(),
            PendingAction::ResetLevel => {
                self.reset_actors();
                self.pause.hold();
            }
            PendingAction::RestartGame => {
                self.score = 0;
                self.lives = self.rules.starting_lives;
                self.load_level(self.start_level);
                self.pause.hold();
            }
            PendingAction::NextLevel => {
                self.load_level(self.world.level + 1);
                self.pause.hold();
            }
        }
    }

    fn load_level(&mut self, level: u32) {
        self.world = fresh_world(&self.templates, level);
        self.pacman = spawn_player(&self.world, &self.rules);
        self.ghosts = GhostGroup::new(&self.world, &self.rules);
        self.alive = true;
        self.fruit = None;
        self.announce_level();
    }

    // Pellets and pen releases carry over a death.
    fn reset_actors(&mut self) {
        self.pacman
            .reset(self.rules.base_speed, &self.world.graph, &self.world.geometry);
        place_player(&mut self.pacman, &self.world);
        self.alive = true;
        self.ghosts
            .reset(&self.world.graph, &self.world.geometry, &self.rules);
        for species in Species::ALL {
            self.world.deny_home(EntityKind::Ghost(species));
        }
        self.fruit = None;
    }

    fn show_entities(&mut self) {
        self.pacman.visible = true;
        self.ghosts.show();
    }

    fn hide_entities(&mut self) {
        self.pacman.visible = false;
        self.ghosts.hide();
    }

    fn announce_level(&mut self) {
        info!(
            level = self.world.level,
            maze = self.world.layout.name,
            pellets = self.world.pellets.len(),
            "level started"
        );
        self.events.push(RuntimeEvent::LevelStarted {
            level: self.world.level,
        });
    }

    fn record_mode_changes(&mut self, before: &[GhostMode]) {
        for (ghost, previous) in self.ghosts.iter().zip(before) {
            let mode = ghost.mode.current();
            if mode != *previous {
                debug!(species = ghost.species.label(), ?mode, "ghost mode changed");
                self.events.push(RuntimeEvent::GhostModeChanged {
                    species: ghost.species,
                    mode,
                });
            }
        }
    }
}

fn fresh_world(templates: &[LevelWorld], level: u32) -> LevelWorld {
    let mut world = templates[level as usize % templates.len()].clone();
    world.level = level;
    world
}

fn spawn_player(world: &LevelWorld, rules: &RulesConfig) -> Mover {
    let mut pacman = Mover::new(
        EntityKind::Pacman,
        world.pacman_start,
        DirectionPolicy::PlayerInput,
        &world.graph,
        &world.geometry,
    );
    pacman.set_speed(rules.base_speed, &world.geometry);
    pacman.collide_radius = rules.collide_radius;
    place_player(&mut pacman, world);
    pacman
}

fn place_player(pacman: &mut Mover, world: &LevelWorld) {
    pacman.direction = Direction::Left;
    pacman.set_between_nodes(Direction::Left, &world.graph);
}

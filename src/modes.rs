use crate::config::RulesConfig;
use crate::types::GhostMode;

/// Fixed scatter/chase schedule. Keeps running underneath freight and spawn
/// so the baseline resumes in the right phase when an override ends.
#[derive(Clone, Debug)]
pub struct AutonomousCycle {
    mode: GhostMode,
    timer: f32,
    duration: f32,
    scatter_secs: f32,
    chase_secs: f32,
}

impl AutonomousCycle {
    pub fn new(scatter_secs: f32, chase_secs: f32) -> Self {
        Self {
            mode: GhostMode::Scatter,
            timer: 0.0,
            duration: scatter_secs,
            scatter_secs,
            chase_secs,
        }
    }

    pub fn mode(&self) -> GhostMode {
        self.mode
    }

    pub fn update(&mut self, dt: f32) {
        self.timer += dt;
        if self.timer < self.duration {
            return;
        }
        self.timer = 0.0;
        if self.mode == GhostMode::Scatter {
            self.mode = GhostMode::Chase;
            self.duration = self.chase_secs;
        } else {
            self.mode = GhostMode::Scatter;
            self.duration = self.scatter_secs;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeEvent {
    PowerPellet,
    Captured,
    FreightExpired,
    ReachedHome,
}

/// Pure transition table. `baseline` is what the autonomous cycle reports
/// right now. Events that do not apply leave the mode untouched.
pub fn next_mode(current: GhostMode, event: ModeEvent, baseline: GhostMode) -> GhostMode {
    match (current, event) {
        (GhostMode::Scatter | GhostMode::Chase | GhostMode::Freight, ModeEvent::PowerPellet) => {
            GhostMode::Freight
        }
        (GhostMode::Freight, ModeEvent::Captured) => GhostMode::Spawn,
        (GhostMode::Freight, ModeEvent::FreightExpired) => baseline,
        (GhostMode::Spawn, ModeEvent::ReachedHome) => baseline,
        (current, _) => current,
    }
}

/// Override that just ended; the owner restores base speed and policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeChange {
    FreightExpired,
    ReturnedHome,
}

#[derive(Clone, Debug)]
pub struct ModeController {
    current: GhostMode,
    freight_timer: f32,
    freight_secs: f32,
    cycle: AutonomousCycle,
}

impl ModeController {
    pub fn new(rules: &RulesConfig) -> Self {
        let cycle = AutonomousCycle::new(rules.scatter_secs, rules.chase_secs);
        Self {
            current: cycle.mode(),
            freight_timer: 0.0,
            freight_secs: rules.freight_secs,
            cycle,
        }
    }

    pub fn current(&self) -> GhostMode {
        self.current
    }

    pub fn baseline(&self) -> GhostMode {
        self.cycle.mode()
    }

    pub fn freight_remaining(&self) -> Option<f32> {
        (self.current == GhostMode::Freight)
            .then(|| (self.freight_secs - self.freight_timer).max(0.0))
    }

    pub fn update(&mut self, dt: f32, at_spawn_node: bool) -> Option<ModeChange> {
        self.cycle.update(dt);
        let baseline = self.cycle.mode();
        match self.current {
            GhostMode::Freight => {
                self.freight_timer += dt;
                if self.freight_timer >= self.freight_secs {
                    self.current = next_mode(self.current, ModeEvent::FreightExpired, baseline);
                    return Some(ModeChange::FreightExpired);
                }
                None
            }
            GhostMode::Spawn if at_spawn_node => {
                self.current = next_mode(self.current, ModeEvent::ReachedHome, baseline);
                Some(ModeChange::ReturnedHome)
            }
            GhostMode::Spawn => None,
            GhostMode::Scatter | GhostMode::Chase => {
                self.current = baseline;
                None
            }
        }
    }

    /// Enters freight or restarts its countdown. Returns false when the ghost
    /// is returning home and ignores the pellet.
    pub fn set_freight(&mut self) -> bool {
        let next = next_mode(self.current, ModeEvent::PowerPellet, self.cycle.mode());
        if next != GhostMode::Freight {
            return false;
        }
        self.current = next;
        self.freight_timer = 0.0;
        true
    }

    pub fn set_spawn(&mut self) -> bool {
        let next = next_mode(self.current, ModeEvent::Captured, self.cycle.mode());
        if next != GhostMode::Spawn {
            return false;
        }
        self.current = next;
        true
    }

    pub fn reset(&mut self, rules: &RulesConfig) {
        *self = Self::new(rules);
    }
}

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    AMBUSH_LOOKAHEAD_TILES, BASE_SPEED, CAPTURE_BASE_POINTS, CAPTURE_FREEZE_SECS, CHASE_SECS,
    DEATH_FREEZE_SECS, ENTITY_COLLIDE_RADIUS, FLANK_LOOKAHEAD_TILES, FLANK_RELEASE_PELLETS,
    FREIGHT_SECS, FREIGHT_SPEED, FRUIT_LIFESPAN_SECS, FRUIT_PELLET_THRESHOLDS,
    LEVEL_CLEAR_FREEZE_SECS, MAX_STEP_SECS, SCATTER_SECS, SHY_RADIUS_TILES, SHY_RELEASE_PELLETS,
    SPAWN_SPEED, STARTING_LIVES, TILE_HEIGHT, TILE_WIDTH,
};
use crate::error::CoreResult;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RulesConfig {
    pub tile_width: f32,
    pub tile_height: f32,
    pub max_step_secs: f32,
    pub scatter_secs: f32,
    pub chase_secs: f32,
    pub freight_secs: f32,
    pub base_speed: f32,
    pub freight_speed: f32,
    pub spawn_speed: f32,
    pub collide_radius: f32,
    pub capture_base_points: u32,
    pub starting_lives: u32,
    pub ambush_lookahead_tiles: f32,
    pub flank_lookahead_tiles: f32,
    pub shy_radius_tiles: f32,
    pub flank_release_pellets: u32,
    pub shy_release_pellets: u32,
    pub fruit_pellet_thresholds: Vec<u32>,
    pub fruit_lifespan_secs: f32,
    pub capture_freeze_secs: f32,
    pub death_freeze_secs: f32,
    pub level_clear_freeze_secs: f32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            tile_width: TILE_WIDTH,
            tile_height: TILE_HEIGHT,
            max_step_secs: MAX_STEP_SECS,
            scatter_secs: SCATTER_SECS,
            chase_secs: CHASE_SECS,
            freight_secs: FREIGHT_SECS,
            base_speed: BASE_SPEED,
            freight_speed: FREIGHT_SPEED,
            spawn_speed: SPAWN_SPEED,
            collide_radius: ENTITY_COLLIDE_RADIUS,
            capture_base_points: CAPTURE_BASE_POINTS,
            starting_lives: STARTING_LIVES,
            ambush_lookahead_tiles: AMBUSH_LOOKAHEAD_TILES,
            flank_lookahead_tiles: FLANK_LOOKAHEAD_TILES,
            shy_radius_tiles: SHY_RADIUS_TILES,
            flank_release_pellets: FLANK_RELEASE_PELLETS,
            shy_release_pellets: SHY_RELEASE_PELLETS,
            fruit_pellet_thresholds: FRUIT_PELLET_THRESHOLDS.to_vec(),
            fruit_lifespan_secs: FRUIT_LIFESPAN_SECS,
            capture_freeze_secs: CAPTURE_FREEZE_SECS,
            death_freeze_secs: DEATH_FREEZE_SECS,
            level_clear_freeze_secs: LEVEL_CLEAR_FREEZE_SECS,
        }
    }
}

impl RulesConfig {
    pub fn from_json_str(raw: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> CoreResult<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

pub const TILE_WIDTH: f32 = 16.0;
pub const TILE_HEIGHT: f32 = 16.0;
pub const BOARD_COLS: u32 = 28;
pub const BOARD_ROWS: u32 = 36;

/// Speeds are authored against a 16px tile and scaled by the real tile width.
pub const REFERENCE_TILE_WIDTH: f32 = 16.0;

pub const MAX_STEP_SECS: f32 = 1.0 / 30.0;

pub const SCATTER_SECS: f32 = 7.0;
pub const CHASE_SECS: f32 = 20.0;
pub const FREIGHT_SECS: f32 = 7.0;

pub const BASE_SPEED: f32 = 100.0;
pub const FREIGHT_SPEED: f32 = 50.0;
pub const SPAWN_SPEED: f32 = 150.0;

pub const ENTITY_COLLIDE_RADIUS: f32 = 5.0;
pub const PELLET_COLLIDE_RADIUS: f32 = 2.0;

pub const PELLET_POINTS: u32 = 10;
pub const POWER_PELLET_POINTS: u32 = 50;
pub const CAPTURE_BASE_POINTS: u32 = 200;
pub const FRUIT_BASE_POINTS: u32 = 100;
pub const FRUIT_POINTS_PER_LEVEL: u32 = 20;
pub const FRUIT_LIFESPAN_SECS: f32 = 10.0;

pub const STARTING_LIVES: u32 = 5;

pub const AMBUSH_LOOKAHEAD_TILES: f32 = 4.0;
pub const FLANK_LOOKAHEAD_TILES: f32 = 2.0;
pub const SHY_RADIUS_TILES: f32 = 8.0;

pub const FLANK_RELEASE_PELLETS: u32 = 30;
pub const SHY_RELEASE_PELLETS: u32 = 70;
pub const FRUIT_PELLET_THRESHOLDS: [u32; 2] = [50, 140];

pub const CAPTURE_FREEZE_SECS: f32 = 1.0;
pub const DEATH_FREEZE_SECS: f32 = 3.0;
pub const LEVEL_CLEAR_FREEZE_SECS: f32 = 3.0;

pub fn fruit_points(level: u32) -> u32 {
    FRUIT_BASE_POINTS + level * FRUIT_POINTS_PER_LEVEL
}

pub fn scaled_speed(speed: f32, tile_width: f32) -> f32 {
    speed * tile_width / REFERENCE_TILE_WIDTH
}
